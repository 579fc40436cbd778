use crc32fast::Hasher;
use folio_model::Node;

/// Seed for a document: CRC32 of its JSON form
pub fn document_seed(doc: &Node) -> String {
    let mut hasher = Hasher::new();
    hasher.update(serde_json::to_string(doc).unwrap_or_default().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ids sharing one document seed
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(doc: &Node) -> Self {
        Self::from_seed(document_seed(doc))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_stable() {
        let doc = Node::new("doc").with_child(Node::new("paragraph").with_child(Node::text("a")));
        assert_eq!(document_seed(&doc), document_seed(&doc.clone()));

        let other = Node::new("doc").with_child(Node::new("paragraph").with_child(Node::text("b")));
        assert_ne!(document_seed(&doc), document_seed(&other));
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = IdGenerator::from_seed("abc".to_string());

        assert_eq!(ids.new_id(), "abc-1");
        assert_eq!(ids.new_id(), "abc-2");
        assert_eq!(ids.seed(), "abc");
    }
}
