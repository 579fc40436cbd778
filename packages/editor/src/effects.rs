//! # Post-command effects
//!
//! Editor features that act on every committed command rather than on a
//! command of their own. An effect may veto a result before it is
//! committed, and may emit follow-up steps that are applied to it.
//!
//! - [`CharacterLimit`] rejects results that grow past the limit
//! - [`UniqueIds`] gives configured node types a fresh id where one is
//!   missing or duplicated

use crate::commands::Rejection;
use crate::errors::TransformResult;
use crate::ids::IdGenerator;
use crate::queries::character_count;
use crate::steps::Step;
use folio_model::Node;
use folio_schema::Feature;
use serde_json::Value;
use std::collections::HashSet;

pub trait PostEffect: std::fmt::Debug + Send + Sync {
    /// Veto the transition from `before` to `after`
    fn check(&self, _before: &Node, _after: &Node) -> Option<Rejection> {
        None
    }

    /// Follow-up steps for a result about to be committed
    fn analyze(&mut self, doc: &Node) -> Vec<Step>;
}

#[derive(Debug)]
pub struct CharacterLimit {
    pub limit: usize,
}

impl PostEffect for CharacterLimit {
    fn check(&self, before: &Node, after: &Node) -> Option<Rejection> {
        let old = character_count(before).characters;
        let new = character_count(after).characters;
        (new > self.limit && new > old).then_some(Rejection::NotApplicable)
    }

    fn analyze(&mut self, _doc: &Node) -> Vec<Step> {
        vec![]
    }
}

#[derive(Debug)]
pub struct UniqueIds {
    attribute: String,
    types: Vec<String>,
    ids: IdGenerator,
}

impl UniqueIds {
    pub fn new(attribute: impl Into<String>, types: Vec<String>, ids: IdGenerator) -> Self {
        Self {
            attribute: attribute.into(),
            types,
            ids,
        }
    }
}

impl PostEffect for UniqueIds {
    fn analyze(&mut self, doc: &Node) -> Vec<Step> {
        let mut seen = HashSet::new();
        let mut steps = Vec::new();
        let attribute = self.attribute.as_str();
        let types = &self.types;
        let ids = &mut self.ids;

        doc.walk(&mut |node: &Node, path: &[usize]| {
            if !types.contains(&node.kind) || !node.attrs.contains_key(attribute) {
                return true;
            }
            let current = node.attr_str(attribute).filter(|id| !id.is_empty());
            if let Some(id) = current {
                if seen.insert(id.to_string()) {
                    return true;
                }
            }
            let mut fresh = ids.new_id();
            while seen.contains(&fresh) {
                fresh = ids.new_id();
            }
            seen.insert(fresh.clone());

            let mut attrs = node.attrs.clone();
            attrs.insert(attribute.to_string(), Value::String(fresh));
            steps.push(Step::SetAttrs {
                path: path.to_vec(),
                attrs,
            });
            true
        });
        steps
    }
}

/// The effects the schema's features ask for
#[derive(Debug, Default)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effects for `features`; id generation is seeded from `doc`
    pub fn from_features(features: &[Feature], doc: &Node) -> Self {
        let mut engine = Self::new();
        for feature in features {
            match feature {
                Feature::CharacterCount { limit: Some(limit) } => {
                    engine.register(CharacterLimit { limit: *limit });
                }
                Feature::UniqueId { attribute, types } => {
                    engine.register(UniqueIds::new(attribute.clone(), types.clone(), IdGenerator::new(doc)));
                }
                _ => {}
            }
        }
        engine
    }

    pub fn register<E: PostEffect + 'static>(&mut self, effect: E) {
        self.effects.push(Box::new(effect));
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// First veto any effect raises
    pub fn check(&self, before: &Node, after: &Node) -> Option<Rejection> {
        self.effects.iter().find_map(|effect| effect.check(before, after))
    }

    /// Apply every effect's follow-up steps to `doc`, returning them
    pub fn apply(&mut self, doc: &mut Node) -> TransformResult<Vec<Step>> {
        let mut applied = Vec::new();
        for effect in &mut self.effects {
            for step in effect.analyze(doc) {
                step.apply(doc)?;
                applied.push(step);
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(ids: [Option<&str>; 3]) -> Node {
        Node::new("doc").with_content(
            ids.iter()
                .map(|id| {
                    Node::new("paragraph")
                        .with_attr("id", id.map_or(Value::Null, Value::from))
                        .with_child(Node::text("x"))
                })
                .collect(),
        )
    }

    #[test]
    fn test_fills_missing_and_duplicate_ids() {
        let mut engine = PostEffectEngine::new();
        engine.register(UniqueIds::new(
            "id",
            vec!["paragraph".to_string()],
            IdGenerator::from_seed("s".to_string()),
        ));

        let mut doc = doc([Some("a"), None, Some("a")]);
        let steps = engine.apply(&mut doc).unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(doc.content[0].attr_str("id"), Some("a"));
        assert_eq!(doc.content[1].attr_str("id"), Some("s-1"));
        assert_eq!(doc.content[2].attr_str("id"), Some("s-2"));

        // stable once every node has an id
        assert!(engine.apply(&mut doc).unwrap().is_empty());
    }

    #[test]
    fn test_character_limit_rejects_growth_only() {
        let engine = PostEffectEngine::from_features(&[Feature::CharacterCount { limit: Some(2) }], &Node::new("doc"));
        let short = Node::new("doc").with_child(Node::new("paragraph").with_child(Node::text("abc")));
        let shorter = Node::new("doc").with_child(Node::new("paragraph").with_child(Node::text("ab")));

        assert_eq!(engine.check(&shorter, &short), Some(Rejection::NotApplicable));
        // over the limit but shrinking
        assert_eq!(engine.check(&short, &shorter), None);
    }
}
