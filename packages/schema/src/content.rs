//! # Content expressions
//!
//! A content expression constrains the child sequence of a node type:
//!
//! ```text
//! block+                       one or more nodes of group `block`
//! paragraph block*             a paragraph, then any number of blocks
//! detailsSummary detailsContent
//! (tableCell | tableHeader)*
//! ```
//!
//! Expressions are tokenized with logos, parsed into a [`ContentExpr`] and
//! compiled into a small NFA ([`ContentModel`]) once the set of node types
//! and groups is known.

use logos::Logos;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum ContentToken<'src> {
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Name(&'src str),

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("|")]
    Pipe,

    #[token("+")]
    Plus,

    #[token("*")]
    Star,

    #[token("?")]
    Question,
}

impl fmt::Display for ContentToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentToken::Name(name) => write!(f, "`{}`", name),
            ContentToken::LParen => write!(f, "`(`"),
            ContentToken::RParen => write!(f, "`)`"),
            ContentToken::Pipe => write!(f, "`|`"),
            ContentToken::Plus => write!(f, "`+`"),
            ContentToken::Star => write!(f, "`*`"),
            ContentToken::Question => write!(f, "`?`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentExpr {
    /// A node type or group name
    Name(String),
    Seq(Vec<ContentExpr>),
    Choice(Vec<ContentExpr>),
    Plus(Box<ContentExpr>),
    Star(Box<ContentExpr>),
    Opt(Box<ContentExpr>),
}

impl ContentExpr {
    /// Every name the expression mentions
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            ContentExpr::Name(name) => names.push(name),
            ContentExpr::Seq(items) | ContentExpr::Choice(items) => {
                items.iter().for_each(|item| item.collect_names(names))
            }
            ContentExpr::Plus(inner) | ContentExpr::Star(inner) | ContentExpr::Opt(inner) => {
                inner.collect_names(names)
            }
        }
    }
}

/// Parse a content expression. The error is a human readable message.
pub fn parse_content(source: &str) -> Result<ContentExpr, String> {
    let mut tokens = Vec::new();
    for (token, span) in ContentToken::lexer(source).spanned() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => return Err(format!("unexpected character at {}", span.start)),
        }
    }
    let mut parser = ContentParser { tokens, pos: 0 };
    let expr = parser.parse_choice()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(format!("unexpected {}", token)),
    }
}

struct ContentParser<'src> {
    tokens: Vec<ContentToken<'src>>,
    pos: usize,
}

impl<'src> ContentParser<'src> {
    fn peek(&self) -> Option<&ContentToken<'src>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&ContentToken<'src>> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn check(&self, token: &ContentToken) -> bool {
        self.peek() == Some(token)
    }

    fn parse_choice(&mut self) -> Result<ContentExpr, String> {
        let mut alternatives = vec![self.parse_seq()?];
        while self.check(&ContentToken::Pipe) {
            self.advance();
            alternatives.push(self.parse_seq()?);
        }
        Ok(if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            ContentExpr::Choice(alternatives)
        })
    }

    fn parse_seq(&mut self) -> Result<ContentExpr, String> {
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token, ContentToken::RParen | ContentToken::Pipe) {
                break;
            }
            items.push(self.parse_item()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            ContentExpr::Seq(items)
        })
    }

    fn parse_item(&mut self) -> Result<ContentExpr, String> {
        let mut expr = self.parse_atom()?;
        loop {
            expr = match self.peek() {
                Some(ContentToken::Plus) => ContentExpr::Plus(Box::new(expr)),
                Some(ContentToken::Star) => ContentExpr::Star(Box::new(expr)),
                Some(ContentToken::Question) => ContentExpr::Opt(Box::new(expr)),
                _ => return Ok(expr),
            };
            self.advance();
        }
    }

    fn parse_atom(&mut self) -> Result<ContentExpr, String> {
        match self.advance().cloned() {
            Some(ContentToken::Name(name)) => Ok(ContentExpr::Name(name.to_string())),
            Some(ContentToken::LParen) => {
                let inner = self.parse_choice()?;
                match self.advance() {
                    Some(ContentToken::RParen) => Ok(inner),
                    Some(token) => Err(format!("expected `)`, found {}", token)),
                    None => Err("expected `)`, found end of expression".to_string()),
                }
            }
            Some(token) => Err(format!("expected a name or `(`, found {}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct Edge {
    /// Index into `terms`, or `None` for an epsilon edge
    term: Option<usize>,
    to: usize,
}

/// Compiled content expression
#[derive(Debug, Clone)]
pub struct ContentModel {
    expression: String,
    /// Node types each term accepts, in schema order
    terms: Vec<Vec<String>>,
    states: Vec<Vec<Edge>>,
    accept: usize,
}

type StateSet = BTreeSet<usize>;

impl ContentModel {
    /// Compile `expr`. `resolve` maps a name to the node types it stands
    /// for (the type itself, or every member of a group) and returns `None`
    /// for names the schema does not know.
    pub fn compile<F>(expression: &str, expr: &ContentExpr, resolve: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<Vec<String>>,
    {
        let mut model = ContentModel {
            expression: expression.to_string(),
            terms: Vec::new(),
            states: vec![Vec::new()],
            accept: 0,
        };
        model.accept = model.compile_expr(expr, 0, &resolve)?;
        Ok(model)
    }

    /// Content model that accepts only an empty child list
    pub fn empty() -> Self {
        ContentModel {
            expression: String::new(),
            terms: Vec::new(),
            states: vec![Vec::new()],
            accept: 0,
        }
    }

    fn new_state(&mut self) -> usize {
        self.states.push(Vec::new());
        self.states.len() - 1
    }

    fn epsilon(&mut self, from: usize, to: usize) {
        self.states[from].push(Edge { term: None, to });
    }

    fn compile_expr<F>(&mut self, expr: &ContentExpr, from: usize, resolve: &F) -> Result<usize, String>
    where
        F: Fn(&str) -> Option<Vec<String>>,
    {
        match expr {
            ContentExpr::Name(name) => {
                let types = resolve(name).ok_or_else(|| format!("unknown type or group `{}`", name))?;
                let term = match self.terms.iter().position(|t| *t == types) {
                    Some(index) => index,
                    None => {
                        self.terms.push(types);
                        self.terms.len() - 1
                    }
                };
                let to = self.new_state();
                self.states[from].push(Edge { term: Some(term), to });
                Ok(to)
            }
            ContentExpr::Seq(items) => {
                let mut state = from;
                for item in items {
                    state = self.compile_expr(item, state, resolve)?;
                }
                Ok(state)
            }
            ContentExpr::Choice(alternatives) => {
                let end = self.new_state();
                for alternative in alternatives {
                    let entry = self.new_state();
                    self.epsilon(from, entry);
                    let exit = self.compile_expr(alternative, entry, resolve)?;
                    self.epsilon(exit, end);
                }
                Ok(end)
            }
            ContentExpr::Star(inner) => {
                let head = self.new_state();
                self.epsilon(from, head);
                let exit = self.compile_expr(inner, head, resolve)?;
                self.epsilon(exit, head);
                Ok(head)
            }
            ContentExpr::Plus(inner) => {
                let first = self.compile_expr(inner, from, resolve)?;
                self.compile_expr(&ContentExpr::Star(inner.clone()), first, resolve)
            }
            ContentExpr::Opt(inner) => {
                let entry = self.new_state();
                self.epsilon(from, entry);
                let exit = self.compile_expr(inner, entry, resolve)?;
                self.epsilon(entry, exit);
                Ok(exit)
            }
        }
    }

    fn closure(&self, mut set: StateSet) -> StateSet {
        let mut stack: Vec<usize> = set.iter().copied().collect();
        while let Some(state) = stack.pop() {
            for edge in &self.states[state] {
                if edge.term.is_none() && set.insert(edge.to) {
                    stack.push(edge.to);
                }
            }
        }
        set
    }

    fn step(&self, set: &StateSet, type_name: &str) -> StateSet {
        let mut next = StateSet::new();
        for state in set {
            for edge in &self.states[*state] {
                if let Some(term) = edge.term {
                    if self.terms[term].iter().any(|t| t == type_name) {
                        next.insert(edge.to);
                    }
                }
            }
        }
        self.closure(next)
    }

    fn run<'a, I>(&self, types: I) -> StateSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = self.closure(StateSet::from([0]));
        for type_name in types {
            if set.is_empty() {
                break;
            }
            set = self.step(&set, type_name);
        }
        set
    }

    /// The whole child sequence satisfies the expression
    pub fn matches<'a, I>(&self, types: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.run(types).contains(&self.accept)
    }

    /// The sequence is a valid prefix of some matching sequence
    pub fn accepts_prefix<'a, I>(&self, types: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        !self.run(types).is_empty()
    }

    /// Shortest list of types to append to `types` so the sequence matches,
    /// or `None` when `types` is not a valid prefix. Terms that only accept
    /// `excluded` types (text, usually) are never used for filling.
    pub fn fill<'a, I>(&self, types: I, excluded: &[&str]) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let start = self.run(types);
        if start.is_empty() {
            return None;
        }

        let mut seen: HashSet<StateSet> = HashSet::new();
        let mut queue = VecDeque::from([(start, Vec::new())]);
        while let Some((set, path)) = queue.pop_front() {
            if set.contains(&self.accept) {
                return Some(path);
            }
            if !seen.insert(set.clone()) {
                continue;
            }
            for state in &set {
                for edge in &self.states[*state] {
                    let Some(term) = edge.term else { continue };
                    let Some(candidate) = self.terms[term]
                        .iter()
                        .find(|t| !excluded.contains(&t.as_str()))
                    else {
                        continue;
                    };
                    let next = self.step(&set, candidate);
                    let mut next_path = path.clone();
                    next_path.push(candidate.clone());
                    queue.push_back((next, next_path));
                }
            }
        }
        None
    }

    /// Some term accepts `type_name`
    pub fn allows(&self, type_name: &str) -> bool {
        self.terms.iter().any(|term| term.iter().any(|t| t == type_name))
    }

    /// Types accepted anywhere in the expression, in first-seen order
    pub fn allowed_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for term in &self.terms {
            for t in term {
                if !types.contains(&t.as_str()) {
                    types.push(t);
                }
            }
        }
        types
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Accepts nothing but the empty sequence
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(source: &str) -> ContentModel {
        let expr = parse_content(source).unwrap();
        ContentModel::compile(source, &expr, |name| match name {
            "block" => Some(vec!["paragraph".into(), "heading".into(), "layout".into()]),
            "inline" => Some(vec!["text".into(), "hardBreak".into()]),
            other => Some(vec![other.to_string()]),
        })
        .unwrap()
    }

    #[test]
    fn test_parse_grammar() {
        assert_eq!(
            parse_content("paragraph block*").unwrap(),
            ContentExpr::Seq(vec![
                ContentExpr::Name("paragraph".into()),
                ContentExpr::Star(Box::new(ContentExpr::Name("block".into()))),
            ])
        );
        assert_eq!(
            parse_content("(tableCell | tableHeader)+").unwrap().names(),
            vec!["tableCell", "tableHeader"]
        );
        assert!(parse_content("(paragraph").is_err());
        assert!(parse_content("paragraph)").is_err());
        assert!(parse_content("para-graph").is_err());
    }

    #[test]
    fn test_plus_requires_one() {
        let columns = model("layoutColumn+");

        assert!(!columns.matches([]));
        assert!(columns.matches(["layoutColumn"]));
        assert!(columns.matches(["layoutColumn"; 5]));
        assert!(!columns.matches(["layoutColumn", "paragraph"]));
    }

    #[test]
    fn test_group_terms() {
        let list_item = model("paragraph block*");

        assert!(list_item.matches(["paragraph", "heading", "layout"]));
        assert!(!list_item.matches(["heading"]));
        assert!(list_item.allows("layout"));
    }

    #[test]
    fn test_sequence_and_optional() {
        let details = model("detailsSummary detailsContent");
        assert!(details.matches(["detailsSummary", "detailsContent"]));
        assert!(!details.matches(["detailsContent"]));

        let optional = model("heading? paragraph");
        assert!(optional.matches(["paragraph"]));
        assert!(optional.matches(["heading", "paragraph"]));
        assert!(!optional.matches(["heading", "heading", "paragraph"]));
    }

    #[test]
    fn test_fill_required_content() {
        let doc = model("block+");
        assert_eq!(doc.fill([], &["text"]), Some(vec!["paragraph".to_string()]));
        assert_eq!(doc.fill(["heading"], &["text"]), Some(vec![]));

        let details = model("detailsSummary detailsContent");
        assert_eq!(
            details.fill([], &["text"]),
            Some(vec!["detailsSummary".to_string(), "detailsContent".to_string()])
        );
        assert_eq!(details.fill(["detailsContent"], &["text"]), None);

        let textblock = model("inline*");
        assert_eq!(textblock.fill([], &["text"]), Some(vec![]));
    }

    #[test]
    fn test_unknown_name_is_error() {
        let expr = parse_content("nope+").unwrap();
        let result = ContentModel::compile("nope+", &expr, |_| None);
        assert!(result.is_err());
    }
}
