//! # Attribute descriptors
//!
//! An [`AttributeSpec`] declares one attribute of a node or mark type: its
//! default, where its value is read from in markup and what markup it emits.
//!
//! Two rules hold for every descriptor regardless of how it is configured:
//!
//! - parsing never fails: a missing or unreadable markup attribute yields the
//!   declared default
//! - rendering emits nothing for a null or empty value or for the default
//!   value, so serialized markup stays minimal
//! - stored values are normalized to what the markup reads back
//!   ([`AttributeSpec::normalize`]), so every stored value reparses to itself

use folio_markup::{merge_attributes, Attributes, Element};
use folio_model::Attrs;
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

pub type ParseAttrFn = Arc<dyn Fn(&Element) -> Option<Value> + Send + Sync>;
pub type RenderAttrFn = Arc<dyn Fn(&Attrs) -> Attributes + Send + Sync>;

/// How a markup string is turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `true`/`false` become booleans, numerals become numbers
    Auto,
    String,
    Number,
    Boolean,
}

/// Where a descriptor reads its value from
#[derive(Clone)]
pub enum AttrSource {
    /// A markup attribute, coerced with `kind`
    Attribute { name: String, kind: ValueKind },
    /// `true` when the markup attribute is present at all
    Present(String),
    /// One property of the inline `style` attribute
    Style(String),
    Custom(ParseAttrFn),
    /// Not read from markup; only set through commands
    None,
}

/// What a descriptor writes for a non-default value
#[derive(Clone)]
pub enum AttrTarget {
    /// `name="value"`
    Attribute(String),
    /// `name=""` when the value is truthy
    Boolean(String),
    /// `style="property: value"`
    Style(String),
    /// `class="<prefix><value>"`
    Class(String),
    Custom(RenderAttrFn),
}

#[derive(Clone)]
pub struct AttributeSpec {
    pub key: String,
    pub default: Value,
    pub source: AttrSource,
    pub targets: Vec<AttrTarget>,
    /// Carried over when a textblock changes type or is split
    pub keep_on_split: bool,
}

impl AttributeSpec {
    /// Attribute read from and written to a markup attribute of the same name
    pub fn new(key: impl Into<String>, default: impl Into<Value>) -> Self {
        let key = key.into();
        Self {
            source: AttrSource::Attribute {
                name: key.clone(),
                kind: ValueKind::Auto,
            },
            targets: vec![AttrTarget::Attribute(key.clone())],
            key,
            default: default.into(),
            keep_on_split: true,
        }
    }

    /// Attribute stored as `data-<kebab-key>`, kept as a string
    pub fn data(key: impl Into<String>, default: impl Into<Value>) -> Self {
        let key = key.into();
        let name = data_attribute_name(&key);
        Self {
            source: AttrSource::Attribute {
                name: name.clone(),
                kind: ValueKind::String,
            },
            targets: vec![AttrTarget::Attribute(name)],
            key,
            default: default.into(),
            keep_on_split: true,
        }
    }

    /// Attribute that is never read from or written to markup
    pub fn internal(key: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            source: AttrSource::None,
            targets: Vec::new(),
            keep_on_split: true,
        }
    }

    pub fn parse_from(mut self, source: AttrSource) -> Self {
        self.source = source;
        self
    }

    pub fn render_to(mut self, targets: Vec<AttrTarget>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_target(mut self, target: AttrTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Coerce the source attribute as a number
    pub fn numeric(mut self) -> Self {
        if let AttrSource::Attribute { kind, .. } = &mut self.source {
            *kind = ValueKind::Number;
        }
        self
    }

    pub fn keep_on_split(mut self, keep: bool) -> Self {
        self.keep_on_split = keep;
        self
    }

    /// Read the value from `element`, falling back to the default
    pub fn parse(&self, element: &Element) -> Value {
        let parsed = match &self.source {
            AttrSource::Attribute { name, kind } => element
                .attribute(name)
                .and_then(|raw| coerce_value(raw, *kind)),
            AttrSource::Present(name) => element.has_attribute(name).then_some(Value::Bool(true)),
            AttrSource::Style(property) => element
                .style(property)
                .map(|raw| Value::String(raw.trim_matches(|c| c == '"' || c == '\'').to_string())),
            AttrSource::Custom(parse) => parse(element),
            AttrSource::None => None,
        };
        match parsed {
            Some(value) => self.normalize(value),
            None => self.default.clone(),
        }
    }

    /// The value this descriptor reads back after rendering `value`. Scalars
    /// take the kind of the markup source; values that render nothing
    /// become the default.
    pub fn normalize(&self, value: Value) -> Value {
        if is_blank(&value) {
            return self.default.clone();
        }
        let scalar = !matches!(value, Value::Array(_) | Value::Object(_));
        match &self.source {
            AttrSource::Attribute { kind, .. } if scalar => {
                coerce_value(&value_to_string(&value), *kind).unwrap_or_else(|| self.default.clone())
            }
            AttrSource::Style(_) if scalar => Value::String(value_to_string(&value)),
            AttrSource::Present(_) => Value::Bool(is_truthy(&value)),
            _ => value,
        }
    }

    /// Markup attributes for the value of this descriptor in `attrs`
    pub fn render(&self, attrs: &Attrs) -> Attributes {
        let mut out = Attributes::new();
        let value = match attrs.get(&self.key) {
            Some(value) => value,
            None => return out,
        };
        if self.is_default(value) {
            return out;
        }

        for target in &self.targets {
            let rendered = match target {
                AttrTarget::Attribute(name) => single(name, value_to_string(value)),
                AttrTarget::Boolean(name) if is_truthy(value) => single(name, String::new()),
                AttrTarget::Boolean(_) => Attributes::new(),
                AttrTarget::Style(property) => {
                    single("style", format!("{}: {}", property, value_to_string(value)))
                }
                AttrTarget::Class(prefix) => {
                    single("class", format!("{}{}", prefix, value_to_string(value)))
                }
                AttrTarget::Custom(render) => render(attrs),
            };
            merge_attributes(&mut out, rendered);
        }
        out
    }

    /// Null, the empty string and the declared default never produce markup
    pub fn is_default(&self, value: &Value) -> bool {
        is_blank(value) || *value == self.default
    }
}

impl fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("keep_on_split", &self.keep_on_split)
            .finish()
    }
}

fn single(name: &str, value: String) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(name.to_string(), value);
    attributes
}

/// `spaceBefore` → `data-space-before`
pub fn data_attribute_name(key: &str) -> String {
    let mut name = String::from("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// Coerce a raw markup string to a value of the given kind
pub fn coerce_value(raw: &str, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::String => Some(Value::String(raw.to_string())),
        ValueKind::Number => parse_number(raw),
        ValueKind::Boolean => Some(Value::Bool(raw != "false")),
        ValueKind::Auto => Some(match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => parse_number(raw).unwrap_or_else(|| Value::String(raw.to_string())),
        }),
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parse every descriptor of a type from `element`
pub fn parse_attributes(specs: &[AttributeSpec], element: &Element) -> Attrs {
    specs
        .iter()
        .map(|spec| (spec.key.clone(), spec.parse(element)))
        .collect()
}

/// Render every descriptor of a type, merging class and style output
pub fn render_attributes(specs: &[AttributeSpec], attrs: &Attrs) -> Attributes {
    let mut out = Attributes::new();
    for spec in specs {
        merge_attributes(&mut out, spec.render(attrs));
    }
    out
}

/// Restrict `attrs` to the declared keys, normalize the given values and
/// default-fill the missing ones
pub fn fill_defaults(specs: &[AttributeSpec], attrs: &Attrs) -> Attrs {
    specs
        .iter()
        .map(|spec| {
            let value = match attrs.get(&spec.key) {
                Some(value) => spec.normalize(value.clone()),
                None => spec.default.clone(),
            };
            (spec.key.clone(), value)
        })
        .collect()
}

/// Insert or replace `spec` by key, keeping declaration order
pub fn upsert_attribute(specs: &mut Vec<AttributeSpec>, spec: AttributeSpec) {
    match specs.iter_mut().find(|existing| existing.key == spec.key) {
        Some(existing) => *existing = spec,
        None => specs.push(spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> Attrs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn reparse(spec: &AttributeSpec, value: Value) -> Value {
        let rendered = spec.render(&attrs(&[(&spec.key, value)]));
        spec.parse(&Element::new("div").with_attributes(rendered))
    }

    #[test]
    fn test_data_attribute_round_trip() {
        let spec = AttributeSpec::data("spaceBefore", Value::Null);

        assert_eq!(data_attribute_name("spaceBefore"), "data-space-before");
        assert_eq!(reparse(&spec, json!("16")), json!("16"));
        assert_eq!(reparse(&spec, Value::Null), Value::Null);
    }

    #[test]
    fn test_stored_values_take_the_markup_kind() {
        let spacing = AttributeSpec::data("spaceBefore", Value::Null);
        assert_eq!(spacing.normalize(json!(16)), json!("16"));
        assert_eq!(reparse(&spacing, spacing.normalize(json!(16))), json!("16"));

        let level = AttributeSpec::new("level", 1);
        assert_eq!(level.normalize(json!("3")), json!(3));
        assert_eq!(level.normalize(json!("")), json!(1));

        let columns = AttributeSpec::new("columns", 2).numeric();
        assert_eq!(columns.normalize(json!("many")), json!(2));

        let filled = fill_defaults(&[spacing], &attrs(&[("spaceBefore", json!(8))]));
        assert_eq!(filled["spaceBefore"], json!("8"));
    }

    #[test]
    fn test_empty_value_is_omitted() {
        let spec = AttributeSpec::data("variant", Value::Null).with_target(AttrTarget::Class("paragraph-".into()));

        assert!(spec.render(&attrs(&[("variant", json!(""))])).is_empty());
        assert_eq!(spec.normalize(json!("")), Value::Null);
        assert_eq!(
            spec.parse(&Element::new("p").with_attribute("data-variant", "")),
            Value::Null
        );
    }

    #[test]
    fn test_default_value_is_omitted() {
        let spec = AttributeSpec::data("variant", "default")
            .with_target(AttrTarget::Class("list-variant-".into()));

        assert!(spec.render(&attrs(&[("variant", json!("default"))])).is_empty());

        let rendered = spec.render(&attrs(&[("variant", json!("dashed"))]));
        assert_eq!(rendered.get("class").unwrap(), "list-variant-dashed");
        assert_eq!(rendered.get("data-variant").unwrap(), "dashed");
    }

    #[test]
    fn test_missing_attribute_falls_back_to_default() {
        let spec = AttributeSpec::new("columns", 2)
            .parse_from(AttrSource::Attribute {
                name: "data-columns".into(),
                kind: ValueKind::Number,
            });

        assert_eq!(spec.parse(&Element::new("div")), json!(2));
        assert_eq!(
            spec.parse(&Element::new("div").with_attribute("data-columns", "nope")),
            json!(2)
        );
        assert_eq!(
            spec.parse(&Element::new("div").with_attribute("data-columns", "3")),
            json!(3)
        );
    }

    #[test]
    fn test_style_round_trip() {
        let spec = AttributeSpec::new("textAlign", "left")
            .parse_from(AttrSource::Style("text-align".into()))
            .render_to(vec![AttrTarget::Style("text-align".into())]);

        let rendered = spec.render(&attrs(&[("textAlign", json!("center"))]));
        assert_eq!(rendered.get("style").unwrap(), "text-align: center");
        assert_eq!(reparse(&spec, json!("center")), json!("center"));
        assert_eq!(reparse(&spec, json!("left")), json!("left"));
    }

    #[test]
    fn test_boolean_presence_round_trip() {
        let spec = AttributeSpec::new("autoplay", false)
            .parse_from(AttrSource::Present("autoplay".into()))
            .render_to(vec![AttrTarget::Boolean("autoplay".into())]);

        assert_eq!(reparse(&spec, json!(true)), json!(true));
        assert_eq!(reparse(&spec, json!(false)), json!(false));
    }

    #[test]
    fn test_auto_coercion() {
        assert_eq!(coerce_value("true", ValueKind::Auto), Some(json!(true)));
        assert_eq!(coerce_value("12", ValueKind::Auto), Some(json!(12)));
        assert_eq!(coerce_value("1.5", ValueKind::Auto), Some(json!(1.5)));
        assert_eq!(coerce_value("2xl", ValueKind::Auto), Some(json!("2xl")));
        assert_eq!(coerce_value("x", ValueKind::Number), None);
    }

    #[test]
    fn test_fill_defaults_drops_unknown_keys() {
        let specs = vec![AttributeSpec::new("level", 1), AttributeSpec::data("variant", Value::Null)];
        let filled = fill_defaults(&specs, &attrs(&[("level", json!(3)), ("bogus", json!(1))]));

        assert_eq!(filled, attrs(&[("level", json!(3)), ("variant", Value::Null)]));
    }
}
