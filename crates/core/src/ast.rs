//! Document tree produced by the parser.
//!
//! The tree keeps every attribute in source order, duplicates included. Only
//! the flattened projection ([`Element::flatten`]) resolves duplicate names,
//! last one wins.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::lexer::{Number, Position};

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A bare identifier used as a value, e.g. `default = DEPRECATED`
    ConstantReference(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text of a string or constant reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::ConstantReference(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// JSON form of the value. Constant references become plain strings.
    /// Non-finite floats have no JSON form and become `null`; the lexer never
    /// produces them.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) | Value::ConstantReference(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json_value).collect())
            }
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(i) => Value::Integer(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) | Value::ConstantReference(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

// ──────────────────────────────────────────────
// Attributes
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    /// `Boolean(true)` when the attribute was written as a bare flag
    pub value: Value,
    pub position: Position,
}

/// Attributes in source order. Duplicate names are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Value of the last attribute called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .rev()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Name-to-value mapping; a later duplicate replaces an earlier one.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.attributes
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ──────────────────────────────────────────────
// Elements
// ──────────────────────────────────────────────

/// A node of the document tree.
///
/// `children` and `text_contents` are independent sequences: the relative
/// order of a text block and a sibling element is not recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Empty for anonymous elements
    pub identifier: String,
    pub attributes: AttributeList,
    pub children: Vec<Element>,
    pub text_contents: Vec<String>,
    pub position: Position,
}

impl Element {
    pub fn count_children(&self) -> usize {
        self.children.len()
    }

    /// First direct child with the given identifier.
    pub fn child(&self, identifier: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.identifier == identifier)
    }

    /// Generic projection of this subtree.
    pub fn flatten(&self) -> FlatElement {
        FlatElement {
            identifier: self.identifier.clone(),
            attributes: self.attributes.to_map(),
            children: self.children.iter().map(Element::flatten).collect(),
            content: self.text_contents.clone(),
        }
    }

    /// The projection as JSON, the form handed to generators.
    pub fn to_json_value(&self) -> serde_json::Value {
        self.flatten().to_json_value()
    }
}

/// Flattened element: attributes resolved to a mapping.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FlatElement {
    pub identifier: String,
    pub attributes: BTreeMap<String, Value>,
    pub children: Vec<FlatElement>,
    pub content: Vec<String>,
}

impl FlatElement {
    pub fn to_json_value(&self) -> serde_json::Value {
        let attributes = self
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json_value()))
            .collect();
        let children = self.children.iter().map(FlatElement::to_json_value).collect();
        let content = self
            .content
            .iter()
            .cloned()
            .map(serde_json::Value::String)
            .collect();

        let mut object = serde_json::Map::new();
        object.insert("identifier".into(), self.identifier.clone().into());
        object.insert("attributes".into(), serde_json::Value::Object(attributes));
        object.insert("children".into(), serde_json::Value::Array(children));
        object.insert("content".into(), serde_json::Value::Array(content));
        serde_json::Value::Object(object)
    }
}
