//! Coercion of literal text into typed values.

use super::vocab::{local_name, xsd};
use oxigraph::model::{Literal, NamedNodeRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A datatype property value after coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Integer(i32),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Text(String),
}

impl TypedValue {
    /// Coerces `text` according to the local name of a declared range:
    /// `int`, `float`, `double` and `boolean` are typed, anything else stays
    /// text. Text that does not parse as the declared type is kept as text.
    pub fn coerce(range: Option<&str>, text: &str) -> Self {
        let kind = range.map(local_name).unwrap_or_default();
        let parsed = match kind {
            "int" => text.trim().parse().ok().map(TypedValue::Integer),
            "float" => text.trim().parse().ok().map(TypedValue::Float),
            "double" => text.trim().parse().ok().map(TypedValue::Double),
            "boolean" => parse_boolean(text.trim()).map(TypedValue::Boolean),
            _ => return TypedValue::Text(text.to_string()),
        };
        parsed.unwrap_or_else(|| {
            warn!(range = kind, value = text, "literal does not match declared range");
            TypedValue::Text(text.to_string())
        })
    }

    /// Like [`coerce`](Self::coerce), but `None` when the range is one of the
    /// typed kinds and `text` does not parse as it.
    pub fn parse_for_range(range: Option<&str>, text: &str) -> Option<Self> {
        let kind = range.map(local_name).unwrap_or_default();
        match Self::coerce(range, text) {
            TypedValue::Text(_) if is_typed_kind(kind) => None,
            value => Some(value),
        }
    }

    /// Coerces a stored literal, dispatching on its own datatype.
    pub fn from_literal(literal: &Literal) -> Self {
        Self::coerce(Some(literal.datatype().as_str()), literal.value())
    }

    /// Literal to store for this value. Text keeps `datatype` when one is
    /// declared in the XSD namespace and is not a typed kind, so a typed
    /// literal always carries a valid lexical form.
    pub fn to_literal(&self, datatype: Option<NamedNodeRef<'_>>) -> Literal {
        match self {
            TypedValue::Integer(value) => Literal::from(*value),
            TypedValue::Float(value) => Literal::from(*value),
            TypedValue::Double(value) => Literal::from(*value),
            TypedValue::Boolean(value) => Literal::from(*value),
            TypedValue::Text(text) => match datatype {
                Some(datatype)
                    if datatype.as_str().starts_with(XSD_NAMESPACE)
                        && datatype != xsd::STRING
                        && !is_typed_kind(local_name(datatype.as_str())) =>
                {
                    Literal::new_typed_literal(text.as_str(), datatype)
                }
                _ => Literal::new_simple_literal(text.as_str()),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Integer(value) => write!(f, "{value}"),
            TypedValue::Float(value) => write!(f, "{value}"),
            TypedValue::Double(value) => write!(f, "{value}"),
            TypedValue::Boolean(value) => write!(f, "{value}"),
            TypedValue::Text(text) => f.write_str(text),
        }
    }
}

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

fn is_typed_kind(kind: &str) -> bool {
    matches!(kind, "int" | "float" | "double" | "boolean")
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
