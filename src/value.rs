use std::fmt;

use indexmap::IndexMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::PlistError;

/// An ordered dictionary of property list values.
///
/// Keys are unique and insertion order is preserved, so re-encoding a
/// decoded document keeps the original key layout. Equality is key-set
/// based and ignores order.
pub type Dictionary = IndexMap<String, Value>;

/// A node in a property list tree.
///
/// A property list is a tree over a small closed set of value kinds:
/// strings, numbers, booleans, dates, binary blobs, ordered arrays and
/// dictionaries keyed by strings. Containers own their children by value,
/// so every tree is acyclic by construction.
///
/// # Examples
///
/// ```
/// use plist_codec_rs::{Dictionary, Value};
///
/// let mut contact = Dictionary::new();
/// contact.insert("Name".to_string(), Value::from("John Doe"));
/// contact.insert("Year Of Birth".to_string(), Value::from(1965));
///
/// let document = Value::Dictionary(contact);
/// assert_eq!(
///     document.as_dictionary().unwrap()["Name"].as_text().unwrap(),
///     "John Doe"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Date(OffsetDateTime),
    Array(Vec<Value>),
    Dictionary(Dictionary),
}

impl Value {
    /// Name of the variant, as used in diagnostics and error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_boolean(&self) -> Result<bool, PlistError> {
        match self {
            Value::Boolean(value) => Ok(*value),
            other => Err(other.mismatch("boolean")),
        }
    }

    pub fn as_integer(&self) -> Result<i64, PlistError> {
        match self {
            Value::Integer(value) => Ok(*value),
            other => Err(other.mismatch("integer")),
        }
    }

    pub fn as_real(&self) -> Result<f64, PlistError> {
        match self {
            Value::Real(value) => Ok(*value),
            other => Err(other.mismatch("real")),
        }
    }

    pub fn as_text(&self) -> Result<&str, PlistError> {
        match self {
            Value::Text(value) => Ok(value),
            other => Err(other.mismatch("text")),
        }
    }

    pub fn as_blob(&self) -> Result<&[u8], PlistError> {
        match self {
            Value::Blob(value) => Ok(value),
            other => Err(other.mismatch("blob")),
        }
    }

    pub fn as_date(&self) -> Result<OffsetDateTime, PlistError> {
        match self {
            Value::Date(value) => Ok(*value),
            other => Err(other.mismatch("date")),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], PlistError> {
        match self {
            Value::Array(value) => Ok(value),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Vec<Value>, PlistError> {
        match self {
            Value::Array(value) => Ok(value),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_dictionary(&self) -> Result<&Dictionary, PlistError> {
        match self {
            Value::Dictionary(value) => Ok(value),
            other => Err(other.mismatch("dictionary")),
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Result<&mut Dictionary, PlistError> {
        match self {
            Value::Dictionary(value) => Ok(value),
            other => Err(other.mismatch("dictionary")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> PlistError {
        PlistError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    fn fmt_at_depth(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Real(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value:?}"),
            Value::Blob(bytes) => {
                f.write_str("<")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str(">")
            }
            Value::Date(date) => match date.format(&Rfc3339) {
                Ok(text) => f.write_str(&text),
                Err(_) => write!(f, "{date:?}"),
            },
            Value::Array(items) => {
                if items.is_empty() {
                    return f.write_str("[]");
                }
                f.write_str("[\n")?;
                for item in items {
                    write_indent(f, depth + 1)?;
                    item.fmt_at_depth(f, depth + 1)?;
                    f.write_str(",\n")?;
                }
                write_indent(f, depth)?;
                f.write_str("]")
            }
            Value::Dictionary(dict) => {
                if dict.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{\n")?;
                for (key, value) in dict {
                    write_indent(f, depth + 1)?;
                    write!(f, "{key:?} => ")?;
                    value.fmt_at_depth(f, depth + 1)?;
                    f.write_str(",\n")?;
                }
                write_indent(f, depth)?;
                f.write_str("}")
            }
        }
    }
}

fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("    ")?;
    }
    Ok(())
}

/// Human-readable rendering of the whole tree, indented four spaces per
/// level. Covers every value kind, so callers never need a generic
/// "display anything" facility.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at_depth(f, 0)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::Date(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Dictionary> for Value {
    fn from(value: Dictionary) -> Self {
        Value::Dictionary(value)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Dictionary(iter.into_iter().collect())
    }
}
