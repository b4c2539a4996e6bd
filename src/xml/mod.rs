//! XML serialization for property list trees.
//!
//! This module converts between [`Value`](crate::Value) trees and the XML
//! property list document form: a prolog, the PLIST 1.0 doctype and a
//! `<plist version="1.0">` wrapper around exactly one root value. The
//! implementation uses `quick-xml` events for both directions; decoding is
//! the exact left inverse of encoding, so `from_bytes(to_bytes(v))`
//! reconstructs a tree equal to `v`.
//!
//! # Encoding
//!
//! ```
//! use plist_codec_rs::{to_bytes, Dictionary, Value};
//!
//! let mut dict = Dictionary::new();
//! dict.insert("Name".to_string(), Value::from("John Doe"));
//! dict.insert("Year Of Birth".to_string(), Value::from(1965));
//!
//! let bytes = to_bytes(&Value::Dictionary(dict)).unwrap();
//! let text = String::from_utf8(bytes).unwrap();
//! assert!(text.contains("<key>Name</key>"));
//! assert!(text.contains("<string>John Doe</string>"));
//! assert!(text.contains("<integer>1965</integer>"));
//! ```
//!
//! # Decoding
//!
//! ```
//! use plist_codec_rs::from_bytes;
//!
//! let document = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <plist version="1.0">
//!     <array>
//!         <string>John</string>
//!         <string>Kyra</string>
//!     </array>
//! </plist>"#;
//!
//! let value = from_bytes(document).unwrap();
//! let names = value.as_array().unwrap();
//! assert_eq!(names.len(), 2);
//! assert_eq!(names[0].as_text().unwrap(), "John");
//! ```

pub mod reader;
pub mod writer;

pub use reader::{XmlPlistReader, XmlPlistReaderBuilder};
pub use writer::{XmlPlistWriter, XmlPlistWriterBuilder};

use crate::error::PlistError;
use crate::value::Value;

/// Root wrapper element of an XML property list document.
pub(crate) const PLIST_TAG: &str = "plist";

/// The only document version this codec reads and writes.
pub(crate) const PLIST_VERSION: &str = "1.0";

/// Encodes a value tree into an XML property list byte buffer.
///
/// # Examples
///
/// ```
/// use plist_codec_rs::{to_bytes, Value};
///
/// let bytes = to_bytes(&Value::Boolean(true)).unwrap();
/// assert!(String::from_utf8(bytes).unwrap().contains("<true/>"));
/// ```
pub fn to_bytes(value: &Value) -> Result<Vec<u8>, PlistError> {
    let mut writer = XmlPlistWriterBuilder::new().from_writer(Vec::new());
    writer.write(value)?;
    writer.into_inner()
}

/// Decodes an XML property list byte buffer into a value tree.
///
/// # Examples
///
/// ```
/// use plist_codec_rs::{from_bytes, to_bytes, Value};
///
/// let original = Value::from("round trip");
/// let decoded = from_bytes(&to_bytes(&original).unwrap()).unwrap();
/// assert_eq!(decoded, original);
/// ```
pub fn from_bytes(bytes: &[u8]) -> Result<Value, PlistError> {
    XmlPlistReaderBuilder::new().from_reader(bytes).read()
}
