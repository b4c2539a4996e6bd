/*!
 # plist-codec-rs

 A codec for XML property lists: documents built from a small closed set
 of value kinds (strings, integers, reals, booleans, dates, binary blobs,
 ordered arrays and dictionaries) and serialized as XML with the
 `<plist version="1.0">` wrapper.

 ## Core Concepts

 - **[`Value`]:** the in-memory tree. Containers own their children by
   value, so trees are acyclic and cheap to reason about. Dictionaries
   preserve insertion order for stable output.
 - **[`XmlPlistWriter`](xml::XmlPlistWriter):** encodes a `Value` tree
   into an XML document over any [`std::io::Write`] sink.
 - **[`XmlPlistReader`](xml::XmlPlistReader):** parses an XML document
   from any [`std::io::Read`] source back into a `Value` tree, reporting
   malformed input as explicit errors.

 Decoding is the left inverse of encoding: for every constructible tree
 `v`, `from_bytes(&to_bytes(&v)?)?` is structurally equal to `v`.

 ## Getting Started

 ```
 use plist_codec_rs::{from_bytes, to_bytes, Dictionary, PlistError, Value};

 fn main() -> Result<(), PlistError> {
     let mut contact = Dictionary::new();
     contact.insert("Name".to_string(), Value::from("John Doe"));
     contact.insert("Year Of Birth".to_string(), Value::from(1965));
     contact.insert(
         "Kids Names".to_string(),
         Value::Array(vec![Value::from("John"), Value::from("Kyra")]),
     );

     let document = Value::Dictionary(contact);
     let bytes = to_bytes(&document)?;

     let decoded = from_bytes(&bytes)?;
     assert_eq!(decoded, document);
     Ok(())
 }
 ```

 Both codec directions are pure and keep no state between calls, so
 independent encodes and decodes may run concurrently on independent
 trees without coordination.
*/

pub mod error;
pub mod value;
pub mod xml;

pub use error::PlistError;
pub use value::{Dictionary, Value};
pub use xml::{from_bytes, to_bytes};
