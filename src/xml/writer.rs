use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::error;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;

use super::{PLIST_TAG, PLIST_VERSION};
use crate::error::PlistError;
use crate::value::Value;

const PLIST_DOCTYPE: &str =
    r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

/// A writer that serializes a value tree to an XML property list.
///
/// One call to [`write`](XmlPlistWriter::write) produces one complete
/// document. The writer never mutates the tree it is given.
///
/// # Examples
///
/// ```
/// use plist_codec_rs::xml::XmlPlistWriterBuilder;
/// use plist_codec_rs::{Dictionary, Value};
///
/// let mut dict = Dictionary::new();
/// dict.insert("Name".to_string(), Value::from("John Doe"));
///
/// let mut writer = XmlPlistWriterBuilder::new().from_writer(Vec::new());
/// writer.write(&Value::Dictionary(dict)).unwrap();
///
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
/// assert!(text.contains("<plist version=\"1.0\">"));
/// assert!(text.contains("<key>Name</key>"));
/// ```
pub struct XmlPlistWriter<W: Write> {
    writer: Writer<BufWriter<W>>,
}

impl<W: Write> XmlPlistWriter<W> {
    /// Writes `value` as a complete XML property list document and
    /// flushes the sink.
    ///
    /// On failure the sink may hold a partial document prefix; discarding
    /// it is the caller's responsibility.
    pub fn write(&mut self, value: &Value) -> Result<(), PlistError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        self.writer
            .write_event(Event::DocType(BytesText::from_escaped(PLIST_DOCTYPE)))
            .map_err(write_error)?;

        let mut root = BytesStart::new(PLIST_TAG);
        root.push_attribute(("version", PLIST_VERSION));
        self.writer
            .write_event(Event::Start(root))
            .map_err(write_error)?;

        self.write_value(value)?;

        self.writer
            .write_event(Event::End(BytesEnd::new(PLIST_TAG)))
            .map_err(write_error)?;

        let sink = self.writer.get_mut();
        sink.write_all(b"\n")
            .map_err(|e| PlistError::Io(format!("failed to write to sink: {e}")))?;
        sink.flush()
            .map_err(|e| PlistError::Io(format!("failed to flush sink: {e}")))
    }

    /// Flushes any buffered output and returns the underlying sink.
    pub fn into_inner(self) -> Result<W, PlistError> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| PlistError::Io(format!("failed to flush sink: {e}")))
    }

    fn write_value(&mut self, value: &Value) -> Result<(), PlistError> {
        match value {
            Value::Null => self.write_empty("null"),
            Value::Boolean(true) => self.write_empty("true"),
            Value::Boolean(false) => self.write_empty("false"),
            Value::Integer(value) => self.write_leaf("integer", &value.to_string()),
            // f64's Display is the shortest decimal form that parses back
            // to the identical bit pattern.
            Value::Real(value) => self.write_leaf("real", &value.to_string()),
            Value::Text(value) => self.write_leaf("string", value),
            Value::Blob(bytes) => self.write_leaf("data", &BASE64.encode(bytes)),
            Value::Date(date) => {
                let text = date
                    .to_offset(UtcOffset::UTC)
                    .format(&Rfc3339)
                    .map_err(|e| {
                        PlistError::UnsupportedValue(format!(
                            "date cannot be represented in RFC 3339: {e}"
                        ))
                    })?;
                self.write_leaf("date", &text)
            }
            Value::Array(items) => {
                if items.is_empty() {
                    return self.write_empty("array");
                }
                self.writer
                    .write_event(Event::Start(BytesStart::new("array")))
                    .map_err(write_error)?;
                for item in items {
                    self.write_value(item)?;
                }
                self.writer
                    .write_event(Event::End(BytesEnd::new("array")))
                    .map_err(write_error)
            }
            Value::Dictionary(dict) => {
                if dict.is_empty() {
                    return self.write_empty("dict");
                }
                self.writer
                    .write_event(Event::Start(BytesStart::new("dict")))
                    .map_err(write_error)?;
                for (key, value) in dict {
                    self.write_leaf("key", key)?;
                    self.write_value(value)?;
                }
                self.writer
                    .write_event(Event::End(BytesEnd::new("dict")))
                    .map_err(write_error)
            }
        }
    }

    fn write_leaf(&mut self, tag: &str, text: &str) -> Result<(), PlistError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(write_error)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(write_error)
    }

    fn write_empty(&mut self, tag: &str) -> Result<(), PlistError> {
        self.writer
            .write_event(Event::Empty(BytesStart::new(tag)))
            .map_err(write_error)
    }
}

fn write_error(err: impl Display) -> PlistError {
    PlistError::Io(format!("failed to write XML event: {err}"))
}

/// Builder for [`XmlPlistWriter`].
///
/// # Examples
///
/// ```
/// use plist_codec_rs::xml::XmlPlistWriterBuilder;
/// use plist_codec_rs::Value;
///
/// // Compact output, no indentation between elements.
/// let mut writer = XmlPlistWriterBuilder::new()
///     .indent(false)
///     .from_writer(Vec::new());
/// writer.write(&Value::from(42)).unwrap();
///
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert!(text.contains("<plist version=\"1.0\"><integer>42</integer></plist>"));
/// ```
pub struct XmlPlistWriterBuilder {
    indent: bool,
}

impl Default for XmlPlistWriterBuilder {
    fn default() -> Self {
        Self { indent: true }
    }
}

impl XmlPlistWriterBuilder {
    /// Creates a builder with the default settings: tab-indented output,
    /// one tab per nesting level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables indentation of the emitted document.
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Creates an `XmlPlistWriter` over any [`Write`] sink: an in-memory
    /// buffer, a socket, or anything else byte-accepting.
    pub fn from_writer<W: Write>(self, wtr: W) -> XmlPlistWriter<W> {
        let sink = BufWriter::new(wtr);
        let writer = if self.indent {
            Writer::new_with_indent(sink, b'\t', 1)
        } else {
            Writer::new(sink)
        };
        XmlPlistWriter { writer }
    }

    /// Creates an `XmlPlistWriter` that writes to a file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use plist_codec_rs::xml::XmlPlistWriterBuilder;
    /// use plist_codec_rs::Value;
    ///
    /// let mut writer = XmlPlistWriterBuilder::new()
    ///     .from_path("schema.xml")
    ///     .unwrap();
    /// writer.write(&Value::from("on disk")).unwrap();
    /// ```
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<XmlPlistWriter<File>, PlistError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            error!("Failed to create plist file {}: {}", path.display(), e);
            PlistError::Io(format!("failed to create plist file {}: {e}", path.display()))
        })?;
        Ok(self.from_writer(file))
    }
}
