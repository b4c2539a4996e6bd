use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, error};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::{PLIST_TAG, PLIST_VERSION};
use crate::error::PlistError;
use crate::value::{Dictionary, Value};

/// A reader that parses one XML property list document into a value tree.
///
/// Parsing is strict: unknown tags, mismatched or missing end tags, stray
/// text between container children, duplicate dictionary keys and leaf
/// content that does not parse to its claimed type are all rejected with
/// an explicit error. Whitespace used for indentation is ignored, but
/// character data inside `<string>` elements is preserved verbatim.
///
/// # Examples
///
/// ```
/// use plist_codec_rs::xml::XmlPlistReaderBuilder;
///
/// let document = br#"<?xml version="1.0" encoding="UTF-8"?>
/// <plist version="1.0">
///     <dict>
///         <key>Name</key>
///         <string>John Doe</string>
///         <key>Year Of Birth</key>
///         <integer>1965</integer>
///     </dict>
/// </plist>"#;
///
/// let reader = XmlPlistReaderBuilder::new().from_reader(&document[..]);
/// let value = reader.read().unwrap();
///
/// let dict = value.as_dictionary().unwrap();
/// assert_eq!(dict["Name"].as_text().unwrap(), "John Doe");
/// assert_eq!(dict["Year Of Birth"].as_integer().unwrap(), 1965);
/// ```
pub struct XmlPlistReader<R: Read> {
    reader: Reader<BufReader<R>>,
    buf: Vec<u8>,
}

impl<R: Read> XmlPlistReader<R> {
    fn with_capacity(rdr: R, capacity: usize) -> Self {
        let reader = Reader::from_reader(BufReader::with_capacity(capacity, rdr));
        Self {
            reader,
            buf: Vec::with_capacity(1024),
        }
    }

    /// Parses the source as a complete property list document and returns
    /// the reconstructed value tree.
    pub fn read(mut self) -> Result<Value, PlistError> {
        let root = self.read_prolog()?;
        self.check_version(&root)?;
        debug!("Parsing plist document, version {}", PLIST_VERSION);

        let value = match self.next_content_event()? {
            Event::Start(start) => self.read_element(start)?,
            Event::Empty(empty) => read_empty_element(&empty)?,
            Event::End(_) => {
                return Err(PlistError::MalformedDocument(
                    "plist document contains no root value".to_string(),
                ));
            }
            Event::Eof => return Err(truncated()),
            other => return Err(unexpected_content(&other)),
        };

        match self.next_content_event()? {
            Event::End(end) if end.name().as_ref() == PLIST_TAG.as_bytes() => {}
            Event::Eof => return Err(truncated()),
            Event::Start(_) | Event::Empty(_) => {
                return Err(PlistError::MalformedDocument(
                    "plist root must contain exactly one value".to_string(),
                ));
            }
            other => return Err(unexpected_content(&other)),
        }

        loop {
            match self.next_event()? {
                Event::Eof => break,
                Event::Comment(_) | Event::PI(_) => continue,
                Event::Text(text) if is_blank(text.as_ref()) => continue,
                other => {
                    error!("Trailing content after </plist>: {:?}", other);
                    return Err(PlistError::MalformedDocument(
                        "trailing content after the plist root element".to_string(),
                    ));
                }
            }
        }

        debug!("Finished parsing plist document");
        Ok(value)
    }

    /// Skips the prolog (declaration, doctype, comments, whitespace) and
    /// returns the opening `<plist>` tag.
    fn read_prolog(&mut self) -> Result<BytesStart<'static>, PlistError> {
        loop {
            match self.next_event()? {
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => continue,
                Event::Text(text) if is_blank(text.as_ref()) => continue,
                Event::Start(start) => {
                    if start.name().as_ref() != PLIST_TAG.as_bytes() {
                        return Err(PlistError::MalformedDocument(format!(
                            "unexpected root element <{}>, expected <plist>",
                            lossy_name(&start)
                        )));
                    }
                    return Ok(start);
                }
                Event::Empty(empty) => {
                    if empty.name().as_ref() == PLIST_TAG.as_bytes() {
                        return Err(PlistError::MalformedDocument(
                            "plist document contains no root value".to_string(),
                        ));
                    }
                    return Err(PlistError::MalformedDocument(format!(
                        "unexpected root element <{}>, expected <plist>",
                        lossy_name(&empty)
                    )));
                }
                Event::Eof => {
                    return Err(PlistError::MalformedDocument(
                        "document has no plist root element".to_string(),
                    ));
                }
                other => return Err(unexpected_content(&other)),
            }
        }
    }

    fn check_version(&self, root: &BytesStart<'static>) -> Result<(), PlistError> {
        let mut version = None;
        for attr in root.attributes() {
            let attr = attr.map_err(|e| {
                PlistError::MalformedDocument(format!("invalid attribute on <plist>: {e}"))
            })?;
            if attr.key.as_ref() == b"version" {
                version = Some(String::from_utf8_lossy(&attr.value).to_string());
            }
        }

        match version {
            Some(version) if version == PLIST_VERSION => Ok(()),
            Some(version) => {
                error!("Unsupported plist version: {}", version);
                Err(PlistError::MalformedDocument(format!(
                    "unsupported plist version \"{version}\""
                )))
            }
            None => Err(PlistError::MalformedDocument(
                "plist root element is missing the version attribute".to_string(),
            )),
        }
    }

    /// Reconstructs the value opened by `start`, consuming events up to
    /// and including its end tag.
    fn read_element(&mut self, start: BytesStart<'static>) -> Result<Value, PlistError> {
        match start.name().as_ref() {
            b"dict" => self.read_dict(),
            b"array" => self.read_array(),
            b"string" => self.read_leaf("string").map(Value::Text),
            b"integer" => parse_integer(&self.read_leaf("integer")?),
            b"real" => parse_real(&self.read_leaf("real")?),
            b"date" => parse_date(&self.read_leaf("date")?),
            b"data" => parse_data(&self.read_leaf("data")?),
            b"true" => self.read_marker("true").map(|()| Value::Boolean(true)),
            b"false" => self.read_marker("false").map(|()| Value::Boolean(false)),
            b"null" => self.read_marker("null").map(|()| Value::Null),
            b"key" => Err(PlistError::MalformedDocument(
                "<key> element outside of a dict".to_string(),
            )),
            _ => {
                error!("Unknown plist element: <{}>", lossy_name(&start));
                Err(PlistError::MalformedDocument(format!(
                    "unknown element <{}>",
                    lossy_name(&start)
                )))
            }
        }
    }

    fn read_dict(&mut self) -> Result<Value, PlistError> {
        let mut dict = Dictionary::new();
        loop {
            let key = match self.next_content_event()? {
                Event::End(_) => break,
                Event::Start(start) if start.name().as_ref() == b"key" => self.read_leaf("key")?,
                Event::Empty(empty) if empty.name().as_ref() == b"key" => String::new(),
                Event::Start(start) | Event::Empty(start) => {
                    return Err(PlistError::MalformedDocument(format!(
                        "expected <key> inside dict, found <{}>",
                        lossy_name(&start)
                    )));
                }
                Event::Eof => return Err(truncated()),
                other => return Err(unexpected_content(&other)),
            };
            debug!("Read dict key {:?}", key);

            let value = match self.next_content_event()? {
                Event::Start(start) => self.read_element(start)?,
                Event::Empty(empty) => read_empty_element(&empty)?,
                Event::End(_) => {
                    return Err(PlistError::MalformedDocument(format!(
                        "dict key {key:?} has no value"
                    )));
                }
                Event::Eof => return Err(truncated()),
                other => return Err(unexpected_content(&other)),
            };

            if dict.contains_key(&key) {
                error!("Duplicate dict key {:?}", key);
                return Err(PlistError::DuplicateKey(key));
            }
            dict.insert(key, value);
        }
        Ok(Value::Dictionary(dict))
    }

    fn read_array(&mut self) -> Result<Value, PlistError> {
        let mut items = Vec::new();
        loop {
            match self.next_content_event()? {
                Event::End(_) => break,
                Event::Start(start) => items.push(self.read_element(start)?),
                Event::Empty(empty) => items.push(read_empty_element(&empty)?),
                Event::Eof => return Err(truncated()),
                other => return Err(unexpected_content(&other)),
            }
        }
        Ok(Value::Array(items))
    }

    /// Collects the character data of a leaf element up to its end tag.
    /// Text is preserved verbatim, so surrounding whitespace survives.
    fn read_leaf(&mut self, tag: &str) -> Result<String, PlistError> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(chunk) => {
                    let raw = str::from_utf8(chunk.as_ref()).map_err(|e| {
                        PlistError::InvalidEncoding(format!("invalid UTF-8 in <{tag}>: {e}"))
                    })?;
                    unescape_into(&mut text, raw, tag)?;
                }
                Event::GeneralRef(reference) => {
                    let raw = str::from_utf8(reference.as_ref()).map_err(|e| {
                        PlistError::InvalidEncoding(format!("invalid UTF-8 in <{tag}>: {e}"))
                    })?;
                    text.push(resolve_reference(raw, tag)?);
                }
                Event::CData(chunk) => {
                    let raw = str::from_utf8(chunk.as_ref()).map_err(|e| {
                        PlistError::InvalidEncoding(format!("invalid UTF-8 in <{tag}>: {e}"))
                    })?;
                    text.push_str(raw);
                }
                Event::Comment(_) => continue,
                Event::End(_) => break,
                Event::Start(start) | Event::Empty(start) => {
                    return Err(PlistError::MalformedDocument(format!(
                        "unexpected <{}> inside <{tag}>",
                        lossy_name(&start)
                    )));
                }
                Event::Eof => return Err(truncated()),
                other => return Err(unexpected_content(&other)),
            }
        }
        Ok(text)
    }

    /// Consumes the end tag of a content-free element (`true`, `false`,
    /// `null`) written in open-close form.
    fn read_marker(&mut self, tag: &str) -> Result<(), PlistError> {
        let text = self.read_leaf(tag)?;
        if text.trim().is_empty() {
            Ok(())
        } else {
            Err(PlistError::MalformedDocument(format!(
                "<{tag}> elements take no content"
            )))
        }
    }

    fn next_event(&mut self) -> Result<Event<'static>, PlistError> {
        self.buf.clear();
        match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => Ok(event.into_owned()),
            Err(quick_xml::Error::Io(e)) => Err(PlistError::Io(e.to_string())),
            Err(e) => Err(PlistError::MalformedDocument(format!(
                "XML parsing error: {e}"
            ))),
        }
    }

    /// Next event that is not a comment, a processing instruction or
    /// blank inter-element text.
    fn next_content_event(&mut self) -> Result<Event<'static>, PlistError> {
        loop {
            match self.next_event()? {
                Event::Comment(_) | Event::PI(_) => continue,
                Event::Text(text) if is_blank(text.as_ref()) => continue,
                other => return Ok(other),
            }
        }
    }
}

fn read_empty_element(element: &BytesStart<'static>) -> Result<Value, PlistError> {
    match element.name().as_ref() {
        b"dict" => Ok(Value::Dictionary(Dictionary::new())),
        b"array" => Ok(Value::Array(Vec::new())),
        b"string" => Ok(Value::Text(String::new())),
        b"data" => Ok(Value::Blob(Vec::new())),
        b"true" => Ok(Value::Boolean(true)),
        b"false" => Ok(Value::Boolean(false)),
        b"null" => Ok(Value::Null),
        tag @ (b"integer" | b"real" | b"date") => Err(PlistError::InvalidEncoding(format!(
            "<{}/> has no content to parse",
            String::from_utf8_lossy(tag)
        ))),
        b"key" => Err(PlistError::MalformedDocument(
            "<key> element outside of a dict".to_string(),
        )),
        _ => {
            error!("Unknown plist element: <{}>", lossy_name(element));
            Err(PlistError::MalformedDocument(format!(
                "unknown element <{}>",
                lossy_name(element)
            )))
        }
    }
}

fn parse_integer(text: &str) -> Result<Value, PlistError> {
    let text = text.trim();
    text.parse::<i64>().map(Value::Integer).map_err(|e| {
        PlistError::InvalidEncoding(format!("invalid integer {text:?}: {e}"))
    })
}

fn parse_real(text: &str) -> Result<Value, PlistError> {
    let text = text.trim();
    text.parse::<f64>().map(Value::Real).map_err(|e| {
        PlistError::InvalidEncoding(format!("invalid real {text:?}: {e}"))
    })
}

fn parse_date(text: &str) -> Result<Value, PlistError> {
    let text = text.trim();
    OffsetDateTime::parse(text, &Rfc3339)
        .map(Value::Date)
        .map_err(|e| PlistError::InvalidEncoding(format!("invalid date {text:?}: {e}")))
}

fn parse_data(text: &str) -> Result<Value, PlistError> {
    // Generators are free to wrap base64 payloads across lines.
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map(Value::Blob)
        .map_err(|e| PlistError::InvalidEncoding(format!("invalid base64 data: {e}")))
}

fn unescape_into(out: &mut String, raw: &str, tag: &str) -> Result<(), PlistError> {
    if !raw.contains('&') {
        out.push_str(raw);
        return Ok(());
    }
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let Some(end) = after.find(';') else {
            return Err(PlistError::MalformedDocument(format!(
                "unterminated entity reference in <{tag}>"
            )));
        };
        out.push(resolve_reference(&after[..end], tag)?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(())
}

fn resolve_reference(name: &str, tag: &str) -> Result<char, PlistError> {
    match name {
        "amp" => Ok('&'),
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "quot" => Ok('"'),
        "apos" => Ok('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = name.strip_prefix('#') {
                decimal.parse::<u32>().ok()
            } else {
                None
            };
            code.and_then(char::from_u32).ok_or_else(|| {
                PlistError::MalformedDocument(format!(
                    "unresolvable entity reference \"&{name};\" in <{tag}>"
                ))
            })
        }
    }
}

fn is_blank(text: &[u8]) -> bool {
    text.iter().all(|b| matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
}

fn lossy_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).to_string()
}

fn truncated() -> PlistError {
    PlistError::MalformedDocument("unexpected end of document".to_string())
}

fn unexpected_content(event: &Event<'_>) -> PlistError {
    PlistError::MalformedDocument(format!("unexpected XML content: {event:?}"))
}

/// Builder for [`XmlPlistReader`].
///
/// # Examples
///
/// ```
/// use plist_codec_rs::xml::XmlPlistReaderBuilder;
///
/// let document = br#"<plist version="1.0"><integer>42</integer></plist>"#;
/// let reader = XmlPlistReaderBuilder::new()
///     .capacity(4096)
///     .from_reader(&document[..]);
/// assert_eq!(reader.read().unwrap().as_integer().unwrap(), 42);
/// ```
pub struct XmlPlistReaderBuilder {
    capacity: usize,
}

impl Default for XmlPlistReaderBuilder {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl XmlPlistReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read buffer capacity. Larger documents benefit from a
    /// larger buffer at the cost of memory.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Creates an `XmlPlistReader` from any [`Read`] source: a file, a
    /// network stream or an in-memory buffer.
    pub fn from_reader<R: Read>(self, rdr: R) -> XmlPlistReader<R> {
        XmlPlistReader::with_capacity(rdr, self.capacity)
    }

    /// Creates an `XmlPlistReader` that reads from a file.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<XmlPlistReader<File>, PlistError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            error!("Failed to open plist file {}: {}", path.display(), e);
            PlistError::Io(format!("failed to open plist file {}: {e}", path.display()))
        })?;
        Ok(self.from_reader(file))
    }
}
