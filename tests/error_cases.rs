use plist_codec_rs::xml::{XmlPlistReaderBuilder, XmlPlistWriterBuilder};
use plist_codec_rs::{from_bytes, to_bytes, Dictionary, PlistError, Value};
use std::io::{self, ErrorKind, Read, Write};

/// A sink that refuses every write, standing in for a broken pipe or a
/// full disk behind the stream boundary.
struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(ErrorKind::BrokenPipe, "sink rejected write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(ErrorKind::BrokenPipe, "sink rejected flush"))
    }
}

/// A source that fails mid-stream, after yielding a document prefix.
struct FailingSource {
    prefix: &'static [u8],
    position: usize,
}

impl Read for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position < self.prefix.len() {
            let n = buf.len().min(self.prefix.len() - self.position);
            buf[..n].copy_from_slice(&self.prefix[self.position..self.position + n]);
            self.position += n;
            Ok(n)
        } else {
            Err(io::Error::new(ErrorKind::ConnectionReset, "source went away"))
        }
    }
}

#[test]
fn rejected_sink_write_surfaces_as_io_error() {
    let mut writer = XmlPlistWriterBuilder::new().from_writer(FailingSink);
    let result = writer.write(&Value::from("unwritable"));

    match result {
        Err(PlistError::Io(message)) => assert!(message.contains("sink")),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn failing_source_surfaces_as_io_error() {
    let source = FailingSource {
        prefix: br#"<plist version="1.0"><dict><key>Name</key>"#,
        position: 0,
    };
    let result = XmlPlistReaderBuilder::new().from_reader(source).read();

    assert!(matches!(result, Err(PlistError::Io(_))));
}

#[test]
fn accessor_errors_carry_both_sides_of_the_mismatch() {
    let decoded = from_bytes(br#"<plist version="1.0"><integer>1965</integer></plist>"#).unwrap();
    let error = decoded.as_text().unwrap_err();

    assert_eq!(
        error.to_string(),
        "type mismatch: expected text, found integer"
    );
}

#[test]
fn malformed_documents_never_panic() {
    let samples: &[&str] = &[
        "",
        "not xml at all",
        "<plist",
        r#"<plist version="1.0">"#,
        r#"<plist version="1.0"><dict>"#,
        r#"<plist version="1.0"><dict><key>a</key></dict></plist>"#,
        r#"<plist version="1.0"><array><integer>1</array></plist>"#,
        r#"<plist version="1.0"><gadget/></plist>"#,
        r#"<plist version="1.0"><string>x</string><string>y</string></plist>"#,
        r#"<plist version="1.0"><string>x</string></plist>trailing"#,
    ];

    for sample in samples {
        let result = from_bytes(sample.as_bytes());
        assert!(
            matches!(result, Err(PlistError::MalformedDocument(_))),
            "expected MalformedDocument for {sample:?}, got {result:?}"
        );
    }
}

#[test]
fn leaf_values_that_do_not_parse_are_encoding_errors() {
    let samples: &[&str] = &[
        r#"<plist version="1.0"><data>!!!</data></plist>"#,
        r#"<plist version="1.0"><integer>12.5</integer></plist>"#,
        r#"<plist version="1.0"><real>one half</real></plist>"#,
        r#"<plist version="1.0"><date>yesterday</date></plist>"#,
    ];

    for sample in samples {
        let result = from_bytes(sample.as_bytes());
        assert!(
            matches!(result, Err(PlistError::InvalidEncoding(_))),
            "expected InvalidEncoding for {sample:?}, got {result:?}"
        );
    }
}

#[test]
fn duplicate_keys_report_the_offending_key() {
    let document = br#"<plist version="1.0">
        <dict>
            <key>City of Birth</key>
            <string>Springfield</string>
            <key>City of Birth</key>
            <string>Shelbyville</string>
        </dict>
    </plist>"#;

    match from_bytes(document) {
        Err(PlistError::DuplicateKey(key)) => assert_eq!(key, "City of Birth"),
        other => panic!("expected DuplicateKey, got {other:?}"),
    }
}

#[test]
fn nested_duplicate_keys_are_allowed_across_levels() {
    // The same key at different nesting levels is not a duplicate.
    let mut inner = Dictionary::new();
    inner.insert("Name".to_string(), Value::from("inner"));

    let mut outer = Dictionary::new();
    outer.insert("Name".to_string(), Value::from("outer"));
    outer.insert("Child".to_string(), Value::Dictionary(inner));

    let document = Value::Dictionary(outer);
    let decoded = from_bytes(&to_bytes(&document).unwrap()).unwrap();
    assert_eq!(decoded, document);
}
