use plist_codec_rs::xml::{XmlPlistReaderBuilder, XmlPlistWriterBuilder};
use plist_codec_rs::{from_bytes, to_bytes, Dictionary, Value};
use std::fs::read_to_string;
use tempfile::NamedTempFile;
use time::macros::datetime;

/// The dictionary from the classic "write a plist" walkthrough: strings,
/// an integer, a populated array, an empty array and a small blob.
fn john_doe_info() -> Value {
    let mut dict = Dictionary::new();
    dict.insert("Name".to_string(), Value::from("John Doe"));
    dict.insert("City of Birth".to_string(), Value::from("Springfield"));
    dict.insert("Year Of Birth".to_string(), Value::from(1965));
    dict.insert(
        "Kids Names".to_string(),
        Value::Array(vec![Value::from("John"), Value::from("Kyra")]),
    );
    dict.insert("Pets Names".to_string(), Value::Array(Vec::new()));
    dict.insert(
        "Picture".to_string(),
        Value::Blob(vec![
            0x3c, 0x42, 0x81, 0xa5, 0x81, 0xa5, 0x99, 0x81, 0x42, 0x3c,
        ]),
    );
    Value::Dictionary(dict)
}

fn all_kinds() -> Value {
    let mut nested = Dictionary::new();
    nested.insert("flag".to_string(), Value::Boolean(true));
    nested.insert("off".to_string(), Value::Boolean(false));
    nested.insert("nothing".to_string(), Value::Null);

    let mut dict = Dictionary::new();
    dict.insert("text".to_string(), Value::from("Zoë the crab 🦀"));
    dict.insert("min".to_string(), Value::Integer(i64::MIN));
    dict.insert("max".to_string(), Value::Integer(i64::MAX));
    dict.insert("ratio".to_string(), Value::Real(-0.125));
    dict.insert("large".to_string(), Value::Real(1e300));
    dict.insert(
        "stamp".to_string(),
        Value::Date(datetime!(2009-06-15 20:45:30 UTC)),
    );
    dict.insert("payload".to_string(), Value::Blob(vec![0, 1, 2, 255]));
    dict.insert(
        "mixed".to_string(),
        Value::Array(vec![
            Value::Dictionary(nested),
            Value::Array(vec![Value::Integer(1)]),
            Value::from(""),
        ]),
    );
    Value::Dictionary(dict)
}

#[test]
fn john_doe_dictionary_round_trips_through_a_file() {
    let document = john_doe_info();

    let temp_file = NamedTempFile::new().unwrap();
    let mut writer = XmlPlistWriterBuilder::new()
        .from_path(temp_file.path())
        .unwrap();
    writer.write(&document).unwrap();

    let content = read_to_string(temp_file.path()).unwrap();
    assert!(content.contains("<key>Name</key>"));
    assert!(content.contains("<string>John Doe</string>"));
    assert!(content.contains("<integer>1965</integer>"));
    assert!(content.contains("<data>PEKBpYGlmYFCPA==</data>"));

    let decoded = XmlPlistReaderBuilder::new()
        .from_path(temp_file.path())
        .unwrap()
        .read()
        .unwrap();
    assert_eq!(decoded, document);

    // The empty array must decode to an empty sequence, not go missing.
    let dict = decoded.as_dictionary().unwrap();
    assert!(dict.contains_key("Pets Names"));
    assert!(dict["Pets Names"].as_array().unwrap().is_empty());
    assert_eq!(dict["Kids Names"].as_array().unwrap().len(), 2);
}

#[test]
fn every_value_kind_round_trips() {
    let document = all_kinds();
    let decoded = from_bytes(&to_bytes(&document).unwrap()).unwrap();
    assert_eq!(decoded, document);
}

#[test]
fn encoding_a_decoded_document_is_byte_identical() {
    let first = to_bytes(&all_kinds()).unwrap();
    let second = to_bytes(&from_bytes(&first).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn blobs_round_trip_every_byte_value() {
    let payload: Vec<u8> = (0..=255u8).collect();
    let document = Value::Blob(payload.clone());

    let decoded = from_bytes(&to_bytes(&document).unwrap()).unwrap();
    assert_eq!(decoded.as_blob().unwrap(), payload.as_slice());
}

#[test]
fn empty_blob_round_trips() {
    let decoded = from_bytes(&to_bytes(&Value::Blob(Vec::new())).unwrap()).unwrap();
    assert!(decoded.as_blob().unwrap().is_empty());
}

#[test]
fn reserved_characters_round_trip_exactly() {
    let document = Value::from("5 < 6, 7 > 2, fish & chips, \"quoted\"");
    let decoded = from_bytes(&to_bytes(&document).unwrap()).unwrap();
    assert_eq!(decoded, document);
}

#[test]
fn dates_round_trip_as_the_same_instant() {
    let document = Value::Date(datetime!(2009-06-15 22:45:30 +02:00));
    let bytes = to_bytes(&document).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("2009-06-15T20:45:30Z"));

    let decoded = from_bytes(&bytes).unwrap();
    assert_eq!(
        decoded.as_date().unwrap(),
        datetime!(2009-06-15 20:45:30 UTC)
    );
}

#[test]
fn dictionary_key_order_is_stable_across_the_codec() {
    let document = john_doe_info();
    let decoded = from_bytes(&to_bytes(&document).unwrap()).unwrap();

    let original_keys: Vec<&str> = document
        .as_dictionary()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    let decoded_keys: Vec<&str> = decoded
        .as_dictionary()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(original_keys, decoded_keys);
}

#[test]
fn in_memory_buffer_works_as_a_sink() {
    let mut writer = XmlPlistWriterBuilder::new().from_writer(Vec::new());
    writer.write(&john_doe_info()).unwrap();
    let bytes = writer.into_inner().unwrap();

    let decoded = XmlPlistReaderBuilder::new()
        .from_reader(bytes.as_slice())
        .read()
        .unwrap();
    assert_eq!(decoded, john_doe_info());
}
