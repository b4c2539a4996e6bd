use log::info;
use plist_codec_rs::xml::{XmlPlistReaderBuilder, XmlPlistWriterBuilder};
use plist_codec_rs::{to_bytes, Dictionary, PlistError, Value};

/// Builds a dictionary describing John Doe: plain strings, a number, a
/// populated array, an empty array and a small binary blob.
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

fn main() -> Result<(), PlistError> {
    env_logger::init();

    let document = john_doe_info();
    println!("John Doe info dictionary:\n{document}\n");

    let bytes = to_bytes(&document)?;
    println!(
        "The XML property list contents:\n{}",
        String::from_utf8_lossy(&bytes)
    );

    let path = std::env::temp_dir().join("schema.xml");
    let mut writer = XmlPlistWriterBuilder::new().from_path(&path)?;
    writer.write(&document)?;
    info!("Property list written to {}", path.display());

    let decoded = XmlPlistReaderBuilder::new().from_path(&path)?.read()?;
    assert_eq!(decoded, document);
    println!("Decoded property list from {} matches the original", path.display());

    Ok(())
}
