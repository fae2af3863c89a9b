//! XML serialization of raw oEmbed payloads.
//!
//! Produces an `<oembed>` document: one child element per payload field,
//! arrays nested as repeated `<oembed>` children, scalar values escaped.
//! Numeric field names (illegal as XML element names) are renamed
//! `oembed`.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::{Result, UnfurlError};

/// Serialize a JSON payload as an oEmbed XML document.
pub fn payload_to_xml(payload: &Value) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, "oembed", payload)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| UnfurlError::Xml(format!("non-UTF8 output: {e}")))
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    let name = element_name(name)?;
    writer
        .write_event(Event::Start(BytesStart::new(name.as_ref())))
        .map_err(|e| UnfurlError::Xml(e.to_string()))?;

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_element(writer, key, child)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                write_element(writer, "oembed", item)?;
            }
        }
        scalar => {
            let text = scalar_text(scalar);
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(|e| UnfurlError::Xml(e.to_string()))?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(name.as_ref())))
        .map_err(|e| UnfurlError::Xml(e.to_string()))?;
    Ok(())
}

/// Validate a field name as an XML element name; numeric names become
/// `oembed`.
fn element_name(name: &str) -> Result<std::borrow::Cow<'_, str>> {
    if name.parse::<f64>().is_ok() {
        return Ok("oembed".into());
    }
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid_start && valid_rest {
        Ok(name.into())
    } else {
        Err(UnfurlError::Xml(format!(
            "field name '{name}' cannot be serialized as an XML element"
        )))
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => unreachable!("objects and arrays handled by caller"),
    }
}
