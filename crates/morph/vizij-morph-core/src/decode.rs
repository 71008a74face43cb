//! Morph document decoder.
//!
//! Keys are matched case-insensitively. Unrecognized keys are skipped so
//! newer documents still load; a recognized key carrying the wrong JSON type
//! fails the whole decode.

use serde_json::{Map, Value as JsonValue};

use crate::error::{DecodeError, TokenKind};
use crate::model::MorphDocument;
use crate::wire::{DocumentRecord, MorphRecord, PeripheralRecord};

/// Decode `text` into a document with defaults for absent keys.
pub fn decode(text: &str) -> Result<MorphDocument, DecodeError> {
    decode_record(text).map(DocumentRecord::into_document)
}

/// Decode `text` keeping track of which keys were present.
pub fn decode_record(text: &str) -> Result<DocumentRecord, DecodeError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let obj = match root {
        JsonValue::Object(obj) => obj,
        other => {
            return Err(DecodeError::UnnamedProperty {
                found: token_kind(&other),
            })
        }
    };

    let mut doc = DocumentRecord::default();
    for (key, value) in &obj {
        match key.to_lowercase().as_str() {
            "name" => doc.name = Some(expect_string(key, value)?),
            "prototype" => doc.prototype = Some(expect_string(key, value)?),
            "morphs" => doc.morphs = parse_array(key, value, parse_morph)?,
            "peripherals" => doc.peripherals = parse_array(key, value, parse_peripheral)?,
            _ => {}
        }
    }
    Ok(doc)
}

/// Token kind a JSON value would start with.
pub fn token_kind(v: &JsonValue) -> TokenKind {
    match v {
        JsonValue::Object(_) => TokenKind::ObjectStart,
        JsonValue::Array(_) => TokenKind::ArrayStart,
        JsonValue::String(_) => TokenKind::String,
        JsonValue::Number(n) if n.is_f64() => TokenKind::Double,
        JsonValue::Number(_) => TokenKind::Int,
        JsonValue::Bool(_) => TokenKind::Boolean,
        JsonValue::Null => TokenKind::Null,
    }
}

fn parse_array<T>(
    key: &str,
    value: &JsonValue,
    parse: fn(&Map<String, JsonValue>) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let items = value.as_array().ok_or_else(|| DecodeError::TypeMismatch {
        key: key.to_string(),
        expected: TokenKind::ArrayStart,
        found: token_kind(value),
    })?;

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| DecodeError::ElementNotObject {
                key: key.to_string(),
                index,
                found: token_kind(item),
            })?;
        out.push(parse(obj)?);
    }
    Ok(out)
}

fn parse_morph(obj: &Map<String, JsonValue>) -> Result<MorphRecord, DecodeError> {
    let mut m = MorphRecord::default();
    for (key, value) in obj {
        match key.to_lowercase().as_str() {
            "name" => m.name = Some(expect_string(key, value)?),
            "nameinternal" => m.internal_name = expect_string(key, value)?,
            "category" => m.category = Some(expect_string(key, value)?),
            "hasnegativevalues" => m.has_negative_values = Some(expect_bool(key, value)?),
            "value" => m.value = Some(expect_number(key, value)?),
            _ => {}
        }
    }
    Ok(m)
}

fn parse_peripheral(obj: &Map<String, JsonValue>) -> Result<PeripheralRecord, DecodeError> {
    let mut p = PeripheralRecord::default();
    for (key, value) in obj {
        match key.to_lowercase().as_str() {
            "name" => p.name = Some(expect_string(key, value)?),
            "bone" => p.bone = Some(expect_string(key, value)?),
            "resourcepath" => p.resource_path = expect_string(key, value)?,
            "enabled" => p.enabled = Some(expect_bool(key, value)?),
            "offset_x" => p.offset_x = Some(expect_number(key, value)?),
            "offset_y" => p.offset_y = Some(expect_number(key, value)?),
            "offset_z" => p.offset_z = Some(expect_number(key, value)?),
            "scale_x" => p.scale_x = Some(expect_number(key, value)?),
            "scale_y" => p.scale_y = Some(expect_number(key, value)?),
            "scale_z" => p.scale_z = Some(expect_number(key, value)?),
            _ => {}
        }
    }
    Ok(p)
}

fn mismatch(key: &str, expected: TokenKind, found: &JsonValue) -> DecodeError {
    DecodeError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: token_kind(found),
    }
}

fn expect_string(key: &str, value: &JsonValue) -> Result<String, DecodeError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(key, TokenKind::String, value))
}

fn expect_bool(key: &str, value: &JsonValue) -> Result<bool, DecodeError> {
    value
        .as_bool()
        .ok_or_else(|| mismatch(key, TokenKind::Boolean, value))
}

// Integers are accepted wherever a double is expected ("0" for "0.0").
fn expect_number(key: &str, value: &JsonValue) -> Result<f64, DecodeError> {
    match value {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| mismatch(key, TokenKind::Double, value)),
        _ => Err(mismatch(key, TokenKind::Double, value)),
    }
}
