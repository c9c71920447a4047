//! Catalog records and their JSON wire form.
//!
//! The remote API returns loosely-typed JSON: a Mongo `_id`, the schema's
//! fields, and an optional raw image buffer plus `contentType`. [`WireRecord`]
//! captures that shape and [`WireRecord::into_record`] turns it into a
//! [`Record`] whose image is already transcoded to an [`InlineImage`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::error::CoreError;
use crate::image::InlineImage;
use crate::schema::{FieldKind, RecordSchema};
use crate::types::RecordId;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A field value as held in the local collection.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One persisted catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, FieldValue>,
    pub image: Option<InlineImage>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            image: None,
        }
    }

    /// Builder-style setter for a text field.
    pub fn with_text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.to_string(), FieldValue::Text(value.into()));
        self
    }

    /// Builder-style setter for a numeric field.
    pub fn with_number(mut self, name: &str, value: f64) -> Self {
        self.fields
            .insert(name.to_string(), FieldValue::Number(value));
        self
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

/// Image as serialized by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireImage {
    /// Node `Buffer#toJSON`: `{"type":"Buffer","data":[...]}`.
    Buffer { data: Vec<u8> },
    /// A bare byte array.
    Bytes(Vec<u8>),
    /// An already-inline `data:` URI.
    DataUri(String),
}

/// A record exactly as the API returns it.
///
/// Mongo backends send `_id`; some also add an `id` virtual, or send only
/// `id`. Both are captured and `_id` wins.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRecord {
    #[serde(default, rename = "_id")]
    pub mongo_id: Option<RecordId>,
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub image: Option<WireImage>,
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl WireRecord {
    /// Convert into a [`Record`], keeping only the fields `schema` declares
    /// and transcoding any binary image into an inline URI.
    pub fn into_record(self, schema: &RecordSchema) -> Result<Record, CoreError> {
        let id = self
            .mongo_id
            .or(self.id)
            .ok_or_else(|| CoreError::Decode("record has neither `_id` nor `id`".to_string()))?;

        let mut fields = BTreeMap::new();

        for spec in schema.fields {
            let Some(raw) = self.fields.get(spec.name) else {
                continue;
            };
            if let Some(value) = decode_field(spec.name, spec.kind, raw)? {
                fields.insert(spec.name.to_string(), value);
            }
        }

        let image = match self.image {
            None => None,
            Some(WireImage::Buffer { data }) | Some(WireImage::Bytes(data)) => {
                if data.is_empty() {
                    None
                } else {
                    Some(InlineImage::from_bytes(self.content_type.as_deref(), &data))
                }
            }
            Some(WireImage::DataUri(uri)) => Some(InlineImage::from_data_uri(&uri).ok_or_else(
                || CoreError::Decode(format!("record {id}: image is not a data URI")),
            )?),
        };

        Ok(Record {
            id,
            fields,
            image,
        })
    }
}

/// Decode one JSON value according to the field's kind.
///
/// `null` decodes as absent. Numeric fields accept numbers and numeric
/// strings (multipart submissions are stored as text by some backends), but
/// only finite ones.
fn decode_field(
    name: &str,
    kind: FieldKind,
    raw: &serde_json::Value,
) -> Result<Option<FieldValue>, CoreError> {
    use serde_json::Value;

    let value = match (kind, raw) {
        (_, Value::Null) => None,
        (FieldKind::Number, Value::Number(n)) => n.as_f64().map(FieldValue::Number),
        (FieldKind::Number, Value::String(s)) if s.trim().is_empty() => None,
        (FieldKind::Number, Value::String(s)) => {
            let n = s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    CoreError::Decode(format!("field {name}: '{s}' is not a finite number"))
                })?;
            Some(FieldValue::Number(n))
        }
        (FieldKind::Text | FieldKind::Date, Value::String(s)) => Some(FieldValue::Text(s.clone())),
        (FieldKind::Text | FieldKind::Date, Value::Number(n)) => {
            Some(FieldValue::Text(n.to_string()))
        }
        (FieldKind::Text, Value::Bool(b)) => Some(FieldValue::Text(b.to_string())),
        (_, other) => {
            return Err(CoreError::Decode(format!(
                "field {name}: unexpected value {other}"
            )))
        }
    };
    Ok(value)
}

/// Decode a JSON array of records.
pub fn decode_records(
    schema: &RecordSchema,
    wire: Vec<WireRecord>,
) -> Result<Vec<Record>, CoreError> {
    wire.into_iter().map(|w| w.into_record(schema)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
