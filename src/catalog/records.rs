//! Response shapes returned by the catalog service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{CatalogError, CatalogResult};
use super::query::OutputFormat;

/// A query response, shaped by the content type the service declared.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogResponse {
    /// Decoded JSON records, passed through verbatim.
    Records(Vec<Value>),
    /// Raw body for the textual formats (TLE, XML, CSV).
    Text(String),
}

impl CatalogResponse {
    /// Returns the empty response for a requested format.
    #[must_use]
    pub const fn empty(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Records(Vec::new()),
            OutputFormat::Tle | OutputFormat::Xml | OutputFormat::Csv => Self::Text(String::new()),
        }
    }

    /// Returns `true` if the response holds no records or no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Records(records) => records.is_empty(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// Decodes a JSON body. The service always answers with an array.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Decode`] if the body is not a JSON array.
    pub fn from_json(body: &str) -> CatalogResult<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| CatalogError::Decode {
            message: format!("{e}: {}", truncate(body, 200)),
        })?;

        match value {
            Value::Array(records) => Ok(Self::Records(records)),
            other => Err(CatalogError::Decode {
                message: format!("expected a JSON array, got: {}", truncate(&other.to_string(), 200)),
            }),
        }
    }
}

/// One two-line element set with the metadata the tools report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ElementSet {
    /// NORAD catalog identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub norad_cat_id: Option<String>,
    /// Object name, when the service provides one.
    #[serde(default, deserialize_with = "lenient_string")]
    pub object_name: Option<String>,
    /// Epoch of the element set as reported by the service.
    pub epoch: String,
    /// First element line.
    pub tle_line1: String,
    /// Second element line.
    pub tle_line2: String,
    /// Mean motion in revolutions per day.
    #[serde(default, deserialize_with = "lenient_string")]
    pub mean_motion: Option<String>,
    /// Eccentricity.
    #[serde(default, deserialize_with = "lenient_string")]
    pub eccentricity: Option<String>,
}

impl ElementSet {
    /// Extracts an element set from one JSON record.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidRecord`] if `EPOCH`, `TLE_LINE1` or
    /// `TLE_LINE2` is missing.
    pub fn from_record(record: &Value) -> CatalogResult<Self> {
        Self::deserialize(record).map_err(|e| CatalogError::InvalidRecord {
            message: e.to_string(),
        })
    }
}

/// The service reports numeric fields as strings; accept either.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
