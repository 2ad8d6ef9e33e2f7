//! Tool definitions, argument parsing and result shaping.
//!
//! Domain failures never become JSON-RPC errors. They are returned as a
//! tool result with `isError` set and a `{"error": "..."}` body.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{CatalogResponse, OutputFormat, TleQuery};
use crate::propagation::StateVector;

/// Name of the element set retrieval tool.
pub const GET_TLES: &str = "get_tles";

/// Name of the propagation tool.
pub const PROPAGATE_SATELLITE_POSITION: &str = "propagate_satellite_position";

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates a successful result holding pretty-printed JSON.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise tool result");
                Self::error("Internal error: failed to serialise result")
            }
        }
    }

    /// Creates an error result with an `{"error": message}` body.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        let body = json!({ "error": message.into() });
        Self {
            content: vec![ToolContent::Text {
                text: body.to_string(),
            }],
            is_error: true,
        }
    }

    /// Returns the text of the first content item.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|content| match content {
            ToolContent::Text { text } => text.as_str(),
        })
    }
}

/// Shapes a catalog response: records as a JSON array, text verbatim.
#[must_use]
pub fn catalog_result(response: CatalogResponse) -> ToolCallResult {
    match response {
        CatalogResponse::Records(records) => ToolCallResult::json(&Value::Array(records)),
        CatalogResponse::Text(text) => ToolCallResult::text(text),
    }
}

/// Shapes a successful propagation.
#[must_use]
pub fn propagation_result(
    norad_cat_id: u64,
    target_epoch: &str,
    state: &StateVector,
    tle_epoch: &str,
) -> ToolCallResult {
    ToolCallResult::json(&json!({
        "norad_cat_id": norad_cat_id,
        "target_epoch": target_epoch,
        "position_km": state.position,
        "velocity_km_per_s": state.velocity,
        "tle_epoch": tle_epoch,
    }))
}

/// Builds filter criteria from `get_tles` arguments.
///
/// Absent and `null` arguments are treated alike.
///
/// # Errors
///
/// Returns a message naming the first invalid argument.
pub fn parse_tle_query(arguments: &Value, limit: u32) -> Result<TleQuery, String> {
    let format = match optional(arguments, "format_type") {
        None => OutputFormat::Json,
        Some(value) => value
            .as_str()
            .ok_or_else(|| "format_type must be a string".to_string())?
            .parse()?,
    };

    Ok(TleQuery {
        norad_cat_id: optional_u64(arguments, "norad_cat_id")?,
        start_date: optional_timestamp(arguments, "start_date")?,
        end_date: optional_timestamp(arguments, "end_date")?,
        mean_motion_min: optional_f64(arguments, "mean_motion_min")?,
        mean_motion_max: optional_f64(arguments, "mean_motion_max")?,
        eccentricity_min: optional_f64(arguments, "eccentricity_min")?,
        eccentricity_max: optional_f64(arguments, "eccentricity_max")?,
        format,
        limit,
    })
}

/// Parses a target epoch.
///
/// Accepts RFC 3339 timestamps with an offset (converted to UTC), and
/// ISO 8601 date-times or dates without one (taken as UTC).
#[must_use]
pub fn parse_epoch(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Some(datetime.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn optional<'a>(arguments: &'a Value, name: &str) -> Option<&'a Value> {
    arguments.get(name).filter(|value| !value.is_null())
}

fn optional_u64(arguments: &Value, name: &str) -> Result<Option<u64>, String> {
    optional(arguments, name)
        .map(|value| {
            value
                .as_u64()
                .ok_or_else(|| format!("{name} must be a non-negative integer"))
        })
        .transpose()
}

fn optional_f64(arguments: &Value, name: &str) -> Result<Option<f64>, String> {
    optional(arguments, name)
        .map(|value| {
            value
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("{name} must be a number"))
        })
        .transpose()
}

/// Epoch bounds go into the query path verbatim once they are known to be
/// RFC 3339 timestamps with a timezone.
fn optional_timestamp(arguments: &Value, name: &str) -> Result<Option<String>, String> {
    optional(arguments, name)
        .map(|value| {
            let text = value
                .as_str()
                .map(str::trim)
                .ok_or_else(|| format!("{name} must be a string"))?;
            DateTime::parse_from_rfc3339(text).map_err(|_| {
                format!(
                    "{name} must be ISO 8601 with timezone, e.g. '2025-07-12T00:00:00Z'"
                )
            })?;
            Ok(text.to_string())
        })
        .transpose()
}

/// Returns the list of available tools.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: GET_TLES.to_string(),
            description: Some(
                "Retrieve Two-Line Element (TLE) sets from Space-Track.org, newest first. \
                 Returns at most the 10 latest element sets matching the filters to keep \
                 responses small. Without start_date/end_date only element sets from the \
                 last day are returned. Returns a JSON array of records for format_type \
                 'json', or the raw text for 'tle', 'xml' and 'csv'. A failed query \
                 returns an empty result."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "norad_cat_id": {
                        "type": "integer",
                        "description": "NORAD catalog ID of the satellite"
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Exclusive lower epoch bound, ISO 8601 with timezone (e.g. '2025-07-12T00:00:00Z')"
                    },
                    "end_date": {
                        "type": "string",
                        "description": "Exclusive upper epoch bound, ISO 8601 with timezone (e.g. '2025-07-12T23:59:59Z')"
                    },
                    "mean_motion_min": {
                        "type": "number",
                        "description": "Minimum mean motion in revolutions per day (GEO is about 0.99)"
                    },
                    "mean_motion_max": {
                        "type": "number",
                        "description": "Maximum mean motion in revolutions per day (GEO is about 1.1)"
                    },
                    "eccentricity_min": {
                        "type": "number",
                        "description": "Minimum eccentricity"
                    },
                    "eccentricity_max": {
                        "type": "number",
                        "description": "Maximum eccentricity (GEO is below 0.01)"
                    },
                    "format_type": {
                        "type": "string",
                        "enum": ["json", "tle", "xml", "csv"],
                        "default": "json",
                        "description": "Output format"
                    }
                }
            }),
        },
        ToolDefinition {
            name: PROPAGATE_SATELLITE_POSITION.to_string(),
            description: Some(
                "Propagate a satellite to a target epoch with SGP4 using its latest TLE \
                 from Space-Track. Returns position (km) and velocity (km/s) in the TEME \
                 frame, together with the epoch of the TLE that was used."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "norad_cat_id": {
                        "type": "integer",
                        "description": "NORAD catalog ID of the satellite"
                    },
                    "epoch": {
                        "type": "string",
                        "description": "Target epoch in ISO 8601 (e.g. '2025-12-31T12:00:00Z')"
                    }
                },
                "required": ["norad_cat_id", "epoch"]
            }),
        },
    ]
}
