//! Filter criteria and query path construction.
//!
//! Space-Track queries are encoded as path segments rather than a query
//! string. Each filter is a `FIELD/<predicate>` pair where the predicate is
//! one of:
//!
//! - `<min>%2D%2D<max>` when both bounds are given
//! - `%3E<min>` (greater than) when only the lower bound is given
//! - `%3C<max>` (less than) when only the upper bound is given
//!
//! The `min--max` range is assumed to be inclusive on both ends. This is
//! how the service documents the operator but has not been verified for
//! every field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of element sets returned per query.
pub const DEFAULT_LIMIT: u32 = 10;

/// Percent-encoded `>`.
const GREATER_THAN: &str = "%3E";
/// Percent-encoded `<`.
const LESS_THAN: &str = "%3C";
/// Percent-encoded `--` range operator.
const RANGE: &str = "%2D%2D";

/// Response format requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of records.
    #[default]
    Json,
    /// Plain two-line element text.
    Tle,
    /// XML document.
    Xml,
    /// Comma-separated values.
    Csv,
}

impl OutputFormat {
    /// Returns the path token for this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Tle => "tle",
            Self::Xml => "xml",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "tle" => Ok(Self::Tle),
            "xml" => Ok(Self::Xml),
            "csv" => Ok(Self::Csv),
            other => Err(format!(
                "Invalid format_type '{other}'. Must be one of: json, tle, xml, csv"
            )),
        }
    }
}

/// Filter criteria for an element set query.
#[derive(Debug, Clone, PartialEq)]
pub struct TleQuery {
    /// NORAD catalog identifier.
    pub norad_cat_id: Option<u64>,
    /// Exclusive lower epoch bound (ISO 8601 with timezone).
    pub start_date: Option<String>,
    /// Exclusive upper epoch bound (ISO 8601 with timezone).
    pub end_date: Option<String>,
    /// Minimum mean motion in revolutions per day.
    pub mean_motion_min: Option<f64>,
    /// Maximum mean motion in revolutions per day.
    pub mean_motion_max: Option<f64>,
    /// Minimum eccentricity.
    pub eccentricity_min: Option<f64>,
    /// Maximum eccentricity.
    pub eccentricity_max: Option<f64>,
    /// Response format.
    pub format: OutputFormat,
    /// Maximum number of results.
    pub limit: u32,
}

impl Default for TleQuery {
    fn default() -> Self {
        Self {
            norad_cat_id: None,
            start_date: None,
            end_date: None,
            mean_motion_min: None,
            mean_motion_max: None,
            eccentricity_min: None,
            eccentricity_max: None,
            format: OutputFormat::Json,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TleQuery {
    /// Creates a query for a single satellite.
    #[must_use]
    pub fn for_satellite(norad_cat_id: u64) -> Self {
        Self {
            norad_cat_id: Some(norad_cat_id),
            ..Self::default()
        }
    }

    /// Sets the response format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Builds the path below `/basicspacedata/query/`.
    ///
    /// When no epoch bound is given the query is restricted to element sets
    /// newer than `epoch_window_days` days to keep responses small.
    #[must_use]
    pub fn to_path(&self, epoch_window_days: u32) -> String {
        let mut segments = vec!["class/tle".to_string()];

        if let Some(id) = self.norad_cat_id {
            segments.push(format!("NORAD_CAT_ID/{id}"));
        }

        segments.push(
            predicate("EPOCH", self.start_date.as_deref(), self.end_date.as_deref())
                .unwrap_or_else(|| format!("EPOCH/{GREATER_THAN}now-{epoch_window_days}")),
        );

        segments.extend(predicate(
            "MEAN_MOTION",
            self.mean_motion_min,
            self.mean_motion_max,
        ));
        segments.extend(predicate(
            "ECCENTRICITY",
            self.eccentricity_min,
            self.eccentricity_max,
        ));

        segments.push(format!(
            "orderby/EPOCH%20DESC/format/{}/LIMIT/{}/emptyresult/show",
            self.format, self.limit
        ));

        segments.join("/")
    }
}

/// Encodes a bounded filter as one path segment pair, if any bound is set.
fn predicate<T: fmt::Display>(field: &str, min: Option<T>, max: Option<T>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) => Some(format!("{field}/{min}{RANGE}{max}")),
        (Some(min), None) => Some(format!("{field}/{GREATER_THAN}{min}")),
        (None, Some(max)) => Some(format!("{field}/{LESS_THAN}{max}")),
        (None, None) => None,
    }
}
