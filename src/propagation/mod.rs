//! SGP4 propagation of two-line element sets.
//!
//! All orbital mechanics come from the [`sgp4`] crate. This module only
//! converts between its types and ours:
//!
//! - [`parse_element_set`] turns two TLE lines into an [`OrbitalState`]
//! - [`propagate`] evaluates that state at a UTC time
//!
//! Positions are in kilometres and velocities in kilometres per second,
//! both in the TEME (True Equator, Mean Equinox) frame.

mod error;
mod julian;

pub use error::PropagationError;
pub use julian::JulianDate;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// A parsed element set ready for propagation.
pub struct OrbitalState {
    elements: sgp4::Elements,
    constants: sgp4::Constants,
    epoch: JulianDate,
}

impl OrbitalState {
    /// Returns the NORAD catalog identifier encoded in the element lines.
    #[must_use]
    pub const fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    /// Returns the element set epoch (UTC).
    #[must_use]
    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    /// Returns the element set epoch as a Julian date.
    #[must_use]
    pub const fn julian_epoch(&self) -> JulianDate {
        self.epoch
    }
}

impl fmt::Debug for OrbitalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitalState")
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish_non_exhaustive()
    }
}

/// Position and velocity at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateVector {
    /// Position in km.
    pub position: [f64; 3],
    /// Velocity in km/s.
    pub velocity: [f64; 3],
}

impl StateVector {
    /// Distance from the Earth's centre in km.
    #[must_use]
    pub fn radius(&self) -> f64 {
        norm(&self.position)
    }

    /// Speed in km/s.
    #[must_use]
    pub fn speed(&self) -> f64 {
        norm(&self.velocity)
    }
}

fn norm(v: &[f64; 3]) -> f64 {
    v.iter().map(|c| c * c).sum::<f64>().sqrt()
}

/// Parses two TLE lines.
///
/// Failures are logged at warn level before being returned.
///
/// # Errors
///
/// Returns [`PropagationError::Parse`] if the lines are malformed or the
/// elements cannot initialise SGP4.
pub fn parse_element_set(line1: &str, line2: &str) -> Result<OrbitalState, PropagationError> {
    let elements = sgp4::Elements::from_tle(None, line1.trim_end().as_bytes(), line2.trim_end().as_bytes())
        .map_err(|e| parse_failure(line1, line2, &e.to_string()))?;

    let constants = sgp4::Constants::from_elements(&elements)
        .map_err(|e| parse_failure(line1, line2, &e.to_string()))?;

    let epoch = JulianDate::from_datetime(&elements.datetime);

    Ok(OrbitalState {
        elements,
        constants,
        epoch,
    })
}

fn parse_failure(line1: &str, line2: &str, message: &str) -> PropagationError {
    warn!(line1, line2, error = message, "Failed to parse element set");
    PropagationError::Parse {
        message: message.to_string(),
    }
}

/// Propagates `state` to `target`.
///
/// # Errors
///
/// Returns [`PropagationError::Propagation`] if SGP4 reports an invalid
/// orbit (for example eccentricity out of range) at the target time.
pub fn propagate(state: &OrbitalState, target: &DateTime<Utc>) -> Result<StateVector, PropagationError> {
    let target_jd = JulianDate::from_datetime(&target.naive_utc());
    let minutes = target_jd.minutes_since(&state.epoch);

    let prediction = state
        .constants
        .propagate(sgp4::MinutesSinceEpoch(minutes))
        .map_err(|e| {
            let message = e.to_string();
            warn!(
                norad_id = state.elements.norad_id,
                minutes_since_epoch = minutes,
                error = %message,
                "SGP4 propagation failed"
            );
            PropagationError::Propagation { message }
        })?;

    Ok(StateVector {
        position: prediction.position,
        velocity: prediction.velocity,
    })
}
