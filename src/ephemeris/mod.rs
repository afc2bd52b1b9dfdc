// Ephemeris boundary: which bodies exist, how dates become day-numbers,
// and the engine that turns a day-number into an ecliptic longitude.

pub mod elements;
pub mod julian;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub use elements::OrbitalElementsEphemeris;
pub use julian::julian_day;

/// A point reported by the astro endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    /// Moon's ascending node.
    Rahu,
    /// Derived: opposite the Sun.
    Earth,
    /// Derived: opposite Rahu.
    Ketu,
}

impl Body {
    /// Bodies requested from the ephemeris, in response order.
    pub const COMPUTED: [Body; 11] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::Rahu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::Rahu => "Rahu",
            Body::Earth => "Earth",
            Body::Ketu => "Ketu",
        }
    }

    pub fn is_derived(self) -> bool {
        matches!(self, Body::Earth | Body::Ketu)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("{0} is derived and not computed by the ephemeris")]
    UnsupportedBody(Body),

    #[error("invalid day-number {0}")]
    InvalidDayNumber(f64),

    #[error("computation failed for {body}: {reason}")]
    Computation { body: Body, reason: String },
}

/// Source of geocentric ecliptic longitudes.
///
/// Implementations are synchronous; callers run them on the blocking pool
/// and bound each call with a timeout.
pub trait Ephemeris: Send + Sync + 'static {
    /// Longitude of `body` in degrees at `julian_day` (UT). The value is not
    /// required to be normalised.
    fn ecliptic_longitude(&self, body: Body, julian_day: f64) -> Result<f64, EphemerisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_bodies_exclude_derived_points() {
        assert_eq!(Body::COMPUTED.len(), 11);
        assert!(Body::COMPUTED.iter().all(|body| !body.is_derived()));
        assert_eq!(Body::COMPUTED[0], Body::Sun);
        assert_eq!(Body::COMPUTED[10], Body::Rahu);
    }

    #[test]
    fn test_body_serializes_as_name() {
        let json = serde_json::to_string(&Body::Ketu).expect("Failed to serialize body");
        assert_eq!(json, r#""Ketu""#);
        assert_eq!(Body::Mercury.to_string(), "Mercury");
    }
}
