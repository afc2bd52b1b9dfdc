use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::ephemeris::Body;

/// Payload of `POST /api/astro`.
#[derive(Debug, Deserialize)]
pub struct AstroRequest {
    pub date: Option<DateInput>,
    /// Accepted for client compatibility; it does not change the result.
    #[serde(rename = "isRed", default)]
    pub is_red: Option<Value>,
}

/// Calendar date and time of day. Every field is optional on the wire so
/// that a missing field is reported as a validation error rather than a
/// deserialisation failure; zero is a legitimate value for hours and minutes.
#[derive(Debug, Default, Deserialize)]
pub struct DateInput {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hours: Option<u32>,
    pub minutes: Option<u32>,
}

/// A validated moment in the proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl AstroRequest {
    pub fn validate(&self) -> Result<CivilDateTime, String> {
        match self.date {
            Some(ref date) => date.validate(),
            None => Err("Invalid date data: 'date' is required".to_string()),
        }
    }
}

impl DateInput {
    pub fn validate(&self) -> Result<CivilDateTime, String> {
        let (Some(year), Some(month), Some(day)) = (self.year, self.month, self.day) else {
            return Err("Invalid date data: year, month and day are required".to_string());
        };
        let (Some(hours), Some(minutes)) = (self.hours, self.minutes) else {
            return Err("Invalid date data: hours and minutes are required".to_string());
        };

        if !(1..=12).contains(&month) {
            return Err(format!("Invalid date data: month {} is out of range 1-12", month));
        }
        if !(1..=31).contains(&day) {
            return Err(format!("Invalid date data: day {} is out of range 1-31", day));
        }
        if hours > 23 {
            return Err(format!("Invalid date data: hours {} is out of range 0-23", hours));
        }
        if minutes > 59 {
            return Err(format!("Invalid date data: minutes {} is out of range 0-59", minutes));
        }

        Ok(CivilDateTime { year, month, day, hours, minutes })
    }
}

impl CivilDateTime {
    pub fn fractional_hour(&self) -> f64 {
        f64::from(self.hours) + f64::from(self.minutes) / 60.0
    }
}

/// An ecliptic longitude rounded to hundredths of a degree, always in
/// `[0, 360)`. Serialised as a string with two decimals, e.g. `"280.38"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Degree(u32);

const FULL_CIRCLE: u32 = 36_000;
const HALF_CIRCLE: u32 = 18_000;

impl Degree {
    /// Normalises any finite longitude into `[0, 360)`. NaN and infinities
    /// yield `None`.
    pub fn from_longitude(longitude: f64) -> Option<Self> {
        if !longitude.is_finite() {
            return None;
        }
        let normalized = longitude.rem_euclid(360.0);
        // 359.996 rounds up to a full turn, which is 0.00.
        let centidegrees = (normalized * 100.0).round() as u32 % FULL_CIRCLE;
        Some(Degree(centidegrees))
    }

    pub fn from_centidegrees(centidegrees: u32) -> Self {
        Degree(centidegrees % FULL_CIRCLE)
    }

    pub fn centidegrees(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// The point 180 degrees away.
    pub fn opposite(self) -> Self {
        Degree((self.0 + HALF_CIRCLE) % FULL_CIRCLE)
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Degree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One entry of the astro response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CelestialPosition {
    pub planet: Body,
    pub degree: Option<Degree>,
}

impl CelestialPosition {
    pub fn new(planet: Body, degree: Option<Degree>) -> Self {
        CelestialPosition { planet, degree }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> AstroRequest {
        serde_json::from_value(value).expect("Failed to deserialize request")
    }

    #[test]
    fn test_midnight_on_new_year_is_valid() {
        let moment = request(json!({
            "date": {"year": 2024, "month": 1, "day": 1, "hours": 0, "minutes": 0}
        }))
        .validate()
        .expect("Zero hours and minutes are valid");

        assert_eq!(
            moment,
            CivilDateTime { year: 2024, month: 1, day: 1, hours: 0, minutes: 0 }
        );
        assert_eq!(moment.fractional_hour(), 0.0);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(request(json!({})).validate().is_err());
        assert!(request(json!({"date": {"month": 1, "day": 1, "hours": 0, "minutes": 0}})).validate().is_err());
        assert!(request(json!({"date": {"year": 2024, "day": 1, "hours": 0, "minutes": 0}})).validate().is_err());
        assert!(request(json!({"date": {"year": 2024, "month": 1, "hours": 0, "minutes": 0}})).validate().is_err());
        assert!(request(json!({"date": {"year": 2024, "month": 1, "day": 1, "minutes": 0}})).validate().is_err());
        assert!(request(json!({"date": {"year": 2024, "month": 1, "day": 1, "hours": 0}})).validate().is_err());
        assert!(request(json!({"date": {"year": 2024, "month": 1, "day": 1, "hours": null, "minutes": 0}})).validate().is_err());
    }

    #[test]
    fn test_out_of_range_fields_are_rejected() {
        let base = |field: &str, value: u32| {
            let mut date = json!({"year": 2024, "month": 6, "day": 15, "hours": 12, "minutes": 30});
            date[field] = json!(value);
            request(json!({ "date": date })).validate()
        };

        assert!(base("month", 0).is_err());
        assert!(base("month", 13).is_err());
        assert!(base("day", 0).is_err());
        assert!(base("day", 32).is_err());
        assert!(base("hours", 24).is_err());
        assert!(base("minutes", 60).is_err());
        assert!(base("hours", 23).is_ok());
        assert!(base("minutes", 59).is_ok());
    }

    #[test]
    fn test_is_red_is_accepted_in_any_shape() {
        let req = request(json!({
            "date": {"year": 2024, "month": 1, "day": 1, "hours": 5, "minutes": 45},
            "isRed": true
        }));
        assert_eq!(req.is_red, Some(json!(true)));
        assert!(req.validate().is_ok());

        let req = request(json!({
            "date": {"year": 2024, "month": 1, "day": 1, "hours": 5, "minutes": 45},
            "isRed": "yes"
        }));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_fractional_hour() {
        let moment = CivilDateTime { year: 2024, month: 1, day: 1, hours: 18, minutes: 45 };
        assert_eq!(moment.fractional_hour(), 18.75);
    }

    #[test]
    fn test_degree_normalization() {
        assert_eq!(Degree::from_longitude(0.0).unwrap().to_string(), "0.00");
        assert_eq!(Degree::from_longitude(123.456).unwrap().to_string(), "123.46");
        assert_eq!(Degree::from_longitude(-90.0).unwrap().to_string(), "270.00");
        assert_eq!(Degree::from_longitude(725.5).unwrap().to_string(), "5.50");
        assert_eq!(Degree::from_longitude(-720.0).unwrap().to_string(), "0.00");
        assert_eq!(Degree::from_longitude(359.996).unwrap().to_string(), "0.00");
        assert_eq!(Degree::from_longitude(359.994).unwrap().to_string(), "359.99");
    }

    #[test]
    fn test_degree_rejects_non_finite_values() {
        assert!(Degree::from_longitude(f64::NAN).is_none());
        assert!(Degree::from_longitude(f64::INFINITY).is_none());
        assert!(Degree::from_longitude(f64::NEG_INFINITY).is_none());
    }

    #[test]
    fn test_degree_always_below_full_circle() {
        let mut longitude = -1000.0;
        while longitude < 1000.0 {
            let degree = Degree::from_longitude(longitude).unwrap();
            assert!(degree.as_f64() >= 0.0 && degree.as_f64() < 360.0);
            longitude += 0.137;
        }
    }

    #[test]
    fn test_opposite_point() {
        assert_eq!(Degree::from_centidegrees(28038).opposite().to_string(), "100.38");
        assert_eq!(Degree::from_centidegrees(1000).opposite().to_string(), "190.00");
        assert_eq!(Degree::from_centidegrees(18000).opposite().to_string(), "0.00");
        assert_eq!(Degree::from_centidegrees(35999).opposite().to_string(), "179.99");
    }

    #[test]
    fn test_position_serialization() {
        let positions = vec![
            CelestialPosition::new(Body::Sun, Degree::from_longitude(280.384)),
            CelestialPosition::new(Body::Mars, None),
        ];

        let json = serde_json::to_string(&positions).expect("Failed to serialize positions");
        assert_eq!(
            json,
            r#"[{"planet":"Sun","degree":"280.38"},{"planet":"Mars","degree":null}]"#
        );
    }
}
