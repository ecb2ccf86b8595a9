use serde::{Deserialize, Serialize};

use crate::InputError;

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// a position in signed decimal degrees. serialized as `[lat, lng]`, which is
/// the order listings store and report their positions in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// builds a point without validation. use [`GeoPoint::try_new`] for
    /// values that come from outside the engine.
    pub const fn new(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    /// builds a point, rejecting non-finite or out-of-range coordinates.
    pub fn try_new(lat: f64, lng: f64) -> Result<GeoPoint, InputError> {
        let lat = check_range("latitude", lat, MIN_LAT, MAX_LAT)?;
        let lng = check_range("longitude", lng, MIN_LNG, MAX_LNG)?;
        Ok(GeoPoint { lat, lng })
    }

    /// parses a pair of form field values into a validated point.
    pub fn parse(lat: &str, lng: &str) -> Result<GeoPoint, InputError> {
        let lat = parse_num(lat)?;
        let lng = parse_num(lng)?;
        GeoPoint::try_new(lat, lng)
    }

    /// re-checks a point that may have been built with [`GeoPoint::new`].
    pub fn validate(&self) -> Result<(), InputError> {
        GeoPoint::try_new(self.lat, self.lng).map(|_| ())
    }

    /// the point in (x, y) = (lng, lat) order used by the geometry types.
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(value: [f64; 2]) -> Self {
        GeoPoint::new(value[0], value[1])
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(value: GeoPoint) -> Self {
        [value.lat, value.lng]
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(value: geo::Point<f64>) -> Self {
        GeoPoint::new(value.y(), value.x())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.lat, self.lng)
    }
}

fn parse_num(s: &str) -> Result<f64, InputError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| InputError::NotANumber(s.to_string()))
}

fn check_range(axis: &'static str, value: f64, min: f64, max: f64) -> Result<f64, InputError> {
    if !value.is_finite() || value < min || max < value {
        Err(InputError::InvalidCoordinate {
            axis,
            value,
            min,
            max,
        })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(GeoPoint::try_new(41.29, -82.21).is_ok());
        assert!(matches!(
            GeoPoint::try_new(91.0, 0.0),
            Err(InputError::InvalidCoordinate { axis: "latitude", .. })
        ));
        assert!(matches!(
            GeoPoint::try_new(0.0, -180.5),
            Err(InputError::InvalidCoordinate { axis: "longitude", .. })
        ));
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_parse_form_values() {
        let p = GeoPoint::parse(" 41.293", "-82.205 ").expect("test invariant failed: parse");
        assert_eq!(p, GeoPoint::new(41.293, -82.205));
        assert_eq!(
            GeoPoint::parse("north", "0"),
            Err(InputError::NotANumber(String::from("north")))
        );
    }

    #[test]
    fn test_serializes_as_lat_lng_pair() {
        let p = GeoPoint::new(41.293, -82.205);
        let json = serde_json::to_string(&p).expect("test invariant failed: serialize");
        assert_eq!(json, "[41.293,-82.205]");
        let geo_point = p.to_geo();
        assert_eq!(geo_point.x(), -82.205);
        assert_eq!(GeoPoint::from(geo_point), p);
    }
}
