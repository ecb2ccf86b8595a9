use serde::{Deserialize, Serialize};

use super::{geo_utils, GeoPoint};

/// two locations closer than this (in kilometers) name the same place.
pub const SAME_PLACE_KM: f64 = 0.1;

/// a titled position attached to a listing as its start or end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub position: GeoPoint,
    pub title: String,
}

impl Location {
    pub fn new(position: GeoPoint, title: &str) -> Location {
        Location {
            position,
            title: title.to_string(),
        }
    }

    /// approximate equality: true when the haversine distance between the
    /// two positions is below [`SAME_PLACE_KM`]. titles are ignored.
    pub fn same_place(&self, other: &Location) -> bool {
        self.same_place_within(other, SAME_PLACE_KM)
    }

    /// approximate equality with a caller-chosen threshold in kilometers.
    pub fn same_place_within(&self, other: &Location, threshold_km: f64) -> bool {
        geo_utils::distance(&self.position, &other.position) < threshold_km
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}
