use std::path::Path;

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::model::{RideOffer, RideRequest, UserProfile};

/// the persisted form of a listing store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSnapshot {
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
    #[serde(default)]
    pub offers: Vec<RideOffer>,
    #[serde(default)]
    pub requests: Vec<RideRequest>,
}

impl ListingSnapshot {
    pub fn read(path: &Path) -> Result<ListingSnapshot, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::SnapshotRead {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| StoreError::SnapshotRead {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        let write_error = |message: String| StoreError::SnapshotWrite {
            path: path.to_string_lossy().to_string(),
            message,
        };
        let contents = serde_json::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| write_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_layout() {
        let json = r#"{
            "profiles": [{"id": "p", "first_name": "Pat", "last_name": "Rider", "email": "pat@example.com"}],
            "offers": [{
                "id": "000000000000000000000001",
                "driver": "d",
                "start": {"position": [41.293, -82.205], "title": "Oberlin"},
                "end": {"position": [41.266, -82.223], "title": "Kipton"},
                "date": "2024-06-01T14:00:00",
                "fuzziness": "2-hours",
                "passengers": ["p"],
                "polygon": [[-82.3, 41.2], [-82.1, 41.2], [-82.1, 41.4], [-82.3, 41.4]]
            }]
        }"#;
        let snapshot: ListingSnapshot =
            serde_json::from_str(json).expect("test invariant failed: deserialize");
        assert!(snapshot.requests.is_empty());
        let offer = &snapshot.offers[0];
        assert_eq!(offer.start.position.lat, 41.293);
        assert!(offer.askers.is_empty());
        assert!(!offer.completed);
        assert_eq!(offer.polygon.as_ref().map(|p| p.contour().len()), Some(4));
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "ridematch-snapshot-{}.json",
            std::process::id()
        ));
        let snapshot = ListingSnapshot {
            profiles: vec![UserProfile::new("p", "Pat", "Rider", "pat@example.com")],
            offers: vec![],
            requests: vec![],
        };
        snapshot.write(&path).expect("test invariant failed: write");
        let read = ListingSnapshot::read(&path).expect("test invariant failed: read");
        let _ = std::fs::remove_file(&path);
        assert_eq!(read, snapshot);
        assert!(matches!(
            ListingSnapshot::read(&path),
            Err(StoreError::SnapshotRead { .. })
        ));
    }
}
