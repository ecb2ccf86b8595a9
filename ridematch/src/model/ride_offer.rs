use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use ridematch_core::{
    spatial::{Location, RoutePolygon},
    temporal::{date_codec, Fuzziness},
};
use serde::{Deserialize, Serialize};

use super::{OfferId, ProfileId};
use crate::RideMatchError;

/// the fields a driver supplies when posting an offer. the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferDraft {
    pub driver: ProfileId,
    pub start: Location,
    pub end: Location,
    #[serde(default)]
    pub message: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub fuzziness: Fuzziness,
    #[serde(default)]
    pub polygon: Option<RoutePolygon>,
}

/// a driver's posted availability for a route and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideOffer {
    pub id: OfferId,
    pub driver: ProfileId,
    pub start: Location,
    pub end: Location,
    #[serde(default)]
    pub message: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub fuzziness: Fuzziness,
    /// accepted riders
    #[serde(default)]
    pub passengers: BTreeSet<ProfileId>,
    /// riders who asked to join and are waiting on the driver
    #[serde(default)]
    pub askers: BTreeSet<ProfileId>,
    /// the trip took place and the driver left feedback
    #[serde(default)]
    pub completed: bool,
    /// route corridor; `None` limits matching to point-to-point distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<RoutePolygon>,
}

impl RideOffer {
    pub fn from_draft(id: OfferId, draft: OfferDraft) -> RideOffer {
        RideOffer {
            id,
            driver: draft.driver,
            start: draft.start,
            end: draft.end,
            message: draft.message,
            date: draft.date,
            fuzziness: draft.fuzziness,
            passengers: BTreeSet::new(),
            askers: BTreeSet::new(),
            completed: false,
            polygon: draft.polygon.filter(|p| !p.is_empty()),
        }
    }

    /// the route corridor, if the offer has a non-empty one.
    pub fn route(&self) -> Option<&RoutePolygon> {
        self.polygon.as_ref().filter(|p| !p.is_empty())
    }

    /// records that `profile` asked to ride along. returns false if the ask
    /// was already pending.
    pub fn add_asker(&mut self, profile: &ProfileId) -> Result<bool, RideMatchError> {
        if *profile == self.driver {
            return Err(RideMatchError::OwnListing(profile.clone()));
        }
        if self.passengers.contains(profile) {
            return Err(RideMatchError::AlreadyPassenger {
                profile: profile.clone(),
                offer: self.id.clone(),
            });
        }
        Ok(self.askers.insert(profile.clone()))
    }

    /// moves a pending asker into the passenger set.
    pub fn accept_asker(&mut self, profile: &ProfileId) -> Result<(), RideMatchError> {
        if !self.askers.remove(profile) {
            return Err(self.not_pending(profile));
        }
        self.passengers.insert(profile.clone());
        Ok(())
    }

    /// drops a pending asker without seating them.
    pub fn decline_asker(&mut self, profile: &ProfileId) -> Result<(), RideMatchError> {
        if self.askers.remove(profile) {
            Ok(())
        } else {
            Err(self.not_pending(profile))
        }
    }

    /// seats a rider who accepted this offer from their own request. any
    /// pending ask from the same rider is resolved by the seat.
    pub fn seat_passenger(&mut self, profile: &ProfileId) -> Result<(), RideMatchError> {
        if *profile == self.driver {
            return Err(RideMatchError::OwnListing(profile.clone()));
        }
        if !self.passengers.insert(profile.clone()) {
            return Err(RideMatchError::AlreadyPassenger {
                profile: profile.clone(),
                offer: self.id.clone(),
            });
        }
        self.askers.remove(profile);
        Ok(())
    }

    /// removes a rider from both sets. returns true if they were present in either.
    pub fn remove_rider(&mut self, profile: &ProfileId) -> bool {
        let seated = self.passengers.remove(profile);
        let asked = self.askers.remove(profile);
        seated || asked
    }

    pub fn time(&self) -> String {
        date_codec::format_display_date(&self.date)
    }

    fn not_pending(&self, profile: &ProfileId) -> RideMatchError {
        RideMatchError::NotPending {
            profile: profile.clone(),
            listing: format!("ride offer '{}'", self.id),
        }
    }
}

impl std::fmt::Display for RideOffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "from {} to {} on {}", self.start, self.end, self.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridematch_core::spatial::GeoPoint;

    fn offer() -> RideOffer {
        let draft = OfferDraft {
            driver: ProfileId::from("driver"),
            start: Location::new(GeoPoint::new(41.293, -82.205), "Oberlin"),
            end: Location::new(GeoPoint::new(41.266, -82.223), "Kipton"),
            message: String::new(),
            date: NaiveDateTime::parse_from_str("2024-06-01 14:00", "%Y-%m-%d %H:%M")
                .expect("test invariant failed: date"),
            fuzziness: Fuzziness::OneHour,
            polygon: Some(RoutePolygon::empty()),
        };
        RideOffer::from_draft(OfferId::from("offer"), draft)
    }

    #[test]
    fn test_empty_polygon_is_dropped() {
        assert_eq!(offer().polygon, None);
        assert!(offer().route().is_none());
    }

    #[test]
    fn test_ask_accept_keeps_sets_disjoint() {
        let mut offer = offer();
        let rider = ProfileId::from("rider");
        assert!(offer.add_asker(&rider).expect("test invariant failed: ask"));
        assert!(!offer.add_asker(&rider).expect("test invariant failed: second ask"));
        offer.accept_asker(&rider).expect("test invariant failed: accept");
        assert!(offer.passengers.contains(&rider));
        assert!(!offer.askers.contains(&rider));
        assert!(matches!(
            offer.add_asker(&rider),
            Err(RideMatchError::AlreadyPassenger { .. })
        ));
        assert!(matches!(
            offer.accept_asker(&rider),
            Err(RideMatchError::NotPending { .. })
        ));
    }

    #[test]
    fn test_driver_cannot_ask_or_ride() {
        let mut offer = offer();
        let driver = offer.driver.clone();
        assert!(matches!(
            offer.add_asker(&driver),
            Err(RideMatchError::OwnListing(_))
        ));
        assert!(matches!(
            offer.seat_passenger(&driver),
            Err(RideMatchError::OwnListing(_))
        ));
    }

    #[test]
    fn test_seat_passenger_resolves_pending_ask() {
        let mut offer = offer();
        let rider = ProfileId::from("rider");
        offer.add_asker(&rider).expect("test invariant failed: ask");
        offer.seat_passenger(&rider).expect("test invariant failed: seat");
        assert!(offer.askers.is_empty());
        assert!(offer.remove_rider(&rider));
        assert!(!offer.remove_rider(&rider));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            offer().to_string(),
            "from Oberlin to Kipton on 06/01/2024 at 02:00 PM"
        );
    }
}
