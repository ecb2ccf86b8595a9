use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use ridematch_core::{
    spatial::Location,
    temporal::{date_codec, Fuzziness},
};
use serde::{Deserialize, Serialize};

use super::{OfferId, ProfileId, RequestId};
use crate::RideMatchError;

/// the fields a passenger supplies when posting a request. the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub passenger: ProfileId,
    pub start: Location,
    pub end: Location,
    #[serde(default)]
    pub message: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub fuzziness: Fuzziness,
}

/// a passenger's posted need for a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RequestId,
    pub passenger: ProfileId,
    pub start: Location,
    pub end: Location,
    #[serde(default)]
    pub message: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub fuzziness: Fuzziness,
    /// drivers who proposed an offer and are waiting on the passenger
    #[serde(default)]
    pub askers: BTreeSet<ProfileId>,
    /// the accepted offer; set once the request is matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ride_offer: Option<OfferId>,
}

impl RideRequest {
    pub fn from_draft(id: RequestId, draft: RequestDraft) -> RideRequest {
        RideRequest {
            id,
            passenger: draft.passenger,
            start: draft.start,
            end: draft.end,
            message: draft.message,
            date: draft.date,
            fuzziness: draft.fuzziness,
            askers: BTreeSet::new(),
            ride_offer: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ride_offer.is_none()
    }

    /// records that `driver` proposed a ride. returns false if the proposal
    /// was already pending.
    pub fn add_asker(&mut self, driver: &ProfileId) -> Result<bool, RideMatchError> {
        if *driver == self.passenger {
            return Err(RideMatchError::OwnListing(driver.clone()));
        }
        self.ensure_open()?;
        Ok(self.askers.insert(driver.clone()))
    }

    pub fn decline_asker(&mut self, driver: &ProfileId) -> Result<(), RideMatchError> {
        if self.askers.remove(driver) {
            Ok(())
        } else {
            Err(RideMatchError::NotPending {
                profile: driver.clone(),
                listing: format!("ride request '{}'", self.id),
            })
        }
    }

    /// check-and-set of the accepted offer. fails if the request is already
    /// matched, so at most one acceptance can ever succeed. the accepting
    /// driver's pending proposal, if any, is cleared.
    pub fn claim(&mut self, offer: &OfferId, driver: &ProfileId) -> Result<(), RideMatchError> {
        self.ensure_open()?;
        self.ride_offer = Some(offer.clone());
        self.askers.remove(driver);
        Ok(())
    }

    /// undoes a claim made for `offer`. a no-op if the request is matched elsewhere.
    pub fn release(&mut self, offer: &OfferId) -> bool {
        if self.ride_offer.as_ref() == Some(offer) {
            self.ride_offer = None;
            true
        } else {
            false
        }
    }

    pub fn time(&self) -> String {
        date_codec::format_display_date(&self.date)
    }

    fn ensure_open(&self) -> Result<(), RideMatchError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(RideMatchError::AlreadyMatched(self.id.clone()))
        }
    }
}

impl std::fmt::Display for RideRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "from {} to {} on {}", self.start, self.end, self.time())
    }
}
