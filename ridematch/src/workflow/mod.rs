//! the ride negotiation workflows: posting listings, proposing and answering
//! rides from either side, cancelling, and exchanging feedback.
//!
//! every workflow runs against a [`crate::store::ListingStore`]. multi-listing
//! changes go through single-listing atomic updates, with the request claimed
//! first so that a request can be accepted at most once.
mod acceptance;
mod browsing;
mod cancellation;
mod feedback;
mod offer_proposals;
mod posting;
mod request_proposals;

pub use browsing::{
    browse, offers_for_request, requests_for_offer, show_offer, show_request, Listings,
};
pub use cancellation::{cancel_offer, cancel_request, Cancellation};
pub use feedback::{driver_feedback, rider_feedback};
pub use offer_proposals::{answer_ride_ask, ask_for_ride};
pub use posting::{post_offer, post_request, update_offer_message, update_request_message};
pub use request_proposals::{answer_ride_offer, offer_ride};

use serde::{Deserialize, Serialize};

use crate::{model::ProfileId, search::MatchConfig, RideMatchError};

/// a listing owner's answer to a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Accept,
    Decline,
}

fn check_message(message: &str, config: &MatchConfig) -> Result<(), RideMatchError> {
    let len = message.chars().count();
    if len > config.message_max_len {
        Err(RideMatchError::MessageTooLong {
            len,
            max: config.message_max_len,
        })
    } else {
        Ok(())
    }
}

fn ensure_owner(
    owner: &ProfileId,
    profile: &ProfileId,
    action: &'static str,
) -> Result<(), RideMatchError> {
    if owner == profile {
        Ok(())
    } else {
        Err(RideMatchError::NotPermitted {
            profile: profile.clone(),
            action,
        })
    }
}
