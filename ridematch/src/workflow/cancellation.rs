use std::collections::BTreeSet;

use serde::Serialize;

use super::ensure_owner;
use crate::{
    model::{OfferId, ProfileId, RequestFilter, RequestId},
    store::{ListingStore, RequestQuery, StoreError},
    RideMatchError,
};

/// the outcome of cancelling a listing: who should hear about it and which
/// requests went back on the market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cancellation {
    pub reason: String,
    /// profiles tied to the cancelled listing, excluding its owner
    pub affected: BTreeSet<ProfileId>,
    pub reopened: Vec<RequestId>,
}

/// deletes an offer. every request matched to it is re-opened.
///
/// the offer is removed before its matches are collected. an acceptance that
/// seats a rider after the delete fails and releases its own claim, and one
/// that seated before it has its claim visible to the query below.
pub fn cancel_offer<S: ListingStore>(
    store: &S,
    offer_id: &OfferId,
    driver: &ProfileId,
    reason: &str,
) -> Result<Cancellation, RideMatchError> {
    let offer = store.get_offer(offer_id)?;
    ensure_owner(&offer.driver, driver, "cancel this ride offer")?;
    let offer = store.delete_offer(offer_id)?;

    let matched_to_offer = RequestFilter::MatchedTo(offer_id.clone());
    let matched =
        store.query_requests(&RequestQuery::new(None, None).with_filter(matched_to_offer))?;
    let mut reopened = vec![];
    for request in matched.iter() {
        let released =
            store.update_request(&request.id, |r| Ok::<_, RideMatchError>(r.release(offer_id)));
        match released {
            Ok(true) => reopened.push(request.id.clone()),
            Ok(false) => {}
            Err(RideMatchError::NotFound(_)) => log::debug!(
                "ride request '{}' was removed before it could be re-opened",
                request.id
            ),
            Err(e) => return Err(e),
        }
    }

    forget_listing(store, driver, |p| p.offers.retain(|id| id != offer_id))?;

    let affected: BTreeSet<ProfileId> = offer
        .passengers
        .iter()
        .chain(offer.askers.iter())
        .cloned()
        .collect();
    log::info!(
        "driver '{driver}' cancelled ride offer '{offer_id}' ({reason}); {} requests re-opened, {} profiles affected",
        reopened.len(),
        affected.len()
    );
    Ok(Cancellation {
        reason: reason.to_string(),
        affected,
        reopened,
    })
}

/// deletes a request. if it was matched, the passenger gives up their seat on the offer.
pub fn cancel_request<S: ListingStore>(
    store: &S,
    request_id: &RequestId,
    passenger: &ProfileId,
    reason: &str,
) -> Result<Cancellation, RideMatchError> {
    let request = store.get_request(request_id)?;
    ensure_owner(&request.passenger, passenger, "cancel this ride request")?;

    let mut affected: BTreeSet<ProfileId> = request.askers.iter().cloned().collect();
    if let Some(offer_id) = &request.ride_offer {
        let left = store.update_offer(offer_id, |o| {
            o.remove_rider(passenger);
            Ok::<_, RideMatchError>(o.driver.clone())
        });
        match left {
            Ok(driver) => {
                affected.insert(driver);
            }
            Err(RideMatchError::NotFound(_)) => {
                log::debug!("ride offer '{offer_id}' of request '{request_id}' no longer exists")
            }
            Err(e) => return Err(e),
        }
    }

    store.delete_request(request_id)?;
    forget_listing(store, passenger, |p| p.requests.retain(|id| id != request_id))?;
    log::info!(
        "passenger '{passenger}' cancelled ride request '{request_id}' ({reason}); {} profiles affected",
        affected.len()
    );
    Ok(Cancellation {
        reason: reason.to_string(),
        affected,
        reopened: vec![],
    })
}

/// drops a listing id from its owner's profile. a missing profile is tolerated.
fn forget_listing<S, F>(store: &S, owner: &ProfileId, op: F) -> Result<(), RideMatchError>
where
    S: ListingStore,
    F: FnOnce(&mut crate::model::UserProfile),
{
    match store.update_profile(owner, |p| {
        op(p);
        Ok::<_, StoreError>(())
    }) {
        Ok(()) => Ok(()),
        Err(StoreError::NotFound { .. }) => {
            log::warn!("profile '{owner}' not found while removing a cancelled listing");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
