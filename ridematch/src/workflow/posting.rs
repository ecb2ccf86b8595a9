use super::{check_message, ensure_owner};
use crate::{
    model::{OfferDraft, OfferId, ProfileId, RequestDraft, RequestId, RideOffer, RideRequest},
    search::MatchConfig,
    store::{ListingStore, StoreError},
    RideMatchError,
};

/// stores a new offer and records it on the driver's profile.
pub fn post_offer<S: ListingStore>(
    store: &S,
    draft: OfferDraft,
    config: &MatchConfig,
) -> Result<RideOffer, RideMatchError> {
    draft.start.position.validate()?;
    draft.end.position.validate()?;
    check_message(&draft.message, config)?;
    let driver = store.get_profile(&draft.driver)?;
    let offer = store.insert_offer(draft)?;
    store.update_profile(&driver.id, |p| -> Result<(), RideMatchError> {
        p.offers.push(offer.id.clone());
        Ok(())
    })?;
    log::info!("profile '{}' posted ride offer '{}' {}", driver.id, offer.id, offer);
    Ok(offer)
}

/// stores a new request and records it on the passenger's profile.
pub fn post_request<S: ListingStore>(
    store: &S,
    draft: RequestDraft,
    config: &MatchConfig,
) -> Result<RideRequest, RideMatchError> {
    draft.start.position.validate()?;
    draft.end.position.validate()?;
    check_message(&draft.message, config)?;
    let passenger = store.get_profile(&draft.passenger)?;
    let request = store.insert_request(draft)?;
    store.update_profile(&passenger.id, |p| -> Result<(), RideMatchError> {
        p.requests.push(request.id.clone());
        Ok(())
    })?;
    log::info!(
        "profile '{}' posted ride request '{}' {}",
        passenger.id,
        request.id,
        request
    );
    Ok(request)
}

/// removes an offer posted on behalf of a proposal that did not go through.
pub(super) fn withdraw_offer<S: ListingStore>(store: &S, offer_id: &OfferId, driver: &ProfileId) {
    let withdrawn = store.delete_offer(offer_id).and_then(|_| {
        store.update_profile(driver, |p| {
            p.offers.retain(|id| id != offer_id);
            Ok::<_, StoreError>(())
        })
    });
    match withdrawn {
        Ok(()) => log::debug!("withdrew ride offer '{offer_id}' of driver '{driver}'"),
        Err(e) => log::warn!("failed to withdraw ride offer '{offer_id}': {e}"),
    }
}

/// removes a request posted on behalf of an ask that did not go through.
pub(super) fn withdraw_request<S: ListingStore>(
    store: &S,
    request_id: &RequestId,
    passenger: &ProfileId,
) {
    let withdrawn = store.delete_request(request_id).and_then(|_| {
        store.update_profile(passenger, |p| {
            p.requests.retain(|id| id != request_id);
            Ok::<_, StoreError>(())
        })
    });
    match withdrawn {
        Ok(()) => log::debug!("withdrew ride request '{request_id}' of profile '{passenger}'"),
        Err(e) => log::warn!("failed to withdraw ride request '{request_id}': {e}"),
    }
}

pub fn update_offer_message<S: ListingStore>(
    store: &S,
    offer_id: &OfferId,
    driver: &ProfileId,
    message: &str,
    config: &MatchConfig,
) -> Result<RideOffer, RideMatchError> {
    check_message(message, config)?;
    let offer = store.update_offer(offer_id, |o| {
        ensure_owner(&o.driver, driver, "edit this ride offer")?;
        o.message = message.to_string();
        Ok::<_, RideMatchError>(o.clone())
    })?;
    log::info!("ride offer '{offer_id}' message updated");
    Ok(offer)
}

pub fn update_request_message<S: ListingStore>(
    store: &S,
    request_id: &RequestId,
    passenger: &ProfileId,
    message: &str,
    config: &MatchConfig,
) -> Result<RideRequest, RideMatchError> {
    check_message(message, config)?;
    let request = store.update_request(request_id, |r| {
        ensure_owner(&r.passenger, passenger, "edit this ride request")?;
        r.message = message.to_string();
        Ok::<_, RideMatchError>(r.clone())
    })?;
    log::info!("ride request '{request_id}' message updated");
    Ok(request)
}
