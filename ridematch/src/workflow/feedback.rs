use super::{check_message, ensure_owner};
use crate::{
    model::{OfferId, ProfileId, RequestId, RideOffer, Trust},
    search::MatchConfig,
    store::ListingStore,
    RideMatchError,
};

/// the driver reviews their passengers after the trip. the offer is marked
/// completed and each review is recorded as trust on the passenger's profile.
///
/// # Arguments
///
/// * `reviews` - `(passenger, message)` pairs; every passenger must have been seated
pub fn driver_feedback<S: ListingStore>(
    store: &S,
    offer_id: &OfferId,
    driver: &ProfileId,
    reviews: &[(ProfileId, String)],
    config: &MatchConfig,
) -> Result<RideOffer, RideMatchError> {
    let offer = store.get_offer(offer_id)?;
    ensure_owner(&offer.driver, driver, "leave feedback on this ride offer")?;
    for (passenger, message) in reviews.iter() {
        if !offer.passengers.contains(passenger) {
            return Err(RideMatchError::NotPermitted {
                profile: passenger.clone(),
                action: "receive feedback for a ride they did not take",
            });
        }
        check_message(message, config)?;
    }

    let offer = store.update_offer(offer_id, |o| {
        o.completed = true;
        Ok::<_, RideMatchError>(o.clone())
    })?;
    for (passenger, message) in reviews.iter() {
        let trust = Trust {
            truster: driver.clone(),
            offer: offer_id.clone(),
            message: message.clone(),
        };
        store.update_profile(passenger, |p| -> Result<(), RideMatchError> {
            p.trust.push(trust);
            Ok(())
        })?;
    }
    log::info!(
        "driver '{driver}' completed ride offer '{offer_id}' with {} reviews",
        reviews.len()
    );
    Ok(offer)
}

/// the passenger reviews the driver of the offer their request was matched to.
pub fn rider_feedback<S: ListingStore>(
    store: &S,
    request_id: &RequestId,
    passenger: &ProfileId,
    message: &str,
    config: &MatchConfig,
) -> Result<Trust, RideMatchError> {
    check_message(message, config)?;
    let request = store.get_request(request_id)?;
    ensure_owner(&request.passenger, passenger, "leave feedback on this ride request")?;
    let offer_id = request
        .ride_offer
        .ok_or_else(|| RideMatchError::NotMatched(request_id.clone()))?;
    let offer = store.get_offer(&offer_id)?;
    let trust = Trust {
        truster: passenger.clone(),
        offer: offer_id,
        message: message.to_string(),
    };
    store.update_profile(&offer.driver, |p| -> Result<(), RideMatchError> {
        p.trust.push(trust.clone());
        Ok(())
    })?;
    log::info!("passenger '{passenger}' reviewed driver '{}'", offer.driver);
    Ok(trust)
}
