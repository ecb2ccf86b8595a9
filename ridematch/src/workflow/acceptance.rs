use crate::{
    model::{OfferId, ProfileId, RequestId, RideOffer, RideRequest},
    store::ListingStore,
    RideMatchError,
};

/// pairs a request with an offer.
///
/// the request is claimed first with a check-and-set on `ride_offer`, which is
/// what limits a request to one acceptance. `seat` then updates the offer. if
/// that fails, the claim is released and the request is restored to what it
/// was before.
pub(super) fn accept_match<S, F, G>(
    store: &S,
    request_id: &RequestId,
    offer_id: &OfferId,
    driver: &ProfileId,
    check_request: G,
    seat: F,
) -> Result<(RideRequest, RideOffer), RideMatchError>
where
    S: ListingStore,
    F: FnOnce(&mut RideOffer) -> Result<(), RideMatchError>,
    G: FnOnce(&RideRequest) -> Result<(), RideMatchError>,
{
    let (before, claimed) = store.update_request(request_id, |r| {
        check_request(r)?;
        let before = r.clone();
        r.claim(offer_id, driver)?;
        Ok::<_, RideMatchError>((before, r.clone()))
    })?;
    let seated = store.update_offer(offer_id, |o| {
        seat(o)?;
        Ok::<_, RideMatchError>(o.clone())
    });
    match seated {
        Ok(offer) => Ok((claimed, offer)),
        Err(e) => {
            let rollback = store.update_request(request_id, |r| {
                if r.release(offer_id) {
                    r.askers = before.askers.clone();
                }
                Ok::<_, RideMatchError>(())
            });
            if let Err(rollback_error) = rollback {
                log::warn!(
                    "failed to release claim of ride request '{request_id}' on offer '{offer_id}': {rollback_error}"
                );
            }
            Err(e)
        }
    }
}
