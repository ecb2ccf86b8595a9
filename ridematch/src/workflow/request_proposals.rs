use ridematch_core::temporal::dates_match;

use super::{acceptance::accept_match, ensure_owner, post_offer, posting::withdraw_offer, Answer};
use crate::{
    model::{OfferDraft, OfferFilter, OfferId, ProfileId, RequestId, RideOffer, RideRequest},
    search::MatchConfig,
    store::{ListingStore, OfferQuery},
    RideMatchError,
};

/// a driver proposes a ride to a request.
///
/// the proposal is backed by one of the driver's offers: either the one given,
/// an existing offer for the same trip, or a new offer copied from the
/// request's route and time.
///
/// # Returns
///
/// * the id of the offer backing the proposal
pub fn offer_ride<S: ListingStore>(
    store: &S,
    request_id: &RequestId,
    driver: &ProfileId,
    offer_id: Option<&OfferId>,
    config: &MatchConfig,
) -> Result<OfferId, RideMatchError> {
    let request = store.get_request(request_id)?;
    if request.passenger == *driver {
        return Err(RideMatchError::OwnListing(driver.clone()));
    }
    if !request.is_open() {
        return Err(RideMatchError::AlreadyMatched(request_id.clone()));
    }
    store.get_profile(driver)?;

    let (offer_id, posted) = match offer_id {
        Some(id) => {
            let offer = store.get_offer(id)?;
            ensure_owner(&offer.driver, driver, "offer a ride with this offer")?;
            if offer.passengers.contains(&request.passenger) {
                return Err(RideMatchError::AlreadyPassenger {
                    profile: request.passenger.clone(),
                    offer: id.clone(),
                });
            }
            (id.clone(), false)
        }
        None => match find_offer(store, &request, driver, config)? {
            Some(existing) => (existing.id, false),
            None => {
                let draft = OfferDraft {
                    driver: driver.clone(),
                    start: request.start.clone(),
                    end: request.end.clone(),
                    message: String::new(),
                    date: request.date,
                    fuzziness: request.fuzziness,
                    polygon: None,
                };
                (post_offer(store, draft, config)?.id, true)
            }
        },
    };

    let added = match store.update_request(request_id, |r| r.add_asker(driver)) {
        Ok(added) => added,
        Err(e) => {
            if posted {
                withdraw_offer(store, &offer_id, driver);
            }
            return Err(e);
        }
    };
    if added {
        log::info!("driver '{driver}' offered ride offer '{offer_id}' to request '{request_id}'");
    } else {
        log::debug!("driver '{driver}' already offered a ride to request '{request_id}'");
    }
    Ok(offer_id)
}

/// the passenger answers a driver's proposal. accepting matches the request to
/// `offer_id` and seats the passenger; declining drops the proposal.
pub fn answer_ride_offer<S: ListingStore>(
    store: &S,
    request_id: &RequestId,
    passenger: &ProfileId,
    driver: &ProfileId,
    offer_id: &OfferId,
    answer: Answer,
) -> Result<RideRequest, RideMatchError> {
    let request = store.get_request(request_id)?;
    ensure_owner(&request.passenger, passenger, "answer proposals on this ride request")?;
    let offer = store.get_offer(offer_id)?;
    ensure_owner(&offer.driver, driver, "propose this ride offer")?;
    match answer {
        Answer::Accept => {
            let (request, _) = accept_match(
                store,
                request_id,
                offer_id,
                driver,
                |r| {
                    if r.askers.contains(driver) {
                        Ok(())
                    } else {
                        Err(RideMatchError::NotPending {
                            profile: driver.clone(),
                            listing: format!("ride request '{request_id}'"),
                        })
                    }
                },
                |o| o.seat_passenger(passenger),
            )?;
            log::info!(
                "passenger '{passenger}' accepted ride offer '{offer_id}' from '{driver}' for request '{request_id}'"
            );
            Ok(request)
        }
        Answer::Decline => {
            let request = store.update_request(request_id, |r| {
                r.decline_asker(driver)?;
                Ok::<_, RideMatchError>(r.clone())
            })?;
            log::info!(
                "passenger '{passenger}' declined '{driver}' on ride request '{request_id}'"
            );
            Ok(request)
        }
    }
}

/// an uncompleted offer of `driver` describing the same trip as `request`, if one exists.
fn find_offer<S: ListingStore>(
    store: &S,
    request: &RideRequest,
    driver: &ProfileId,
    config: &MatchConfig,
) -> Result<Option<RideOffer>, RideMatchError> {
    let query = OfferQuery::new(None)
        .with_filter(OfferFilter::Driver(driver.clone()))
        .with_filter(OfferFilter::Completed(false));
    let found = store.query_offers(&query)?.into_iter().find(|o| {
        o.start.same_place_within(&request.start, config.same_place_km)
            && o.end.same_place_within(&request.end, config.same_place_km)
            && dates_match(&request.date, request.fuzziness, &o.date, o.fuzziness)
            && !o.passengers.contains(&request.passenger)
    });
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::InMemoryListingStore, workflow::test_support::*};

    #[test]
    fn test_offer_ride_creates_offer_when_none_given() {
        let store = store();
        let conf = MatchConfig::default();
        let request = posted_request(&store, "rider");
        let offer_id = offer_ride(&store, &request.id, &id("driver"), None, &conf)
            .expect("test invariant failed: offer ride");
        let offer = store.get_offer(&offer_id).expect("test invariant failed: offer");
        assert_eq!(offer.driver, id("driver"));
        assert_eq!(offer.date, request.date);
        let request = store.get_request(&request.id).expect("test invariant failed: request");
        assert!(request.askers.contains(&id("driver")));
    }

    #[test]
    fn test_offer_ride_reuses_existing_offer() {
        let store = store();
        let conf = MatchConfig::default();
        let existing = posted_offer(&store, "driver");
        let request = posted_request(&store, "rider");
        let offer_id = offer_ride(&store, &request.id, &id("driver"), None, &conf)
            .expect("test invariant failed: offer ride");
        assert_eq!(offer_id, existing.id);
    }

    #[test]
    fn test_offer_ride_rejections() {
        let store = store();
        let conf = MatchConfig::default();
        let request = posted_request(&store, "rider");
        assert!(matches!(
            offer_ride(&store, &request.id, &id("rider"), None, &conf),
            Err(RideMatchError::OwnListing(_))
        ));
        let others = posted_offer(&store, "other");
        assert!(matches!(
            offer_ride(&store, &request.id, &id("driver"), Some(&others.id), &conf),
            Err(RideMatchError::NotPermitted { .. })
        ));
    }

    #[test]
    fn test_accept_ride_offer() {
        let store = store();
        let conf = MatchConfig::default();
        let request = posted_request(&store, "rider");
        let offer_id = offer_ride(&store, &request.id, &id("driver"), None, &conf)
            .expect("test invariant failed: offer ride");
        let request = answer_ride_offer(
            &store,
            &request.id,
            &id("rider"),
            &id("driver"),
            &offer_id,
            Answer::Accept,
        )
        .expect("test invariant failed: accept");
        assert_eq!(request.ride_offer, Some(offer_id.clone()));
        assert!(request.askers.is_empty());
        let offer = store.get_offer(&offer_id).expect("test invariant failed: offer");
        assert!(offer.passengers.contains(&id("rider")));
        assert!(offer.askers.is_empty());

        assert!(matches!(
            offer_ride(&store, &request.id, &id("other"), None, &conf),
            Err(RideMatchError::AlreadyMatched(_))
        ));
    }

    #[test]
    fn test_accept_clears_pending_ask_on_offer() {
        let store = store();
        let conf = MatchConfig::default();
        let offer = posted_offer(&store, "driver");
        let request_id = super::super::ask_for_ride(&store, &offer.id, &id("rider"), None, &conf)
            .expect("test invariant failed: ask");
        offer_ride(&store, &request_id, &id("driver"), Some(&offer.id), &conf)
            .expect("test invariant failed: offer ride");
        answer_ride_offer(
            &store,
            &request_id,
            &id("rider"),
            &id("driver"),
            &offer.id,
            Answer::Accept,
        )
        .expect("test invariant failed: accept");
        let offer = store.get_offer(&offer.id).expect("test invariant failed: offer");
        assert!(offer.passengers.contains(&id("rider")));
        assert!(offer.askers.is_empty());
    }

    #[test]
    fn test_decline_ride_offer() {
        let store = store();
        let conf = MatchConfig::default();
        let request = posted_request(&store, "rider");
        let offer_id = offer_ride(&store, &request.id, &id("driver"), None, &conf)
            .expect("test invariant failed: offer ride");
        assert!(matches!(
            answer_ride_offer(
                &store,
                &request.id,
                &id("other"),
                &id("driver"),
                &offer_id,
                Answer::Decline
            ),
            Err(RideMatchError::NotPermitted { .. })
        ));
        let request = answer_ride_offer(
            &store,
            &request.id,
            &id("rider"),
            &id("driver"),
            &offer_id,
            Answer::Decline,
        )
        .expect("test invariant failed: decline");
        assert!(request.askers.is_empty());
        assert!(request.is_open());
        assert!(matches!(
            answer_ride_offer(
                &store,
                &request.id,
                &id("rider"),
                &id("driver"),
                &offer_id,
                Answer::Accept
            ),
            Err(RideMatchError::NotPending { .. })
        ));
    }

    #[test]
    fn test_failed_proposal_withdraws_the_offer_it_posted() {
        let inner = store();
        let request = posted_request(&inner, "rider");
        let request_id = request.id.clone();
        // another driver is accepted between posting the offer and proposing it
        let store = InterferingStore {
            inner,
            interfere: move |s: &InMemoryListingStore| {
                let _ = s.update_request(&request_id, |r| {
                    r.claim(&OfferId::from("elsewhere"), &ProfileId::from("other"))
                });
            },
        };
        let result = offer_ride(&store, &request.id, &id("driver"), None, &MatchConfig::default());
        assert!(matches!(result, Err(RideMatchError::AlreadyMatched(_))));
        let driver = store.get_profile(&id("driver")).expect("test invariant failed: driver");
        assert!(driver.offers.is_empty());
        let offers = store
            .query_offers(&OfferQuery::new(None))
            .expect("test invariant failed: query");
        assert!(offers.is_empty());
    }
}

