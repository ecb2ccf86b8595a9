use ridematch_core::temporal::dates_match;

use super::{
    acceptance::accept_match, ensure_owner, post_request, posting::withdraw_request, Answer,
};
use crate::{
    model::{OfferId, ProfileId, RequestDraft, RequestFilter, RequestId, RideOffer, RideRequest},
    search::MatchConfig,
    store::{ListingStore, RequestQuery},
    RideMatchError,
};

/// a passenger asks to join an offer.
///
/// the ask is backed by one of the passenger's open requests: either the one
/// given, an existing open request for the same trip, or a new request copied
/// from the offer's route and time.
///
/// # Returns
///
/// * the id of the request backing the ask
pub fn ask_for_ride<S: ListingStore>(
    store: &S,
    offer_id: &OfferId,
    passenger: &ProfileId,
    request_id: Option<&RequestId>,
    config: &MatchConfig,
) -> Result<RequestId, RideMatchError> {
    let offer = store.get_offer(offer_id)?;
    if offer.driver == *passenger {
        return Err(RideMatchError::OwnListing(passenger.clone()));
    }
    if offer.passengers.contains(passenger) {
        return Err(RideMatchError::AlreadyPassenger {
            profile: passenger.clone(),
            offer: offer_id.clone(),
        });
    }
    store.get_profile(passenger)?;

    let (request_id, posted) = match request_id {
        Some(id) => {
            let request = store.get_request(id)?;
            ensure_owner(&request.passenger, passenger, "ask for a ride with this request")?;
            if !request.is_open() {
                return Err(RideMatchError::AlreadyMatched(id.clone()));
            }
            (id.clone(), false)
        }
        None => match find_open_request(store, &offer, passenger, config)? {
            Some(existing) => (existing.id, false),
            None => {
                let draft = RequestDraft {
                    passenger: passenger.clone(),
                    start: offer.start.clone(),
                    end: offer.end.clone(),
                    message: String::new(),
                    date: offer.date,
                    fuzziness: offer.fuzziness,
                };
                (post_request(store, draft, config)?.id, true)
            }
        },
    };

    let added = match store.update_offer(offer_id, |o| o.add_asker(passenger)) {
        Ok(added) => added,
        Err(e) => {
            if posted {
                withdraw_request(store, &request_id, passenger);
            }
            return Err(e);
        }
    };
    if added {
        log::info!(
            "profile '{passenger}' asked to join ride offer '{offer_id}' with request '{request_id}'"
        );
    } else {
        log::debug!("profile '{passenger}' already asked to join ride offer '{offer_id}'");
    }
    Ok(request_id)
}

/// the driver answers a pending ask. accepting matches `request_id` to the
/// offer and seats the asker; declining drops the ask.
pub fn answer_ride_ask<S: ListingStore>(
    store: &S,
    offer_id: &OfferId,
    driver: &ProfileId,
    asker: &ProfileId,
    request_id: &RequestId,
    answer: Answer,
) -> Result<RideOffer, RideMatchError> {
    let offer = store.get_offer(offer_id)?;
    ensure_owner(&offer.driver, driver, "answer asks on this ride offer")?;
    if !offer.askers.contains(asker) {
        return Err(RideMatchError::NotPending {
            profile: asker.clone(),
            listing: format!("ride offer '{offer_id}'"),
        });
    }
    match answer {
        Answer::Accept => {
            let (_, offer) = accept_match(
                store,
                request_id,
                offer_id,
                driver,
                |r| ensure_owner(&r.passenger, asker, "ride with this request"),
                |o| o.accept_asker(asker),
            )?;
            log::info!(
                "driver '{driver}' accepted '{asker}' on ride offer '{offer_id}' for request '{request_id}'"
            );
            Ok(offer)
        }
        Answer::Decline => {
            let offer = store.update_offer(offer_id, |o| {
                o.decline_asker(asker)?;
                Ok::<_, RideMatchError>(o.clone())
            })?;
            log::info!("driver '{driver}' declined '{asker}' on ride offer '{offer_id}'");
            Ok(offer)
        }
    }
}

/// an open request of `passenger` describing the same trip as `offer`, if one exists.
fn find_open_request<S: ListingStore>(
    store: &S,
    offer: &RideOffer,
    passenger: &ProfileId,
    config: &MatchConfig,
) -> Result<Option<RideRequest>, RideMatchError> {
    let query = RequestQuery::new(None, None)
        .with_filter(RequestFilter::Passenger(passenger.clone()))
        .with_filter(RequestFilter::Open);
    let found = store.query_requests(&query)?.into_iter().find(|r| {
        r.start.same_place_within(&offer.start, config.same_place_km)
            && r.end.same_place_within(&offer.end, config.same_place_km)
            && dates_match(&r.date, r.fuzziness, &offer.date, offer.fuzziness)
    });
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::InMemoryListingStore, workflow::test_support::*};

    #[test]
    fn test_ask_creates_request_when_none_given() {
        let store = store();
        let conf = MatchConfig::default();
        let offer = posted_offer(&store, "driver");
        let request_id = ask_for_ride(&store, &offer.id, &id("rider"), None, &conf)
            .expect("test invariant failed: ask");
        let request = store.get_request(&request_id).expect("test invariant failed: request");
        assert_eq!(request.passenger, id("rider"));
        assert!(request.start.same_place(&offer.start));
        assert_eq!(request.date, offer.date);
        let offer = store.get_offer(&offer.id).expect("test invariant failed: offer");
        assert!(offer.askers.contains(&id("rider")));
    }

    #[test]
    fn test_ask_reuses_matching_open_request() {
        let store = store();
        let conf = MatchConfig::default();
        let offer = posted_offer(&store, "driver");
        let existing = posted_request(&store, "rider");
        let request_id = ask_for_ride(&store, &offer.id, &id("rider"), None, &conf)
            .expect("test invariant failed: ask");
        assert_eq!(request_id, existing.id);
        let rider = store.get_profile(&id("rider")).expect("test invariant failed: rider");
        assert_eq!(rider.requests.len(), 1);
    }

    #[test]
    fn test_ask_rejections() {
        let store = store();
        let conf = MatchConfig::default();
        let offer = posted_offer(&store, "driver");
        assert!(matches!(
            ask_for_ride(&store, &offer.id, &id("driver"), None, &conf),
            Err(RideMatchError::OwnListing(_))
        ));
        let others = posted_request(&store, "other");
        assert!(matches!(
            ask_for_ride(&store, &offer.id, &id("rider"), Some(&others.id), &conf),
            Err(RideMatchError::NotPermitted { .. })
        ));
        assert!(matches!(
            ask_for_ride(&store, &OfferId::from("missing"), &id("rider"), None, &conf),
            Err(RideMatchError::NotFound(_))
        ));
    }

    #[test]
    fn test_accept_moves_asker_to_passengers() {
        let store = store();
        let conf = MatchConfig::default();
        let offer = posted_offer(&store, "driver");
        let request_id = ask_for_ride(&store, &offer.id, &id("rider"), None, &conf)
            .expect("test invariant failed: ask");
        let offer = answer_ride_ask(
            &store,
            &offer.id,
            &id("driver"),
            &id("rider"),
            &request_id,
            Answer::Accept,
        )
        .expect("test invariant failed: accept");
        assert!(offer.passengers.contains(&id("rider")));
        assert!(offer.askers.is_empty());
        let request = store.get_request(&request_id).expect("test invariant failed: request");
        assert_eq!(request.ride_offer, Some(offer.id.clone()));

        // a second ask is refused and a second accept finds nothing pending
        assert!(matches!(
            ask_for_ride(&store, &offer.id, &id("rider"), None, &conf),
            Err(RideMatchError::AlreadyPassenger { .. })
        ));
        assert!(matches!(
            answer_ride_ask(
                &store,
                &offer.id,
                &id("driver"),
                &id("rider"),
                &request_id,
                Answer::Accept
            ),
            Err(RideMatchError::NotPending { .. })
        ));
    }

    #[test]
    fn test_accept_of_matched_request_fails() {
        let store = store();
        let conf = MatchConfig::default();
        let first = posted_offer(&store, "driver");
        let second = posted_offer(&store, "other");
        let request_id = ask_for_ride(&store, &first.id, &id("rider"), None, &conf)
            .expect("test invariant failed: ask first");
        ask_for_ride(&store, &second.id, &id("rider"), Some(&request_id), &conf)
            .expect("test invariant failed: ask second");
        answer_ride_ask(&store, &first.id, &id("driver"), &id("rider"), &request_id, Answer::Accept)
            .expect("test invariant failed: accept first");
        let result = answer_ride_ask(
            &store,
            &second.id,
            &id("other"),
            &id("rider"),
            &request_id,
            Answer::Accept,
        );
        assert!(matches!(result, Err(RideMatchError::AlreadyMatched(_))));
        let second = store.get_offer(&second.id).expect("test invariant failed: offer");
        assert!(second.passengers.is_empty());
        assert!(second.askers.contains(&id("rider")));
    }

    #[test]
    fn test_decline_and_permissions() {
        let store = store();
        let conf = MatchConfig::default();
        let offer = posted_offer(&store, "driver");
        let request_id = ask_for_ride(&store, &offer.id, &id("rider"), None, &conf)
            .expect("test invariant failed: ask");
        assert!(matches!(
            answer_ride_ask(
                &store,
                &offer.id,
                &id("other"),
                &id("rider"),
                &request_id,
                Answer::Accept
            ),
            Err(RideMatchError::NotPermitted { .. })
        ));
        let offer = answer_ride_ask(
            &store,
            &offer.id,
            &id("driver"),
            &id("rider"),
            &request_id,
            Answer::Decline,
        )
        .expect("test invariant failed: decline");
        assert!(offer.askers.is_empty());
        assert!(offer.passengers.is_empty());
        let request = store.get_request(&request_id).expect("test invariant failed: request");
        assert!(request.is_open());
    }

    #[test]
    fn test_failed_seat_rolls_back_claim() {
        let store = store();
        let offer = posted_offer(&store, "driver");
        let request = posted_request(&store, "other");
        store
            .update_request(&request.id, |r| r.add_asker(&id("driver")))
            .expect("test invariant failed: propose");
        // `other` never asked to join, so seating them fails after the claim
        let result = accept_match(
            &store,
            &request.id,
            &offer.id,
            &id("driver"),
            |_| Ok(()),
            |o| o.accept_asker(&id("other")),
        );
        assert!(matches!(result, Err(RideMatchError::NotPending { .. })));
        let request = store.get_request(&request.id).expect("test invariant failed: request");
        assert!(request.is_open());
        assert!(request.askers.contains(&id("driver")));
    }

    #[test]
    fn test_failed_ask_withdraws_the_request_it_posted() {
        let inner = store();
        let offer = posted_offer(&inner, "driver");
        let offer_id = offer.id.clone();
        let store = InterferingStore {
            inner,
            interfere: move |s: &InMemoryListingStore| {
                let _ = s.delete_offer(&offer_id);
            },
        };
        let result = ask_for_ride(&store, &offer.id, &id("rider"), None, &MatchConfig::default());
        assert!(matches!(result, Err(RideMatchError::NotFound(_))));
        let rider = store.get_profile(&id("rider")).expect("test invariant failed: rider");
        assert!(rider.requests.is_empty());
        let requests = store
            .query_requests(&RequestQuery::new(None, None))
            .expect("test invariant failed: query");
        assert!(requests.is_empty());
    }
}

