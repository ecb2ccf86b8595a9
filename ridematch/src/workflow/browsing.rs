use chrono::NaiveDateTime;
use ridematch_core::temporal::DateWindow;
use serde::Serialize;

use crate::{
    model::{OfferFilter, OfferId, RequestFilter, RequestId, RideOffer, RideRequest},
    search::{search_offers, search_requests, MatchConfig, OfferSearch, RequestSearch},
    store::{ListingStore, OfferQuery, RequestQuery},
    RideMatchError,
};

/// the listings still on the market.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listings {
    pub offers: Vec<RideOffer>,
    pub requests: Vec<RideRequest>,
}

/// upcoming offers that have not been completed and upcoming requests that
/// have not been matched, as of `now`.
pub fn browse<S: ListingStore>(store: &S, now: &NaiveDateTime) -> Result<Listings, RideMatchError> {
    let upcoming = DateWindow::new(*now, NaiveDateTime::MAX);
    let offers = store
        .query_offers(&OfferQuery::new(Some(upcoming)).with_filter(OfferFilter::Completed(false)))?;
    let requests = store
        .query_requests(&RequestQuery::new(None, Some(upcoming)).with_filter(RequestFilter::Open))?;
    log::debug!(
        "browse at {now}: {} offers, {} requests",
        offers.len(),
        requests.len()
    );
    Ok(Listings { offers, requests })
}

pub fn show_offer<S: ListingStore>(store: &S, id: &OfferId) -> Result<RideOffer, RideMatchError> {
    Ok(store.get_offer(id)?)
}

pub fn show_request<S: ListingStore>(
    store: &S,
    id: &RequestId,
) -> Result<RideRequest, RideMatchError> {
    Ok(store.get_request(id)?)
}

/// offers a stored request could ride with, for display next to the request.
pub fn offers_for_request<S: ListingStore>(
    store: &S,
    request_id: &RequestId,
    config: &MatchConfig,
) -> Result<Vec<RideOffer>, RideMatchError> {
    let request = store.get_request(request_id)?;
    let search = OfferSearch::for_request(&request)?.with_filter(OfferFilter::Completed(false));
    search_offers(store, &search, config)
}

/// open requests along a stored offer's corridor. an offer without a corridor has none.
pub fn requests_for_offer<S: ListingStore>(
    store: &S,
    offer_id: &OfferId,
) -> Result<Vec<RideRequest>, RideMatchError> {
    let offer = store.get_offer(offer_id)?;
    match RequestSearch::for_offer(&offer) {
        Some(search) => search_requests(store, &search),
        None => Ok(vec![]),
    }
}
