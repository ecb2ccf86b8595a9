use ridematch_core::{spatial::RoutePolygon, temporal::DateWindow};

use super::StoreError;
use crate::model::{
    OfferDraft, OfferFilter, OfferId, ProfileId, RequestDraft, RequestFilter, RequestId,
    RideOffer, RideRequest, UserProfile,
};

/// selects stored offers by departure window and filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferQuery {
    /// inclusive window on `date`. `None` does not restrict by time.
    pub date_window: Option<DateWindow>,
    pub filters: Vec<OfferFilter>,
}

impl OfferQuery {
    pub fn new(date_window: Option<DateWindow>) -> OfferQuery {
        OfferQuery {
            date_window,
            filters: vec![],
        }
    }

    pub fn with_filter(mut self, filter: OfferFilter) -> OfferQuery {
        self.filters.push(filter);
        self
    }

    pub fn accepts(&self, offer: &RideOffer) -> bool {
        let in_window = self
            .date_window
            .map(|w| w.contains(&offer.date))
            .unwrap_or(true);
        in_window && self.filters.iter().all(|f| f.accepts(offer))
    }
}

/// selects stored requests by start region, departure window and filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQuery {
    /// the request's start position must lie in this polygon (boundary inclusive)
    pub start_within: Option<RoutePolygon>,
    pub date_window: Option<DateWindow>,
    pub filters: Vec<RequestFilter>,
}

impl RequestQuery {
    pub fn new(
        start_within: Option<RoutePolygon>,
        date_window: Option<DateWindow>,
    ) -> RequestQuery {
        RequestQuery {
            start_within,
            date_window,
            filters: vec![],
        }
    }

    pub fn with_filter(mut self, filter: RequestFilter) -> RequestQuery {
        self.filters.push(filter);
        self
    }

    pub fn accepts(&self, request: &RideRequest) -> bool {
        let in_region = self
            .start_within
            .as_ref()
            .map(|p| p.contains(&request.start.position))
            .unwrap_or(true);
        let in_window = self
            .date_window
            .map(|w| w.contains(&request.date))
            .unwrap_or(true);
        in_region && in_window && self.filters.iter().all(|f| f.accepts(request))
    }
}

/// storage for profiles and the two listing types.
///
/// the `update_*` operations are the unit of atomicity: the closure receives a
/// working copy of a single record, which replaces the stored record only when
/// the closure returns `Ok`. implementations must serialize updates so that a
/// check-and-set inside a closure cannot race with another update.
pub trait ListingStore: Send + Sync {
    fn insert_profile(&self, profile: UserProfile) -> Result<(), StoreError>;
    fn get_profile(&self, id: &ProfileId) -> Result<UserProfile, StoreError>;
    fn update_profile<T, E, F>(&self, id: &ProfileId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut UserProfile) -> Result<T, E>,
        E: From<StoreError>;

    /// stores a new offer under a freshly assigned id.
    fn insert_offer(&self, draft: OfferDraft) -> Result<RideOffer, StoreError>;
    fn get_offer(&self, id: &OfferId) -> Result<RideOffer, StoreError>;
    fn update_offer<T, E, F>(&self, id: &OfferId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut RideOffer) -> Result<T, E>,
        E: From<StoreError>;
    /// removes an offer, returning the removed record.
    fn delete_offer(&self, id: &OfferId) -> Result<RideOffer, StoreError>;
    fn query_offers(&self, query: &OfferQuery) -> Result<Vec<RideOffer>, StoreError>;

    /// stores a new request under a freshly assigned id.
    fn insert_request(&self, draft: RequestDraft) -> Result<RideRequest, StoreError>;
    fn get_request(&self, id: &RequestId) -> Result<RideRequest, StoreError>;
    fn update_request<T, E, F>(&self, id: &RequestId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut RideRequest) -> Result<T, E>,
        E: From<StoreError>;
    /// removes a request, returning the removed record.
    fn delete_request(&self, id: &RequestId) -> Result<RideRequest, StoreError>;
    fn query_requests(&self, query: &RequestQuery) -> Result<Vec<RideRequest>, StoreError>;
}
