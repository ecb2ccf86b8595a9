use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::NaiveDateTime;
use itertools::Itertools;
use rstar::{primitives::GeomWithData, RTree, AABB};

use super::{ListingSnapshot, ListingStore, OfferQuery, RequestQuery, StoreError};
use crate::model::{
    document_id, document_sequence, OfferDraft, OfferId, ProfileId, RequestDraft, RequestId,
    RideOffer, RideRequest, UserProfile,
};

const PROFILE: &str = "profile";
const RIDE_OFFER: &str = "ride offer";
const RIDE_REQUEST: &str = "ride request";

/// a request's start position in (lng, lat) order, tagged with its id.
type RequestStart = GeomWithData<geo::Point<f64>, RequestId>;

/// a thread-safe, in-memory [`ListingStore`].
///
/// offers are indexed by `(date, id)` for departure-window range queries and
/// request start positions are held in an R-tree for the start-region
/// pre-filter. all mutations take the write lock for their full duration.
pub struct InMemoryListingStore {
    tables: RwLock<ListingTables>,
}

struct ListingTables {
    profiles: HashMap<ProfileId, UserProfile>,
    offers: HashMap<OfferId, RideOffer>,
    requests: HashMap<RequestId, RideRequest>,
    offers_by_date: BTreeSet<(NaiveDateTime, OfferId)>,
    request_starts: RTree<RequestStart>,
    next_sequence: u64,
}

impl Default for InMemoryListingStore {
    fn default() -> Self {
        InMemoryListingStore::new()
    }
}

impl InMemoryListingStore {
    pub fn new() -> InMemoryListingStore {
        InMemoryListingStore {
            tables: RwLock::new(ListingTables::new()),
        }
    }

    /// builds a store from a snapshot, rebuilding both indices. new ids are
    /// assigned after the largest document id found in the snapshot.
    pub fn from_snapshot(snapshot: ListingSnapshot) -> Result<InMemoryListingStore, StoreError> {
        let mut tables = ListingTables::new();
        for profile in snapshot.profiles.into_iter() {
            if tables.profiles.contains_key(&profile.id) {
                return Err(duplicate(PROFILE, profile.id.as_str()));
            }
            tables.profiles.insert(profile.id.clone(), profile);
        }
        for offer in snapshot.offers.into_iter() {
            if tables.offers.contains_key(&offer.id) {
                return Err(duplicate(RIDE_OFFER, offer.id.as_str()));
            }
            tables.observe_id(offer.id.as_str());
            tables.put_offer(offer);
        }
        let mut starts = Vec::with_capacity(snapshot.requests.len());
        for request in snapshot.requests.into_iter() {
            if tables.requests.contains_key(&request.id) {
                return Err(duplicate(RIDE_REQUEST, request.id.as_str()));
            }
            tables.observe_id(request.id.as_str());
            starts.push(request_start(&request));
            tables.requests.insert(request.id.clone(), request);
        }
        tables.request_starts = RTree::bulk_load(starts);
        log::debug!(
            "loaded listing store with {} profiles, {} offers, {} requests",
            tables.profiles.len(),
            tables.offers.len(),
            tables.requests.len()
        );
        Ok(InMemoryListingStore {
            tables: RwLock::new(tables),
        })
    }

    pub fn load(path: &Path) -> Result<InMemoryListingStore, StoreError> {
        InMemoryListingStore::from_snapshot(ListingSnapshot::read(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        self.snapshot()?.write(path)
    }

    /// copies the current contents into a snapshot, each table ordered by id.
    pub fn snapshot(&self) -> Result<ListingSnapshot, StoreError> {
        let tables = self.read("snapshot")?;
        Ok(ListingSnapshot {
            profiles: tables
                .profiles
                .values()
                .sorted_by(|a, b| a.id.cmp(&b.id))
                .cloned()
                .collect_vec(),
            offers: tables
                .offers
                .values()
                .sorted_by(|a, b| a.id.cmp(&b.id))
                .cloned()
                .collect_vec(),
            requests: tables
                .requests
                .values()
                .sorted_by(|a, b| a.id.cmp(&b.id))
                .cloned()
                .collect_vec(),
        })
    }

    fn read(&self, op: &'static str) -> Result<RwLockReadGuard<'_, ListingTables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned(op))
    }

    fn write(&self, op: &'static str) -> Result<RwLockWriteGuard<'_, ListingTables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned(op))
    }
}

impl ListingStore for InMemoryListingStore {
    fn insert_profile(&self, profile: UserProfile) -> Result<(), StoreError> {
        let mut tables = self.write("insert_profile")?;
        if tables.profiles.contains_key(&profile.id) {
            return Err(duplicate(PROFILE, profile.id.as_str()));
        }
        tables.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn get_profile(&self, id: &ProfileId) -> Result<UserProfile, StoreError> {
        let tables = self.read("get_profile")?;
        tables
            .profiles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(PROFILE, id.as_str()))
    }

    fn update_profile<T, E, F>(&self, id: &ProfileId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut UserProfile) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self.write("update_profile")?;
        let mut working = tables
            .profiles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(PROFILE, id.as_str()))?;
        let result = op(&mut working)?;
        working.id = id.clone();
        tables.profiles.insert(id.clone(), working);
        Ok(result)
    }

    fn insert_offer(&self, draft: OfferDraft) -> Result<RideOffer, StoreError> {
        let mut tables = self.write("insert_offer")?;
        let id = OfferId(tables.next_id());
        let offer = RideOffer::from_draft(id, draft);
        tables.put_offer(offer.clone());
        Ok(offer)
    }

    fn get_offer(&self, id: &OfferId) -> Result<RideOffer, StoreError> {
        let tables = self.read("get_offer")?;
        tables
            .offers
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(RIDE_OFFER, id.as_str()))
    }

    fn update_offer<T, E, F>(&self, id: &OfferId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut RideOffer) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self.write("update_offer")?;
        let mut working = tables
            .offers
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(RIDE_OFFER, id.as_str()))?;
        let result = op(&mut working)?;
        working.id = id.clone();
        tables.take_offer(id);
        tables.put_offer(working);
        Ok(result)
    }

    fn delete_offer(&self, id: &OfferId) -> Result<RideOffer, StoreError> {
        let mut tables = self.write("delete_offer")?;
        tables
            .take_offer(id)
            .ok_or_else(|| StoreError::not_found(RIDE_OFFER, id.as_str()))
    }

    fn query_offers(&self, query: &OfferQuery) -> Result<Vec<RideOffer>, StoreError> {
        let tables = self.read("query_offers")?;
        let candidates = match query.date_window {
            Some(window) => tables
                .offers_by_date
                .range((window.earliest, OfferId(String::new()))..)
                .take_while(|(date, _)| *date <= window.latest)
                .collect_vec(),
            None => tables.offers_by_date.iter().collect_vec(),
        };
        let n_candidates = candidates.len();
        let result = candidates
            .into_iter()
            .filter_map(|(_, id)| tables.offers.get(id))
            .filter(|offer| query.accepts(offer))
            .cloned()
            .collect_vec();
        log::debug!(
            "offer query with window {:?} and {} filters: {} indexed candidates, {} accepted",
            query.date_window,
            query.filters.len(),
            n_candidates,
            result.len()
        );
        Ok(result)
    }

    fn insert_request(&self, draft: RequestDraft) -> Result<RideRequest, StoreError> {
        let mut tables = self.write("insert_request")?;
        let id = RequestId(tables.next_id());
        let request = RideRequest::from_draft(id, draft);
        tables.put_request(request.clone());
        Ok(request)
    }

    fn get_request(&self, id: &RequestId) -> Result<RideRequest, StoreError> {
        let tables = self.read("get_request")?;
        tables
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(RIDE_REQUEST, id.as_str()))
    }

    fn update_request<T, E, F>(&self, id: &RequestId, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut RideRequest) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self.write("update_request")?;
        let mut working = tables
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(RIDE_REQUEST, id.as_str()))?;
        let result = op(&mut working)?;
        working.id = id.clone();
        tables.take_request(id);
        tables.put_request(working);
        Ok(result)
    }

    fn delete_request(&self, id: &RequestId) -> Result<RideRequest, StoreError> {
        let mut tables = self.write("delete_request")?;
        tables
            .take_request(id)
            .ok_or_else(|| StoreError::not_found(RIDE_REQUEST, id.as_str()))
    }

    fn query_requests(&self, query: &RequestQuery) -> Result<Vec<RideRequest>, StoreError> {
        let tables = self.read("query_requests")?;
        let candidates = match &query.start_within {
            Some(region) => match region.bounding_rect() {
                Some(rect) => {
                    let envelope = AABB::from_corners(
                        geo::Point::from(rect.min()),
                        geo::Point::from(rect.max()),
                    );
                    tables
                        .request_starts
                        .locate_in_envelope_intersecting(&envelope)
                        .filter_map(|start| tables.requests.get(&start.data))
                        .collect_vec()
                }
                // an empty region contains no start positions
                None => vec![],
            },
            None => tables.requests.values().collect_vec(),
        };
        let n_candidates = candidates.len();
        let result = candidates
            .into_iter()
            .filter(|request| query.accepts(request))
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .cloned()
            .collect_vec();
        log::debug!(
            "request query with region {}, window {:?} and {} filters: {} indexed candidates, {} accepted",
            if query.start_within.is_some() { "set" } else { "unset" },
            query.date_window,
            query.filters.len(),
            n_candidates,
            result.len()
        );
        Ok(result)
    }
}

impl ListingTables {
    fn new() -> ListingTables {
        ListingTables {
            profiles: HashMap::new(),
            offers: HashMap::new(),
            requests: HashMap::new(),
            offers_by_date: BTreeSet::new(),
            request_starts: RTree::new(),
            next_sequence: 1,
        }
    }

    fn next_id(&mut self) -> String {
        let id = document_id(self.next_sequence);
        self.next_sequence += 1;
        id
    }

    /// keeps generated ids clear of ids loaded from elsewhere.
    fn observe_id(&mut self, id: &str) {
        if let Some(seq) = document_sequence(id) {
            self.next_sequence = self.next_sequence.max(seq.saturating_add(1));
        }
    }

    fn put_offer(&mut self, offer: RideOffer) {
        self.offers_by_date.insert((offer.date, offer.id.clone()));
        self.offers.insert(offer.id.clone(), offer);
    }

    fn take_offer(&mut self, id: &OfferId) -> Option<RideOffer> {
        let offer = self.offers.remove(id)?;
        self.offers_by_date.remove(&(offer.date, offer.id.clone()));
        Some(offer)
    }

    fn put_request(&mut self, request: RideRequest) {
        self.request_starts.insert(request_start(&request));
        self.requests.insert(request.id.clone(), request);
    }

    fn take_request(&mut self, id: &RequestId) -> Option<RideRequest> {
        let request = self.requests.remove(id)?;
        self.request_starts.remove(&request_start(&request));
        Some(request)
    }
}

fn request_start(request: &RideRequest) -> RequestStart {
    GeomWithData::new(request.start.position.to_geo(), request.id.clone())
}

fn duplicate(kind: &'static str, id: &str) -> StoreError {
    StoreError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}
