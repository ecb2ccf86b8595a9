use chrono::NaiveDateTime;
use ridematch_core::{
    spatial::RoutePolygon,
    temporal::{dates_match, Fuzziness},
};

use crate::{
    model::{RequestFilter, RideOffer, RideRequest},
    store::{ListingStore, RequestQuery},
    RideMatchError,
};

/// a search for requests a driver could serve along a route corridor.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSearch {
    pub polygon: RoutePolygon,
    pub date: NaiveDateTime,
    pub fuzziness: Fuzziness,
    pub filters: Vec<RequestFilter>,
}

impl RequestSearch {
    pub fn new(polygon: RoutePolygon, date: NaiveDateTime, fuzziness: Fuzziness) -> RequestSearch {
        RequestSearch {
            polygon,
            date,
            fuzziness,
            filters: vec![],
        }
    }

    /// the open requests a stored offer could serve, if it has a corridor.
    /// the driver's own requests are excluded.
    pub fn for_offer(offer: &RideOffer) -> Option<RequestSearch> {
        let corridor = offer.route()?.clone();
        let search = RequestSearch::new(corridor, offer.date, offer.fuzziness)
            .with_filter(RequestFilter::Open)
            .with_filter(RequestFilter::NotPassenger(offer.driver.clone()));
        Some(search)
    }

    pub fn with_filter(mut self, filter: RequestFilter) -> RequestSearch {
        self.filters.push(filter);
        self
    }
}

/// finds stored requests whose start and end both lie inside the corridor and
/// whose departure time overlaps the searched one.
///
/// the storage query restricts the start position to the corridor; the
/// overlap check is centered on each candidate's own date, and the end
/// position is tested last.
pub fn search_requests<S: ListingStore>(
    store: &S,
    search: &RequestSearch,
) -> Result<Vec<RideRequest>, RideMatchError> {
    if search.polygon.is_empty() {
        log::debug!("request search with an empty corridor, nothing to match");
        return Ok(vec![]);
    }
    let query = RequestQuery {
        start_within: Some(search.polygon.clone()),
        date_window: None,
        filters: search.filters.clone(),
    };
    let candidates = store.query_requests(&query)?;
    let n_candidates = candidates.len();
    let matches: Vec<RideRequest> = candidates
        .into_iter()
        .filter(|request| {
            dates_match(&request.date, request.fuzziness, &search.date, search.fuzziness)
        })
        .filter(|request| search.polygon.contains(&request.end.position))
        .collect();
    log::debug!(
        "request search at {} ({}): {} of {} candidates starting in the corridor matched",
        search.date,
        search.fuzziness,
        matches.len(),
        n_candidates
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{ProfileId, RequestDraft},
        store::InMemoryListingStore,
    };
    use ridematch_core::spatial::{merge_boxes, GeoPoint, Location};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("test invariant failed: date")
    }

    fn post(
        store: &InMemoryListingStore,
        passenger: &str,
        start: GeoPoint,
        end: GeoPoint,
        date: &str,
        fuzziness: Fuzziness,
    ) -> RideRequest {
        store
            .insert_request(RequestDraft {
                passenger: ProfileId::from(passenger),
                start: Location::new(start, "start"),
                end: Location::new(end, "end"),
                message: String::new(),
                date: at(date),
                fuzziness,
            })
            .expect("test invariant failed: insert request")
    }

    fn corridor() -> RoutePolygon {
        // an L shaped corridor: east along lat 0..1, then north along lng 2..3
        merge_boxes(&[0.0, 0.0, 3.0, 1.0, 2.0, 1.0, 3.0, 4.0])
            .expect("test invariant failed: corridor")
    }

    #[test]
    fn test_start_and_end_must_be_inside() {
        let store = InMemoryListingStore::new();
        let inside = post(
            &store,
            "a",
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(3.5, 2.5),
            "2024-06-01 14:00",
            Fuzziness::OneHour,
        );
        post(
            &store,
            "b",
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(3.5, 0.5),
            "2024-06-01 14:00",
            Fuzziness::OneHour,
        );
        post(
            &store,
            "c",
            GeoPoint::new(3.5, 0.5),
            GeoPoint::new(3.5, 2.5),
            "2024-06-01 14:00",
            Fuzziness::OneHour,
        );
        let search = RequestSearch::new(corridor(), at("2024-06-01 14:30"), Fuzziness::OneHour);
        let found = search_requests(&store, &search).expect("test invariant failed: search");
        assert_eq!(found, vec![inside]);
    }

    #[test]
    fn test_window_centered_on_candidate() {
        let store = InMemoryListingStore::new();
        post(
            &store,
            "a",
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(0.5, 1.5),
            "2024-06-01 14:00",
            Fuzziness::TwoHours,
        );
        let near = RequestSearch::new(corridor(), at("2024-06-01 15:59"), Fuzziness::OneHour);
        assert_eq!(
            search_requests(&store, &near)
                .expect("test invariant failed: search")
                .len(),
            1
        );
        let far = RequestSearch::new(corridor(), at("2024-06-01 16:01"), Fuzziness::OneHour);
        assert!(search_requests(&store, &far)
            .expect("test invariant failed: search")
            .is_empty());
        let week = RequestSearch::new(corridor(), at("2024-06-07 23:00"), Fuzziness::Week);
        assert_eq!(
            search_requests(&store, &week)
                .expect("test invariant failed: search")
                .len(),
            1
        );
    }

    #[test]
    fn test_empty_corridor_matches_nothing() {
        let store = InMemoryListingStore::new();
        post(
            &store,
            "a",
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(0.5, 1.5),
            "2024-06-01 14:00",
            Fuzziness::Anytime,
        );
        let search =
            RequestSearch::new(RoutePolygon::empty(), at("2024-06-01 14:00"), Fuzziness::Anytime);
        assert!(search_requests(&store, &search)
            .expect("test invariant failed: search")
            .is_empty());
    }

    #[test]
    fn test_for_offer_skips_matched_and_own_requests() {
        let store = InMemoryListingStore::new();
        let open = post(
            &store,
            "a",
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(0.5, 1.5),
            "2024-06-01 14:00",
            Fuzziness::OneHour,
        );
        let matched = post(
            &store,
            "b",
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(0.5, 1.5),
            "2024-06-01 14:00",
            Fuzziness::OneHour,
        );
        post(
            &store,
            "driver",
            GeoPoint::new(0.5, 0.5),
            GeoPoint::new(0.5, 1.5),
            "2024-06-01 14:00",
            Fuzziness::OneHour,
        );
        store
            .update_request(&matched.id, |r| {
                r.claim(&crate::model::OfferId::from("x"), &ProfileId::from("y"))
            })
            .expect("test invariant failed: claim");
        let offer = store
            .insert_offer(crate::model::OfferDraft {
                driver: ProfileId::from("driver"),
                start: Location::new(GeoPoint::new(0.1, 0.1), "start"),
                end: Location::new(GeoPoint::new(3.9, 2.5), "end"),
                message: String::new(),
                date: at("2024-06-01 14:00"),
                fuzziness: Fuzziness::OneHour,
                polygon: Some(corridor()),
            })
            .expect("test invariant failed: insert offer");
        let search = RequestSearch::for_offer(&offer).expect("test invariant failed: corridor");
        let found = search_requests(&store, &search).expect("test invariant failed: search");
        assert_eq!(found, vec![open]);
    }
}
