use chrono::NaiveDateTime;
use ridematch_core::{
    spatial::{distance, GeoPoint},
    temporal::{candidate_window, dates_match, Fuzziness},
    InputError,
};

use super::MatchConfig;
use crate::{
    model::{OfferFilter, RideOffer, RideRequest},
    store::{ListingStore, OfferQuery},
    RideMatchError,
};

/// a search for offers that could carry a passenger from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSearch {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub date: NaiveDateTime,
    pub fuzziness: Fuzziness,
    /// additional storage filters, combined with AND
    pub filters: Vec<OfferFilter>,
}

impl OfferSearch {
    /// builds a search, rejecting invalid coordinates.
    pub fn new(
        start: GeoPoint,
        end: GeoPoint,
        date: NaiveDateTime,
        fuzziness: Fuzziness,
    ) -> Result<OfferSearch, InputError> {
        start.validate()?;
        end.validate()?;
        Ok(OfferSearch {
            start,
            end,
            date,
            fuzziness,
            filters: vec![],
        })
    }

    /// the offers a stored request could use. the passenger's own offers are excluded.
    pub fn for_request(request: &RideRequest) -> Result<OfferSearch, InputError> {
        Ok(OfferSearch::new(
            request.start.position,
            request.end.position,
            request.date,
            request.fuzziness,
        )?
        .with_filter(OfferFilter::NotDriver(request.passenger.clone())))
    }

    pub fn with_filter(mut self, filter: OfferFilter) -> OfferSearch {
        self.filters.push(filter);
        self
    }

    /// true if the offer's route serves this search: either both endpoints are
    /// strictly closer than `radius_km` to the searched ones, or the offer's
    /// corridor contains both searched endpoints.
    pub fn route_fits(&self, offer: &RideOffer, radius_km: f64) -> bool {
        let near_start = distance(&offer.start.position, &self.start) < radius_km;
        let near_end = distance(&offer.end.position, &self.end) < radius_km;
        if near_start && near_end {
            return true;
        }
        offer
            .route()
            .map(|corridor| corridor.contains(&self.start) && corridor.contains(&self.end))
            .unwrap_or(false)
    }
}

/// finds stored offers compatible with a passenger's route and departure time.
///
/// candidates come from a storage query over the coarse departure window of
/// the search, and are then confirmed with [`dates_match`] centered on the
/// searched date before the route check is applied.
///
/// # Arguments
///
/// * `store`  - listing storage
/// * `search` - passenger endpoints, departure time, fuzziness and filters
/// * `config` - supplies the point-to-point radius
///
/// # Returns
///
/// * every qualifying offer, possibly none
pub fn search_offers<S: ListingStore>(
    store: &S,
    search: &OfferSearch,
    config: &MatchConfig,
) -> Result<Vec<RideOffer>, RideMatchError> {
    search.start.validate()?;
    search.end.validate()?;
    let query = OfferQuery {
        date_window: candidate_window(&search.date, search.fuzziness),
        filters: search.filters.clone(),
    };
    let candidates = store.query_offers(&query)?;
    let n_candidates = candidates.len();
    let matches: Vec<RideOffer> = candidates
        .into_iter()
        .filter(|offer| dates_match(&search.date, search.fuzziness, &offer.date, offer.fuzziness))
        .filter(|offer| search.route_fits(offer, config.offer_radius_km))
        .collect();
    log::debug!(
        "offer search from {} to {} at {} ({}): {} of {} candidates matched",
        search.start,
        search.end,
        search.date,
        search.fuzziness,
        matches.len(),
        n_candidates
    );
    Ok(matches)
}
