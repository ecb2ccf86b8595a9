use chrono::NaiveDateTime;
use ridematch_core::{
    spatial::Location,
    temporal::{date_codec, Fuzziness},
};
use serde::{Deserialize, Serialize};

use crate::{
    model::{ProfileId, RideOffer, RideRequest, UserProfile},
    store::{ListingStore, StoreError},
    RideMatchError,
};

/// placeholder name for a listing whose owner profile is gone.
pub const MISSING_NAME: &str = "no one";
/// placeholder id for a listing whose owner profile is gone.
pub const MISSING_ID: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// `[lat, lng]`
    pub point: [f64; 2],
    pub title: String,
}

impl From<&Location> for LocationRecord {
    fn from(value: &Location) -> Self {
        LocationRecord {
            point: value.position.into(),
            title: value.title.clone(),
        }
    }
}

/// a ride offer as reported to the web layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: String,
    pub driver_first_name: String,
    pub driver_last_name: String,
    pub driver_id: String,
    pub location_start: LocationRecord,
    pub location_end: LocationRecord,
    #[serde(with = "date_codec::listing_date")]
    pub date: NaiveDateTime,
    pub fuzziness: Fuzziness,
    pub message: String,
    pub passengers: usize,
}

/// a ride request as reported to the web layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: String,
    pub passenger_first_name: String,
    pub passenger_last_name: String,
    pub passenger_id: String,
    pub location_start: LocationRecord,
    pub location_end: LocationRecord,
    #[serde(with = "date_codec::listing_date")]
    pub date: NaiveDateTime,
    pub fuzziness: Fuzziness,
    pub message: String,
}

impl OfferRecord {
    pub fn new(offer: &RideOffer, driver: Option<&UserProfile>) -> OfferRecord {
        let (first, last, id) = owner_fields(driver);
        OfferRecord {
            id: offer.id.to_string(),
            driver_first_name: first,
            driver_last_name: last,
            driver_id: id,
            location_start: LocationRecord::from(&offer.start),
            location_end: LocationRecord::from(&offer.end),
            date: offer.date,
            fuzziness: offer.fuzziness,
            message: offer.message.clone(),
            passengers: offer.passengers.len(),
        }
    }
}

impl RequestRecord {
    pub fn new(request: &RideRequest, passenger: Option<&UserProfile>) -> RequestRecord {
        let (first, last, id) = owner_fields(passenger);
        RequestRecord {
            id: request.id.to_string(),
            passenger_first_name: first,
            passenger_last_name: last,
            passenger_id: id,
            location_start: LocationRecord::from(&request.start),
            location_end: LocationRecord::from(&request.end),
            date: request.date,
            fuzziness: request.fuzziness,
            message: request.message.clone(),
        }
    }
}

/// encodes offers, looking up each driver's profile.
pub fn offer_records<S: ListingStore>(
    store: &S,
    offers: &[RideOffer],
) -> Result<Vec<OfferRecord>, RideMatchError> {
    offers
        .iter()
        .map(|o| {
            let driver = find_profile(store, &o.driver)?;
            Ok(OfferRecord::new(o, driver.as_ref()))
        })
        .collect()
}

/// encodes requests, looking up each passenger's profile.
pub fn request_records<S: ListingStore>(
    store: &S,
    requests: &[RideRequest],
) -> Result<Vec<RequestRecord>, RideMatchError> {
    requests
        .iter()
        .map(|r| {
            let passenger = find_profile(store, &r.passenger)?;
            Ok(RequestRecord::new(r, passenger.as_ref()))
        })
        .collect()
}

fn find_profile<S: ListingStore>(
    store: &S,
    id: &ProfileId,
) -> Result<Option<UserProfile>, RideMatchError> {
    match store.get_profile(id) {
        Ok(profile) => Ok(Some(profile)),
        Err(StoreError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn owner_fields(owner: Option<&UserProfile>) -> (String, String, String) {
    match owner {
        Some(p) => (p.first_name.clone(), p.last_name.clone(), p.id.to_string()),
        None => (
            MISSING_NAME.to_string(),
            MISSING_NAME.to_string(),
            MISSING_ID.to_string(),
        ),
    }
}
