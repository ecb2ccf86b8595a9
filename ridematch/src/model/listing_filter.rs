use std::collections::BTreeSet;

use super::{OfferId, ProfileId, RideOffer, RideRequest};

/// a storage-side predicate on ride offers. a query's filters are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferFilter {
    Driver(ProfileId),
    DriverIn(BTreeSet<ProfileId>),
    NotDriver(ProfileId),
    HasPassenger(ProfileId),
    Completed(bool),
}

impl OfferFilter {
    pub fn accepts(&self, offer: &RideOffer) -> bool {
        match self {
            OfferFilter::Driver(driver) => offer.driver == *driver,
            OfferFilter::DriverIn(drivers) => drivers.contains(&offer.driver),
            OfferFilter::NotDriver(driver) => offer.driver != *driver,
            OfferFilter::HasPassenger(passenger) => offer.passengers.contains(passenger),
            OfferFilter::Completed(completed) => offer.completed == *completed,
        }
    }
}

/// a storage-side predicate on ride requests. a query's filters are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestFilter {
    Passenger(ProfileId),
    PassengerIn(BTreeSet<ProfileId>),
    NotPassenger(ProfileId),
    /// no accepted offer yet
    Open,
    MatchedTo(OfferId),
}

impl RequestFilter {
    pub fn accepts(&self, request: &RideRequest) -> bool {
        match self {
            RequestFilter::Passenger(passenger) => request.passenger == *passenger,
            RequestFilter::PassengerIn(passengers) => passengers.contains(&request.passenger),
            RequestFilter::NotPassenger(passenger) => request.passenger != *passenger,
            RequestFilter::Open => request.is_open(),
            RequestFilter::MatchedTo(offer) => request.ride_offer.as_ref() == Some(offer),
        }
    }
}
