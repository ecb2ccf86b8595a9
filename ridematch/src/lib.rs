//! ride offer and ride request matching for a ride-sharing marketplace.
//!
//! listings live behind the [`store::ListingStore`] trait. [`search`] finds
//! compatible counter-listings by distance, route corridor and departure time,
//! and [`workflow`] carries riders and drivers from a proposal to a completed trip.
pub mod app;
pub mod model;
pub mod output;
pub mod search;
pub mod store;
pub mod workflow;

mod ride_match_error;

pub use ride_match_error::RideMatchError;
