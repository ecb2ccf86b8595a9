mod ids;
mod listing_filter;
mod profile;
mod ride_offer;
mod ride_request;

pub use ids::{document_id, document_sequence, OfferId, ProfileId, RequestId};
pub use listing_filter::{OfferFilter, RequestFilter};
pub use profile::{Trust, UserProfile};
pub use ride_offer::{OfferDraft, RideOffer};
pub use ride_request::{RequestDraft, RideRequest};
