mod match_config;
mod offer_matcher;
mod request_matcher;
mod search_form;

pub use match_config::{MatchConfig, ENV_PREFIX};
pub use offer_matcher::{search_offers, OfferSearch};
pub use request_matcher::{search_requests, RequestSearch};
pub use search_form::SearchForm;
