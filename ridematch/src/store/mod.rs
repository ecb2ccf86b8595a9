mod in_memory;
mod listing_store;
mod snapshot;
mod store_error;

pub use in_memory::InMemoryListingStore;
pub use listing_store::{ListingStore, OfferQuery, RequestQuery};
pub use snapshot::ListingSnapshot;
pub use store_error::StoreError;
