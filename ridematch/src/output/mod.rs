mod listing_record;

pub use listing_record::{
    offer_records, request_records, LocationRecord, OfferRecord, RequestRecord, MISSING_ID,
    MISSING_NAME,
};
