mod date_ops;
mod fuzziness;

pub mod date_codec;

pub use date_codec::{format_listing_date, parse_date, LISTING_DATE_FORMAT};
pub use date_ops::{candidate_window, dates_match, DateWindow, WEEK_DAYS};
pub use fuzziness::Fuzziness;
