mod app_error;
mod ridematch_app;

pub use app_error::AppError;
pub use ridematch_app::{RideMatchApp, RideMatchOperation};
