//! geometry, time-window and input parsing primitives shared by the
//! ridematch ride-sharing engine. everything in this crate is pure and
//! synchronous; storage and workflows live in the `ridematch` crate.
mod input_error;

pub mod spatial;
pub mod temporal;

pub use input_error::InputError;
