use ridematch_core::InputError;

use crate::{
    model::{OfferId, ProfileId, RequestId},
    store::StoreError,
};

#[derive(thiserror::Error, Debug)]
pub enum RideMatchError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("listing store failure: {0}")]
    Store(StoreError),
    #[error("profile '{profile}' is not permitted to {action}")]
    NotPermitted {
        profile: ProfileId,
        action: &'static str,
    },
    #[error("profile '{0}' cannot propose on their own listing")]
    OwnListing(ProfileId),
    #[error("ride request '{0}' has already been matched to an offer")]
    AlreadyMatched(RequestId),
    #[error("profile '{profile}' is already a passenger on offer '{offer}'")]
    AlreadyPassenger { profile: ProfileId, offer: OfferId },
    #[error("profile '{profile}' has no pending proposal on {listing}")]
    NotPending { profile: ProfileId, listing: String },
    #[error("ride request '{0}' has not been matched to an offer")]
    NotMatched(RequestId),
    #[error("message has {len} characters, the limit is {max}")]
    MessageTooLong { len: usize, max: usize },
}

impl From<StoreError> for RideMatchError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, id } => RideMatchError::NotFound(format!("{kind} '{id}'")),
            other => RideMatchError::Store(other),
        }
    }
}
