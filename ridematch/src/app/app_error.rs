use ridematch_core::InputError;

use crate::{store::StoreError, RideMatchError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{msg}: {source}")]
    ConfigReadError {
        msg: String,
        source: config::ConfigError,
    },
    #[error(transparent)]
    Match(#[from] RideMatchError),
    #[error("failed writing output: {0}")]
    OutputError(#[from] serde_json::Error),
}

impl From<InputError> for AppError {
    fn from(value: InputError) -> Self {
        AppError::Match(RideMatchError::InvalidInput(value))
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::Match(RideMatchError::from(value))
    }
}
