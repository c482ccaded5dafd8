use crate::{
    batch::BatchError,
    config::ConfigError,
    detect::DetectError,
    keys::KeyError,
    landing::LandingError,
    store::StoreError,
    types::{ParseDateError, ParseSourceError},
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Everything a run can fail with, one variant per subsystem. Input parsing
/// errors surface before any storage or landing call is made.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Date(#[from] ParseDateError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Landing(#[from] LandingError),

    #[error(transparent)]
    Source(#[from] ParseSourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

///
/// TESTS
///
