use thiserror::Error;

use crate::error::ValidationError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum TodoError {
    #[error("No active session")]
    NoSession,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
