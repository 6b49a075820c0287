use thiserror::Error;

use crate::error::ValidationError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}
