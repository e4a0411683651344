use axum::response::IntoResponse;
use thiserror::Error;

use crate::{api, auth, validations::Rejection, views};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ApiError(#[from] api::error::Error),
    #[error(transparent)]
    ViewError(#[from] views::error::Error),
    #[error(transparent)]
    AuthError(#[from] auth::error::Error),
}

impl Error {
    pub fn reject(&self, fallback: &str) -> Rejection {
        match self {
            Error::ApiError(err) => Rejection::from_api(err, fallback),
            Error::AuthError(auth::error::Error::ApiError(err)) => Rejection::from_api(err, fallback),
            Error::AuthError(auth::error::Error::Unauthorized) => Rejection::Unauthorized,
            _ => Rejection::Failed(fallback.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::ApiError(err) => err.into_response(),
            Error::ViewError(err) => err.into_response(),
            Error::AuthError(err) => err.into_response(),
        }
    }
}
