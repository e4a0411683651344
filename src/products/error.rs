use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{api, files, response::error_page, validations::Rejection, views};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ApiError(#[from] api::error::Error),
    #[error(transparent)]
    ViewError(#[from] views::error::Error),
    #[error(transparent)]
    FileError(#[from] files::error::Error),
    #[error("Could not read the product form: {0}")]
    FormError(#[from] serde_json::Error),
}

impl Error {
    pub fn reject(&self, fallback: &str) -> Rejection {
        match self {
            Error::ApiError(err) => Rejection::from_api(err, fallback),
            Error::FileError(err) => err.reject(fallback),
            _ => Rejection::Failed(fallback.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::ApiError(err) => err.into_response(),
            Error::ViewError(err) => err.into_response(),
            Error::FileError(err) => err.into_response(),
            Error::FormError(err) => error_page(StatusCode::BAD_REQUEST, &err.to_string()),
        }
    }
}
