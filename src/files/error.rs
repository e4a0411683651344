use axum::{extract::multipart::MultipartError, response::IntoResponse};
use log::warn;
use thiserror::Error;

use crate::{api, response::error_page, validations::Rejection, views};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ApiError(#[from] api::error::Error),
    #[error(transparent)]
    ViewError(#[from] views::error::Error),
    #[error("Could not read the submitted form: {0}")]
    MultipartError(#[from] MultipartError),
}

impl Error {
    pub fn reject(&self, fallback: &str) -> Rejection {
        match self {
            Error::ApiError(err) => Rejection::from_api(err, fallback),
            _ => Rejection::Failed(fallback.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::ApiError(err) => err.into_response(),
            Error::ViewError(err) => err.into_response(),
            Error::MultipartError(err) => {
                warn!("{}", err);
                error_page(err.status(), &err.body_text())
            }
        }
    }
}
