use axum::response::IntoResponse;
use log::error;
use reqwest::StatusCode;
use thiserror::Error;

use crate::{response::internal_server_error_response, validations::Rejection};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reqwest error while calling the email service: {0}")]
    ClientSendError(#[from] reqwest::Error),
    #[error("Status code other than 2xx received from the email service. StatusCode: {0}. Body: {1}")]
    StatusCodeSendError(StatusCode, String),
}

impl Error {
    pub fn reject(&self, fallback: &str) -> Rejection {
        error!("{}", self);
        Rejection::Failed(fallback.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        error!("{}", self);
        internal_server_error_response()
    }
}
