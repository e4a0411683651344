use axum::response::IntoResponse;
use log::error;
use thiserror::Error;

use crate::response::internal_server_error_response;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        error!("{}", self);
        internal_server_error_response()
    }
}
