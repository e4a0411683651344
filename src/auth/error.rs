use axum::response::IntoResponse;
use log::error;
use thiserror::Error;

use crate::{
    api,
    response::{internal_server_error_response, member_redirect, signin_redirect},
    views,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ApiError(#[from] api::error::Error),
    #[error(transparent)]
    ViewError(#[from] views::error::Error),
    #[error("Unauthorized. Please sign in to receive a session cookie")]
    Unauthorized,
    #[error("Admin area requested by a member account")]
    Forbidden,
    #[error("Login succeeded but the API returned no session token")]
    MissingToken,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::Unauthorized => signin_redirect(),
            Error::Forbidden => member_redirect(),
            Error::ApiError(err) => err.into_response(),
            Error::ViewError(err) => err.into_response(),
            Error::MissingToken => {
                error!("{}", self);
                internal_server_error_response()
            }
        };
    }
}
