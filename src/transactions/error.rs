use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    addresses, api, auth, files, payments, products,
    response::{error_page, not_found_response},
    support, users,
    validations::Rejection,
    views,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ApiError(#[from] api::error::Error),
    #[error(transparent)]
    ViewError(#[from] views::error::Error),
    #[error(transparent)]
    AuthError(#[from] auth::error::Error),
    #[error(transparent)]
    UserError(#[from] users::error::Error),
    #[error(transparent)]
    AddressError(#[from] addresses::error::Error),
    #[error(transparent)]
    ProductError(#[from] products::error::Error),
    #[error(transparent)]
    PaymentError(#[from] payments::error::Error),
    #[error(transparent)]
    FileError(#[from] files::error::Error),
    #[error(transparent)]
    SupportError(#[from] support::error::Error),
    #[error("Could not read the submitted form: {0}")]
    FormError(#[from] serde_json::Error),
    #[error("The signed in member is not the {0} of transaction {1}")]
    NotAParty(&'static str, String),
    #[error("Unknown transaction action: {0}")]
    UnknownAction(String),
}

impl Error {
    pub fn reject(&self, fallback: &str) -> Rejection {
        match self {
            Error::ApiError(err) => Rejection::from_api(err, fallback),
            Error::AuthError(auth::error::Error::ApiError(err)) => Rejection::from_api(err, fallback),
            Error::AuthError(auth::error::Error::Unauthorized) => Rejection::Unauthorized,
            Error::UserError(err) => err.reject(fallback),
            Error::AddressError(err) => err.reject(fallback),
            Error::ProductError(err) => err.reject(fallback),
            Error::PaymentError(err) => err.reject(fallback),
            Error::FileError(err) => err.reject(fallback),
            Error::SupportError(err) => err.reject(fallback),
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
            Error::UserError(err) => err.into_response(),
            Error::AddressError(err) => err.into_response(),
            Error::ProductError(err) => err.into_response(),
            Error::PaymentError(err) => err.into_response(),
            Error::FileError(err) => err.into_response(),
            Error::SupportError(err) => err.into_response(),
            Error::FormError(err) => error_page(StatusCode::BAD_REQUEST, &err.to_string()),
            Error::NotAParty(..) | Error::UnknownAction(_) => not_found_response(),
        }
    }
}
