use axum::response::IntoResponse;
use log::error;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::response::{internal_server_error_response, not_found_response, signin_redirect};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reqwest error while calling the Flexcrow API: {0}")]
    ClientFetchError(#[from] reqwest::Error),
    #[error("Status code other than 2xx received from API. StatusCode: {0}. Body: {1}")]
    StatusCodeFetchError(StatusCode, String),
    #[error("Could not parse response body from the Flexcrow API. Error: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl Error {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::StatusCodeFetchError(status, _) => Some(*status),
            Error::ClientFetchError(err) => err.status(),
            Error::ParseError(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// The `error` string of a JSON error body, if the API sent one
    pub fn server_message(&self) -> Option<String> {
        match self {
            Error::StatusCodeFetchError(_, body) => serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|body| body.error)
                .filter(|msg| !msg.trim().is_empty()),
            _ => None,
        }
    }

    pub fn server_code(&self) -> Option<ServerErrorCode> {
        self.server_message().and_then(|msg| ServerErrorCode::parse(&msg))
    }
}

///
/// Error codes the API uses to point at a single offending field
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorCode {
    User,
    Customer,
    Product,
    Address,
    Payment,
    Email,
    Username,
    InvalidPassword,
}

impl ServerErrorCode {
    pub fn parse(code: &str) -> Option<Self> {
        Some(match code.trim() {
            "user_error" => ServerErrorCode::User,
            "customer_error" => ServerErrorCode::Customer,
            "product_error" => ServerErrorCode::Product,
            "address_error" => ServerErrorCode::Address,
            "payment_error" => ServerErrorCode::Payment,
            "email_error" => ServerErrorCode::Email,
            "username_error" => ServerErrorCode::Username,
            "invalid_password" => ServerErrorCode::InvalidPassword,
            _ => return None,
        })
    }

    /// `(field, message)` shown next to the form input
    pub fn field_error(self) -> (&'static str, &'static str) {
        match self {
            ServerErrorCode::User => ("user_id", "User not found"),
            ServerErrorCode::Customer => ("customer_id", "Customer not found"),
            ServerErrorCode::Product => ("product_id", "Product not found"),
            ServerErrorCode::Address => ("address_id", "Address not found"),
            ServerErrorCode::Payment => ("payment_id", "Payment not found"),
            ServerErrorCode::Email => ("email", "Email already exists"),
            ServerErrorCode::Username => ("username", "Username already exists"),
            ServerErrorCode::InvalidPassword => ("current_password", "Current password is incorrect"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        if self.is_unauthorized() {
            return signin_redirect();
        }
        if self.is_not_found() {
            return not_found_response();
        }
        error!("{}", self);
        internal_server_error_response()
    }
}
