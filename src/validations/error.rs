use log::error;
use thiserror::Error;

use crate::api;

use super::FieldErrors;

///
/// Why a submitted form was not carried out
///
#[derive(Debug, PartialEq, Error)]
pub enum Rejection {
    #[error("Form has invalid fields: {0:?}")]
    Invalid(FieldErrors),
    #[error("{0}")]
    Failed(String),
    #[error("Session is missing or was rejected by the API")]
    Unauthorized,
}

impl Rejection {
    ///
    /// Classifies an API failure: known error codes land on their form
    /// field, an expired session asks for a new sign in, and everything
    /// else shows `fallback` as a banner.
    ///
    pub fn from_api(err: &api::error::Error, fallback: &str) -> Self {
        if err.is_unauthorized() {
            return Rejection::Unauthorized;
        }
        if let Some(code) = err.server_code() {
            let (field, message) = code.field_error();
            return Rejection::Invalid(FieldErrors::single(field, message));
        }
        error!("{}", err);
        Rejection::Failed(fallback.to_string())
    }

    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Rejection::Invalid(errors) => errors.clone(),
            _ => FieldErrors::new(),
        }
    }

    pub fn banner(&self) -> Option<String> {
        match self {
            Rejection::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }
}

impl From<FieldErrors> for Rejection {
    fn from(errors: FieldErrors) -> Self {
        Rejection::Invalid(errors)
    }
}
