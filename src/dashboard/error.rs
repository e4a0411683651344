use axum::response::IntoResponse;
use thiserror::Error;

use crate::{addresses, auth, payments, products, transactions, users, views, withdrawals};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
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
    TransactionError(#[from] transactions::error::Error),
    #[error(transparent)]
    PaymentError(#[from] payments::error::Error),
    #[error(transparent)]
    WithdrawalError(#[from] withdrawals::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::ViewError(err) => err.into_response(),
            Error::AuthError(err) => err.into_response(),
            Error::UserError(err) => err.into_response(),
            Error::AddressError(err) => err.into_response(),
            Error::ProductError(err) => err.into_response(),
            Error::TransactionError(err) => err.into_response(),
            Error::PaymentError(err) => err.into_response(),
            Error::WithdrawalError(err) => err.into_response(),
        }
    }
}
