use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::UserType;

use super::{error::*, DynAuthService};

lazy_static! {
    static ref TOKEN_COOKIE_RE: Regex = Regex::new(r"(?:^|;)\s*token=([^;\s]+)").unwrap();
}

/// The API session token carried by the `token` cookie
pub struct AuthToken(pub String);

impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        token_from_headers(&parts.headers)
            .map(AuthToken)
            .ok_or(Error::Unauthorized)
    }
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookies| TOKEN_COOKIE_RE.captures(cookies).map(|caps| caps[1].to_string()))
}

///
/// Lets a request through to the admin area only when the API
/// confirms the session belongs to an administrator.
///
pub async fn require_admin(
    State(auth_svc): State<DynAuthService>,
    AuthToken(token): AuthToken,
    req: Request,
    next: Next,
) -> Result<Response> {
    match auth_svc.user_type(&token).await? {
        UserType::Admin => Ok(next.run(req).await),
        UserType::User => Err(Error::Forbidden),
    }
}
