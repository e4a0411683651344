use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};

pub const SIGNIN_PATH: &str = "/auth/signin";
pub const ADMIN_HOME: &str = "/admin";
pub const MEMBER_HOME: &str = "/member";

pub fn internal_server_error_response() -> Response {
    error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "An error has occurred. Please try again later.",
    )
}

pub fn not_found_response() -> Response {
    error_page(StatusCode::NOT_FOUND, "The page you are looking for does not exist.")
}

///
/// Sends the browser back to the sign in page and drops whatever
/// session cookie it still carries.
///
pub fn signin_redirect() -> Response {
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Redirect::to(SIGNIN_PATH),
    )
        .into_response()
}

pub fn member_redirect() -> Response {
    Redirect::to(MEMBER_HOME).into_response()
}

pub fn session_cookie(token: &str) -> String {
    format!("token={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    "token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0".to_string()
}

/// Bare page used when the template engine itself is unavailable
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html><html><head><title>Flexcrow</title></head>\
         <body><main><h1>{}</h1><p>{}</p><a href=\"/\">Back to dashboard</a></main></body></html>",
        status.as_u16(),
        tera::escape_html(message),
    );
    (status, Html(body)).into_response()
}
