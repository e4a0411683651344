use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};

use crate::{
    api::{ApiClient, ApiResponse, MockApiTransport, Payload},
    models::UserType,
};

use super::{
    error::Error,
    middleware::token_from_headers,
    models::{LoginModel, SignInForm, SignUpForm},
    ApiAuthService, AuthService,
};

fn auth_service(transport: MockApiTransport) -> ApiAuthService {
    ApiAuthService { api: ApiClient::new(Arc::new(transport)) }
}

#[test]
fn test_token_is_read_from_cookie_header() {
    let mut headers = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
    headers.append(header::COOKIE, HeaderValue::from_static("lang=th; token=eyJhbGciOi.abc; other=1"));
    assert_eq!(Some("eyJhbGciOi.abc".to_string()), token_from_headers(&headers));

    let mut headers = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("xtoken=nope; token="));
    assert_eq!(None, token_from_headers(&headers));

    assert_eq!(None, token_from_headers(&HeaderMap::new()));
}

#[tokio::test]
async fn test_login_returns_session() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| {
            req.method == Method::POST
                && req.path == "/users/login"
                && req.token.is_none()
                && req.payload == Payload::Json(serde_json::json!({
                    "email": "admin@flexcrow.test",
                    "password": "secret1",
                }))
        })
        .times(1)
        .returning(|_| Ok(ApiResponse {
            status: StatusCode::OK,
            body: r#"{"user_id": "u1", "token": "tok-1", "user_type": "ADMIN"}"#.to_string(),
        }));

    let session = auth_service(transport)
        .login(LoginModel { email: "admin@flexcrow.test".into(), password: "secret1".into() })
        .await?;

    assert_eq!("tok-1", session.token);
    assert_eq!(UserType::Admin, session.user_type);
    assert_eq!("/admin", session.home());
    Ok(())
}

#[tokio::test]
async fn test_login_without_token_fails() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .returning(|_| Ok(ApiResponse { status: StatusCode::OK, body: r#"{"token": ""}"#.to_string() }));

    let res = auth_service(transport)
        .login(LoginModel { email: "a@b.co".into(), password: "secret1".into() })
        .await;

    assert!(matches!(res, Err(Error::MissingToken)));
    Ok(())
}

#[tokio::test]
async fn test_user_type_is_verified_with_token() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| req.path == "/auth/verify" && req.token.as_deref() == Some("tok-2"))
        .returning(|_| Ok(ApiResponse { status: StatusCode::OK, body: r#"{"user_type": "USER"}"#.to_string() }));

    assert_eq!(UserType::User, auth_service(transport).user_type("tok-2").await?);
    Ok(())
}

#[test]
fn test_signup_form_validation() {
    let form = SignUpForm {
        username: "buyer".into(),
        email: "buyer@flexcrow".into(),
        phone: "+66812345678".into(),
        first_name: "Som".into(),
        last_name: "C".into(),
        password: "secret1".into(),
        confirm_password: "secret2".into(),
    };

    let errors = form.validate().unwrap_err();
    assert_eq!(Some("Invalid email format"), errors.get("email"));
    assert_eq!(Some("Last name must be 2-100 characters"), errors.get("last_name"));
    assert_eq!(Some("Passwords do not match"), errors.get("confirm_password"));
    assert!(!errors.contains("username"));
    assert!(!errors.contains("phone"));
}

#[test]
fn test_signin_requires_both_fields() {
    let errors = SignInForm::default().validate().unwrap_err();
    assert_eq!(Some("Email is required"), errors.get("email"));
    assert_eq!(Some("Password is required"), errors.get("password"));
}
