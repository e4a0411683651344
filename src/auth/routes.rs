use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use log::{info, warn};

use crate::{
    response::{clear_session_cookie, session_cookie, SIGNIN_PATH},
    state::AppState,
    validations::{FieldErrors, Rejection},
    views::{
        models::{form_fields, Area, FormPage},
        Views,
    },
};

use super::{
    error::{Error, Result},
    middleware::token_from_headers,
    models::*,
    DynAuthService,
};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/signin", get(signin_page).post(signin))
        .route("/signup", get(signup_page).post(signup))
        .route("/signout", get(signout))
        .with_state(app_state)
}

fn signin_form(form: &SignInForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(Area::Guest, "Sign in", "/auth/signin", form_fields(SIGNIN_FIELDS, form, errors))
        .submit("Sign in")
}

fn signup_form(form: &SignUpForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(Area::Guest, "Sign up", "/auth/signup", form_fields(SIGNUP_FIELDS, form, errors))
        .submit("Create account")
        .cancel(SIGNIN_PATH)
}

/// Sends an already signed in browser to its home area
async fn signed_in_home(auth_svc: &DynAuthService, headers: &HeaderMap) -> Option<Redirect> {
    let token = token_from_headers(headers)?;
    let user_type = auth_svc.user_type(&token).await.ok()?;
    Some(Redirect::to(Session { token, user_type }.home()))
}

pub async fn signin_page(
    State(auth_svc): State<DynAuthService>,
    State(views): State<Views>,
    headers: HeaderMap,
) -> Result<Response> {
    if let Some(home) = signed_in_home(&auth_svc, &headers).await {
        return Ok(home.into_response());
    }
    Ok(views.form(&signin_form(&SignInForm::default(), &FieldErrors::new()))?)
}

pub async fn signin(
    State(auth_svc): State<DynAuthService>,
    State(views): State<Views>,
    Form(form): Form<SignInForm>,
) -> Result<Response> {
    let login = match form.validate() {
        Ok(login) => login,
        Err(errors) => return Ok(views.reject_form(errors.into(), |e| signin_form(&form, e))?),
    };

    match auth_svc.login(login).await {
        Ok(session) => {
            info!("Signed in a {} session", session.user_type);
            Ok((
                AppendHeaders([(SET_COOKIE, session_cookie(&session.token))]),
                Redirect::to(session.home()),
            )
                .into_response())
        }
        Err(Error::ApiError(err)) if err.status().is_some() => {
            warn!("Sign in refused: {}", err);
            let rejection = Rejection::Failed("Email or password is incorrect".to_string());
            Ok(views.reject_form(rejection, |e| signin_form(&form, e))?)
        }
        Err(err) => Err(err),
    }
}

pub async fn signup_page(State(views): State<Views>) -> Result<Response> {
    Ok(views.form(&signup_form(&SignUpForm::default(), &FieldErrors::new()))?)
}

pub async fn signup(
    State(auth_svc): State<DynAuthService>,
    State(views): State<Views>,
    Form(form): Form<SignUpForm>,
) -> Result<Response> {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => return Ok(views.reject_form(errors.into(), |e| signup_form(&form, e))?),
    };

    match auth_svc.sign_up(payload).await {
        Ok(()) => Ok(Redirect::to(SIGNIN_PATH).into_response()),
        Err(Error::ApiError(err)) => {
            let rejection = Rejection::from_api(&err, "Something went wrong! Please try again.");
            Ok(views.reject_form(rejection, |e| signup_form(&form, e))?)
        }
        Err(err) => Err(err),
    }
}

pub async fn signout() -> Response {
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Redirect::to(SIGNIN_PATH),
    )
        .into_response()
}
