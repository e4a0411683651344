use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use log::info;

use crate::{
    api::query::{PageParams, PaginationInfo},
    auth::{middleware::AuthToken, DynAuthService},
    clock::DynClock,
    config::Config,
    state::AppState,
    validations::{FieldErrors, Rejection},
    views::{
        format,
        models::{form_fields, ActionForm, Area, DetailPage, FieldSpec, FormPage, Section, TablePage, TableRow},
        Views,
    },
};

use super::{error::Result, models::*, DynUserService};

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/create", get(create_page).post(create))
        .route("/{user_id}", get(view_user))
        .route("/{user_id}/edit", get(edit_page).post(edit))
        .route("/{user_id}/delete", post(delete))
        .with_state(app_state)
}

pub fn settings_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(settings_page))
        .route("/profile", get(profile_page).post(profile))
        .route("/password", get(password_page).post(password))
        .with_state(app_state)
}

pub async fn create_user(svc: &DynUserService, token: &str, form: &UserForm) -> std::result::Result<(), Rejection> {
    let payload = form.validate_create()?;
    svc.create_user(token, payload)
        .await
        .map_err(|err| err.reject("Failed to create user. Please try again."))
}

pub async fn update_user(
    svc: &DynUserService,
    token: &str,
    user_id: &str,
    form: &UserForm,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate_update()?;
    svc.update_user(token, user_id, payload)
        .await
        .map_err(|err| err.reject("Failed to update user. Please try again."))
}

pub async fn update_profile(
    svc: &DynUserService,
    token: &str,
    user_id: &str,
    form: &ProfileForm,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate()?;
    svc.update_profile(token, user_id, payload)
        .await
        .map_err(|err| err.reject("Failed to update profile. Please try again."))
}

pub async fn change_password(
    svc: &DynUserService,
    token: &str,
    user_id: &str,
    form: &PasswordForm,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate()?;
    svc.change_password(token, user_id, payload)
        .await
        .map_err(|err| err.reject("Failed to change password. Please try again."))
}

fn user_form(title: &str, action: &str, specs: &[FieldSpec], form: &UserForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(Area::Admin, title, action, form_fields(specs, form, errors)).cancel("/admin/users")
}

async fn list_users(
    State(user_svc): State<DynUserService>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page);
    let page = user_svc.list_users(&token, query.clone()).await?;

    let rows = page
        .items
        .iter()
        .map(|user| TableRow {
            href: format!("/admin/users/{}", user.user_id),
            cells: vec![
                user.username().to_string(),
                user.full_name(),
                format::text(&user.email),
                format::label(user.user_type),
                format::label(user.status),
                format::money_opt(user.balance),
            ],
        })
        .collect();

    let table = TablePage::new(
        Area::Admin,
        "Users",
        "/admin/users",
        vec!["Username", "Name", "Email", "Type", "Status", "Balance"],
        rows,
        PaginationInfo::of(&query, &page),
    )
    .action("Create user", "/admin/users/create");
    Ok(views.table(&table)?)
}

async fn create_page(State(views): State<Views>) -> Result<Response> {
    let form = UserForm::default();
    Ok(views.form(&user_form("Create user", "/admin/users/create", USER_FIELDS, &form, &FieldErrors::new()))?)
}

async fn create(
    State(user_svc): State<DynUserService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<UserForm>,
) -> Result<Response> {
    match create_user(&user_svc, &token, &form).await {
        Ok(()) => {
            info!("Created user {}", form.username.trim());
            Ok(Redirect::to("/admin/users").into_response())
        }
        Err(rejection) => Ok(views.reject_form(rejection, |e| {
            user_form("Create user", "/admin/users/create", USER_FIELDS, &form, e)
        })?),
    }
}

async fn view_user(
    State(user_svc): State<DynUserService>,
    State(views): State<Views>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Path(user_id): Path<String>,
) -> Result<Response> {
    let user = user_svc.get_user(&token, &user_id).await?;
    let now = clock.utc_now();

    let page = DetailPage::new(Area::Admin, format!("User {}", user.username()))
        .section(
            Section::new("Account")
                .row("User ID", user.user_id.clone())
                .row("Username", user.username())
                .row("Email", format::text(&user.email))
                .row("Type", format::label(user.user_type))
                .row("Status", format::label(user.status))
                .row("Balance", format::money(user.balance())),
        )
        .section(
            Section::new("Profile")
                .row("First name", format::text(&user.first_name))
                .row("Last name", format::text(&user.last_name))
                .row("Phone number", format::text(&user.phone)),
        )
        .section(
            Section::new("Record")
                .row("Created", format::datetime_opt(user.created_at, now))
                .row("Updated", format::datetime_opt(user.updated_at, now)),
        )
        .link("Edit", format!("/admin/users/{user_id}/edit"))
        .link("Back to users", "/admin/users")
        .form(ActionForm::new("Delete user", format!("/admin/users/{user_id}/delete")).danger());
    Ok(views.detail(&page)?)
}

async fn edit_page(
    State(user_svc): State<DynUserService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(user_id): Path<String>,
) -> Result<Response> {
    let user = user_svc.get_user(&token, &user_id).await?;
    let action = format!("/admin/users/{user_id}/edit");
    let form = UserForm::from(&user);
    Ok(views.form(&user_form("Edit user", &action, USER_EDIT_FIELDS, &form, &FieldErrors::new()))?)
}

async fn edit(
    State(user_svc): State<DynUserService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(user_id): Path<String>,
    Form(form): Form<UserForm>,
) -> Result<Response> {
    match update_user(&user_svc, &token, &user_id, &form).await {
        Ok(()) => Ok(Redirect::to(&format!("/admin/users/{user_id}")).into_response()),
        Err(rejection) => {
            let action = format!("/admin/users/{user_id}/edit");
            Ok(views.reject_form(rejection, |e| user_form("Edit user", &action, USER_EDIT_FIELDS, &form, e))?)
        }
    }
}

async fn delete(
    State(user_svc): State<DynUserService>,
    AuthToken(token): AuthToken,
    Path(user_id): Path<String>,
) -> Result<Response> {
    user_svc.delete_user(&token, &user_id).await?;
    info!("Deleted user {}", user_id);
    Ok(Redirect::to("/admin/users").into_response())
}

fn profile_form(form: &ProfileForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(Area::Member, "Edit profile", "/member/settings/profile", form_fields(PROFILE_FIELDS, form, errors))
        .cancel("/member/settings")
}

fn password_form(form: &PasswordForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(Area::Member, "Change password", "/member/settings/password", form_fields(PASSWORD_FIELDS, form, errors))
        .submit("Change password")
        .cancel("/member/settings")
}

async fn settings_page(
    State(auth_svc): State<DynAuthService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
) -> Result<Response> {
    let user = auth_svc.current_user(&token).await?;

    let page = DetailPage::new(Area::Member, "Settings")
        .section(
            Section::new("Account")
                .row("Username", user.username())
                .row("Email", format::text(&user.email))
                .row("Balance", format::money(user.balance())),
        )
        .section(
            Section::new("Profile")
                .row("First name", format::text(&user.first_name))
                .row("Last name", format::text(&user.last_name))
                .row("Phone number", format::text(&user.phone)),
        )
        .link("Edit profile", "/member/settings/profile")
        .link("Change password", "/member/settings/password");
    Ok(views.detail(&page)?)
}

async fn profile_page(
    State(auth_svc): State<DynAuthService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
) -> Result<Response> {
    let user = auth_svc.current_user(&token).await?;
    Ok(views.form(&profile_form(&ProfileForm::from(&user), &FieldErrors::new()))?)
}

async fn profile(
    State(auth_svc): State<DynAuthService>,
    State(user_svc): State<DynUserService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let user = auth_svc.current_user(&token).await?;
    match update_profile(&user_svc, &token, &user.user_id, &form).await {
        Ok(()) => Ok(Redirect::to("/member/settings").into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| profile_form(&form, e))?),
    }
}

async fn password_page(State(views): State<Views>) -> Result<Response> {
    Ok(views.form(&password_form(&PasswordForm::default(), &FieldErrors::new()))?)
}

async fn password(
    State(auth_svc): State<DynAuthService>,
    State(user_svc): State<DynUserService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<PasswordForm>,
) -> Result<Response> {
    let user = auth_svc.current_user(&token).await?;
    match change_password(&user_svc, &token, &user.user_id, &form).await {
        Ok(()) => {
            info!("Password changed for user {}", user.user_id);
            Ok(Redirect::to("/member/settings").into_response())
        }
        Err(rejection) => Ok(views.reject_form(rejection, |e| password_form(&form, e))?),
    }
}
