use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;

use crate::{
    api::query::{Owner, PageParams, PaginationInfo},
    auth::{middleware::AuthToken, DynAuthService},
    clock::DynClock,
    config::Config,
    enrichment::{NameResolver, Names},
    models::present,
    state::AppState,
    validations::{FieldErrors, Rejection},
    views::{
        format,
        models::{form_fields, ActionForm, Area, DetailPage, FormPage, Section, TablePage, TableRow},
        Views,
    },
};

use super::{error::Result, models::*, DynWithdrawalService};

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(admin_list))
        .route("/create", get(admin_create_page).post(admin_create))
        .route("/{withdrawal_id}", get(admin_view))
        .route("/{withdrawal_id}/edit", get(admin_edit_page).post(admin_edit))
        .route("/{withdrawal_id}/delete", post(admin_delete))
        .with_state(app_state)
}

pub fn member_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(member_list))
        .route("/create", get(member_create_page).post(member_create))
        .with_state(app_state)
}

/// Files a member's withdrawal request against their current balance
pub async fn request_withdrawal(
    svc: &DynWithdrawalService,
    token: &str,
    balance: Decimal,
    form: &WithdrawalForm,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate_request(balance)?;
    svc.create_withdrawal(token, payload)
        .await
        .map_err(|err| err.reject("Failed to create withdrawal. Please try again."))
}

///
/// Saves a withdrawal entered by an administrator: created when
/// `withdrawal_id` is `None`, updated otherwise.
///
pub async fn save_withdrawal(
    svc: &DynWithdrawalService,
    token: &str,
    withdrawal_id: Option<&str>,
    form: &WithdrawalForm,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate_admin(withdrawal_id.is_none())?;
    let res = match withdrawal_id {
        None => svc.create_withdrawal(token, payload).await,
        Some(id) => svc.update_withdrawal(token, id, payload).await,
    };
    res.map_err(|err| err.reject("Failed to save withdrawal. Please try again."))
}

fn admin_form(withdrawal_id: Option<&str>, form: &WithdrawalForm, errors: &FieldErrors) -> FormPage {
    let (title, action, specs) = match withdrawal_id {
        None => ("Create withdrawal", "/admin/withdrawals/create".to_string(), ADMIN_CREATE_FIELDS),
        Some(id) => ("Edit withdrawal", format!("/admin/withdrawals/{id}/edit"), ADMIN_EDIT_FIELDS),
    };
    FormPage::new(Area::Admin, title, action, form_fields(specs, form, errors)).cancel("/admin/withdrawals")
}

fn member_form(balance: Decimal, form: &WithdrawalForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(
        Area::Member,
        "Request withdrawal",
        "/member/withdrawals/create",
        form_fields(MEMBER_WITHDRAWAL_FIELDS, form, errors),
    )
    .note("Balance", format::money(balance))
    .submit("Request withdrawal")
    .cancel("/member/withdrawals")
}

fn table_rows(area: Area, withdrawals: &[Withdrawal], owners: Option<&Names>, now: DateTime<Utc>) -> Vec<TableRow> {
    withdrawals
        .iter()
        .map(|withdrawal| {
            let mut cells = vec![
                format::money_opt(withdrawal.amount),
                method_label(&withdrawal.method),
                format::text(&withdrawal.account),
                format::label(withdrawal.status),
                format::datetime_opt(withdrawal.created_at, now),
            ];
            if let Some(owners) = owners {
                cells.insert(0, owners.get(&withdrawal.user_id));
            }
            let href = match area {
                Area::Admin => format!("/admin/withdrawals/{}", withdrawal.withdrawal_id),
                _ => String::new(),
            };
            TableRow { href, cells }
        })
        .collect()
}

async fn admin_list(
    State(withdrawal_svc): State<DynWithdrawalService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page);
    let page = withdrawal_svc.list_withdrawals(&token, query.clone()).await?;
    let owners = names.user_names(&token, page.items.iter().map(|w| &w.user_id)).await;

    let table = TablePage::new(
        Area::Admin,
        "Withdrawals",
        "/admin/withdrawals",
        vec!["User", "Amount", "Method", "Account", "Status", "Created"],
        table_rows(Area::Admin, &page.items, Some(&owners), clock.utc_now()),
        PaginationInfo::of(&query, &page),
    )
    .action("Create withdrawal", "/admin/withdrawals/create");
    Ok(views.table(&table)?)
}

async fn admin_create_page(State(views): State<Views>) -> Result<Response> {
    Ok(views.form(&admin_form(None, &WithdrawalForm::default(), &FieldErrors::new()))?)
}

async fn admin_create(
    State(withdrawal_svc): State<DynWithdrawalService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<WithdrawalForm>,
) -> Result<Response> {
    match save_withdrawal(&withdrawal_svc, &token, None, &form).await {
        Ok(()) => Ok(Redirect::to("/admin/withdrawals").into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| admin_form(None, &form, e))?),
    }
}

async fn admin_view(
    State(withdrawal_svc): State<DynWithdrawalService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Path(withdrawal_id): Path<String>,
) -> Result<Response> {
    let withdrawal = withdrawal_svc.get_withdrawal(&token, &withdrawal_id).await?;
    let owner = names.user_name(&token, &withdrawal.user_id).await;
    let now = clock.utc_now();

    let section = Section::new("Withdrawal").row("Withdrawal ID", withdrawal.withdrawal_id.clone());
    let section = match present(&withdrawal.user_id) {
        Some(user_id) => section.link("User", owner, format!("/admin/users/{user_id}")),
        None => section.row("User", owner),
    };
    let section = section
        .row("Amount", format::money_opt(withdrawal.amount))
        .row("Method", method_label(&withdrawal.method))
        .row("Account", format::text(&withdrawal.account))
        .row("Status", format::label(withdrawal.status))
        .row("Created", format::datetime_opt(withdrawal.created_at, now))
        .row("Updated", format::datetime_opt(withdrawal.updated_at, now));

    let page = DetailPage::new(Area::Admin, format!("Withdrawal {}", withdrawal.withdrawal_id))
        .section(section)
        .link("Edit", format!("/admin/withdrawals/{withdrawal_id}/edit"))
        .link("Back to withdrawals", "/admin/withdrawals")
        .form(ActionForm::new("Delete withdrawal", format!("/admin/withdrawals/{withdrawal_id}/delete")).danger());
    Ok(views.detail(&page)?)
}

async fn admin_edit_page(
    State(withdrawal_svc): State<DynWithdrawalService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(withdrawal_id): Path<String>,
) -> Result<Response> {
    let withdrawal = withdrawal_svc.get_withdrawal(&token, &withdrawal_id).await?;
    let form = WithdrawalForm::from(&withdrawal);
    Ok(views.form(&admin_form(Some(&withdrawal_id), &form, &FieldErrors::new()))?)
}

async fn admin_edit(
    State(withdrawal_svc): State<DynWithdrawalService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(withdrawal_id): Path<String>,
    Form(form): Form<WithdrawalForm>,
) -> Result<Response> {
    match save_withdrawal(&withdrawal_svc, &token, Some(&withdrawal_id), &form).await {
        Ok(()) => Ok(Redirect::to(&format!("/admin/withdrawals/{withdrawal_id}")).into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| admin_form(Some(&withdrawal_id), &form, e))?),
    }
}

async fn admin_delete(
    State(withdrawal_svc): State<DynWithdrawalService>,
    AuthToken(token): AuthToken,
    Path(withdrawal_id): Path<String>,
) -> Result<Response> {
    withdrawal_svc.delete_withdrawal(&token, &withdrawal_id).await?;
    info!("Deleted withdrawal {}", withdrawal_id);
    Ok(Redirect::to("/admin/withdrawals").into_response())
}

async fn member_list(
    State(withdrawal_svc): State<DynWithdrawalService>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page).owned_by(Owner::current_user());
    let page = withdrawal_svc.list_withdrawals(&token, query.clone()).await?;

    let table = TablePage::new(
        Area::Member,
        "Withdrawals",
        "/member/withdrawals",
        vec!["Amount", "Method", "Account", "Status", "Created"],
        table_rows(Area::Member, &page.items, None, clock.utc_now()),
        PaginationInfo::of(&query, &page),
    )
    .action("Request withdrawal", "/member/withdrawals/create");
    Ok(views.table(&table)?)
}

async fn member_create_page(
    State(auth_svc): State<DynAuthService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
) -> Result<Response> {
    let user = auth_svc.current_user(&token).await?;
    Ok(views.form(&member_form(user.balance(), &WithdrawalForm::default(), &FieldErrors::new()))?)
}

async fn member_create(
    State(auth_svc): State<DynAuthService>,
    State(withdrawal_svc): State<DynWithdrawalService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<WithdrawalForm>,
) -> Result<Response> {
    let balance = auth_svc.current_user(&token).await?.balance();
    match request_withdrawal(&withdrawal_svc, &token, balance, &form).await {
        Ok(()) => {
            info!("Withdrawal of {} requested", form.amount.trim());
            Ok(Redirect::to("/member/withdrawals").into_response())
        }
        Err(rejection) => Ok(views.reject_form(rejection, |e| member_form(balance, &form, e))?),
    }
}
