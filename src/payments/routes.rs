use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use log::info;

use crate::{
    api::query::{Owner, PageParams, PaginationInfo},
    auth::middleware::AuthToken,
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

use super::{error::Result, models::*, DynPaymentService};

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(admin_list))
        .route("/{payment_id}", get(admin_view))
        .route("/{payment_id}/edit", get(edit_page).post(edit))
        .route("/{payment_id}/delete", post(delete))
        .with_state(app_state)
}

pub fn member_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(member_list))
        .with_state(app_state)
}

pub async fn update_payment(
    svc: &DynPaymentService,
    token: &str,
    payment_id: &str,
    form: &PaymentForm,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate()?;
    svc.update_payment(token, payment_id, payload)
        .await
        .map_err(|err| err.reject("Failed to update payment. Please try again."))
}

fn payment_form(payment_id: &str, form: &PaymentForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(
        Area::Admin,
        "Edit payment",
        format!("/admin/payments/{payment_id}/edit"),
        form_fields(PAYMENT_FIELDS, form, errors),
    )
    .cancel(format!("/admin/payments/{payment_id}"))
}

fn table_rows(area: Area, payments: &[Payment], owners: Option<&Names>, now: chrono::DateTime<chrono::Utc>) -> Vec<TableRow> {
    payments
        .iter()
        .map(|payment| {
            let mut cells = vec![
                format::money_opt(payment.amount),
                payment.method_label(),
                format::label(payment.status),
                format::datetime_opt(payment.created_at, now),
            ];
            if let Some(owners) = owners {
                cells.insert(0, owners.get(&payment.user_id));
            }
            let href = match area {
                Area::Admin => format!("/admin/payments/{}", payment.payment_id),
                _ => String::new(),
            };
            TableRow { href, cells }
        })
        .collect()
}

async fn admin_list(
    State(payment_svc): State<DynPaymentService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page);
    let page = payment_svc.list_payments(&token, query.clone()).await?;
    let owners = names.user_names(&token, page.items.iter().map(|p| &p.user_id)).await;

    let table = TablePage::new(
        Area::Admin,
        "Payments",
        "/admin/payments",
        vec!["User", "Amount", "Method", "Status", "Created"],
        table_rows(Area::Admin, &page.items, Some(&owners), clock.utc_now()),
        PaginationInfo::of(&query, &page),
    );
    Ok(views.table(&table)?)
}

async fn admin_view(
    State(payment_svc): State<DynPaymentService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Path(payment_id): Path<String>,
) -> Result<Response> {
    let payment = payment_svc.get_payment(&token, &payment_id).await?;
    let owner = names.user_name(&token, &payment.user_id).await;
    let now = clock.utc_now();

    let section = Section::new("Payment").row("Payment ID", payment.payment_id.clone());
    let section = match present(&payment.user_id) {
        Some(user_id) => section.link("User", owner, format!("/admin/users/{user_id}")),
        None => section.row("User", owner),
    };
    let section = section
        .row("Amount", format::money_opt(payment.amount))
        .row("Method", payment.method_label())
        .row("Status", format::label(payment.status))
        .row("Created", format::datetime_opt(payment.created_at, now))
        .row("Updated", format::datetime_opt(payment.updated_at, now));

    let page = DetailPage::new(Area::Admin, format!("Payment {}", payment.payment_id))
        .section(section)
        .link("Edit", format!("/admin/payments/{payment_id}/edit"))
        .link("Back to payments", "/admin/payments")
        .form(ActionForm::new("Delete payment", format!("/admin/payments/{payment_id}/delete")).danger());
    Ok(views.detail(&page)?)
}

async fn edit_page(
    State(payment_svc): State<DynPaymentService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(payment_id): Path<String>,
) -> Result<Response> {
    let payment = payment_svc.get_payment(&token, &payment_id).await?;
    Ok(views.form(&payment_form(&payment_id, &PaymentForm::from(&payment), &FieldErrors::new()))?)
}

async fn edit(
    State(payment_svc): State<DynPaymentService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(payment_id): Path<String>,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    match update_payment(&payment_svc, &token, &payment_id, &form).await {
        Ok(()) => Ok(Redirect::to(&format!("/admin/payments/{payment_id}")).into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| payment_form(&payment_id, &form, e))?),
    }
}

async fn delete(
    State(payment_svc): State<DynPaymentService>,
    AuthToken(token): AuthToken,
    Path(payment_id): Path<String>,
) -> Result<Response> {
    payment_svc.delete_payment(&token, &payment_id).await?;
    info!("Deleted payment {}", payment_id);
    Ok(Redirect::to("/admin/payments").into_response())
}

async fn member_list(
    State(payment_svc): State<DynPaymentService>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page).owned_by(Owner::current_user());
    let page = payment_svc.list_payments(&token, query.clone()).await?;

    let table = TablePage::new(
        Area::Member,
        "Payments",
        "/member/payments",
        vec!["Amount", "Method", "Status", "Created"],
        table_rows(Area::Member, &page.items, None, clock.utc_now()),
        PaginationInfo::of(&query, &page),
    );
    Ok(views.table(&table)?)
}
