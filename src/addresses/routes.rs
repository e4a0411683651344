use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use log::info;

use crate::{
    api::query::{ListQuery, Owner, PageParams, PaginationInfo},
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

use super::{error::Result, models::*, DynAddressService};

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(admin_list))
        .route("/create", get(admin_create_page).post(admin_create))
        .route("/{address_id}", get(admin_view))
        .route("/{address_id}/edit", get(admin_edit_page).post(admin_edit))
        .route("/{address_id}/delete", post(admin_delete))
        .with_state(app_state)
}

pub fn member_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(member_list))
        .route("/create", get(member_create_page).post(member_create))
        .route("/{address_id}", get(member_view))
        .route("/{address_id}/edit", get(member_edit_page).post(member_edit))
        .route("/{address_id}/remove", post(member_remove))
        .with_state(app_state)
}

///
/// Validates and saves an address: created when `address_id` is
/// `None`, updated otherwise.
///
pub async fn save_address(
    svc: &DynAddressService,
    token: &str,
    address_id: Option<&str>,
    form: &AddressForm,
    admin: bool,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate(admin)?;
    let res = match address_id {
        None => svc.create_address(token, payload).await,
        Some(id) => svc.update_address(token, id, payload).await,
    };
    res.map_err(|err| err.reject("Failed to save address. Please try again."))
}

fn area_root(area: Area) -> String {
    format!("{}/addresses", area.root())
}

fn address_form(area: Area, title: &str, action: &str, form: &AddressForm, errors: &FieldErrors) -> FormPage {
    let specs = match area {
        Area::Admin => ADMIN_ADDRESS_FIELDS,
        _ => MEMBER_ADDRESS_FIELDS,
    };
    FormPage::new(area, title, action, form_fields(specs, form, errors)).cancel(area_root(area))
}

fn table_rows(area: Area, addresses: &[Address], owners: Option<&Names>) -> Vec<TableRow> {
    addresses
        .iter()
        .map(|address| {
            let mut cells = vec![
                format::text(&address.name),
                format::text(&address.full_name),
                format::label(address.address_type),
                address.one_line(),
            ];
            if let Some(owners) = owners {
                cells.insert(0, owners.get(&address.user_id));
                cells.push(format::label(address.status));
            }
            TableRow { href: format!("{}/{}", area_root(area), address.address_id), cells }
        })
        .collect()
}

fn address_section(address: &Address) -> Section {
    Section::new("Address")
        .row("Name", format::text(&address.name))
        .row("Type", format::label(address.address_type))
        .row("Recipient’s Name", format::text(&address.full_name))
        .row("Phone number", format::text(&address.phone))
        .row("Address 1", format::text(&address.address_1))
        .row("Address 2", format::text(&address.address_2))
        .row("Subdistrict", format::text(&address.subdistrict))
        .row("District", format::text(&address.district))
        .row("Province", format::text(&address.province))
        .row("Country", format::text(&address.country))
        .row("Postal code", format::text(&address.postal_code))
}

async fn admin_list(
    State(address_svc): State<DynAddressService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page);
    let page = address_svc.list_addresses(&token, query.clone()).await?;
    let owners = names.user_names(&token, page.items.iter().map(|a| &a.user_id)).await;

    let table = TablePage::new(
        Area::Admin,
        "Addresses",
        "/admin/addresses",
        vec!["User", "Name", "Recipient", "Type", "Address", "Status"],
        table_rows(Area::Admin, &page.items, Some(&owners)),
        PaginationInfo::of(&query, &page),
    )
    .action("Create address", "/admin/addresses/create");
    Ok(views.table(&table)?)
}

async fn admin_create_page(State(views): State<Views>) -> Result<Response> {
    let page = address_form(Area::Admin, "Create address", "/admin/addresses/create", &AddressForm::default(), &FieldErrors::new());
    Ok(views.form(&page)?)
}

async fn admin_create(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match save_address(&address_svc, &token, None, &form, true).await {
        Ok(()) => Ok(Redirect::to("/admin/addresses").into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| {
            address_form(Area::Admin, "Create address", "/admin/addresses/create", &form, e)
        })?),
    }
}

async fn admin_view(
    State(address_svc): State<DynAddressService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
) -> Result<Response> {
    let address = address_svc.get_address(&token, &address_id).await?;
    let owner = names.user_name(&token, &address.user_id).await;
    let now = clock.utc_now();

    let mut owner_section = Section::new("Record").row("Address ID", address.address_id.clone());
    owner_section = match present(&address.user_id) {
        Some(user_id) => owner_section.link("User", owner, format!("/admin/users/{user_id}")),
        None => owner_section.row("User", owner),
    };
    let owner_section = owner_section
        .row("Status", format::label(address.status))
        .row("Created", format::datetime_opt(address.created_at, now))
        .row("Updated", format::datetime_opt(address.updated_at, now));

    let page = DetailPage::new(Area::Admin, format!("Address {}", format::text(&address.name)))
        .section(owner_section)
        .section(address_section(&address))
        .link("Edit", format!("/admin/addresses/{address_id}/edit"))
        .link("Back to addresses", "/admin/addresses")
        .form(ActionForm::new("Delete address", format!("/admin/addresses/{address_id}/delete")).danger());
    Ok(views.detail(&page)?)
}

async fn admin_edit_page(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
) -> Result<Response> {
    let address = address_svc.get_address(&token, &address_id).await?;
    let action = format!("/admin/addresses/{address_id}/edit");
    let page = address_form(Area::Admin, "Edit address", &action, &AddressForm::from(&address), &FieldErrors::new());
    Ok(views.form(&page)?)
}

async fn admin_edit(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match save_address(&address_svc, &token, Some(&address_id), &form, true).await {
        Ok(()) => Ok(Redirect::to(&format!("/admin/addresses/{address_id}")).into_response()),
        Err(rejection) => {
            let action = format!("/admin/addresses/{address_id}/edit");
            Ok(views.reject_form(rejection, |e| address_form(Area::Admin, "Edit address", &action, &form, e))?)
        }
    }
}

async fn admin_delete(
    State(address_svc): State<DynAddressService>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
) -> Result<Response> {
    address_svc.delete_address(&token, &address_id).await?;
    info!("Deleted address {}", address_id);
    Ok(Redirect::to("/admin/addresses").into_response())
}

async fn member_list(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query: ListQuery = params.list_query(config.records_per_page).owned_by(Owner::current_user());
    let page = address_svc.list_addresses(&token, query.clone()).await?;

    let table = TablePage::new(
        Area::Member,
        "Addresses",
        "/member/addresses",
        vec!["Name", "Recipient", "Type", "Address"],
        table_rows(Area::Member, &page.items, None),
        PaginationInfo::of(&query, &page),
    )
    .action("Add address", "/member/addresses/create");
    Ok(views.table(&table)?)
}

async fn member_create_page(State(views): State<Views>) -> Result<Response> {
    let page = address_form(Area::Member, "Add address", "/member/addresses/create", &AddressForm::default(), &FieldErrors::new());
    Ok(views.form(&page)?)
}

async fn member_create(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match save_address(&address_svc, &token, None, &form, false).await {
        Ok(()) => Ok(Redirect::to("/member/addresses").into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| {
            address_form(Area::Member, "Add address", "/member/addresses/create", &form, e)
        })?),
    }
}

async fn member_view(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
) -> Result<Response> {
    let address = address_svc.get_address(&token, &address_id).await?;

    let mut page = DetailPage::new(Area::Member, format!("Address {}", format::text(&address.name)))
        .section(address_section(&address))
        .link("Back to addresses", "/member/addresses");
    if address.is_active() {
        page = page
            .link("Edit", format!("/member/addresses/{address_id}/edit"))
            .form(ActionForm::new("Remove address", format!("/member/addresses/{address_id}/remove")).danger());
    }
    Ok(views.detail(&page)?)
}

async fn member_edit_page(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
) -> Result<Response> {
    let address = address_svc.get_address(&token, &address_id).await?;
    let action = format!("/member/addresses/{address_id}/edit");
    let page = address_form(Area::Member, "Edit address", &action, &AddressForm::from(&address), &FieldErrors::new());
    Ok(views.form(&page)?)
}

async fn member_edit(
    State(address_svc): State<DynAddressService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match save_address(&address_svc, &token, Some(&address_id), &form, false).await {
        Ok(()) => Ok(Redirect::to(&format!("/member/addresses/{address_id}")).into_response()),
        Err(rejection) => {
            let action = format!("/member/addresses/{address_id}/edit");
            Ok(views.reject_form(rejection, |e| address_form(Area::Member, "Edit address", &action, &form, e))?)
        }
    }
}

async fn member_remove(
    State(address_svc): State<DynAddressService>,
    AuthToken(token): AuthToken,
    Path(address_id): Path<String>,
) -> Result<Response> {
    address_svc.remove_address(&token, &address_id).await?;
    info!("Removed address {}", address_id);
    Ok(Redirect::to("/member/addresses").into_response())
}
