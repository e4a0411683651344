use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{DateTime, Utc};
use log::info;

use crate::{
    api::query::{ListQuery, Owner, PageParams, PaginationInfo},
    auth::middleware::AuthToken,
    clock::DynClock,
    config::Config,
    enrichment::NameResolver,
    files::{self, multipart::MultipartForm},
    models::present,
    products::{models::Product, DynProductService},
    response::signin_redirect,
    state::AppState,
    users::models::User,
    validations::{FieldErrors, Rejection},
    views::{
        format,
        models::{form_fields, ActionForm, Area, DetailPage, FormPage, Media, Section, TablePage, TableRow},
        Views,
    },
};

use super::{
    actions::{available_actions, Action, Role},
    error::{Error, Result},
    fees::settlement,
    lifecycle::{default_address, Lifecycle},
    models::*,
    step::Progress,
    DynTransactionService,
};

/// Products offered on the create form, enough for any member's catalogue
const PRODUCT_CHOICES: u64 = 100;

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(admin_list))
        .route("/create", get(admin_create_page).post(admin_create))
        .route("/{transaction_id}", get(admin_view))
        .route("/{transaction_id}/delete", post(admin_delete))
        .with_state(app_state)
}

pub fn member_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/member/transactions/sell") }))
        .route("/sell", get(sell_list))
        .route("/buy", get(buy_list))
        .route("/create", get(member_create_page).post(member_create))
        .route("/sell/{transaction_id}", get(seller_view))
        .route("/sell/{transaction_id}/ship", post(seller_ship))
        .route("/sell/{transaction_id}/{action}", post(seller_action))
        .route("/buy/{transaction_id}", get(buyer_view))
        .route("/buy/{transaction_id}/{action}", post(buyer_action))
        .with_state(app_state)
}

/// Validates a transaction entered by an administrator and creates it
pub async fn create_transaction(
    svc: &DynTransactionService,
    token: &str,
    form: &TransactionForm,
) -> std::result::Result<(), Rejection> {
    let payload = form.validate_admin()?;
    svc.create_transaction(token, payload)
        .await
        .map_err(|err| err.reject("Failed to create transaction. Please try again."))
}

fn progress_text(tx: &Transaction) -> String {
    let progress = Progress::of(tx);
    match progress.number() {
        0 => progress.label().to_string(),
        n => format!("{n}. {}", progress.label()),
    }
}

fn admin_form(form: &TransactionForm, errors: &FieldErrors) -> FormPage {
    FormPage::new(
        Area::Admin,
        "Create transaction",
        "/admin/transactions/create",
        form_fields(ADMIN_TRANSACTION_FIELDS, form, errors),
    )
    .cancel("/admin/transactions")
}

fn member_form(form: &TransactionForm, errors: &FieldErrors, products: &[Product]) -> FormPage {
    let options = std::iter::once((String::new(), "Select a product".to_string()))
        .chain(
            products
                .iter()
                .filter(|p| p.is_active())
                .map(|p| (p.product_id.clone(), format!("{} ({})", p.display_name(), format::money(p.price())))),
        )
        .collect();

    FormPage::new(
        Area::Member,
        "Create transaction",
        "/member/transactions/create",
        form_fields(MEMBER_TRANSACTION_FIELDS, form, errors),
    )
    .options("product_id", options)
    .note("Platform fee", "2% up to 100, 5% up to 200, 8% above")
    .submit("Send offer")
    .cancel("/member/transactions/sell")
}

///
/// Sections shared by every transaction page. `price` is the unit
/// price of the product, when it could be loaded.
///
fn transaction_sections(tx: &Transaction, price: Option<rust_decimal::Decimal>, now: DateTime<Utc>) -> Vec<Section> {
    let overview = Section::new("Transaction")
        .row("Transaction ID", tx.transaction_id.clone())
        .row("Progress", progress_text(tx))
        .row("Status", format::label(tx.status))
        .row("Type", format::label(tx.transaction_type))
        .row("Quantity", tx.quantity().to_string())
        .row("Created", format::datetime_opt(tx.created_at, now))
        .row("Updated", format::datetime_opt(tx.updated_at, now));

    let delivery = if tx.is_digital() {
        Section::new("Delivery")
            .row("Delivery details", format::text(&tx.delivered_details))
            .row("Delivered", format::datetime_opt(tx.delivered_at, now))
    } else {
        Section::new("Shipping")
            .row("Shipping service", format::text(&tx.shipping))
            .row("Shipping price", format::money(tx.shipping_price()))
            .row("Shipping number", format::text(&tx.shipping_number))
            .row("Shipping details", format::text(&tx.shipping_details))
            .row("Delivered", format::datetime_opt(tx.delivered_at, now))
    };

    let mut payment = Section::new("Payment")
        .row("Fee", format::money(tx.fee()))
        .row("Fee type", tx.fee_type().label());
    payment = match price {
        Some(price) => {
            let payment = payment.row("Unit price", format::money(price));
            match settlement(tx, price) {
                Some(settlement) => payment
                    .row("Buyer pays", format::money(settlement.buyer))
                    .row("Seller receives", format::money(settlement.seller)),
                None => payment.row("Buyer pays", format::EMPTY).row("Seller receives", format::EMPTY),
            }
        }
        None => payment.row("Unit price", format::EMPTY),
    };

    vec![overview, delivery, payment]
}

fn shipping_media_ids(tx: &Transaction) -> Vec<String> {
    present(&tx.shipping_image_id).map(str::to_string).into_iter().collect()
}

async fn admin_list(
    State(tx_svc): State<DynTransactionService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page);
    let page = tx_svc.list_transactions(&token, query.clone()).await?;

    let parties = page.items.iter().flat_map(|tx| [&tx.user_id, &tx.customer_id]);
    let (users, products) = futures::join!(
        names.user_names(&token, parties),
        names.product_names(&token, page.items.iter().map(|tx| &tx.product_id)),
    );
    let now = clock.utc_now();

    let rows = page
        .items
        .iter()
        .map(|tx| TableRow {
            href: format!("/admin/transactions/{}", tx.transaction_id),
            cells: vec![
                products.get(&tx.product_id),
                users.get(&tx.user_id),
                users.get(&tx.customer_id),
                format::label(tx.transaction_type),
                progress_text(tx),
                format::datetime_opt(tx.created_at, now),
            ],
        })
        .collect();

    let table = TablePage::new(
        Area::Admin,
        "Transactions",
        "/admin/transactions",
        vec!["Product", "Seller", "Buyer", "Type", "Progress", "Created"],
        rows,
        PaginationInfo::of(&query, &page),
    )
    .action("Create transaction", "/admin/transactions/create");
    Ok(views.table(&table)?)
}

async fn admin_create_page(State(views): State<Views>) -> Result<Response> {
    Ok(views.form(&admin_form(&TransactionForm::default(), &FieldErrors::new()))?)
}

async fn admin_create(
    State(tx_svc): State<DynTransactionService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<TransactionForm>,
) -> Result<Response> {
    match create_transaction(&tx_svc, &token, &form).await {
        Ok(()) => Ok(Redirect::to("/admin/transactions").into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| admin_form(&form, e))?),
    }
}

async fn admin_view(
    State(lifecycle): State<Lifecycle>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(transaction_id): Path<String>,
) -> Result<Response> {
    let tx = lifecycle.tx_svc.get_transaction(&token, &transaction_id, None).await?;
    let product_id = present(&tx.product_id).unwrap_or_default();
    let media_ids = shipping_media_ids(&tx);
    let (users, product, media) = futures::join!(
        lifecycle.names.user_names(&token, [&tx.user_id, &tx.customer_id]),
        lifecycle.product_svc.get_product(&token, product_id),
        files::media(&lifecycle.file_svc, &token, &media_ids),
    );
    let product = product.ok();
    let now = lifecycle.clock.utc_now();

    let mut links = Section::new("Records");
    for (label, id, base) in [
        ("Seller", &tx.user_id, "/admin/users"),
        ("Buyer", &tx.customer_id, "/admin/users"),
    ] {
        links = match present(id) {
            Some(id) => links.link(label, users.get(&Some(id.to_string())), format!("{base}/{id}")),
            None => links.row(label, format::EMPTY),
        };
    }
    let product_name = product.as_ref().map_or_else(|| format::EMPTY.to_string(), |p| p.display_name().to_string());
    for (label, value, id, base) in [
        ("Product", product_name, &tx.product_id, "/admin/products"),
        ("Address", format::text(&tx.address_id), &tx.address_id, "/admin/addresses"),
        ("Payment", format::text(&tx.payment_id), &tx.payment_id, "/admin/payments"),
    ] {
        links = match present(id) {
            Some(id) => links.link(label, value, format!("{base}/{id}")),
            None => links.row(label, value),
        };
    }

    let mut page = DetailPage::new(Area::Admin, format!("Transaction {transaction_id}"))
        .link("Back to transactions", "/admin/transactions")
        .form(ActionForm::new("Delete transaction", format!("/admin/transactions/{transaction_id}/delete")).danger());
    for section in transaction_sections(&tx, product.as_ref().map(Product::price), now) {
        page = page.section(section);
    }
    page = page.section(links);
    page.stepper = Some(Progress::of(&tx).stepper(tx.transaction_type));
    page.media = media;
    Ok(views.detail(&page)?)
}

async fn admin_delete(
    State(tx_svc): State<DynTransactionService>,
    AuthToken(token): AuthToken,
    Path(transaction_id): Path<String>,
) -> Result<Response> {
    tx_svc.delete_transaction(&token, &transaction_id).await?;
    info!("Deleted transaction {}", transaction_id);
    Ok(Redirect::to("/admin/transactions").into_response())
}

#[allow(clippy::too_many_arguments)]
async fn member_list(
    role: Role,
    tx_svc: &DynTransactionService,
    names: &NameResolver,
    views: &Views,
    config: &Config,
    now: DateTime<Utc>,
    token: &str,
    params: PageParams,
) -> Result<Response> {
    let owner = match role {
        Role::Seller => Owner::current_user(),
        Role::Buyer => Owner::current_customer(),
    };
    let query = params.list_query(config.records_per_page).owned_by(owner);
    let page = tx_svc.list_transactions(token, query.clone()).await?;

    let other_party = |tx: &Transaction| match role {
        Role::Seller => tx.customer_id.clone(),
        Role::Buyer => tx.user_id.clone(),
    };
    let parties: Vec<Option<String>> = page.items.iter().map(other_party).collect();
    let (users, products) = futures::join!(
        names.user_names(token, &parties),
        names.product_names(token, page.items.iter().map(|tx| &tx.product_id)),
    );

    let rows = page
        .items
        .iter()
        .zip(&parties)
        .map(|(tx, party)| TableRow {
            href: format!("{}/{}", role.area_path(), tx.transaction_id),
            cells: vec![
                products.get(&tx.product_id),
                users.get(party),
                format::label(tx.transaction_type),
                progress_text(tx),
                format::datetime_opt(tx.created_at, now),
            ],
        })
        .collect();

    let (title, party_column) = match role {
        Role::Seller => ("Selling", "Buyer"),
        Role::Buyer => ("Buying", "Seller"),
    };
    let table = TablePage::new(
        Area::Member,
        title,
        role.area_path(),
        vec!["Product", party_column, "Type", "Progress", "Created"],
        rows,
        PaginationInfo::of(&query, &page),
    )
    .action("Create transaction", "/member/transactions/create");
    Ok(views.table(&table)?)
}

async fn sell_list(
    State(tx_svc): State<DynTransactionService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    member_list(Role::Seller, &tx_svc, &names, &views, &config, clock.utc_now(), &token, params).await
}

async fn buy_list(
    State(tx_svc): State<DynTransactionService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    member_list(Role::Buyer, &tx_svc, &names, &views, &config, clock.utc_now(), &token, params).await
}

async fn own_products(product_svc: &DynProductService, token: &str) -> Vec<Product> {
    let query = ListQuery::new(1, PRODUCT_CHOICES).owned_by(Owner::current_user());
    match product_svc.list_products(token, query).await {
        Ok(page) => page.items,
        Err(err) => {
            log::warn!("Could not load products for the offer form: {}", err);
            vec![]
        }
    }
}

async fn member_create_page(
    State(product_svc): State<DynProductService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
) -> Result<Response> {
    let products = own_products(&product_svc, &token).await;
    Ok(views.form(&member_form(&TransactionForm::default(), &FieldErrors::new(), &products))?)
}

async fn member_create(
    State(lifecycle): State<Lifecycle>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Form(form): Form<TransactionForm>,
) -> Result<Response> {
    let me = lifecycle.auth_svc.current_user(&token).await?;
    match lifecycle.create_offer(&token, &me, &form).await {
        Ok(()) => Ok(Redirect::to("/member/transactions/sell").into_response()),
        Err(rejection) => {
            let products = own_products(&lifecycle.product_svc, &token).await;
            Ok(views.reject_form(rejection, |e| member_form(&form, e, &products))?)
        }
    }
}

/// Looked up to show one transaction to one of its parties
#[derive(Debug, Default)]
pub struct MemberContext {
    pub product: Option<Product>,
    pub other_party: String,
    pub addresses: Vec<(String, String)>,
    pub default_address: Option<String>,
    pub media: Vec<Media>,
}

/// What was posted, when the page is shown again after an action
#[derive(Debug, Default)]
pub struct Submitted {
    pub action: Option<Action>,
    pub form: StepForm,
    pub rejection: Option<Rejection>,
    pub notice: Option<&'static str>,
}

impl Submitted {
    pub fn failed(action: Action, form: StepForm, rejection: Rejection) -> Self {
        Self { action: Some(action), form, rejection: Some(rejection), notice: None }
    }

    fn errors_for(&self, action: Action) -> FieldErrors {
        match (&self.rejection, self.action) {
            (Some(rejection), Some(failed)) if failed == action => rejection.field_errors(),
            _ => FieldErrors::new(),
        }
    }
}

async fn member_context(lifecycle: &Lifecycle, token: &str, role: Role, tx: &Transaction, me: &User) -> MemberContext {
    let other_party = match role {
        Role::Seller => &tx.customer_id,
        Role::Buyer => &tx.user_id,
    };
    let needs_address = role == Role::Buyer && !tx.is_digital() && available_actions(role, Progress::of(tx)).contains(&Action::Accept);
    let address_query = ListQuery::new(1, PRODUCT_CHOICES).owned_by(Owner::current_user());
    let product_id = present(&tx.product_id).unwrap_or_default();
    let media_ids = shipping_media_ids(tx);

    let (product, name, addresses, media) = futures::join!(
        lifecycle.product_svc.get_product(token, product_id),
        lifecycle.names.user_name(token, other_party),
        async {
            match needs_address {
                true => lifecycle.address_svc.list_addresses(token, address_query).await.map(|p| p.items).unwrap_or_default(),
                false => vec![],
            }
        },
        files::media(&lifecycle.file_svc, token, &media_ids),
    );

    MemberContext {
        product: product.ok(),
        other_party: name,
        default_address: default_address(&addresses, &me.address_id),
        addresses: address_options(&addresses),
        media,
    }
}

fn action_form(role: Role, tx: &Transaction, action: Action, ctx: &MemberContext, submitted: &Submitted) -> ActionForm {
    let href = format!("{}/{}/{}", role.area_path(), tx.transaction_id, action.slug());
    let form = ActionForm::new(action.label(), href);
    let errors = submitted.errors_for(action);
    let values = &submitted.form;

    match action {
        Action::Accept if !tx.is_digital() => {
            let address_id = match values.address_id.trim() {
                "" => ctx.default_address.clone().unwrap_or_default(),
                chosen => chosen.to_string(),
            };
            let values = StepForm { address_id, ..values.clone() };
            form.fields(form_fields(ACCEPT_FIELDS, &values, &errors))
                .options("address_id", ctx.addresses.clone())
        }
        Action::Ship => form.fields(form_fields(SHIP_FIELDS, values, &errors)),
        Action::DeliverDigital => form.fields(form_fields(DELIVER_FIELDS, values, &errors)),
        Action::Help => form.fields(form_fields(MESSAGE_FIELDS, values, &errors)),
        Action::Dispute | Action::RequestCancellation => form.fields(form_fields(MESSAGE_FIELDS, values, &errors)).danger(),
        Action::Reject => form.danger(),
        _ => form,
    }
}

///
/// The page one party of a transaction sees: its progress, the
/// details and a form for every action open to them at this step.
///
pub fn member_page(
    role: Role,
    tx: &Transaction,
    ctx: &MemberContext,
    submitted: &Submitted,
    now: DateTime<Utc>,
) -> DetailPage {
    let progress = Progress::of(tx);
    let (party_label, list_label) = match role {
        Role::Seller => ("Buyer", "Back to selling"),
        Role::Buyer => ("Seller", "Back to buying"),
    };
    let product_name = ctx.product.as_ref().map_or_else(|| format::EMPTY.to_string(), |p| p.display_name().to_string());

    let mut page = DetailPage::new(Area::Member, format!("Transaction {}", tx.transaction_id)).section(
        Section::new("Parties")
            .row("You are the", role.label())
            .row(party_label, ctx.other_party.clone())
            .row("Product", product_name),
    );
    for section in transaction_sections(tx, ctx.product.as_ref().map(Product::price), now) {
        page = page.section(section);
    }
    for action in available_actions(role, progress) {
        page = page.form(action_form(role, tx, action, ctx, submitted));
    }

    page = page.link(list_label, role.area_path());
    page.stepper = Some(progress.stepper(tx.transaction_type));
    page.media = ctx.media.clone();
    page.notice = submitted.notice.map(str::to_string);
    page.banner = submitted.rejection.as_ref().and_then(Rejection::banner);
    page
}

async fn render_member(
    lifecycle: &Lifecycle,
    views: &Views,
    token: &str,
    role: Role,
    tx: &Transaction,
    me: &User,
    submitted: Submitted,
) -> Result<Response> {
    if let Some(Rejection::Unauthorized) = submitted.rejection {
        return Ok(signin_redirect());
    }
    let ctx = member_context(lifecycle, token, role, tx, me).await;
    let page = member_page(role, tx, &ctx, &submitted, lifecycle.clock.utc_now());

    let html = views.render("detail.html", &page)?;
    match submitted.rejection {
        Some(_) => Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response()),
        None => Ok(html.into_response()),
    }
}

async fn seller_view(
    State(lifecycle): State<Lifecycle>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(transaction_id): Path<String>,
) -> Result<Response> {
    let (tx, me) = lifecycle.load(&token, &transaction_id, Role::Seller).await?;
    render_member(&lifecycle, &views, &token, Role::Seller, &tx, &me, Submitted::default()).await
}

/// Also where the checkout page sends the buyer back to
async fn buyer_view(
    State(lifecycle): State<Lifecycle>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(transaction_id): Path<String>,
    Query(ret): Query<PaymentReturn>,
) -> Result<Response> {
    let (mut tx, me) = lifecycle.load(&token, &transaction_id, Role::Buyer).await?;

    let mut submitted = Submitted::default();
    match lifecycle.payment_return(&token, &tx, &ret).await {
        Ok(Some(notice)) => {
            submitted.notice = Some(notice);
            tx = lifecycle.load(&token, &transaction_id, Role::Buyer).await?.0;
        }
        Ok(None) => {}
        Err(rejection) => submitted = Submitted::failed(Action::Pay, StepForm::default(), rejection),
    }
    render_member(&lifecycle, &views, &token, Role::Buyer, &tx, &me, submitted).await
}

async fn perform(
    lifecycle: &Lifecycle,
    views: &Views,
    token: &str,
    role: Role,
    transaction_id: &str,
    slug: &str,
    form: StepForm,
) -> Result<Response> {
    let action = Action::from_slug(slug).ok_or_else(|| Error::UnknownAction(slug.to_string()))?;
    let (tx, me) = lifecycle.load(token, transaction_id, role).await?;

    match lifecycle.perform(token, &tx, role, action, &form).await {
        Ok(Some(next)) => Ok(Redirect::to(&next).into_response()),
        Ok(None) => Ok(Redirect::to(&format!("{}/{}", role.area_path(), transaction_id)).into_response()),
        Err(rejection) => {
            render_member(lifecycle, views, token, role, &tx, &me, Submitted::failed(action, form, rejection)).await
        }
    }
}

async fn seller_action(
    State(lifecycle): State<Lifecycle>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path((transaction_id, action)): Path<(String, String)>,
    Form(form): Form<StepForm>,
) -> Result<Response> {
    perform(&lifecycle, &views, &token, Role::Seller, &transaction_id, &action, form).await
}

async fn buyer_action(
    State(lifecycle): State<Lifecycle>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path((transaction_id, action)): Path<(String, String)>,
    Form(form): Form<StepForm>,
) -> Result<Response> {
    perform(&lifecycle, &views, &token, Role::Buyer, &transaction_id, &action, form).await
}

async fn seller_ship(
    State(lifecycle): State<Lifecycle>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(transaction_id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let mut submitted = MultipartForm::read(multipart).await?;
    let form: StepForm = submitted.fields()?;
    let image = submitted.take_files(SHIPPING_IMAGE_FIELD).into_iter().next();
    let (tx, me) = lifecycle.load(&token, &transaction_id, Role::Seller).await?;

    match lifecycle.ship(&token, &tx, &form, image).await {
        Ok(()) => Ok(Redirect::to(&format!("/member/transactions/sell/{transaction_id}")).into_response()),
        Err(rejection) => {
            let submitted = Submitted::failed(Action::Ship, form, rejection);
            render_member(&lifecycle, &views, &token, Role::Seller, &tx, &me, submitted).await
        }
    }
}
