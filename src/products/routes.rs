use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use futures::future::try_join_all;
use log::info;

use crate::{
    api::{
        query::{Owner, PageParams, PaginationInfo},
        Upload,
    },
    auth::middleware::AuthToken,
    clock::DynClock,
    config::Config,
    enrichment::{NameResolver, Names},
    files::{self, check_upload, multipart::MultipartForm, DynFileService},
    models::present,
    state::AppState,
    validations::{FieldErrors, Rejection},
    views::{
        format,
        models::{form_fields, ActionForm, Area, DetailPage, FormPage, Media, MediaKind, Section, TablePage, TableRow},
        Views,
    },
};

use super::{error::Result, models::*, DynProductService};

pub fn admin_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(admin_list))
        .route("/create", get(admin_create_page).post(admin_create))
        .route("/{product_id}", get(admin_view))
        .route("/{product_id}/delete", post(admin_delete))
        .with_state(app_state)
}

pub fn member_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(member_list))
        .route("/create", get(member_create_page).post(member_create))
        .route("/{product_id}", get(member_view))
        .route("/{product_id}/remove", post(member_remove))
        .with_state(app_state)
}

/// Files chosen on the product form
#[derive(Debug, Default)]
pub struct ProductMedia {
    pub images: Vec<Upload>,
    pub video: Option<Upload>,
}

impl ProductMedia {
    pub fn take(form: &mut MultipartForm) -> Self {
        Self {
            images: form.take_files(IMAGES_FIELD),
            video: form.take_files(VIDEO_FIELD).into_iter().next(),
        }
    }

    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for image in &self.images {
            if let Err(message) = check_upload(image, MediaKind::Image) {
                errors.insert(IMAGES_FIELD, message);
            }
        }
        if let Some(video) = &self.video {
            if let Err(message) = check_upload(video, MediaKind::Video) {
                errors.insert(VIDEO_FIELD, message);
            }
        }
        errors
    }
}

///
/// Validates the form and the chosen files, uploads the files and
/// creates the product with their ids. Nothing is uploaded while any
/// field is invalid.
///
pub async fn create_product(
    product_svc: &DynProductService,
    file_svc: &DynFileService,
    token: &str,
    form: &ProductForm,
    media: ProductMedia,
    admin: bool,
) -> std::result::Result<(), Rejection> {
    let mut errors = media.check();
    let mut payload = match form.validate(admin) {
        Ok(payload) if errors.is_empty() => payload,
        Ok(_) => return Err(errors.into()),
        Err(form_errors) => {
            errors.extend(form_errors);
            return Err(errors.into());
        }
    };

    let images = try_join_all(media.images.into_iter().map(|image| file_svc.upload(token, image)))
        .await
        .map_err(|err| err.reject("Failed to upload image"))?;
    payload.image_id = images.into_iter().map(|file| file.file_id).collect();

    if let Some(video) = media.video {
        let video = file_svc
            .upload(token, video)
            .await
            .map_err(|err| err.reject("Failed to upload video"))?;
        payload.video_id = video.file_id;
    }

    product_svc
        .create_product(token, payload)
        .await
        .map_err(|err| err.reject("Failed to create product. Please try again."))
}

fn area_root(area: Area) -> String {
    format!("{}/products", area.root())
}

fn product_form(area: Area, form: &ProductForm, errors: &FieldErrors) -> FormPage {
    let (title, specs) = match area {
        Area::Admin => ("Create product", ADMIN_PRODUCT_FIELDS),
        _ => ("Add product", MEMBER_PRODUCT_FIELDS),
    };
    let action = format!("{}/create", area_root(area));
    FormPage::new(area, title, action, form_fields(specs, form, errors)).cancel(area_root(area))
}

fn table_rows(area: Area, products: &[Product], owners: Option<&Names>) -> Vec<TableRow> {
    products
        .iter()
        .map(|product| {
            let mut cells = vec![
                product.display_name().to_string(),
                format::label(product.product_type),
                format::money_opt(product.price),
                format::label(product.status),
            ];
            if let Some(owners) = owners {
                cells.insert(1, owners.get(&product.user_id));
            }
            TableRow { href: format!("{}/{}", area_root(area), product.product_id), cells }
        })
        .collect()
}

fn product_section(product: &Product) -> Section {
    Section::new("Product")
        .row("Name", format::text(&product.name))
        .row("Type", format::label(product.product_type))
        .row("Price", format::money_opt(product.price))
        .row("Status", format::label(product.status))
        .row("Description", format::text(&product.description))
}

async fn admin_list(
    State(product_svc): State<DynProductService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page);
    let page = product_svc.list_products(&token, query.clone()).await?;
    let owners = names.user_names(&token, page.items.iter().map(|p| &p.user_id)).await;

    let table = TablePage::new(
        Area::Admin,
        "Products",
        "/admin/products",
        vec!["Name", "User", "Type", "Price", "Status"],
        table_rows(Area::Admin, &page.items, Some(&owners)),
        PaginationInfo::of(&query, &page),
    )
    .action("Create product", "/admin/products/create");
    Ok(views.table(&table)?)
}

async fn admin_create_page(State(views): State<Views>) -> Result<Response> {
    Ok(views.form(&product_form(Area::Admin, &ProductForm::default(), &FieldErrors::new()))?)
}

async fn admin_create(
    State(product_svc): State<DynProductService>,
    State(file_svc): State<DynFileService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    multipart: Multipart,
) -> Result<Response> {
    let mut submitted = MultipartForm::read(multipart).await?;
    let form: ProductForm = submitted.fields()?;
    let media = ProductMedia::take(&mut submitted);

    match create_product(&product_svc, &file_svc, &token, &form, media, true).await {
        Ok(()) => Ok(Redirect::to("/admin/products").into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| product_form(Area::Admin, &form, e))?),
    }
}

async fn admin_view(
    State(product_svc): State<DynProductService>,
    State(file_svc): State<DynFileService>,
    State(names): State<NameResolver>,
    State(views): State<Views>,
    State(clock): State<DynClock>,
    AuthToken(token): AuthToken,
    Path(product_id): Path<String>,
) -> Result<Response> {
    let ProductDetail { product, owner, media } =
        product_detail(&product_svc, &file_svc, &names, &token, &product_id).await?;
    let now = clock.utc_now();

    let record = Section::new("Record").row("Product ID", product.product_id.clone());
    let record = match present(&product.user_id) {
        Some(user_id) => record.link("User", owner, format!("/admin/users/{user_id}")),
        None => record.row("User", owner),
    };
    let record = record
        .row("Created", format::datetime_opt(product.created_at, now))
        .row("Updated", format::datetime_opt(product.updated_at, now));

    let mut page = DetailPage::new(Area::Admin, format!("Product {}", product.display_name()))
        .section(product_section(&product))
        .section(record)
        .link("Back to products", "/admin/products")
        .form(ActionForm::new("Delete product", format!("/admin/products/{product_id}/delete")).danger());
    page.media = media;
    Ok(views.detail(&page)?)
}

pub struct ProductDetail {
    pub product: Product,
    pub owner: String,
    pub media: Vec<Media>,
}

/// Loads a product with its owner's name and the media it links to
pub async fn product_detail(
    product_svc: &DynProductService,
    file_svc: &DynFileService,
    names: &NameResolver,
    token: &str,
    product_id: &str,
) -> Result<ProductDetail> {
    let product = product_svc.get_product(token, product_id).await?;
    let media_ids = product.media_ids();
    let (owner, media) = futures::join!(
        names.user_name(token, &product.user_id),
        files::media(file_svc, token, &media_ids),
    );
    Ok(ProductDetail { product, owner, media })
}

async fn admin_delete(
    State(product_svc): State<DynProductService>,
    AuthToken(token): AuthToken,
    Path(product_id): Path<String>,
) -> Result<Response> {
    product_svc.delete_product(&token, &product_id).await?;
    info!("Deleted product {}", product_id);
    Ok(Redirect::to("/admin/products").into_response())
}

async fn member_list(
    State(product_svc): State<DynProductService>,
    State(views): State<Views>,
    State(config): State<Arc<Config>>,
    AuthToken(token): AuthToken,
    Query(params): Query<PageParams>,
) -> Result<Response> {
    let query = params.list_query(config.records_per_page).owned_by(Owner::current_user());
    let page = product_svc.list_products(&token, query.clone()).await?;

    let table = TablePage::new(
        Area::Member,
        "Products",
        "/member/products",
        vec!["Name", "Type", "Price", "Status"],
        table_rows(Area::Member, &page.items, None),
        PaginationInfo::of(&query, &page),
    )
    .action("Add product", "/member/products/create");
    Ok(views.table(&table)?)
}

async fn member_create_page(State(views): State<Views>) -> Result<Response> {
    Ok(views.form(&product_form(Area::Member, &ProductForm::default(), &FieldErrors::new()))?)
}

async fn member_create(
    State(product_svc): State<DynProductService>,
    State(file_svc): State<DynFileService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    multipart: Multipart,
) -> Result<Response> {
    let mut submitted = MultipartForm::read(multipart).await?;
    let form: ProductForm = submitted.fields()?;
    let media = ProductMedia::take(&mut submitted);

    match create_product(&product_svc, &file_svc, &token, &form, media, false).await {
        Ok(()) => Ok(Redirect::to("/member/products").into_response()),
        Err(rejection) => Ok(views.reject_form(rejection, |e| product_form(Area::Member, &form, e))?),
    }
}

async fn member_view(
    State(product_svc): State<DynProductService>,
    State(file_svc): State<DynFileService>,
    State(views): State<Views>,
    AuthToken(token): AuthToken,
    Path(product_id): Path<String>,
) -> Result<Response> {
    let product = product_svc.get_product(&token, &product_id).await?;

    let mut page = DetailPage::new(Area::Member, format!("Product {}", product.display_name()))
        .section(product_section(&product))
        .link("Back to products", "/member/products");
    if product.is_active() {
        page = page.form(ActionForm::new("Remove product", format!("/member/products/{product_id}/remove")).danger());
    }
    page.media = files::media(&file_svc, &token, &product.media_ids()).await;
    Ok(views.detail(&page)?)
}

async fn member_remove(
    State(product_svc): State<DynProductService>,
    AuthToken(token): AuthToken,
    Path(product_id): Path<String>,
) -> Result<Response> {
    product_svc.remove_product(&token, &product_id).await?;
    info!("Removed product {}", product_id);
    Ok(Redirect::to("/member/products").into_response())
}
