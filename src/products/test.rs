use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use lazy_static::lazy_static;
use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;

use crate::{
    api::{self, ApiClient, ApiResponse, MockApiTransport, Payload, Upload},
    enrichment::NameResolver,
    files::{self, models::{FileRecord, UploadedFile}, DynFileService, MockFileService},
    models::ActiveStatus,
    users::{models::User, MockUserService},
    views::models::{Media, MediaKind},
};

use super::{
    error::Error,
    models::{Product, ProductForm, ProductType},
    routes::{create_product, product_detail, ProductDetail, ProductMedia},
    ApiProductService, DynProductService, MockProductService, ProductService,
};

lazy_static! {
    static ref PRODUCT_FORM: ProductForm = ProductForm {
        user_id: "u1".into(),
        name: "Film camera".into(),
        product_type: "2".into(),
        status: "1".into(),
        description: "Works fine".into(),
        price: "1250.50".into(),
    };
}

fn upload(content_type: &str) -> Upload {
    Upload { file_name: "media".into(), content_type: content_type.into(), bytes: vec![1, 2, 3] }
}

fn uploaded(file_id: &str) -> UploadedFile {
    UploadedFile { file_id: file_id.into(), cloud_url: None }
}

#[test]
fn test_price_rules() {
    for (price, message) in [
        ("", "Price is required"),
        ("12.345", "Invalid price format"),
        ("-5", "Invalid price format"),
        ("0.50", "Price must be at least 1"),
    ] {
        let form = ProductForm { price: price.into(), ..PRODUCT_FORM.clone() };
        assert_eq!(Some(message), form.validate(false).unwrap_err().get("price"), "price {price:?}");
    }

    let form = ProductForm { price: "1".into(), ..PRODUCT_FORM.clone() };
    assert!(form.validate(false).is_ok());
}

#[test]
fn test_product_field_rules() {
    let form = ProductForm {
        user_id: " ".into(),
        name: "A".into(),
        product_type: "0".into(),
        description: "d".repeat(1001),
        ..PRODUCT_FORM.clone()
    };

    let errors = form.validate(true).unwrap_err();
    assert_eq!(Some("User is required"), errors.get("user_id"));
    assert_eq!(Some("Name must be 2-100 characters"), errors.get("name"));
    assert_eq!(Some("Type must be New or Used"), errors.get("type"));
    assert_eq!(Some("Description must not exceed 1,000 characters"), errors.get("description"));
}

#[tokio::test]
async fn test_wrong_media_blocks_every_upload() -> anyhow::Result<()> {
    let mut products = MockProductService::new();
    products.expect_create_product().times(0);
    let mut files = MockFileService::new();
    files.expect_upload().times(0);
    let products: DynProductService = Arc::new(products);
    let files: DynFileService = Arc::new(files);

    let media = ProductMedia { images: vec![upload("application/pdf")], video: Some(upload("image/png")) };
    let form = ProductForm { name: String::new(), ..PRODUCT_FORM.clone() };
    let errors = create_product(&products, &files, "tok", &form, media, false)
        .await
        .unwrap_err()
        .field_errors();

    assert_eq!(Some("Please upload an image file"), errors.get("images"));
    assert_eq!(Some("Please upload a video file"), errors.get("video"));
    assert_eq!(Some("Name is required"), errors.get("name"));
    Ok(())
}

#[tokio::test]
async fn test_create_attaches_uploaded_media() -> anyhow::Result<()> {
    let uploads = Arc::new(AtomicUsize::new(0));
    let counter = uploads.clone();

    let mut files = MockFileService::new();
    files.expect_upload().times(3).returning(move |_, upload| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        match upload.content_type.as_str() {
            "video/mp4" => Ok(uploaded("vid")),
            _ => Ok(uploaded(&format!("img{n}"))),
        }
    });

    let mut products = MockProductService::new();
    products.expect_create_product()
        .withf(|_, req| {
            req.image_id.len() == 2
                && req.image_id.iter().all(|id| id.starts_with("img"))
                && req.video_id == "vid"
                && req.user_id.is_none()
                && req.status == ActiveStatus::Active
                && req.product_type == ProductType::Used
                && req.price == Decimal::new(125050, 2)
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let products: DynProductService = Arc::new(products);
    let files: DynFileService = Arc::new(files);
    let media = ProductMedia {
        images: vec![upload("image/png"), upload("image/jpeg")],
        video: Some(upload("video/mp4")),
    };

    create_product(&products, &files, "tok", &PRODUCT_FORM, media, false)
        .await
        .map_err(|r| anyhow::anyhow!("{r}"))?;
    assert_eq!(3, uploads.load(Ordering::SeqCst));
    Ok(())
}

#[tokio::test]
async fn test_failed_upload_stops_creation() -> anyhow::Result<()> {
    let mut files = MockFileService::new();
    files.expect_upload().returning(|_, _| {
        Err(files::error::Error::ApiError(api::error::Error::StatusCodeFetchError(
            StatusCode::BAD_GATEWAY,
            String::new(),
        )))
    });
    let mut products = MockProductService::new();
    products.expect_create_product().times(0);

    let products: DynProductService = Arc::new(products);
    let files: DynFileService = Arc::new(files);
    let media = ProductMedia { images: vec![upload("image/png")], video: None };

    let rejection = create_product(&products, &files, "tok", &PRODUCT_FORM, media, true).await.unwrap_err();
    assert_eq!(Some("Failed to upload image".to_string()), rejection.banner());
    Ok(())
}

#[tokio::test]
async fn test_unknown_owner_is_a_field_error() -> anyhow::Result<()> {
    let mut products = MockProductService::new();
    products.expect_create_product().returning(|_, _| {
        Err(Error::ApiError(api::error::Error::StatusCodeFetchError(
            StatusCode::BAD_REQUEST,
            r#"{"error": "user_error"}"#.into(),
        )))
    });
    let products: DynProductService = Arc::new(products);
    let files: DynFileService = Arc::new(MockFileService::new());

    let errors = create_product(&products, &files, "tok", &PRODUCT_FORM, ProductMedia::default(), true)
        .await
        .unwrap_err()
        .field_errors();
    assert_eq!(Some("User not found"), errors.get("user_id"));
    Ok(())
}

#[tokio::test]
async fn test_get_product_reads_media_ids() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| req.method == Method::GET && req.path == "/products/p1" && req.token.as_deref() == Some("tok"))
        .returning(|_| Ok(ApiResponse {
            status: StatusCode::OK,
            body: r#"{"product_id": "p1", "name": "", "type": 1, "price": 99.9,
                      "image_id": ["i1", null, ""], "video_id": "v1"}"#.into(),
        }));

    let svc = ApiProductService { api: ApiClient::new(Arc::new(transport)) };
    let product: Product = svc.get_product("tok", "p1").await?;

    assert_eq!("p1", product.display_name());
    assert_eq!(Some(ProductType::New), product.product_type);
    assert_eq!(Decimal::new(999, 1), product.price());
    assert_eq!(vec!["i1".to_string(), "v1".to_string()], product.media_ids());
    Ok(())
}

#[tokio::test]
async fn test_create_sends_price_as_number() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| match &req.payload {
            Payload::Json(body) => {
                req.path == "/products" && body["price"] == 1250.5 && body["type"] == 2 && body["image_id"].is_array()
            }
            _ => false,
        })
        .times(1)
        .returning(|_| Ok(ApiResponse { status: StatusCode::OK, body: "{}".into() }));

    let svc = ApiProductService { api: ApiClient::new(Arc::new(transport)) };
    let payload = PRODUCT_FORM.validate(true).map_err(|e| anyhow::anyhow!("{e:?}"))?;
    svc.create_product("tok", payload).await?;
    Ok(())
}

#[tokio::test]
async fn test_product_detail_loads_owner_and_media() -> anyhow::Result<()> {
    let mut products = MockProductService::new();
    products.expect_get_product()
        .withf(|_, id| id.to_string() == "p1")
        .returning(|_, _| Ok(Product {
            product_id: "p1".into(),
            user_id: Some("u1".into()),
            name: Some("Film camera".into()),
            image_id: vec!["i1".into()],
            video_id: Some("v1".into()),
            ..Default::default()
        }));
    let product_svc: DynProductService = Arc::new(products);

    let mut users = MockUserService::new();
    users.expect_user_summary()
        .withf(|_, id| id.to_string() == "u1")
        .times(1)
        .returning(|_, _| Ok(User {
            user_id: "u1".into(),
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
            ..Default::default()
        }));

    let mut file_svc = MockFileService::new();
    file_svc.expect_get_file()
        .returning(|_, id| Ok(FileRecord {
            file_id: id.to_string(),
            cloud_url: Some(format!("https://cdn.test/{id}")),
            file_type: Some(if id == "v1" { "video/mp4".into() } else { "image/png".into() }),
            ..Default::default()
        }));
    let file_svc: DynFileService = Arc::new(file_svc);

    let names = NameResolver::new(Arc::new(users), product_svc.clone());
    let ProductDetail { product, owner, media } = product_detail(&product_svc, &file_svc, &names, "tok", "p1").await?;

    assert_eq!("p1", product.product_id);
    assert_eq!("Ann Lee", owner);
    assert_eq!(
        vec![
            Media { kind: MediaKind::Image, url: "https://cdn.test/i1".into() },
            Media { kind: MediaKind::Video, url: "https://cdn.test/v1".into() },
        ],
        media
    );
    Ok(())
}
