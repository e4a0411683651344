use std::sync::Arc;

use lazy_static::lazy_static;
use reqwest::{Method, StatusCode};

use crate::{
    api::{self, ApiClient, ApiResponse, MockApiTransport, Payload},
    models::ActiveStatus,
};

use super::{
    error::Error,
    models::{Address, AddressForm, AddressType},
    routes::save_address,
    AddressService, ApiAddressService, DynAddressService, MockAddressService,
};

lazy_static! {
    static ref ADDRESS_FORM: AddressForm = AddressForm {
        user_id: "u1".into(),
        name: "Home".into(),
        address_type: "1".into(),
        status: "1".into(),
        full_name: "Somchai Jaidee".into(),
        phone: "+66812345678".into(),
        address_1: "99/1 Sukhumvit Rd".into(),
        address_2: String::new(),
        subdistrict: "Khlong Toei".into(),
        district: "Khlong Toei".into(),
        province: "Bangkok".into(),
        country: "Thailand".into(),
        postal_code: "10110".into(),
    };
}

#[tokio::test]
async fn test_blank_country_blocks_the_request() -> anyhow::Result<()> {
    let mut svc = MockAddressService::new();
    svc.expect_create_address().times(0);
    let svc: DynAddressService = Arc::new(svc);

    let form = AddressForm { country: String::new(), ..ADDRESS_FORM.clone() };
    let errors = save_address(&svc, "tok", None, &form, false).await.unwrap_err().field_errors();

    assert_eq!(1, errors.len());
    assert_eq!(Some("Country is required"), errors.get("country"));
    Ok(())
}

#[test]
fn test_address_field_rules() {
    let form = AddressForm {
        user_id: String::new(),
        name: "H".into(),
        address_type: "3".into(),
        full_name: String::new(),
        phone: "12".into(),
        address_1: "x".repeat(1001),
        subdistrict: "s".repeat(101),
        postal_code: "ABC12".into(),
        ..ADDRESS_FORM.clone()
    };

    let errors = form.validate(true).unwrap_err();
    assert_eq!(Some("User is required"), errors.get("user_id"));
    assert_eq!(Some("Name must be 2-100 characters"), errors.get("name"));
    assert_eq!(Some("Type must be Home or Workplace"), errors.get("type"));
    assert_eq!(Some("Recipient’s Name is required"), errors.get("full_name"));
    assert_eq!(Some("Invalid phone number format"), errors.get("phone"));
    assert_eq!(Some("Address 1 must not exceed 1,000 characters"), errors.get("address_1"));
    assert_eq!(Some("Subdistrict must not exceed 100 characters"), errors.get("subdistrict"));
    assert_eq!(Some("Invalid postal code format"), errors.get("postal_code"));
}

#[test]
fn test_member_address_is_active_and_unowned() -> anyhow::Result<()> {
    let form = AddressForm { user_id: "someone-else".into(), status: "2".into(), ..ADDRESS_FORM.clone() };
    let payload = form.validate(false).map_err(|e| anyhow::anyhow!("{e:?}"))?;

    assert_eq!(None, payload.user_id);
    assert_eq!(ActiveStatus::Active, payload.status);
    assert_eq!(AddressType::Home, payload.address_type);
    Ok(())
}

#[tokio::test]
async fn test_unknown_owner_is_a_field_error() -> anyhow::Result<()> {
    let mut svc = MockAddressService::new();
    svc.expect_create_address().times(1).returning(|_, _| {
        Err(Error::ApiError(api::error::Error::StatusCodeFetchError(
            StatusCode::BAD_REQUEST,
            r#"{"error": "user_error"}"#.into(),
        )))
    });
    let svc: DynAddressService = Arc::new(svc);

    let errors = save_address(&svc, "tok", None, &ADDRESS_FORM, true).await.unwrap_err().field_errors();
    assert_eq!(Some("User not found"), errors.get("user_id"));
    Ok(())
}

#[tokio::test]
async fn test_create_sends_typed_payload() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| match &req.payload {
            Payload::Json(body) => {
                req.method == Method::POST
                    && req.path == "/addresses"
                    && body["type"] == 1
                    && body["status"] == 1
                    && body["user_id"] == "u1"
                    && body["postal_code"] == "10110"
            }
            _ => false,
        })
        .times(1)
        .returning(|_| Ok(ApiResponse { status: StatusCode::OK, body: "1".into() }));

    let svc = ApiAddressService { api: ApiClient::new(Arc::new(transport)) };
    let payload = ADDRESS_FORM.validate(true).map_err(|e| anyhow::anyhow!("{e:?}"))?;
    svc.create_address("tok", payload).await?;
    Ok(())
}

#[tokio::test]
async fn test_member_remove_is_a_soft_delete() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| req.method == Method::POST && req.path == "/addresses/remove/a1")
        .times(1)
        .returning(|_| Ok(ApiResponse { status: StatusCode::OK, body: "1".into() }));

    let svc = ApiAddressService { api: ApiClient::new(Arc::new(transport)) };
    svc.remove_address("tok", "a1").await?;
    Ok(())
}

#[test]
fn test_one_line_skips_blank_parts() -> anyhow::Result<()> {
    let address: Address = serde_json::from_str(
        r#"{"address_id": "a1", "type": 2, "address_1": "1 Main", "address_2": "", "district": null,
            "province": "Chiang Mai", "postal_code": "50000", "country": "Thailand"}"#,
    )?;
    assert_eq!(Some(AddressType::Workplace), address.address_type);
    assert_eq!("1 Main, Chiang Mai, 50000, Thailand", address.one_line());
    assert!(address.is_active());
    Ok(())
}
