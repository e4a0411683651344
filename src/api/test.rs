use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;

use super::{
    error::{Error, ServerErrorCode},
    query::{ListQuery, Owner, Page, PageParams, PaginationInfo},
    ApiClient, ApiRequest, ApiResponse, MockApiTransport,
};

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    item_id: String,
}

fn client_answering(status: StatusCode, body: &'static str) -> ApiClient {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .returning(move |_| Ok(ApiResponse { status, body: body.to_string() }));
    ApiClient::new(Arc::new(transport))
}

#[test]
fn test_list_query_pairs() {
    let query = ListQuery::new(3, 10).owned_by(Owner::current_customer());

    assert_eq!(
        vec![
            ("page".to_string(), "3".to_string()),
            ("recordPerPage".to_string(), "10".to_string()),
            ("startIndex".to_string(), "20".to_string()),
            ("customer_id".to_string(), "current".to_string()),
        ],
        query.to_query()
    );
}

#[test]
fn test_page_below_one_is_first_page() {
    assert_eq!(0, ListQuery::new(0, 10).start_index());

    let params = serde_json::from_str::<PageParams>(r#"{"page": "abc"}"#).unwrap();
    assert_eq!(1, params.list_query(25).page);

    let params = serde_json::from_str::<PageParams>(r#"{"page": "4"}"#).unwrap();
    assert_eq!(75, params.list_query(25).start_index());
}

#[test]
fn test_huge_page_saturates_start_index() {
    let params = serde_json::from_str::<PageParams>(r#"{"page": "18446744073709551615"}"#).unwrap();
    let query = params.list_query(10);

    assert_eq!(u64::MAX, query.start_index());
    assert!(query.to_query().contains(&("startIndex".to_string(), u64::MAX.to_string())));

    let info = PaginationInfo::new(query.page, 31, 10);
    assert_eq!(Some(u64::MAX - 1), info.prev_page);
    assert_eq!(None, info.next_page);
}

#[test]
fn test_pagination_info() {
    let info = PaginationInfo::new(2, 31, 10);
    assert_eq!(4, info.total_pages);
    assert_eq!(Some(1), info.prev_page);
    assert_eq!(Some(3), info.next_page);

    let info = PaginationInfo::new(1, 0, 10);
    assert_eq!(1, info.total_pages);
    assert_eq!(None, info.prev_page);
    assert_eq!(None, info.next_page);
}

#[test]
fn test_missing_envelope_fields_mean_empty() -> anyhow::Result<()> {
    let page = Page::<Item>::from_envelope(serde_json::json!({}), "item_items")?;
    assert_eq!(Page::empty(), page);

    let page = Page::<Item>::from_envelope(
        serde_json::json!({"total_count": 12, "item_items": [{"item_id": "a"}]}),
        "item_items",
    )?;
    assert_eq!(12, page.total_count);
    assert_eq!(vec![Item { item_id: "a".to_string() }], page.items);
    Ok(())
}

#[tokio::test]
async fn test_request_carries_token_and_list_query() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| {
            req.method == Method::GET
                && req.path == "/addresses"
                && req.token.as_deref() == Some("tok")
                && req.query.contains(&("user_id".to_string(), "current".to_string()))
        })
        .times(1)
        .returning(|_| Ok(ApiResponse {
            status: StatusCode::OK,
            body: r#"{"total_count": 1, "address_items": [{"item_id": "x"}]}"#.to_string(),
        }));
    let client = ApiClient::new(Arc::new(transport));

    let query = ListQuery::new(1, 10).owned_by(Owner::current_user());
    let page = client
        .list::<Item>(ApiRequest::get("/addresses").token("tok").list(&query), "address_items")
        .await?;

    assert_eq!(1, page.total_count);
    assert_eq!("x", page.items[0].item_id);
    Ok(())
}

#[tokio::test]
async fn test_known_server_code_is_classified() -> anyhow::Result<()> {
    let client = client_answering(StatusCode::BAD_REQUEST, r#"{"error": "customer_error"}"#);

    let err = client.execute(ApiRequest::post("/transactions")).await.unwrap_err();

    assert_eq!(Some(ServerErrorCode::Customer), err.server_code());
    assert_eq!(("customer_id", "Customer not found"), ServerErrorCode::Customer.field_error());
    Ok(())
}

#[tokio::test]
async fn test_unknown_error_body_has_no_code() -> anyhow::Result<()> {
    let client = client_answering(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");

    let err = client.fetch::<Item>(ApiRequest::get("/items/1")).await.unwrap_err();

    assert!(matches!(err, Error::StatusCodeFetchError(StatusCode::INTERNAL_SERVER_ERROR, _)));
    assert_eq!(None, err.server_code());
    assert_eq!(None, err.server_message());
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_is_detected() -> anyhow::Result<()> {
    let client = client_answering(StatusCode::UNAUTHORIZED, r#"{"error": "unauthorized"}"#);

    let err = client.fetch::<Item>(ApiRequest::get("/auth/data")).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(Some("unauthorized".to_string()), err.server_message());
    Ok(())
}

#[test]
fn test_every_server_code_maps_to_a_field() {
    let codes = [
        ("user_error", "user_id", "User not found"),
        ("product_error", "product_id", "Product not found"),
        ("address_error", "address_id", "Address not found"),
        ("payment_error", "payment_id", "Payment not found"),
        ("email_error", "email", "Email already exists"),
        ("username_error", "username", "Username already exists"),
        ("invalid_password", "current_password", "Current password is incorrect"),
    ];
    for (code, field, message) in codes {
        let parsed = ServerErrorCode::parse(code).unwrap();
        assert_eq!((field, message), parsed.field_error());
    }
    assert_eq!(None, ServerErrorCode::parse("failed to create address"));
}
