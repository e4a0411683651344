use std::sync::Arc;

use lazy_static::lazy_static;
use reqwest::StatusCode;
use rust_decimal::Decimal;

use crate::{
    api::{self, ApiClient, ApiResponse, MockApiTransport, Payload},
    models::SettlementStatus,
};

use super::{
    error::Error,
    models::{method_label, WithdrawalForm, WithdrawalMethod},
    routes::{request_withdrawal, save_withdrawal},
    ApiWithdrawalService, DynWithdrawalService, MockWithdrawalService, WithdrawalService,
};

lazy_static! {
    static ref BALANCE: Decimal = Decimal::from(800);
}

fn request(method: &str, amount: &str) -> WithdrawalForm {
    WithdrawalForm {
        method: method.into(),
        account: "123-4-56789-0".into(),
        amount: amount.into(),
        ..Default::default()
    }
}

#[test]
fn test_method_minimums() {
    for (method, amount, message) in [
        ("promptpay", "99.99", "Amount must be at least 100"),
        ("truemoney", "50", "Amount must be at least 100"),
        ("paypal", "499", "Amount must be at least 500"),
        ("skrill", "150", "Amount must be at least 200"),
        ("usdt", "10", "Amount must be at least 100"),
    ] {
        let errors = request(method, amount).validate_request(*BALANCE).unwrap_err();
        assert_eq!(Some(message), errors.get("amount"), "{method} {amount}");
    }
    assert!(request("paypal", "500").validate_request(*BALANCE).is_ok());
}

#[test]
fn test_balance_check_wins_over_minimum() {
    let errors = request("payoneer", "900").validate_request(*BALANCE).unwrap_err();
    assert_eq!(Some("Amount exceeds your available balance"), errors.get("amount"));

    let amount = request("payoneer", "1000").validate_request(Decimal::from(1500)).map(|p| p.amount);
    assert_eq!(Ok(Decimal::from(1000)), amount);
}

#[test]
fn test_request_field_rules() {
    let form = WithdrawalForm { method: "bank".into(), account: "x".repeat(101), amount: "1.234".into(), ..Default::default() };
    let errors = form.validate_request(*BALANCE).unwrap_err();

    assert_eq!(Some("Withdrawal method is required"), errors.get("method"));
    assert_eq!(Some("Account details must not exceed 100 characters"), errors.get("account"));
    assert_eq!(Some("Invalid amount format"), errors.get("amount"));

    let errors = WithdrawalForm::default().validate_request(*BALANCE).unwrap_err();
    assert_eq!(Some("Account details are required"), errors.get("account"));
    assert_eq!(Some("Amount is required"), errors.get("amount"));
}

#[tokio::test]
async fn test_member_request_is_pending() -> anyhow::Result<()> {
    let mut svc = MockWithdrawalService::new();
    svc.expect_create_withdrawal()
        .withf(|_, req| {
            req.user_id.is_none()
                && req.status == SettlementStatus::Pending
                && req.method == "promptpay"
                && req.amount == Decimal::from(250)
        })
        .times(1)
        .returning(|_, _| Ok(()));
    let svc: DynWithdrawalService = Arc::new(svc);

    request_withdrawal(&svc, "tok", *BALANCE, &request("promptpay", "250"))
        .await
        .map_err(|r| anyhow::anyhow!("{r}"))?;
    Ok(())
}

#[tokio::test]
async fn test_over_balance_makes_no_call() -> anyhow::Result<()> {
    let mut svc = MockWithdrawalService::new();
    svc.expect_create_withdrawal().times(0);
    let svc: DynWithdrawalService = Arc::new(svc);

    let rejection = request_withdrawal(&svc, "tok", Decimal::from(10), &request("promptpay", "100")).await;
    assert!(rejection.is_err());
    Ok(())
}

#[tokio::test]
async fn test_admin_create_requires_user() -> anyhow::Result<()> {
    let mut svc = MockWithdrawalService::new();
    svc.expect_create_withdrawal().returning(|_, _| {
        Err(Error::ApiError(api::error::Error::StatusCodeFetchError(
            StatusCode::BAD_REQUEST,
            r#"{"error": "user_error"}"#.into(),
        )))
    });
    let svc: DynWithdrawalService = Arc::new(svc);

    let blank = WithdrawalForm { user_id: String::new(), ..request("paypal", "5") };
    let errors = save_withdrawal(&svc, "tok", None, &blank).await.unwrap_err().field_errors();
    assert_eq!(Some("User is required"), errors.get("user_id"));

    let unknown = WithdrawalForm { user_id: "u404".into(), ..request("paypal", "5") };
    let errors = save_withdrawal(&svc, "tok", None, &unknown).await.unwrap_err().field_errors();
    assert_eq!(Some("User not found"), errors.get("user_id"));
    Ok(())
}

#[tokio::test]
async fn test_edit_sends_method_code() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| match &req.payload {
            Payload::Json(body) => {
                req.path == "/withdrawals/w1"
                    && body.get("user_id").is_none()
                    && body["status"] == 2
                    && body["method"] == "skrill"
                    && body["amount"] == 300.0
            }
            _ => false,
        })
        .times(1)
        .returning(|_| Ok(ApiResponse { status: StatusCode::OK, body: "{}".into() }));

    let svc = ApiWithdrawalService { api: ApiClient::new(Arc::new(transport)) };
    let form = WithdrawalForm { status: "2".into(), ..request("skrill", "300") };
    let payload = form.validate_admin(false).map_err(|e| anyhow::anyhow!("{e:?}"))?;
    svc.update_withdrawal("tok", "w1", payload).await?;
    Ok(())
}

#[test]
fn test_method_labels() {
    assert_eq!("USDT", method_label(&Some("usdt".into())));
    assert_eq!("bank", method_label(&Some("bank".into())));
    assert_eq!("-", method_label(&None));
    assert_eq!(Some(WithdrawalMethod::PayPal), WithdrawalMethod::from_code("paypal"));
}
