use std::sync::Arc;

use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;

use crate::{
    api::{ApiClient, ApiResponse, MockApiTransport, Payload},
    models::SettlementStatus,
};

use super::{
    models::{method_label, CheckoutRequest, PaymentForm},
    routes::update_payment,
    ApiPaymentService, DynPaymentService, MockPaymentService, PaymentService,
};

#[tokio::test]
async fn test_checkout_posts_buyer_amount() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| match &req.payload {
            Payload::Json(body) => {
                req.method == Method::POST
                    && req.path == "/pay"
                    && req.query == vec![("transaction".to_string(), "t9".to_string())]
                    && body["amount"] == 107.0
                    && body["currency"] == "thb"
                    && body["description"] == "Transaction #t9"
                    && body["method"] == "card"
            }
            _ => false,
        })
        .times(1)
        .returning(|_| Ok(ApiResponse {
            status: StatusCode::OK,
            body: r#"{"checkout_url": "https://checkout.test/s1"}"#.into(),
        }));

    let svc = ApiPaymentService { api: ApiClient::new(Arc::new(transport)) };
    let checkout = svc
        .start_checkout("tok", "t9", CheckoutRequest::for_transaction("t9", Decimal::from(107)))
        .await?;
    assert_eq!("https://checkout.test/s1", checkout.checkout_url);
    Ok(())
}

#[tokio::test]
async fn test_list_reads_payment_items() -> anyhow::Result<()> {
    let mut transport = MockApiTransport::new();
    transport.expect_send()
        .withf(|req| req.path == "/payments")
        .returning(|_| Ok(ApiResponse {
            status: StatusCode::OK,
            body: r#"{"total_count": 1, "payment_items": [
                {"payment_id": "p1", "status": 3, "amount": 12.5, "method": "promptpay", "created_at": null}
            ]}"#.into(),
        }));

    let svc = ApiPaymentService { api: ApiClient::new(Arc::new(transport)) };
    let page = svc.list_payments("tok", crate::api::query::ListQuery::new(1, 10)).await?;

    let payment = &page.items[0];
    assert_eq!(Some(SettlementStatus::Canceled), payment.status);
    assert_eq!("PromptPay", payment.method_label());
    assert!(!payment.is_pending());
    Ok(())
}

#[test]
fn test_payment_edit_rules() {
    let form = PaymentForm { status: "4".into(), method: String::new(), amount: "0.99".into() };
    let errors = form.validate().unwrap_err();

    assert_eq!(Some("Status must be Pending or Completed or Canceled"), errors.get("status"));
    assert_eq!(Some("Method is required"), errors.get("method"));
    assert_eq!(Some("Amount must be at least 1"), errors.get("amount"));
    assert_eq!("Credit/Debit Card", method_label("card"));
    assert_eq!("wire", method_label("wire"));
}

#[tokio::test]
async fn test_update_sends_every_field() -> anyhow::Result<()> {
    let mut svc = MockPaymentService::new();
    svc.expect_update_payment()
        .withf(|_, id, req| {
            id.to_string() == "p1"
                && req.status == Some(SettlementStatus::Completed)
                && req.method.as_deref() == Some("card")
                && req.amount == Some(Decimal::new(1999, 2))
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let svc: DynPaymentService = Arc::new(svc);

    let form = PaymentForm { status: "2".into(), method: "card".into(), amount: "19.99".into() };
    update_payment(&svc, "tok", "p1", &form).await.map_err(|r| anyhow::anyhow!("{r}"))?;
    Ok(())
}
