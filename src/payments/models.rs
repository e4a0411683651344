use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    models::{empty_as_none, present, SettlementStatus},
    validations::{FieldErrors, Validator},
    views::models::FieldSpec,
};

pub const PAYMENT_METHODS: &[&str] = &["card", "promptpay"];
pub const CHECKOUT_CURRENCY: &str = "thb";
pub const CHECKOUT_METHOD: &str = "card";

/// Display name of a payment method code
pub fn method_label(method: &str) -> &str {
    match method {
        "card" => "Credit/Debit Card",
        "promptpay" => "PromptPay",
        other => other,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<SettlementStatus>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn is_pending(&self) -> bool {
        self.status == Some(SettlementStatus::Pending)
    }

    pub fn method_label(&self) -> String {
        present(&self.method).map(method_label).unwrap_or("-").to_string()
    }
}

/// Partial update; fields left `None` are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SettlementStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
}

/// Body of `POST /pay`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub method: String,
}

impl CheckoutRequest {
    pub fn for_transaction(transaction_id: &str, amount: Decimal) -> Self {
        Self {
            amount,
            currency: CHECKOUT_CURRENCY.to_string(),
            description: format!("Transaction #{transaction_id}"),
            method: CHECKOUT_METHOD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Checkout {
    pub checkout_url: String,
}

fn method_options() -> Vec<(String, String)> {
    PAYMENT_METHODS.iter().map(|m| (m.to_string(), method_label(m).to_string())).collect()
}

pub const PAYMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::select("status", "Status", SettlementStatus::options),
    FieldSpec::select("method", "Method", method_options),
    FieldSpec::text("amount", "Amount"),
];

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub status: String,
    pub method: String,
    pub amount: String,
}

impl From<&Payment> for PaymentForm {
    fn from(payment: &Payment) -> Self {
        Self {
            status: payment.status.map(|s| s.code().to_string()).unwrap_or_default(),
            method: payment.method.clone().unwrap_or_default(),
            amount: payment.amount.map(|a| a.to_string()).unwrap_or_default(),
        }
    }
}

impl PaymentForm {
    pub fn validate(&self) -> Result<PaymentUpdate, FieldErrors> {
        let mut v = Validator::new();
        let status = v.choice(
            "status",
            SettlementStatus::from_form(&self.status),
            SettlementStatus::Pending,
            "Status must be Pending or Completed or Canceled",
        );
        let method = v.text("method", "Method", &self.method, 1, 100);
        let amount = v.amount("amount", "Amount", &self.amount, Decimal::ONE, "Amount must be at least 1");

        v.finish(PaymentUpdate { status: Some(status), method: Some(method), amount: Some(amount) })
    }
}
