use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    models::{empty_as_none, present, SettlementStatus},
    validations::{is_amount, FieldErrors, Validator},
    views::models::FieldSpec,
};

/// Where a member can have money paid out, with the smallest amount each accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalMethod {
    PromptPay,
    TrueMoney,
    PayPal,
    Payoneer,
    Usdt,
    Skrill,
}

impl WithdrawalMethod {
    pub const ALL: &'static [WithdrawalMethod] = &[
        WithdrawalMethod::PromptPay,
        WithdrawalMethod::TrueMoney,
        WithdrawalMethod::PayPal,
        WithdrawalMethod::Payoneer,
        WithdrawalMethod::Usdt,
        WithdrawalMethod::Skrill,
    ];

    pub fn code(self) -> &'static str {
        match self {
            WithdrawalMethod::PromptPay => "promptpay",
            WithdrawalMethod::TrueMoney => "truemoney",
            WithdrawalMethod::PayPal => "paypal",
            WithdrawalMethod::Payoneer => "payoneer",
            WithdrawalMethod::Usdt => "usdt",
            WithdrawalMethod::Skrill => "skrill",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WithdrawalMethod::PromptPay => "PromptPay",
            WithdrawalMethod::TrueMoney => "TrueMoney",
            WithdrawalMethod::PayPal => "PayPal",
            WithdrawalMethod::Payoneer => "Payoneer",
            WithdrawalMethod::Usdt => "USDT",
            WithdrawalMethod::Skrill => "Skrill",
        }
    }

    pub fn minimum(self) -> Decimal {
        Decimal::from(match self {
            WithdrawalMethod::PromptPay | WithdrawalMethod::TrueMoney | WithdrawalMethod::Usdt => 100,
            WithdrawalMethod::PayPal => 500,
            WithdrawalMethod::Payoneer => 1000,
            WithdrawalMethod::Skrill => 200,
        })
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.code() == code.trim())
    }

    pub fn options() -> Vec<(String, String)> {
        std::iter::once((String::new(), "Select a method".to_string()))
            .chain(Self::ALL.iter().map(|m| (m.code().to_string(), format!("{} (min {})", m.name(), m.minimum()))))
            .collect()
    }
}

/// Display name of a stored method, which may be one this dashboard does not know
pub fn method_label(method: &Option<String>) -> String {
    match present(method) {
        Some(code) => WithdrawalMethod::from_code(code).map(|m| m.name()).unwrap_or(code).to_string(),
        None => "-".to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub withdrawal_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<SettlementStatus>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub status: SettlementStatus,
    pub method: String,
    pub account: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

const METHOD: FieldSpec = FieldSpec::select("method", "Method", WithdrawalMethod::options);
const ACCOUNT: FieldSpec = FieldSpec::text("account", "Account");
const AMOUNT: FieldSpec = FieldSpec::text("amount", "Amount");
const STATUS: FieldSpec = FieldSpec::select("status", "Status", SettlementStatus::options);

pub const MEMBER_WITHDRAWAL_FIELDS: &[FieldSpec] = &[METHOD, ACCOUNT, AMOUNT];
pub const ADMIN_CREATE_FIELDS: &[FieldSpec] = &[FieldSpec::text("user_id", "User ID"), STATUS, METHOD, ACCOUNT, AMOUNT];
pub const ADMIN_EDIT_FIELDS: &[FieldSpec] = &[STATUS, METHOD, ACCOUNT, AMOUNT];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalForm {
    pub user_id: String,
    pub status: String,
    pub method: String,
    pub account: String,
    pub amount: String,
}

impl Default for WithdrawalForm {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            status: SettlementStatus::Pending.code().to_string(),
            method: String::new(),
            account: String::new(),
            amount: String::new(),
        }
    }
}

impl From<&Withdrawal> for WithdrawalForm {
    fn from(withdrawal: &Withdrawal) -> Self {
        Self {
            user_id: withdrawal.user_id.clone().unwrap_or_default(),
            status: withdrawal.status.map(|s| s.code().to_string()).unwrap_or_default(),
            method: withdrawal.method.clone().unwrap_or_default(),
            account: withdrawal.account.clone().unwrap_or_default(),
            amount: withdrawal.amount.map(|a| a.to_string()).unwrap_or_default(),
        }
    }
}

impl WithdrawalForm {
    ///
    /// A member's request, checked against the method's minimum and the
    /// `balance` available. Running over the balance is the message shown
    /// when both apply.
    ///
    pub fn validate_request(&self, balance: Decimal) -> Result<WithdrawalPayload, FieldErrors> {
        let mut v = Validator::new();

        let method = WithdrawalMethod::from_code(&self.method);
        if method.is_none() {
            v.fail("method", "Withdrawal method is required");
        }

        let account = self.account.trim();
        if account.is_empty() {
            v.fail("account", "Account details are required");
        } else if account.chars().count() > 100 {
            v.fail("account", "Account details must not exceed 100 characters");
        }

        let amount_text = self.amount.trim();
        let amount = match amount_text.parse::<Decimal>() {
            _ if amount_text.is_empty() => {
                v.fail("amount", "Amount is required");
                Decimal::ZERO
            }
            Ok(amount) if is_amount(amount_text) => {
                if amount > balance {
                    v.fail("amount", "Amount exceeds your available balance");
                } else if let Some(method) = method.filter(|m| amount < m.minimum()) {
                    v.fail("amount", format!("Amount must be at least {}", method.minimum()));
                }
                amount
            }
            _ => {
                v.fail("amount", "Invalid amount format");
                Decimal::ZERO
            }
        };

        v.finish(WithdrawalPayload {
            user_id: None,
            status: SettlementStatus::Pending,
            method: method.map(|m| m.code().to_string()).unwrap_or_default(),
            account: account.to_string(),
            amount,
        })
    }

    /// Creation or edit by an administrator; `user_id` is only read when creating
    pub fn validate_admin(&self, creating: bool) -> Result<WithdrawalPayload, FieldErrors> {
        let mut v = Validator::new();

        let user_id = creating.then(|| v.required("user_id", "User", &self.user_id));
        let status = v.choice(
            "status",
            SettlementStatus::from_form(&self.status),
            SettlementStatus::Pending,
            "Status must be Pending or Completed or Canceled",
        );
        let method = v.text("method", "Method", &self.method, 1, 100);
        let account = v.text("account", "Account", &self.account, 1, 100);
        let amount = v.amount("amount", "Amount", &self.amount, Decimal::ONE, "Amount must be at least 1");

        v.finish(WithdrawalPayload { user_id, status, method, account, amount })
    }
}
