use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    addresses::models::Address,
    models::{coded_enum, empty_as_none, present},
    validations::{FieldErrors, Validator},
    views::{
        format,
        models::{FieldKind, FieldSpec},
    },
};

coded_enum! {
    TransactionStatus {
        Pending = 1 => "Pending",
        Accepted = 2 => "Accepted",
        Completed = 3 => "Completed",
        Canceled = 4 => "Canceled",
        Rejected = 5 => "Rejected",
        Disputed = 6 => "Disputed",
    }
}

coded_enum! {
    TransactionType { Physical = 1 => "Physical", Digital = 2 => "Digital" }
}

coded_enum! {
    /// Which party absorbs the platform fee
    FeeType {
        BuyerPays = 1 => "Buyer Pays Fees",
        SellerPays = 2 => "Seller Pays Fees",
        Split = 3 => "Split Fees Equally",
    }
}

pub const SHIPPING_METHODS: &[&str] = &[
    "Thailand Post",
    "KEX Express",
    "Flash Express",
    "J&T Express",
    "DHL",
    "FedEx",
    "GrabExpress",
    "Lalamove",
    "Other",
];

pub fn shipping_options() -> Vec<(String, String)> {
    std::iter::once((String::new(), "Select a shipping service".to_string()))
        .chain(SHIPPING_METHODS.iter().map(|m| (m.to_string(), m.to_string())))
        .collect()
}

///
/// An escrow deal between the seller (`user_id`) and the buyer
/// (`customer_id`). Progress is never stored; see [`super::step`].
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_number: Option<u32>,
    #[serde(default)]
    pub address_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub shipping: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub shipping_price: Option<Decimal>,
    #[serde(default)]
    pub shipping_number: Option<String>,
    #[serde(default)]
    pub shipping_details: Option<String>,
    #[serde(default)]
    pub shipping_image_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_details: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub fee_type: Option<FeeType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_digital(&self) -> bool {
        self.transaction_type == Some(TransactionType::Digital)
    }

    pub fn quantity(&self) -> u32 {
        self.product_number.unwrap_or(1)
    }

    pub fn shipping_price(&self) -> Decimal {
        self.shipping_price.unwrap_or_default()
    }

    pub fn fee(&self) -> Decimal {
        self.fee.unwrap_or_default()
    }

    pub fn fee_type(&self) -> FeeType {
        self.fee_type.unwrap_or(FeeType::BuyerPays)
    }

    pub fn is_seller(&self, user_id: &str) -> bool {
        present(&self.user_id) == Some(user_id)
    }

    pub fn is_buyer(&self, user_id: &str) -> bool {
        present(&self.customer_id) == Some(user_id)
    }
}

///
/// Partial update of a transaction. Only the fields that are set are
/// sent; `delivered_at` is carried along on status changes so the API
/// keeps the delivery time it already has.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_details: Option<String>,
}

impl TransactionUpdate {
    pub fn status(status: TransactionStatus, tx: &Transaction) -> Self {
        Self { status: Some(status), delivered_at: tx.delivered_at, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub customer_id: String,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub product_id: String,
    pub product_number: u32,
    pub address_id: String,
    pub payment_id: String,
    pub shipping: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_price: Decimal,
    pub shipping_number: String,
    pub shipping_details: String,
    pub shipping_image_id: String,
    pub delivered_details: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub fee_type: FeeType,
}

const CUSTOMER: FieldSpec = FieldSpec::text("customer_id", "Customer");
const TYPE: FieldSpec = FieldSpec::select("type", "Type", TransactionType::options);
const PRODUCT_NUMBER: FieldSpec = FieldSpec::new("product_number", "Quantity", FieldKind::Number);
const SHIPPING: FieldSpec = FieldSpec::select("shipping", "Shipping service", shipping_options).optional();
const SHIPPING_PRICE: FieldSpec = FieldSpec::text("shipping_price", "Shipping price").optional();
const SHIPPING_DETAILS: FieldSpec = FieldSpec::new("shipping_details", "Shipping details", FieldKind::Textarea).optional();
const FEE_TYPE: FieldSpec = FieldSpec::select("fee_type", "Fee", FeeType::options);

pub const MEMBER_TRANSACTION_FIELDS: &[FieldSpec] = &[
    CUSTOMER,
    TYPE,
    FieldSpec::select("product_id", "Product", no_options),
    PRODUCT_NUMBER,
    SHIPPING,
    SHIPPING_PRICE,
    SHIPPING_DETAILS,
    FEE_TYPE,
];

pub const ADMIN_TRANSACTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("user_id", "Seller ID"),
    CUSTOMER,
    FieldSpec::select("status", "Status", TransactionStatus::options),
    TYPE,
    FieldSpec::text("product_id", "Product ID"),
    PRODUCT_NUMBER,
    FieldSpec::text("address_id", "Address ID").optional(),
    FieldSpec::text("payment_id", "Payment ID").optional(),
    SHIPPING,
    SHIPPING_PRICE,
    FieldSpec::text("shipping_number", "Shipping number").optional(),
    SHIPPING_DETAILS,
    FieldSpec::new("delivered_details", "Delivery details", FieldKind::Textarea).optional(),
    FieldSpec::text("fee", "Fee").optional(),
    FEE_TYPE,
];

/// Filled in per request from the member's own products
fn no_options() -> Vec<(String, String)> {
    vec![(String::new(), "Select a product".to_string())]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionForm {
    pub user_id: String,
    pub customer_id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub product_id: String,
    pub product_number: String,
    pub address_id: String,
    pub payment_id: String,
    pub shipping: String,
    pub shipping_price: String,
    pub shipping_number: String,
    pub shipping_details: String,
    pub delivered_details: String,
    pub fee: String,
    pub fee_type: String,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            customer_id: String::new(),
            status: TransactionStatus::Pending.code().to_string(),
            transaction_type: TransactionType::Physical.code().to_string(),
            product_id: String::new(),
            product_number: "1".to_string(),
            address_id: String::new(),
            payment_id: String::new(),
            shipping: String::new(),
            shipping_price: String::new(),
            shipping_number: String::new(),
            shipping_details: String::new(),
            delivered_details: String::new(),
            fee: String::new(),
            fee_type: FeeType::BuyerPays.code().to_string(),
        }
    }
}

impl TransactionForm {
    fn validate_common(&self, v: &mut Validator) -> TransactionPayload {
        let customer_id = v.required("customer_id", "Customer", &self.customer_id);
        let transaction_type = v.choice(
            "type",
            TransactionType::from_form(&self.transaction_type),
            TransactionType::Physical,
            "Invalid type",
        );

        let (shipping, shipping_price) = match transaction_type {
            TransactionType::Physical => {
                let shipping = v.required("shipping", "Shipping method", &self.shipping);
                let price = v.optional_amount(
                    "shipping_price",
                    "Price",
                    &self.shipping_price,
                    Decimal::new(1, 2),
                    "Price must be at least 0.01",
                );
                (shipping, price.unwrap_or_default())
            }
            TransactionType::Digital => (String::new(), Decimal::ZERO),
        };

        let product_id = v.required("product_id", "Product", &self.product_id);
        let product_number = match self.product_number.trim() {
            "" => {
                v.fail("product_number", "Product number is required");
                1
            }
            n => match n.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    v.fail("product_number", "Product number must be an integer");
                    1
                }
            },
        };
        let fee_type = v.choice("fee_type", FeeType::from_form(&self.fee_type), FeeType::BuyerPays, "Invalid fee type");

        TransactionPayload {
            user_id: None,
            customer_id,
            status: TransactionStatus::Pending,
            transaction_type,
            product_id,
            product_number,
            address_id: String::new(),
            payment_id: String::new(),
            shipping,
            shipping_price,
            shipping_number: String::new(),
            shipping_details: self.shipping_details.trim().to_string(),
            shipping_image_id: String::new(),
            delivered_details: String::new(),
            fee: Decimal::ZERO,
            fee_type,
        }
    }

    ///
    /// An offer made by a member. `me` holds the identifiers of the
    /// signed in member, which can not be the customer. The fee is left
    /// at zero until the product price is known.
    ///
    pub fn validate_offer(&self, me: &[&str]) -> Result<TransactionPayload, FieldErrors> {
        let mut v = Validator::new();
        let payload = self.validate_common(&mut v);
        if !v.has_error("customer_id") && me.iter().any(|id| !id.is_empty() && *id == payload.customer_id) {
            v.fail("customer_id", "Customer cannot be you");
        }
        v.finish(payload)
    }

    /// Every field, as entered by an administrator
    pub fn validate_admin(&self) -> Result<TransactionPayload, FieldErrors> {
        let mut v = Validator::new();
        let mut payload = self.validate_common(&mut v);

        let user_id = v.required("user_id", "User", &self.user_id);
        if !user_id.is_empty() && user_id == payload.customer_id {
            v.fail("user_id", "User and Customer must be different");
        }
        payload.user_id = Some(user_id);
        payload.status = v.choice(
            "status",
            TransactionStatus::from_form(&self.status),
            TransactionStatus::Pending,
            "Invalid status",
        );
        payload.fee = v
            .optional_amount("fee", "Fee", &self.fee, Decimal::new(1, 2), "Fee must be at least 0.01")
            .unwrap_or_default();
        payload.address_id = self.address_id.trim().to_string();
        payload.payment_id = self.payment_id.trim().to_string();
        payload.shipping_number = self.shipping_number.trim().to_string();
        payload.delivered_details = self.delivered_details.trim().to_string();

        v.finish(payload)
    }
}

pub const SHIPPING_IMAGE_FIELD: &str = "shipping_image";

pub const SHIP_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("shipping_number", "Shipping number"),
    FieldSpec::new(SHIPPING_IMAGE_FIELD, "Shipping image", FieldKind::File),
];

pub const DELIVER_FIELDS: &[FieldSpec] = &[FieldSpec::new("delivered_details", "Delivery details", FieldKind::Textarea)];

pub const ACCEPT_FIELDS: &[FieldSpec] = &[FieldSpec::select("address_id", "Shipping address", no_address)];

pub const MESSAGE_FIELDS: &[FieldSpec] = &[FieldSpec::new("message", "Message", FieldKind::Textarea)];

fn no_address() -> Vec<(String, String)> {
    vec![(String::new(), "Select a shipping address".to_string())]
}

/// Shipping address choices, active addresses only
pub fn address_options(addresses: &[Address]) -> Vec<(String, String)> {
    no_address()
        .into_iter()
        .chain(
            addresses
                .iter()
                .filter(|a| a.is_active())
                .map(|a| (a.address_id.clone(), format!("{}: {}", format::text(&a.name), a.one_line()))),
        )
        .collect()
}

/// Inputs of the small forms posted from a transaction page
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StepForm {
    pub address_id: String,
    pub shipping_number: String,
    pub delivered_details: String,
    pub message: String,
}

/// `?payment=&payment_status=` added by the checkout page when it returns
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaymentReturn {
    pub payment: Option<String>,
    pub payment_status: Option<String>,
}
