use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    models::{coded_enum, compact_ids, empty_as_none, present, ActiveStatus},
    validations::{FieldErrors, Validator},
    views::models::{FieldKind, FieldSpec},
};

coded_enum! {
    ProductType { New = 1 => "New", Used = 2 => "Used" }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ActiveStatus>,
    #[serde(default, rename = "type")]
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "compact_ids")]
    pub image_id: Vec<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The product name, or its id when the name is blank
    pub fn display_name(&self) -> &str {
        present(&self.name).unwrap_or(&self.product_id)
    }

    pub fn price(&self) -> Decimal {
        self.price.unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.status != Some(ActiveStatus::Inactive)
    }

    /// Images first, then the video
    pub fn media_ids(&self) -> Vec<String> {
        let mut ids = self.image_id.clone();
        ids.extend(present(&self.video_id).map(str::to_string));
        ids
    }
}

pub const IMAGES_FIELD: &str = "images";
pub const VIDEO_FIELD: &str = "video";

const NAME: FieldSpec = FieldSpec::text("name", "Name");
const TYPE: FieldSpec = FieldSpec::select("type", "Type", ProductType::options);
const DESCRIPTION: FieldSpec = FieldSpec::new("description", "Description", FieldKind::Textarea).optional();
const PRICE: FieldSpec = FieldSpec::text("price", "Price");
const IMAGES: FieldSpec = FieldSpec::new(IMAGES_FIELD, "Images", FieldKind::File).optional().multiple();
const VIDEO: FieldSpec = FieldSpec::new(VIDEO_FIELD, "Video", FieldKind::File).optional();

pub const ADMIN_PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("user_id", "User ID"),
    NAME,
    FieldSpec::select("status", "Status", ActiveStatus::options),
    TYPE,
    DESCRIPTION,
    PRICE,
    IMAGES,
    VIDEO,
];

pub const MEMBER_PRODUCT_FIELDS: &[FieldSpec] = &[NAME, TYPE, DESCRIPTION, PRICE, IMAGES, VIDEO];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub status: String,
    pub description: String,
    pub price: String,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            name: String::new(),
            product_type: ProductType::New.code().to_string(),
            status: ActiveStatus::Active.code().to_string(),
            description: String::new(),
            price: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub status: ActiveStatus,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_id: Vec<String>,
    pub video_id: String,
}

impl ProductForm {
    ///
    /// Media ids are left empty; they are filled in once the chosen
    /// files have been uploaded.
    ///
    pub fn validate(&self, admin: bool) -> Result<ProductPayload, FieldErrors> {
        let mut v = Validator::new();

        let user_id = admin.then(|| v.required("user_id", "User", &self.user_id));
        let name = v.text("name", "Name", &self.name, 2, 100);
        let status = if admin {
            v.choice(
                "status",
                ActiveStatus::from_form(&self.status),
                ActiveStatus::Active,
                "Status must be Active or Inactive",
            )
        } else {
            ActiveStatus::Active
        };
        let product_type = v.choice(
            "type",
            ProductType::from_form(&self.product_type),
            ProductType::New,
            "Type must be New or Used",
        );
        let description = v.optional_text("description", "Description", &self.description, 1000);
        let price = v.amount("price", "Price", &self.price, Decimal::ONE, "Price must be at least 1");

        v.finish(ProductPayload {
            user_id,
            name,
            status,
            product_type,
            description,
            price,
            image_id: vec![],
            video_id: String::new(),
        })
    }
}
