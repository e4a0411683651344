use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{coded_enum, empty_as_none, present, ActiveStatus},
    validations::{FieldErrors, Validator},
    views::models::{FieldKind, FieldSpec},
};

coded_enum! {
    AddressType { Home = 1 => "Home", Workplace = 2 => "Workplace" }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub address_type: Option<AddressType>,
    #[serde(default)]
    pub status: Option<ActiveStatus>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address_1: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub subdistrict: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Address {
    pub fn is_active(&self) -> bool {
        self.status != Some(ActiveStatus::Inactive)
    }

    /// Postal form on a single line, skipping blank parts
    pub fn one_line(&self) -> String {
        [
            &self.address_1,
            &self.address_2,
            &self.subdistrict,
            &self.district,
            &self.province,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(present)
        .collect::<Vec<_>>()
        .join(", ")
    }
}

const NAME: FieldSpec = FieldSpec::text("name", "Name");
const TYPE: FieldSpec = FieldSpec::select("type", "Type", AddressType::options);
const FULL_NAME: FieldSpec = FieldSpec::text("full_name", "Recipient’s Name");
const PHONE: FieldSpec = FieldSpec::text("phone", "Phone number");
const ADDRESS_1: FieldSpec = FieldSpec::new("address_1", "Address 1", FieldKind::Textarea);
const ADDRESS_2: FieldSpec = FieldSpec::new("address_2", "Address 2", FieldKind::Textarea).optional();
const SUBDISTRICT: FieldSpec = FieldSpec::text("subdistrict", "Subdistrict");
const DISTRICT: FieldSpec = FieldSpec::text("district", "District");
const PROVINCE: FieldSpec = FieldSpec::text("province", "Province");
const COUNTRY: FieldSpec = FieldSpec::text("country", "Country");
const POSTAL_CODE: FieldSpec = FieldSpec::text("postal_code", "Postal code");

pub const ADMIN_ADDRESS_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("user_id", "User ID"),
    NAME,
    FieldSpec::select("status", "Status", ActiveStatus::options),
    TYPE,
    FULL_NAME,
    PHONE,
    ADDRESS_1,
    ADDRESS_2,
    SUBDISTRICT,
    DISTRICT,
    PROVINCE,
    COUNTRY,
    POSTAL_CODE,
];

pub const MEMBER_ADDRESS_FIELDS: &[FieldSpec] = &[
    NAME,
    TYPE,
    FULL_NAME,
    PHONE,
    ADDRESS_1,
    ADDRESS_2,
    SUBDISTRICT,
    DISTRICT,
    PROVINCE,
    COUNTRY,
    POSTAL_CODE,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub address_type: String,
    pub status: String,
    pub full_name: String,
    pub phone: String,
    pub address_1: String,
    pub address_2: String,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

impl Default for AddressForm {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            name: String::new(),
            address_type: AddressType::Home.code().to_string(),
            status: ActiveStatus::Active.code().to_string(),
            full_name: String::new(),
            phone: String::new(),
            address_1: String::new(),
            address_2: String::new(),
            subdistrict: String::new(),
            district: String::new(),
            province: String::new(),
            country: "Thailand".to_string(),
            postal_code: String::new(),
        }
    }
}

impl From<&Address> for AddressForm {
    fn from(address: &Address) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            user_id: text(&address.user_id),
            name: text(&address.name),
            address_type: address.address_type.map(|t| t.code().to_string()).unwrap_or_default(),
            status: address.status.map(|s| s.code().to_string()).unwrap_or_default(),
            full_name: text(&address.full_name),
            phone: text(&address.phone),
            address_1: text(&address.address_1),
            address_2: text(&address.address_2),
            subdistrict: text(&address.subdistrict),
            district: text(&address.district),
            province: text(&address.province),
            country: text(&address.country),
            postal_code: text(&address.postal_code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub status: ActiveStatus,
    pub full_name: String,
    pub phone: String,
    pub address_1: String,
    pub address_2: String,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

impl AddressForm {
    /// Admins pick the owner and status, members always save an active address of their own
    pub fn validate(&self, admin: bool) -> Result<AddressPayload, FieldErrors> {
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
        let address_type = v.choice(
            "type",
            AddressType::from_form(&self.address_type),
            AddressType::Home,
            "Type must be Home or Workplace",
        );
        let full_name = v.text("full_name", "Recipient’s Name", &self.full_name, 2, 100);
        let phone = v.phone("phone", &self.phone);
        let address_1 = v.text("address_1", "Address 1", &self.address_1, 1, 1000);
        let address_2 = v.optional_text("address_2", "Address 2", &self.address_2, 1000);
        let subdistrict = v.text("subdistrict", "Subdistrict", &self.subdistrict, 1, 100);
        let district = v.text("district", "District", &self.district, 1, 100);
        let province = v.text("province", "Province", &self.province, 1, 100);
        let country = v.text("country", "Country", &self.country, 1, 100);
        let postal_code = v.postal_code("postal_code", &self.postal_code);

        v.finish(AddressPayload {
            user_id,
            name,
            address_type,
            status,
            full_name,
            phone,
            address_1,
            address_2,
            subdistrict,
            district,
            province,
            country,
            postal_code,
        })
    }
}
