use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    models::{empty_as_none, present, ActiveStatus, UserType},
    validations::{FieldErrors, Validator},
    views::models::{FieldKind, FieldSpec},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: Option<UserType>,
    #[serde(default)]
    pub status: Option<ActiveStatus>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub address_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn username(&self) -> &str {
        present(&self.username).unwrap_or(&self.user_id)
    }

    /// Name shown in tables, falling back to the username
    pub fn display_name(&self) -> String {
        let full_name = self.full_name();
        if full_name.is_empty() {
            self.username().to_string()
        } else {
            full_name
        }
    }

    pub fn full_name(&self) -> String {
        [present(&self.first_name), present(&self.last_name)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn balance(&self) -> Decimal {
        self.balance.unwrap_or(Decimal::ZERO)
    }
}

pub const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("username", "Username"),
    FieldSpec::new("email", "Email", FieldKind::Email),
    FieldSpec::text("phone", "Phone number"),
    FieldSpec::select("user_type", "User type", UserType::options),
    FieldSpec::select("status", "Status", ActiveStatus::options),
    FieldSpec::text("first_name", "First name"),
    FieldSpec::text("last_name", "Last name"),
    FieldSpec::new("password", "Password", FieldKind::Password),
];

pub const USER_EDIT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("username", "Username"),
    FieldSpec::new("email", "Email", FieldKind::Email),
    FieldSpec::text("phone", "Phone number"),
    FieldSpec::select("user_type", "User type", UserType::options),
    FieldSpec::select("status", "Status", ActiveStatus::options),
    FieldSpec::text("first_name", "First name"),
    FieldSpec::text("last_name", "Last name"),
    FieldSpec::new("balance", "Balance", FieldKind::Number).optional(),
    FieldSpec::new("password", "New password", FieldKind::Password).optional(),
];

/// Admin create and edit form, as submitted
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub user_type: String,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub balance: String,
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
            user_type: user.user_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
            status: user.status.map(|s| s.code().to_string()).unwrap_or_default(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            password: String::new(),
            balance: user.balance.map(|b| b.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub user_type: UserType,
    pub status: ActiveStatus,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub balance: Option<Decimal>,
}

impl UserForm {
    pub fn validate_create(&self) -> Result<UserPayload, FieldErrors> {
        self.validate(true)
    }

    /// On edit the password is optional and the balance may be set
    pub fn validate_update(&self) -> Result<UserPayload, FieldErrors> {
        self.validate(false)
    }

    fn validate(&self, create: bool) -> Result<UserPayload, FieldErrors> {
        let mut v = Validator::new();
        let username = v.username("username", &self.username);
        let email = v.email("email", &self.email);
        let phone = v.phone("phone", &self.phone);
        let user_type = v.choice(
            "user_type",
            UserType::from_form(&self.user_type),
            UserType::User,
            "User type must be ADMIN or USER",
        );
        let status = v.choice(
            "status",
            ActiveStatus::from_form(&self.status),
            ActiveStatus::Active,
            "Status must be Active or Inactive",
        );
        let first_name = v.text("first_name", "First name", &self.first_name, 2, 100);
        let last_name = v.text("last_name", "Last name", &self.last_name, 2, 100);
        let password = v.password("password", "Password", &self.password, create);
        let balance = if create {
            None
        } else {
            v.optional_amount(
                "balance",
                "Balance",
                &self.balance,
                Decimal::new(1, 2),
                "Balance must be at least 0.01",
            )
        };

        v.finish(UserPayload {
            username,
            email,
            phone,
            user_type,
            status,
            first_name,
            last_name,
            password,
            balance,
        })
    }
}

pub const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("email", "Email", FieldKind::Email),
    FieldSpec::text("phone", "Phone number"),
    FieldSpec::text("first_name", "First name"),
    FieldSpec::text("last_name", "Last name"),
];

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePayload {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfilePayload, FieldErrors> {
        let mut v = Validator::new();
        let email = v.email("email", &self.email);
        let phone = v.phone("phone", &self.phone);
        let first_name = v.text("first_name", "First name", &self.first_name, 2, 100);
        let last_name = v.text("last_name", "Last name", &self.last_name, 2, 100);
        v.finish(ProfilePayload { email, phone, first_name, last_name })
    }
}

pub const PASSWORD_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("current_password", "Current password", FieldKind::Password),
    FieldSpec::new("new_password", "New password", FieldKind::Password),
    FieldSpec::new("confirm_password", "Confirm new password", FieldKind::Password),
];

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

impl PasswordForm {
    pub fn validate(&self) -> Result<PasswordPayload, FieldErrors> {
        let mut v = Validator::new();
        if self.current_password.is_empty() {
            v.fail("current_password", "Current password is required");
        }
        let new_password = v
            .password("new_password", "New password", &self.new_password, true)
            .unwrap_or_default();
        if self.confirm_password.is_empty() {
            v.fail("confirm_password", "Please confirm your new password");
        } else if self.confirm_password != self.new_password {
            v.fail("confirm_password", "Passwords do not match");
        }

        v.finish(PasswordPayload { current_password: self.current_password.clone(), new_password })
    }
}
