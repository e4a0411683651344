use serde::{Deserialize, Serialize};

use crate::{
    models::UserType,
    validations::{FieldErrors, Validator},
    views::models::{FieldKind, FieldSpec},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponseModel {
    pub token: Option<String>,
    pub user_type: Option<UserType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_type: UserType,
}

impl Session {
    pub fn home(&self) -> &'static str {
        match self.user_type {
            UserType::Admin => crate::response::ADMIN_HOME,
            UserType::User => crate::response::MEMBER_HOME,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyResponseModel {
    pub user_type: UserType,
}

pub const SIGNIN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("email", "Email", FieldKind::Email),
    FieldSpec::new("password", "Password", FieldKind::Password),
];

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<LoginModel, FieldErrors> {
        let mut v = Validator::new();
        let email = v.email("email", &self.email);
        if self.password.is_empty() {
            v.fail("password", "Password is required");
        }
        v.finish(LoginModel { email, password: self.password.clone() })
    }
}

pub const SIGNUP_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("username", "Username"),
    FieldSpec::new("email", "Email", FieldKind::Email),
    FieldSpec::text("phone", "Phone number"),
    FieldSpec::text("first_name", "First name"),
    FieldSpec::text("last_name", "Last name"),
    FieldSpec::new("password", "Password", FieldKind::Password),
    FieldSpec::new("confirm_password", "Confirm password", FieldKind::Password),
];

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignUpPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_type: UserType,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<SignUpPayload, FieldErrors> {
        let mut v = Validator::new();
        let username = v.username("username", &self.username);
        let email = v.email("email", &self.email);
        let phone = v.phone("phone", &self.phone);
        let first_name = v.text("first_name", "First name", &self.first_name, 2, 100);
        let last_name = v.text("last_name", "Last name", &self.last_name, 2, 100);
        let password = v.password("password", "Password", &self.password, true).unwrap_or_default();
        if !v.has_error("password") && self.password != self.confirm_password {
            v.fail("confirm_password", "Passwords do not match");
        }

        v.finish(SignUpPayload {
            username,
            email,
            password,
            user_type: UserType::User,
            first_name,
            last_name,
            phone,
        })
    }
}
