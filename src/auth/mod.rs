pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    api::{ApiClient, ApiRequest},
    models::UserType,
    users::models::User,
};

use {error::*, models::*};

#[cfg(test)]
mod test;

pub type DynAuthService = Arc<dyn AuthService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthService {
    async fn login(&self, req: LoginModel) -> Result<Session>;
    async fn sign_up(&self, req: SignUpPayload) -> Result<()>;
    /// The account behind the session, as returned by `/auth/data`
    async fn current_user(&self, token: &str) -> Result<User>;
    async fn user_type(&self, token: &str) -> Result<UserType>;
}

pub struct ApiAuthService {
    api: ApiClient,
}

impl ApiAuthService {
    pub fn new_dyn(api: ApiClient) -> DynAuthService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl AuthService for ApiAuthService {
    async fn login(&self, req: LoginModel) -> Result<Session> {
        let res: LoginResponseModel = self.api.fetch(ApiRequest::post("/users/login").json(&req)?).await?;

        let token = res.token.filter(|t| !t.trim().is_empty()).ok_or(Error::MissingToken)?;
        Ok(Session { token, user_type: res.user_type.unwrap_or(UserType::User) })
    }

    async fn sign_up(&self, req: SignUpPayload) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post("/users/signup").json(&req)?).await?)
    }

    async fn current_user(&self, token: &str) -> Result<User> {
        Ok(self.api.fetch(ApiRequest::get("/auth/data").token(token)).await?)
    }

    async fn user_type(&self, token: &str) -> Result<UserType> {
        let res: VerifyResponseModel = self.api.fetch(ApiRequest::get("/auth/verify").token(token)).await?;
        Ok(res.user_type)
    }
}
