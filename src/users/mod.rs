pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::api::{
    query::{ListQuery, Page},
    ApiClient, ApiRequest,
};

use {error::*, models::*};


pub type DynUserService = Arc<dyn UserService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserService {
    async fn list_users(&self, token: &str, query: ListQuery) -> Result<Page<User>>;
    async fn get_user(&self, token: &str, user_id: &str) -> Result<User>;
    /// Public profile of any user, used to put names on table rows
    async fn user_summary(&self, token: &str, user_id: &str) -> Result<User>;
    async fn create_user(&self, token: &str, req: UserPayload) -> Result<()>;
    async fn update_user(&self, token: &str, user_id: &str, req: UserPayload) -> Result<()>;
    async fn update_profile(&self, token: &str, user_id: &str, req: ProfilePayload) -> Result<()>;
    async fn change_password(&self, token: &str, user_id: &str, req: PasswordPayload) -> Result<()>;
    async fn delete_user(&self, token: &str, user_id: &str) -> Result<()>;
}

pub struct ApiUserService {
    api: ApiClient,
}

impl ApiUserService {
    pub fn new_dyn(api: ApiClient) -> DynUserService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl UserService for ApiUserService {
    async fn list_users(&self, token: &str, query: ListQuery) -> Result<Page<User>> {
        let req = ApiRequest::get("/users").token(token).list(&query);
        Ok(self.api.list(req, "user_items").await?)
    }

    async fn get_user(&self, token: &str, user_id: &str) -> Result<User> {
        Ok(self.api.fetch(ApiRequest::get(format!("/users/{user_id}")).token(token)).await?)
    }

    async fn user_summary(&self, token: &str, user_id: &str) -> Result<User> {
        let req = ApiRequest::get("/users/username").token(token).query("user_id", user_id);
        Ok(self.api.fetch(req).await?)
    }

    async fn create_user(&self, token: &str, req: UserPayload) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post("/users").token(token).json(&req)?).await?)
    }

    async fn update_user(&self, token: &str, user_id: &str, req: UserPayload) -> Result<()> {
        let req = ApiRequest::put(format!("/users/{user_id}")).token(token).json(&req)?;
        Ok(self.api.execute(req).await?)
    }

    async fn update_profile(&self, token: &str, user_id: &str, req: ProfilePayload) -> Result<()> {
        let req = ApiRequest::put(format!("/users/{user_id}")).token(token).json(&req)?;
        Ok(self.api.execute(req).await?)
    }

    async fn change_password(&self, token: &str, user_id: &str, req: PasswordPayload) -> Result<()> {
        let req = ApiRequest::put(format!("/users/{user_id}/password")).token(token).json(&req)?;
        Ok(self.api.execute(req).await?)
    }

    async fn delete_user(&self, token: &str, user_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::delete(format!("/users/{user_id}")).token(token)).await?)
    }
}
