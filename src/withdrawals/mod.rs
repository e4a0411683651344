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

#[cfg(test)]
mod test;

pub type DynWithdrawalService = Arc<dyn WithdrawalService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait WithdrawalService {
    async fn list_withdrawals(&self, token: &str, query: ListQuery) -> Result<Page<Withdrawal>>;
    async fn get_withdrawal(&self, token: &str, withdrawal_id: &str) -> Result<Withdrawal>;
    async fn create_withdrawal(&self, token: &str, req: WithdrawalPayload) -> Result<()>;
    async fn update_withdrawal(&self, token: &str, withdrawal_id: &str, req: WithdrawalPayload) -> Result<()>;
    async fn delete_withdrawal(&self, token: &str, withdrawal_id: &str) -> Result<()>;
}

pub struct ApiWithdrawalService {
    api: ApiClient,
}

impl ApiWithdrawalService {
    pub fn new_dyn(api: ApiClient) -> DynWithdrawalService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl WithdrawalService for ApiWithdrawalService {
    async fn list_withdrawals(&self, token: &str, query: ListQuery) -> Result<Page<Withdrawal>> {
        let req = ApiRequest::get("/withdrawals").token(token).list(&query);
        Ok(self.api.list(req, "withdrawal_items").await?)
    }

    async fn get_withdrawal(&self, token: &str, withdrawal_id: &str) -> Result<Withdrawal> {
        Ok(self.api.fetch(ApiRequest::get(format!("/withdrawals/{withdrawal_id}")).token(token)).await?)
    }

    async fn create_withdrawal(&self, token: &str, req: WithdrawalPayload) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post("/withdrawals").token(token).json(&req)?).await?)
    }

    async fn update_withdrawal(&self, token: &str, withdrawal_id: &str, req: WithdrawalPayload) -> Result<()> {
        let req = ApiRequest::put(format!("/withdrawals/{withdrawal_id}")).token(token).json(&req)?;
        Ok(self.api.execute(req).await?)
    }

    async fn delete_withdrawal(&self, token: &str, withdrawal_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::delete(format!("/withdrawals/{withdrawal_id}")).token(token)).await?)
    }
}
