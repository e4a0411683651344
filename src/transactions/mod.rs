pub mod actions;
pub mod error;
pub mod fees;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod step;

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::api::{
    query::{ListQuery, Owner, Page},
    ApiClient, ApiRequest,
};

use {error::*, models::*};


pub type DynTransactionService = Arc<dyn TransactionService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransactionService {
    async fn list_transactions(&self, token: &str, query: ListQuery) -> Result<Page<Transaction>>;
    /// `owner` limits the lookup to transactions the member is a party of
    async fn get_transaction(&self, token: &str, transaction_id: &str, owner: Option<Owner>) -> Result<Transaction>;
    async fn create_transaction(&self, token: &str, req: TransactionPayload) -> Result<()>;
    async fn update_transaction(&self, token: &str, transaction_id: &str, req: TransactionUpdate) -> Result<()>;
    async fn delete_transaction(&self, token: &str, transaction_id: &str) -> Result<()>;
}

pub struct ApiTransactionService {
    api: ApiClient,
}

impl ApiTransactionService {
    pub fn new_dyn(api: ApiClient) -> DynTransactionService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl TransactionService for ApiTransactionService {
    async fn list_transactions(&self, token: &str, query: ListQuery) -> Result<Page<Transaction>> {
        let req = ApiRequest::get("/transactions").token(token).list(&query);
        Ok(self.api.list(req, "transaction_items").await?)
    }

    async fn get_transaction(&self, token: &str, transaction_id: &str, owner: Option<Owner>) -> Result<Transaction> {
        let mut req = ApiRequest::get(format!("/transactions/{transaction_id}")).token(token);
        if let Some(owner) = &owner {
            req = req.owner(owner);
        }
        Ok(self.api.fetch(req).await?)
    }

    async fn create_transaction(&self, token: &str, req: TransactionPayload) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post("/transactions").token(token).json(&req)?).await?)
    }

    async fn update_transaction(&self, token: &str, transaction_id: &str, req: TransactionUpdate) -> Result<()> {
        let req = ApiRequest::put(format!("/transactions/{transaction_id}")).token(token).json(&req)?;
        Ok(self.api.execute(req).await?)
    }

    async fn delete_transaction(&self, token: &str, transaction_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::delete(format!("/transactions/{transaction_id}")).token(token)).await?)
    }
}
