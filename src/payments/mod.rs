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

pub type DynPaymentService = Arc<dyn PaymentService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentService {
    async fn list_payments(&self, token: &str, query: ListQuery) -> Result<Page<Payment>>;
    async fn get_payment(&self, token: &str, payment_id: &str) -> Result<Payment>;
    async fn update_payment(&self, token: &str, payment_id: &str, req: PaymentUpdate) -> Result<()>;
    async fn delete_payment(&self, token: &str, payment_id: &str) -> Result<()>;
    /// Opens a hosted checkout for the buyer's share of a transaction
    async fn start_checkout(&self, token: &str, transaction_id: &str, req: CheckoutRequest) -> Result<Checkout>;
}

pub struct ApiPaymentService {
    api: ApiClient,
}

impl ApiPaymentService {
    pub fn new_dyn(api: ApiClient) -> DynPaymentService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl PaymentService for ApiPaymentService {
    async fn list_payments(&self, token: &str, query: ListQuery) -> Result<Page<Payment>> {
        let req = ApiRequest::get("/payments").token(token).list(&query);
        Ok(self.api.list(req, "payment_items").await?)
    }

    async fn get_payment(&self, token: &str, payment_id: &str) -> Result<Payment> {
        Ok(self.api.fetch(ApiRequest::get(format!("/payments/{payment_id}")).token(token)).await?)
    }

    async fn update_payment(&self, token: &str, payment_id: &str, req: PaymentUpdate) -> Result<()> {
        let req = ApiRequest::put(format!("/payments/{payment_id}")).token(token).json(&req)?;
        Ok(self.api.execute(req).await?)
    }

    async fn delete_payment(&self, token: &str, payment_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::delete(format!("/payments/{payment_id}")).token(token)).await?)
    }

    async fn start_checkout(&self, token: &str, transaction_id: &str, req: CheckoutRequest) -> Result<Checkout> {
        let req = ApiRequest::post("/pay")
            .token(token)
            .query("transaction", transaction_id)
            .json(&req)?;
        Ok(self.api.fetch(req).await?)
    }
}
