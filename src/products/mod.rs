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

pub type DynProductService = Arc<dyn ProductService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductService {
    async fn list_products(&self, token: &str, query: ListQuery) -> Result<Page<Product>>;
    async fn get_product(&self, token: &str, product_id: &str) -> Result<Product>;
    async fn create_product(&self, token: &str, req: ProductPayload) -> Result<()>;
    async fn delete_product(&self, token: &str, product_id: &str) -> Result<()>;
    /// Marks the product inactive instead of deleting it
    async fn remove_product(&self, token: &str, product_id: &str) -> Result<()>;
}

pub struct ApiProductService {
    api: ApiClient,
}

impl ApiProductService {
    pub fn new_dyn(api: ApiClient) -> DynProductService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl ProductService for ApiProductService {
    async fn list_products(&self, token: &str, query: ListQuery) -> Result<Page<Product>> {
        let req = ApiRequest::get("/products").token(token).list(&query);
        Ok(self.api.list(req, "product_items").await?)
    }

    async fn get_product(&self, token: &str, product_id: &str) -> Result<Product> {
        Ok(self.api.fetch(ApiRequest::get(format!("/products/{product_id}")).token(token)).await?)
    }

    async fn create_product(&self, token: &str, req: ProductPayload) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post("/products").token(token).json(&req)?).await?)
    }

    async fn delete_product(&self, token: &str, product_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::delete(format!("/products/{product_id}")).token(token)).await?)
    }

    async fn remove_product(&self, token: &str, product_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post(format!("/products/remove/{product_id}")).token(token)).await?)
    }
}
