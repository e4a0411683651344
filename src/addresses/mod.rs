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

pub type DynAddressService = Arc<dyn AddressService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AddressService {
    async fn list_addresses(&self, token: &str, query: ListQuery) -> Result<Page<Address>>;
    async fn get_address(&self, token: &str, address_id: &str) -> Result<Address>;
    async fn create_address(&self, token: &str, req: AddressPayload) -> Result<()>;
    async fn update_address(&self, token: &str, address_id: &str, req: AddressPayload) -> Result<()>;
    async fn delete_address(&self, token: &str, address_id: &str) -> Result<()>;
    /// Marks the address inactive instead of deleting it
    async fn remove_address(&self, token: &str, address_id: &str) -> Result<()>;
}

pub struct ApiAddressService {
    api: ApiClient,
}

impl ApiAddressService {
    pub fn new_dyn(api: ApiClient) -> DynAddressService {
        Arc::new(Self { api })
    }
}

#[async_trait]
impl AddressService for ApiAddressService {
    async fn list_addresses(&self, token: &str, query: ListQuery) -> Result<Page<Address>> {
        let req = ApiRequest::get("/addresses").token(token).list(&query);
        Ok(self.api.list(req, "address_items").await?)
    }

    async fn get_address(&self, token: &str, address_id: &str) -> Result<Address> {
        Ok(self.api.fetch(ApiRequest::get(format!("/addresses/{address_id}")).token(token)).await?)
    }

    async fn create_address(&self, token: &str, req: AddressPayload) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post("/addresses").token(token).json(&req)?).await?)
    }

    async fn update_address(&self, token: &str, address_id: &str, req: AddressPayload) -> Result<()> {
        let req = ApiRequest::put(format!("/addresses/{address_id}")).token(token).json(&req)?;
        Ok(self.api.execute(req).await?)
    }

    async fn delete_address(&self, token: &str, address_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::delete(format!("/addresses/{address_id}")).token(token)).await?)
    }

    async fn remove_address(&self, token: &str, address_id: &str) -> Result<()> {
        Ok(self.api.execute(ApiRequest::post(format!("/addresses/remove/{address_id}")).token(token)).await?)
    }
}
