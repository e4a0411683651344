pub mod error;
pub mod query;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use reqwest::{
    multipart::{Form, Part},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

use error::*;
use query::{ListQuery, Owner, Page};

#[cfg(test)]
mod test;

pub const TOKEN_HEADER: &str = "token";

pub type DynApiTransport = Arc<dyn ApiTransport + Send + Sync>;

/// A file forwarded to the API's upload endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    File(Upload),
}

///
/// A single call against the Flexcrow API, independent of the HTTP
/// client that performs it.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub token: Option<String>,
    pub payload: Payload,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: vec![],
            token: None,
            payload: Payload::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self { Self::new(Method::GET, path) }
    pub fn post(path: impl Into<String>) -> Self { Self::new(Method::POST, path) }
    pub fn put(path: impl Into<String>) -> Self { Self::new(Method::PUT, path) }
    pub fn delete(path: impl Into<String>) -> Self { Self::new(Method::DELETE, path) }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Scopes a single record lookup to the records `owner` may see
    pub fn owner(mut self, owner: &Owner) -> Self {
        self.query.push(owner.pair());
        self
    }

    pub fn list(mut self, list: &ListQuery) -> Self {
        self.query.extend(list.to_query());
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.payload = Payload::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn file(mut self, upload: Upload) -> Self {
        self.payload = Payload::File(upload);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse>;
}

pub struct ReqwestApiTransport {
    client: Client,
    base_url: String,
}

impl ReqwestApiTransport {
    pub fn new_dyn(client: Client, base_url: &str) -> DynApiTransport {
        Arc::new(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn build_client(timeout_secs: u64) -> Result<Client> {
        Ok(Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?)
    }
}

#[async_trait]
impl ApiTransport for ReqwestApiTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse> {
        let mut builder = self.client.request(req.method, format!("{}{}", self.base_url, req.path));
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = &req.token {
            builder = builder.header(TOKEN_HEADER, token);
        }

        builder = match req.payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::File(upload) => {
                let part = Part::bytes(upload.bytes)
                    .file_name(upload.file_name)
                    .mime_str(&upload.content_type)?;
                builder.multipart(Form::new().part("file", part))
            }
        };

        let res = builder.send().await?;
        let status = res.status();
        Ok(ApiResponse { status, body: res.text().await? })
    }
}

///
/// Typed helpers over an [`ApiTransport`]. Every non-2xx answer becomes
/// [`Error::StatusCodeFetchError`] carrying the raw body, so callers can
/// look for the API's error codes.
///
#[derive(Clone)]
pub struct ApiClient {
    transport: DynApiTransport,
}

impl ApiClient {
    pub fn new(transport: DynApiTransport) -> Self {
        Self { transport }
    }

    async fn exchange(&self, req: ApiRequest) -> Result<String> {
        debug!("{} {}", req.method, req.path);
        let res = self.transport.send(req).await?;
        if !res.status.is_success() {
            return Err(Error::StatusCodeFetchError(res.status, res.body));
        }
        Ok(res.body)
    }

    pub async fn fetch<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T> {
        let body = self.exchange(req).await?;
        Ok(serde_json::from_str::<T>(&body)?)
    }

    /// Runs a call whose response body is not needed
    pub async fn execute(&self, req: ApiRequest) -> Result<()> {
        self.exchange(req).await?;
        Ok(())
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
        items_key: &str,
    ) -> Result<Page<T>> {
        let body = self.fetch::<Value>(req).await?;
        Ok(Page::from_envelope(body, items_key)?)
    }
}
