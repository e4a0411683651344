pub mod error;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use reqwest::Client;

#[cfg(test)]
use mockall::automock;

use crate::config::EmailConfig;

use {error::*, models::*};


pub type DynSupportMailer = Arc<dyn SupportMailer + Send + Sync>;

/// Forwards support requests to the people who handle them
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SupportMailer {
    async fn send(&self, req: SupportRequest) -> Result<()>;
}

pub struct EmailJsMailer {
    client: Client,
    config: EmailConfig,
}

impl EmailJsMailer {
    pub fn new_dyn(client: Client, config: EmailConfig) -> DynSupportMailer {
        Arc::new(Self { client, config })
    }
}

#[async_trait]
impl SupportMailer for EmailJsMailer {
    async fn send(&self, req: SupportRequest) -> Result<()> {
        let message = EmailMessage::for_request(&self.config, &req);
        let res = self.client.post(&self.config.endpoint).json(&message).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::StatusCodeSendError(status, res.text().await?));
        }
        info!("Sent {:?} request for transaction {}", req.kind, req.transaction_id);
        Ok(())
    }
}
