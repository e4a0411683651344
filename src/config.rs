use std::{env, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::api::query::DEFAULT_RECORDS_PER_PAGE;

pub const API_URL_VAR: &str = "FLEXCROW_API_URL";
pub const EMAIL_PUBLIC_KEY_VAR: &str = "FLEXCROW_EMAIL_PUBLIC_KEY";
pub const LISTEN_ADDR_VAR: &str = "FLEXCROW_LISTEN_ADDR";

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not read the configuration file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Could not parse the configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No API base URL configured. Set `api_base_url` or FLEXCROW_API_URL")]
    MissingApiUrl,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_records_per_page")]
    pub records_per_page: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_templates")]
    pub templates: String,
    pub email: EmailConfig,
}

///
/// Settings of the transactional email service that receives
/// cancellation, dispute and help requests.
///
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_endpoint")]
    pub endpoint: String,
    pub service_id: String,
    pub transaction_template: String,
    pub help_template: String,
    #[serde(default)]
    pub public_key: String,
    pub to_email: String,
    pub dashboard_url: String,
}

fn default_listen_addr() -> String { "0.0.0.0:3000".to_string() }
fn default_records_per_page() -> u64 { DEFAULT_RECORDS_PER_PAGE }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_templates() -> String { "templates/**/*.html".to_string() }
fn default_email_endpoint() -> String { EMAILJS_SEND_URL.to_string() }

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = serde_json::from_str::<Config>(&fs::read_to_string(path)?)?;
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Environment values win over the file, blank values are ignored
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(API_URL_VAR) { self.api_base_url = url; }
        if let Some(addr) = lookup(LISTEN_ADDR_VAR) { self.listen_addr = addr; }
        if let Some(key) = lookup(EMAIL_PUBLIC_KEY_VAR) { self.email.public_key = key; }
        if self.records_per_page == 0 { self.records_per_page = DEFAULT_RECORDS_PER_PAGE; }
    }

    fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::MissingApiUrl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    const CONFIG_JSON: &str = r#"{
        "api_base_url": "http://localhost:8000",
        "email": {
            "service_id": "service_flexcrow",
            "transaction_template": "template_tx",
            "help_template": "template_help",
            "to_email": "support@flexcrow.test",
            "dashboard_url": "http://localhost:3000"
        }
    }"#;

    #[test]
    fn test_defaults_fill_missing_fields() -> anyhow::Result<()> {
        let config = serde_json::from_str::<Config>(CONFIG_JSON)?;

        assert_eq!("0.0.0.0:3000", config.listen_addr);
        assert_eq!(10, config.records_per_page);
        assert_eq!(30, config.request_timeout_secs);
        assert_eq!(EMAILJS_SEND_URL, config.email.endpoint);
        assert!(config.email.public_key.is_empty());
        Ok(())
    }

    #[test]
    fn test_environment_overrides_file() -> anyhow::Result<()> {
        let mut config = serde_json::from_str::<Config>(CONFIG_JSON)?;
        let vars = HashMap::from([
            (API_URL_VAR, "https://api.flexcrow.test"),
            (EMAIL_PUBLIC_KEY_VAR, "pk_123"),
            (LISTEN_ADDR_VAR, "  "),
        ]);

        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!("https://api.flexcrow.test", config.api_base_url);
        assert_eq!("pk_123", config.email.public_key);
        assert_eq!("0.0.0.0:3000", config.listen_addr);
        Ok(())
    }

    #[test]
    fn test_missing_api_url_is_rejected() -> anyhow::Result<()> {
        let mut config = serde_json::from_str::<Config>(CONFIG_JSON)?;
        config.api_base_url = String::new();
        assert!(matches!(config.validate(), Err(Error::MissingApiUrl)));
        Ok(())
    }
}
