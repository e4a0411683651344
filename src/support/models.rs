use std::collections::BTreeMap;

use serde::Serialize;

use crate::{config::EmailConfig, transactions::actions::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportKind {
    Cancellation,
    Dispute,
    Help,
}

impl SupportKind {
    /// Message shown when the form is sent without any text
    pub fn blank_message(self) -> &'static str {
        match self {
            SupportKind::Cancellation => "Please provide a reason for cancellation",
            SupportKind::Dispute => "Please provide a reason for the dispute",
            SupportKind::Help => "Please provide a message",
        }
    }
}

/// A member asking the support team to look at a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct SupportRequest {
    pub kind: SupportKind,
    pub transaction_id: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub seller_name: String,
    pub seller_email: String,
    pub requested_by: Role,
    pub message: String,
}

impl SupportRequest {
    fn title(&self) -> Option<&'static str> {
        match self.kind {
            SupportKind::Cancellation => Some("Transaction Cancellation"),
            SupportKind::Dispute => Some("Transaction Disputed"),
            SupportKind::Help => None,
        }
    }

    fn description(&self) -> Option<String> {
        match self.kind {
            SupportKind::Cancellation => Some(format!(
                "The transaction has been requested for cancellation by {} and requires your attention. \
                 Please review the details below and take appropriate action.",
                self.requested_by.label().to_lowercase()
            )),
            SupportKind::Dispute => Some(
                "The transaction has been disputed and requires your attention. \
                 Please review the details below and take appropriate action."
                    .to_string(),
            ),
            SupportKind::Help => None,
        }
    }
}

/// Body of an EmailJS `email/send` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub template_params: BTreeMap<&'static str, String>,
}

impl EmailMessage {
    ///
    /// Cancellations and disputes use the transaction template with a
    /// title and description; help requests use the help template and
    /// name who asked.
    ///
    pub fn for_request(config: &EmailConfig, req: &SupportRequest) -> Self {
        let mut params = BTreeMap::from([
            ("to_email", config.to_email.clone()),
            ("url_email", config.dashboard_url.clone()),
            ("transaction_id", req.transaction_id.clone()),
            ("buyer_name", req.buyer_name.clone()),
            ("buyer_email", req.buyer_email.clone()),
            ("seller_name", req.seller_name.clone()),
            ("seller_email", req.seller_email.clone()),
        ]);

        let template_id = match (req.title(), req.description()) {
            (Some(title), Some(description)) => {
                params.insert("reason", req.message.clone());
                params.insert("title", title.to_string());
                params.insert("description", description);
                config.transaction_template.clone()
            }
            _ => {
                params.insert("request_by", req.requested_by.label().to_string());
                params.insert("message", req.message.clone());
                config.help_template.clone()
            }
        };

        Self {
            service_id: config.service_id.clone(),
            template_id,
            user_id: config.public_key.clone(),
            template_params: params,
        }
    }
}
