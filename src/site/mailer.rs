//! Transactional email for contact messages.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    foundation::error::{ScrollyteError, ScrollyteResult},
    site::forms::{ContactMessage, Inquiry},
};

/// JSON body accepted by the email endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmailPayload {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Inquiry kind.
    #[serde(rename = "type")]
    pub inquiry: Inquiry,
}

impl From<ContactMessage> for EmailPayload {
    fn from(m: ContactMessage) -> Self {
        Self {
            name: m.name,
            email: m.email,
            subject: m.subject,
            message: m.message,
            inquiry: m.inquiry,
        }
    }
}

/// Sends notification emails.
pub trait Mailer {
    /// Deliver one email.
    fn send(&self, payload: &EmailPayload) -> impl Future<Output = ScrollyteResult<()>> + Send;
}

/// Mailer posting JSON to an HTTP endpoint.
#[derive(Clone, Debug)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailer {
    /// Mailer for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Mailer sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint emails are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Mailer for HttpMailer {
    #[tracing::instrument(skip(self, payload), fields(endpoint = %self.endpoint))]
    async fn send(&self, payload: &EmailPayload) -> ScrollyteResult<()> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScrollyteError::remote(format!("email endpoint returned {status}: {body}")));
        }
        Ok(())
    }
}

/// Mailer that records what it was asked to send.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailPayload>>,
    failing: bool,
}

impl MemoryMailer {
    /// Recording mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Payloads accepted so far.
    pub async fn sent(&self) -> Vec<EmailPayload> {
        self.sent.lock().await.clone()
    }
}

impl Mailer for MemoryMailer {
    async fn send(&self, payload: &EmailPayload) -> ScrollyteResult<()> {
        if self.failing {
            return Err(ScrollyteError::remote("email endpoint unreachable"));
        }
        self.sent.lock().await.push(payload.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/site/mailer.rs"]
mod tests;
