//! Persistence for form submissions.

use std::future::Future;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    foundation::error::{ScrollyteError, ScrollyteResult},
    site::forms::{ContactMessage, NewsletterSubscription, WaitlistSignup},
};

/// Table holding waitlist signups.
pub const WAITLIST_TABLE: &str = "waitlist";
/// Table holding newsletter subscriptions.
pub const NEWSLETTER_TABLE: &str = "newsletter";
/// Table holding contact messages.
pub const CONTACT_TABLE: &str = "contact_messages";

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Row sink for the three form tables.
pub trait Datastore {
    /// Insert a waitlist row.
    fn insert_waitlist(&self, row: &WaitlistSignup) -> impl Future<Output = ScrollyteResult<()>> + Send;
    /// Insert a newsletter row; a known email fails with [`ScrollyteError::Duplicate`].
    fn insert_newsletter(
        &self,
        row: &NewsletterSubscription,
    ) -> impl Future<Output = ScrollyteResult<()>> + Send;
    /// Insert a contact message.
    fn insert_contact(&self, row: &ContactMessage) -> impl Future<Output = ScrollyteResult<()>> + Send;
}

/// Hosted Postgres behind a PostgREST-style API.
#[derive(Clone, Debug)]
pub struct RestDatastore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestDatastore {
    /// Client for the project at `base_url`, authenticated with `api_key`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Same as [`RestDatastore::new`] over a preconfigured client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        }
    }

    /// Insert endpoint of `table`.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    #[tracing::instrument(skip(self, row))]
    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> ScrollyteResult<()> {
        let resp = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

/// Map a rejected insert to an error. Conflicts become [`ScrollyteError::Duplicate`].
pub fn classify_failure(status: StatusCode, body: &str) -> ScrollyteError {
    let code = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(str::to_owned));
    if status == StatusCode::CONFLICT || code.as_deref() == Some(UNIQUE_VIOLATION) {
        return ScrollyteError::duplicate(body.to_owned());
    }
    ScrollyteError::remote(format!("datastore returned {status}: {body}"))
}

impl Datastore for RestDatastore {
    async fn insert_waitlist(&self, row: &WaitlistSignup) -> ScrollyteResult<()> {
        self.insert(WAITLIST_TABLE, row).await
    }

    async fn insert_newsletter(&self, row: &NewsletterSubscription) -> ScrollyteResult<()> {
        self.insert(NEWSLETTER_TABLE, row).await
    }

    async fn insert_contact(&self, row: &ContactMessage) -> ScrollyteResult<()> {
        self.insert(CONTACT_TABLE, row).await
    }
}

#[derive(Debug, Default)]
struct Tables {
    waitlist: Vec<WaitlistSignup>,
    newsletter: Vec<NewsletterSubscription>,
    contact: Vec<ContactMessage>,
    calls: usize,
}

/// In-process datastore with the same uniqueness rule as the hosted one.
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    tables: Mutex<Tables>,
    unavailable: bool,
}

impl MemoryDatastore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every insert fails with a remote error.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Insert attempts seen so far, including rejected ones.
    pub async fn calls(&self) -> usize {
        self.tables.lock().await.calls
    }

    /// Stored waitlist rows.
    pub async fn waitlist(&self) -> Vec<WaitlistSignup> {
        self.tables.lock().await.waitlist.clone()
    }

    /// Stored newsletter rows.
    pub async fn newsletter(&self) -> Vec<NewsletterSubscription> {
        self.tables.lock().await.newsletter.clone()
    }

    /// Stored contact messages.
    pub async fn contact(&self) -> Vec<ContactMessage> {
        self.tables.lock().await.contact.clone()
    }

    fn check_available(&self) -> ScrollyteResult<()> {
        if self.unavailable {
            return Err(ScrollyteError::remote("datastore unavailable"));
        }
        Ok(())
    }
}

impl Datastore for MemoryDatastore {
    async fn insert_waitlist(&self, row: &WaitlistSignup) -> ScrollyteResult<()> {
        let mut t = self.tables.lock().await;
        t.calls += 1;
        self.check_available()?;
        t.waitlist.push(row.clone());
        Ok(())
    }

    async fn insert_newsletter(&self, row: &NewsletterSubscription) -> ScrollyteResult<()> {
        let mut t = self.tables.lock().await;
        t.calls += 1;
        self.check_available()?;
        if t.newsletter.iter().any(|r| r.email.eq_ignore_ascii_case(&row.email)) {
            return Err(ScrollyteError::duplicate(format!("{} is already subscribed", row.email)));
        }
        t.newsletter.push(row.clone());
        Ok(())
    }

    async fn insert_contact(&self, row: &ContactMessage) -> ScrollyteResult<()> {
        let mut t = self.tables.lock().await;
        t.calls += 1;
        self.check_available()?;
        t.contact.push(row.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/site/datastore.rs"]
mod tests;
