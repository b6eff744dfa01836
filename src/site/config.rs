//! Site endpoints from the environment.

use crate::{
    foundation::error::{ScrollyteError, ScrollyteResult},
    site::{chat::HttpCompletionClient, mailer::HttpMailer},
};

/// Where the site's remote collaborators live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteConfig {
    /// Datastore project URL.
    pub datastore_url: Option<String>,
    /// Datastore API key.
    pub datastore_key: Option<String>,
    /// Email endpoint for contact notifications.
    pub email_endpoint: Option<String>,
    /// Chat completion endpoint.
    pub chat_endpoint: Option<String>,
    /// Public origin used for canonical links.
    pub site_url: String,
}

/// Used when `SCROLLYTE_SITE_URL` is unset.
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

impl SiteConfig {
    /// Read the `SCROLLYTE_*` variables. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        Self {
            datastore_url: get("SCROLLYTE_DATASTORE_URL"),
            datastore_key: get("SCROLLYTE_DATASTORE_KEY"),
            email_endpoint: get("SCROLLYTE_EMAIL_ENDPOINT"),
            chat_endpoint: get("SCROLLYTE_CHAT_ENDPOINT"),
            site_url: get("SCROLLYTE_SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_owned()),
        }
    }

    /// Datastore URL and key, or a validation error naming what is missing.
    pub fn datastore(&self) -> ScrollyteResult<(&str, &str)> {
        match (&self.datastore_url, &self.datastore_key) {
            (Some(url), Some(key)) => Ok((url, key)),
            (None, _) => Err(ScrollyteError::validation("SCROLLYTE_DATASTORE_URL is not set")),
            (_, None) => Err(ScrollyteError::validation("SCROLLYTE_DATASTORE_KEY is not set")),
        }
    }

    /// Mailer for contact notifications.
    pub fn mailer(&self) -> ScrollyteResult<HttpMailer> {
        self.email_endpoint
            .as_deref()
            .map(HttpMailer::new)
            .ok_or_else(|| ScrollyteError::validation("SCROLLYTE_EMAIL_ENDPOINT is not set"))
    }

    /// Completion client for the support chat.
    pub fn completion_client(&self) -> ScrollyteResult<HttpCompletionClient> {
        self.chat_endpoint
            .as_deref()
            .map(HttpCompletionClient::new)
            .ok_or_else(|| ScrollyteError::validation("SCROLLYTE_CHAT_ENDPOINT is not set"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/site/config.rs"]
mod tests;
