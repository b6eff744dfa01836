//! Support chat: a client-side transcript cache in front of a remote completion service.
//!
//! The conversation is identified by a session id. The local transcript is only a cache of that
//! conversation, so clearing rotates the id before anything else and the old server-side context
//! becomes unreachable even if the reset request never arrives.

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::foundation::error::{ScrollyteError, ScrollyteResult};

/// Author of a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// Visitor.
    User,
    /// Completion service.
    Assistant,
    /// Local notice shown in place of a reply that failed.
    Error,
}

/// One transcript entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub role: ChatRole,
    /// Text as displayed.
    pub text: String,
    /// When the entry was added.
    pub at: DateTime<Utc>,
}

/// Cached conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Server-side conversation key.
    pub session_id: Uuid,
    /// Entries, oldest first.
    pub messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Empty transcript with a fresh session id.
    pub fn fresh() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            messages: Vec::new(),
        }
    }
}

/// Persistent cache for the transcript.
pub trait TranscriptStore {
    /// Cached transcript, if any.
    fn load(&self) -> ScrollyteResult<Option<Transcript>>;
    /// Replace the cached transcript.
    fn save(&mut self, transcript: &Transcript) -> ScrollyteResult<()>;
    /// Drop the cache.
    fn clear(&mut self) -> ScrollyteResult<()>;
}

/// Transcript kept in a JSON file.
#[derive(Clone, Debug)]
pub struct FileTranscriptStore {
    path: PathBuf,
}

impl FileTranscriptStore {
    /// Store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptStore for FileTranscriptStore {
    fn load(&self) -> ScrollyteResult<Option<Transcript>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(anyhow::Error::new(e).into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(t) => Ok(Some(t)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable transcript");
                Ok(None)
            }
        }
    }

    fn save(&mut self, transcript: &Transcript) -> ScrollyteResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(anyhow::Error::new)?;
        }
        let bytes = serde_json::to_vec_pretty(transcript)?;
        std::fs::write(&self.path, bytes).map_err(anyhow::Error::new)?;
        Ok(())
    }

    fn clear(&mut self) -> ScrollyteResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).into()),
        }
    }
}

/// Transcript kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryTranscriptStore {
    cached: Option<Transcript>,
}

impl MemoryTranscriptStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptStore for MemoryTranscriptStore {
    fn load(&self) -> ScrollyteResult<Option<Transcript>> {
        Ok(self.cached.clone())
    }

    fn save(&mut self, transcript: &Transcript) -> ScrollyteResult<()> {
        self.cached = Some(transcript.clone());
        Ok(())
    }

    fn clear(&mut self) -> ScrollyteResult<()> {
        self.cached = None;
        Ok(())
    }
}

/// Remote conversation service.
pub trait CompletionClient {
    /// Reply to `message` within conversation `session_id`.
    fn complete(
        &self,
        session_id: Uuid,
        message: &str,
    ) -> impl Future<Output = ScrollyteResult<String>> + Send;
    /// Forget the server-side context of `session_id`.
    fn reset(&self, session_id: Uuid) -> impl Future<Output = ScrollyteResult<()>> + Send;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    session_id: Uuid,
    message: &'a str,
}

#[derive(Serialize)]
struct ResetRequest {
    session_id: Uuid,
}

#[derive(Deserialize)]
struct CompletionReply {
    reply: String,
}

/// Completion service over HTTP. Replies are `{"reply": ".."}` or plain text.
#[derive(Clone, Debug)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    /// Client for `endpoint`; resets go to `{endpoint}/reset`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Client sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Completion endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompletionClient for HttpCompletionClient {
    #[tracing::instrument(skip(self, message))]
    async fn complete(&self, session_id: Uuid, message: &str) -> ScrollyteResult<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&CompletionRequest { session_id, message })
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ScrollyteError::remote(format!("chat endpoint returned {status}: {body}")));
        }
        Ok(match serde_json::from_str::<CompletionReply>(&body) {
            Ok(r) => r.reply,
            Err(_) => body,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn reset(&self, session_id: Uuid) -> ScrollyteResult<()> {
        let resp = self
            .client
            .post(format!("{}/reset", self.endpoint))
            .json(&ResetRequest { session_id })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrollyteError::remote(format!("chat reset returned {status}")));
        }
        Ok(())
    }
}

/// Scripted completion service that echoes messages and records resets.
#[derive(Debug, Default)]
pub struct EchoCompletionClient {
    resets: Mutex<Vec<Uuid>>,
    failing: bool,
}

impl EchoCompletionClient {
    /// Echoing client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Sessions reset so far.
    pub async fn resets(&self) -> Vec<Uuid> {
        self.resets.lock().await.clone()
    }
}

impl CompletionClient for EchoCompletionClient {
    async fn complete(&self, _session_id: Uuid, message: &str) -> ScrollyteResult<String> {
        if self.failing {
            return Err(ScrollyteError::remote("chat endpoint unreachable"));
        }
        Ok(format!("echo: {message}"))
    }

    async fn reset(&self, session_id: Uuid) -> ScrollyteResult<()> {
        if self.failing {
            return Err(ScrollyteError::remote("chat endpoint unreachable"));
        }
        self.resets.lock().await.push(session_id);
        Ok(())
    }
}

const FAILED_REPLY: &str = "Sorry, I couldn't reach the assistant. Please try again.";

/// Chat widget state.
#[derive(Debug)]
pub struct ChatSession<S: TranscriptStore, C: CompletionClient> {
    store: S,
    client: C,
    transcript: Transcript,
}

impl<S: TranscriptStore, C: CompletionClient> ChatSession<S, C> {
    /// Resume the cached conversation, or start a new one.
    pub fn open(mut store: S, client: C) -> ScrollyteResult<Self> {
        let transcript = match store.load()? {
            Some(t) => t,
            None => {
                let t = Transcript::fresh();
                store.save(&t)?;
                t
            }
        };
        Ok(Self {
            store,
            client,
            transcript,
        })
    }

    /// Current session id.
    pub fn session_id(&self) -> Uuid {
        self.transcript.session_id
    }

    /// Visible entries.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript.messages
    }

    /// Transcript cache.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Completion client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn push(&mut self, role: ChatRole, text: String, at: DateTime<Utc>) -> ScrollyteResult<()> {
        self.transcript.messages.push(ChatMessage { role, text, at });
        self.store.save(&self.transcript)
    }

    /// Send `text` and append the reply. A failed completion appends an
    /// [`ChatRole::Error`] entry instead of failing the call.
    #[tracing::instrument(skip(self, text), fields(session = %self.transcript.session_id))]
    pub async fn send(&mut self, text: &str, now: DateTime<Utc>) -> ScrollyteResult<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ScrollyteError::validation("message is empty"));
        }
        self.push(ChatRole::User, text.to_owned(), now)?;
        let reply = self.client.complete(self.transcript.session_id, text).await;
        match reply {
            Ok(reply) => self.push(ChatRole::Assistant, reply, now)?,
            Err(e) => {
                tracing::warn!(error = %e, "chat completion failed");
                self.push(ChatRole::Error, FAILED_REPLY.to_owned(), now)?;
            }
        }
        self.transcript
            .messages
            .last()
            .ok_or_else(|| ScrollyteError::evaluation("transcript is empty after send"))
    }

    /// Forget the conversation locally and remotely.
    #[tracing::instrument(skip(self), fields(session = %self.transcript.session_id))]
    pub async fn clear(&mut self) -> ScrollyteResult<()> {
        let old = std::mem::replace(&mut self.transcript, Transcript::fresh());
        self.store.clear()?;
        self.store.save(&self.transcript)?;
        if let Err(e) = self.client.reset(old.session_id).await {
            tracing::warn!(error = %e, "chat context reset failed, old session abandoned");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/site/chat.rs"]
mod tests;
