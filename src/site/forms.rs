//! Waitlist, newsletter and contact forms: client-side validation, submission and UI state.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{ScrollyteError, ScrollyteResult},
    site::{datastore::Datastore, mailer::Mailer},
};

/// How long a success confirmation stays visible.
pub const DISMISS_AFTER: TimeDelta = TimeDelta::milliseconds(3500);

/// Who is joining the waitlist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A person.
    #[default]
    Individual,
    /// A company or institution.
    Organization,
}

/// Kind of contact inquiry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inquiry {
    /// General question.
    #[default]
    General,
    /// Sales request.
    Sales,
}

/// Row of the `waitlist` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaitlistSignup {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Individual or organization.
    pub role: Role,
    /// Which page or widget the signup came from.
    pub source: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// Row of the `newsletter` table. `email` is unique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    /// Subscriber email.
    pub email: String,
    /// Which page or widget the subscription came from.
    pub source: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// Row of the `contact_messages` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
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
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// What the form shows.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub enum FormState {
    /// Ready for input.
    #[default]
    Idle,
    /// Request in flight; the submit control is disabled.
    Submitting,
    /// Saved; the confirmation disappears at `dismiss_at`.
    Succeeded {
        /// When the confirmation auto-dismisses.
        dismiss_at: DateTime<Utc>,
    },
    /// The email was already on the list.
    AlreadySubscribed,
    /// Rejected or failed, with a short message for the user.
    Failed(String),
}

impl FormState {
    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !matches!(self, Self::Submitting)
    }

    /// Auto-dismiss an expired confirmation.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Self::Succeeded { dismiss_at } = self {
            if now >= *dismiss_at {
                *self = Self::Idle;
            }
        }
    }
}

/// Basic shape check: one `@`, a non-empty local part, a dotted domain, no whitespace.
pub fn validate_email(email: &str) -> ScrollyteResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ScrollyteError::validation("Email is required"));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ScrollyteError::validation("Please enter a valid email address"));
    }
    Ok(email.to_owned())
}

fn required(value: &str, what: &str) -> ScrollyteResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ScrollyteError::validation(format!("{what} is required")));
    }
    Ok(v.to_owned())
}

fn user_message(err: &ScrollyteError) -> String {
    match err {
        ScrollyteError::Validation(msg) => msg.clone(),
        _ => "Something went wrong. Please try again.".to_owned(),
    }
}

/// Waitlist form.
#[derive(Clone, Debug, Default)]
pub struct WaitlistForm {
    /// Name field.
    pub name: String,
    /// Email field.
    pub email: String,
    /// Role selector.
    pub role: Role,
    state: FormState,
}

impl WaitlistForm {
    /// Form filled with the given fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            state: FormState::Idle,
        }
    }

    /// Current UI state.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Row the form would submit, or the reason it cannot.
    pub fn validate(&self, source: &str, now: DateTime<Utc>) -> ScrollyteResult<WaitlistSignup> {
        Ok(WaitlistSignup {
            name: required(&self.name, "Name")?,
            email: validate_email(&self.email)?,
            role: self.role,
            source: source.to_owned(),
            created_at: now,
        })
    }

    /// Validate, store, and clear on success.
    #[tracing::instrument(skip(self, store))]
    pub async fn submit<D: Datastore>(&mut self, store: &D, source: &str, now: DateTime<Utc>) -> &FormState {
        if !self.state.can_submit() {
            return &self.state;
        }
        let row = match self.validate(source, now) {
            Ok(row) => row,
            Err(e) => {
                self.state = FormState::Failed(user_message(&e));
                return &self.state;
            }
        };
        self.state = FormState::Submitting;
        self.state = match store.insert_waitlist(&row).await {
            Ok(()) => {
                *self = Self::default();
                FormState::Succeeded {
                    dismiss_at: now + DISMISS_AFTER,
                }
            }
            Err(e) if e.is_duplicate() => FormState::AlreadySubscribed,
            Err(e) => {
                tracing::warn!(error = %e, "waitlist signup failed");
                FormState::Failed(user_message(&e))
            }
        };
        &self.state
    }

    /// Advance auto-dismiss.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.state.tick(now);
    }
}

/// Newsletter form.
#[derive(Clone, Debug, Default)]
pub struct NewsletterForm {
    /// Email field.
    pub email: String,
    state: FormState,
}

impl NewsletterForm {
    /// Form filled with `email`.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            state: FormState::Idle,
        }
    }

    /// Current UI state.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Validate and store. A duplicate email is reported as [`FormState::AlreadySubscribed`].
    #[tracing::instrument(skip(self, store))]
    pub async fn submit<D: Datastore>(&mut self, store: &D, source: &str, now: DateTime<Utc>) -> &FormState {
        if !self.state.can_submit() {
            return &self.state;
        }
        let email = match validate_email(&self.email) {
            Ok(email) => email,
            Err(e) => {
                self.state = FormState::Failed(user_message(&e));
                return &self.state;
            }
        };
        let row = NewsletterSubscription {
            email,
            source: source.to_owned(),
            created_at: now,
        };
        self.state = FormState::Submitting;
        self.state = match store.insert_newsletter(&row).await {
            Ok(()) => {
                self.email.clear();
                FormState::Succeeded {
                    dismiss_at: now + DISMISS_AFTER,
                }
            }
            Err(e) if e.is_duplicate() => FormState::AlreadySubscribed,
            Err(e) => {
                tracing::warn!(error = %e, "newsletter subscription failed");
                FormState::Failed(user_message(&e))
            }
        };
        &self.state
    }

    /// Advance auto-dismiss.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.state.tick(now);
    }
}

/// Contact form.
#[derive(Clone, Debug, Default)]
pub struct ContactForm {
    /// Name field.
    pub name: String,
    /// Email field.
    pub email: String,
    /// Subject field.
    pub subject: String,
    /// Message field.
    pub message: String,
    /// Inquiry selector.
    pub inquiry: Inquiry,
    state: FormState,
}

impl ContactForm {
    /// Form filled with the sender and their message.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
        inquiry: Inquiry,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
            inquiry,
            state: FormState::Idle,
        }
    }

    /// Current UI state.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Row the form would submit, or the reason it cannot.
    pub fn validate(&self, now: DateTime<Utc>) -> ScrollyteResult<ContactMessage> {
        let email = validate_email(&self.email)?;
        let message = required(&self.message, "Message")?;
        Ok(ContactMessage {
            name: self.name.trim().to_owned(),
            email,
            subject: self.subject.trim().to_owned(),
            message,
            inquiry: self.inquiry,
            created_at: now,
        })
    }

    /// Validate, store, then notify by email. The email is best-effort: its failure is logged
    /// and the stored message stands.
    #[tracing::instrument(skip(self, store, mailer))]
    pub async fn submit<D: Datastore, M: Mailer>(
        &mut self,
        store: &D,
        mailer: &M,
        now: DateTime<Utc>,
    ) -> &FormState {
        if !self.state.can_submit() {
            return &self.state;
        }
        let row = match self.validate(now) {
            Ok(row) => row,
            Err(e) => {
                self.state = FormState::Failed(user_message(&e));
                return &self.state;
            }
        };
        self.state = FormState::Submitting;
        if let Err(e) = store.insert_contact(&row).await {
            tracing::warn!(error = %e, "contact message failed");
            self.state = FormState::Failed(user_message(&e));
            return &self.state;
        }
        if let Err(e) = mailer.send(&row.clone().into()).await {
            tracing::warn!(error = %e, "contact email failed, message kept");
        }
        *self = Self::default();
        self.state = FormState::Succeeded {
            dismiss_at: now + DISMISS_AFTER,
        };
        &self.state
    }

    /// Advance auto-dismiss.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.state.tick(now);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/site/forms.rs"]
mod tests;
