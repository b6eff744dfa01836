//! Site plumbing around the engine: pages, forms and their remote collaborators.

pub mod app;
pub mod chat;
pub mod config;
pub mod datastore;
pub mod forms;
pub mod mailer;
pub mod routes;

#[cfg(test)]
#[path = "../../tests/unit/site/serve.rs"]
pub(crate) mod serve;
