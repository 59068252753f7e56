//! # Commander Directory
//!
//! Resolves a supreme commander's display name from their email.
//!
//! The directory is an external people service queried with
//! `GET {base_url}/users?email=<email>`; it answers with a JSON array of
//! users and the first user's `name` is taken. Any failure (transport error,
//! timeout, non-200, empty array, undecodable body) is reported as a single
//! `EnrichmentError::NotFound` naming the email, and the calling handler
//! aborts before touching storage.

use crate::config::{DirectoryConfig, DirectoryKind};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from the enrichment step.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The directory could not produce a name for this email.
    ///
    /// `reason` is kept for logs only; callers see the email.
    #[error("Supreme commander not found for email: {email}")]
    NotFound { email: String, reason: String },
}

impl EnrichmentError {
    fn not_found(email: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!(
            event = "enrichment_failure",
            email,
            reason = %reason,
            "Commander lookup failed"
        );
        Self::NotFound {
            email: email.to_string(),
            reason,
        }
    }
}

/// A source of commander display names.
#[async_trait]
pub trait CommanderDirectory: Send + Sync {
    /// Display name of the person registered under `email`.
    async fn resolve_name(&self, email: &str) -> Result<String, EnrichmentError>;
}

// =============================================================================
// HTTP DIRECTORY
// =============================================================================

/// One user entry as returned by the directory; other fields are ignored.
#[derive(Debug, Deserialize)]
struct DirectoryUser {
    name: String,
}

/// Directory backed by the remote people service.
#[derive(Clone)]
pub struct HttpDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CommanderDirectory for HttpDirectory {
    async fn resolve_name(&self, email: &str) -> Result<String, EnrichmentError> {
        let url = format!("{}/users", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| EnrichmentError::not_found(email, format!("request failed: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(EnrichmentError::not_found(
                email,
                format!("directory answered {status}"),
            ));
        }

        let users: Vec<DirectoryUser> = response
            .json()
            .await
            .map_err(|e| EnrichmentError::not_found(email, format!("unreadable body: {e}")))?;

        users
            .into_iter()
            .next()
            .map(|user| user.name)
            .ok_or_else(|| EnrichmentError::not_found(email, "no user with this email"))
    }
}

// =============================================================================
// STATIC DIRECTORY
// =============================================================================

/// Fixed email → name table. Emails match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: BTreeMap<String, String>,
}

impl StaticDirectory {
    pub fn new<E, N>(entries: impl IntoIterator<Item = (E, N)>) -> Self
    where
        E: AsRef<str>,
        N: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(email, name)| (email.as_ref().to_lowercase(), name.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CommanderDirectory for StaticDirectory {
    async fn resolve_name(&self, email: &str) -> Result<String, EnrichmentError> {
        self.entries
            .get(&email.to_lowercase())
            .cloned()
            .ok_or_else(|| EnrichmentError::not_found(email, "no static entry"))
    }
}

/// Build the directory selected by configuration.
pub fn build_directory(
    config: &DirectoryConfig,
) -> Result<Arc<dyn CommanderDirectory>, reqwest::Error> {
    match config.kind {
        DirectoryKind::Http => {
            let directory = HttpDirectory::new(
                config.base_url.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            tracing::info!("Commander directory: {}", directory.base_url());
            Ok(Arc::new(directory))
        }
        DirectoryKind::Static => {
            let directory = StaticDirectory::new(config.entries.clone());
            tracing::info!(
                "Commander directory: static table with {} entries",
                directory.len()
            );
            Ok(Arc::new(directory))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
