//! Best-effort off-box durability for the progress documents.
//!
//! After every checkpoint the two progress files can be pushed to a remote
//! store so a lost box does not mean a lost crawl. Backup failures are
//! logged at `warn` and never propagate — local durability is the
//! correctness mechanism, the remote copy is insurance.

use std::time::Duration;

use thiserror::Error;

use crate::store::ProgressStore;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backup store returned HTTP {status} for {name}")]
    UnexpectedStatus { status: u16, name: String },

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for progress-document pushes.
pub trait BackupSink {
    /// Stores `bytes` under `name` at the remote destination.
    fn push_document(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<(), BackupError>> + Send;
}

/// [`BackupSink`] that PUTs each document to `{base_url}/{name}`.
pub struct HttpBackupSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackupSink {
    /// # Errors
    ///
    /// Returns [`BackupError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, BackupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl BackupSink for HttpBackupSink {
    async fn push_document(&self, name: &str, bytes: Vec<u8>) -> Result<(), BackupError> {
        let url = format!("{}/{name}", self.base_url);
        let response = self.client.put(&url).body(bytes).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackupError::UnexpectedStatus {
                status: status.as_u16(),
                name: name.to_owned(),
            });
        }
        Ok(())
    }
}

/// Pushes both progress documents to the sink, best-effort.
///
/// Reads the files as persisted (not the in-memory state) so the remote
/// copy always matches a checkpoint that actually hit disk. Every failure
/// is swallowed after a `warn!`.
pub async fn backup_after_checkpoint<S: BackupSink>(sink: &S, store: &ProgressStore) {
    for path in [store.accumulator_path(), store.cursor_path()] {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping backup of unreadable document");
                continue;
            }
        };
        if let Err(e) = sink.push_document(&name, bytes).await {
            tracing::warn!(document = %name, error = %e, "progress backup failed — continuing");
        }
    }
}
