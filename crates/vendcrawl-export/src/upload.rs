//! Multi-destination upload client for finalized region exports.
//!
//! The crawl engine's only contract with this module: each file is pushed
//! to every configured destination through the supplied retry policy, and
//! the upload as a whole succeeds only when **every** destination has
//! accepted the file. A region is not marked completed until that holds —
//! losing exported output is treated as worse than re-scraping.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use vendcrawl_fetch::RetryPolicy;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("destination {destination} returned HTTP {status}")]
    UnexpectedStatus { status: u16, destination: String },

    #[error("{failed} of {total} upload destinations failed")]
    Incomplete { failed: usize, total: usize },
}

/// Uploads a file to a fixed list of destinations by HTTP PUT to
/// `{destination}/{file_name}`.
pub struct Uploader {
    client: reqwest::Client,
    destinations: Vec<String>,
}

impl Uploader {
    /// # Errors
    ///
    /// Returns [`UploadError::Http`] if the HTTP client cannot be built.
    pub fn new(
        destinations: Vec<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            destinations,
        })
    }

    #[must_use]
    pub fn has_destinations(&self) -> bool {
        !self.destinations.is_empty()
    }

    /// Pushes `path` to every destination, retrying each through `retry`.
    ///
    /// Every destination is attempted even after one fails, so a flaky
    /// first target does not starve the rest; failures are logged per
    /// destination and rolled up into [`UploadError::Incomplete`].
    ///
    /// # Errors
    ///
    /// [`UploadError::Io`] if the file cannot be read,
    /// [`UploadError::Incomplete`] if any destination did not accept it.
    pub async fn upload_all(&self, path: &Path, retry: &RetryPolicy) -> Result<(), UploadError> {
        let bytes = std::fs::read(path).map_err(|e| UploadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export.csv".to_owned());

        let total = self.destinations.len();
        let mut failed = 0usize;
        for destination in &self.destinations {
            let url = format!("{}/{file_name}", destination.trim_end_matches('/'));
            let result = retry
                .run(|| {
                    let url = url.clone();
                    let bytes = bytes.clone();
                    async move { self.put(&url, bytes).await }
                })
                .await;
            match result {
                Ok(()) => {
                    tracing::info!(%destination, file = %file_name, "upload succeeded");
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(%destination, file = %file_name, error = %e, "upload failed after retries");
                }
            }
        }

        if failed > 0 {
            return Err(UploadError::Incomplete { failed, total });
        }
        Ok(())
    }

    async fn put(&self, url: &str, bytes: Vec<u8>) -> Result<(), UploadError> {
        let response = self.client.put(url).body(bytes).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::UnexpectedStatus {
                status: status.as_u16(),
                destination: url.to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn temp_export() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(b"Name,URL\nA,https://x.example/a\n").unwrap();
        file
    }

    fn upload_path(file: &tempfile::NamedTempFile) -> String {
        format!(
            "/up/{}",
            file.path().file_name().unwrap().to_string_lossy()
        )
    }

    #[tokio::test]
    async fn succeeds_when_every_destination_accepts() {
        let a = MockServer::start().await;
        let b = MockServer::start().await;
        let file = temp_export();
        for server in [&a, &b] {
            Mock::given(method("PUT"))
                .and(path(upload_path(&file)))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(server)
                .await;
        }

        let uploader = Uploader::new(
            vec![format!("{}/up", a.uri()), format!("{}/up", b.uri())],
            5,
            "vendcrawl-test/0.1",
        )
        .unwrap();
        uploader
            .upload_all(file.path(), &RetryPolicy::no_retries())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn one_failed_destination_fails_the_upload() {
        let a = MockServer::start().await;
        let b = MockServer::start().await;
        let file = temp_export();
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&a)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&b)
            .await;

        let uploader = Uploader::new(
            vec![format!("{}/up", a.uri()), format!("{}/up", b.uri())],
            5,
            "vendcrawl-test/0.1",
        )
        .unwrap();
        let err = uploader
            .upload_all(file.path(), &RetryPolicy::no_retries())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::Incomplete {
                failed: 1,
                total: 2
            }
        ));
    }

    #[tokio::test]
    async fn transient_failure_is_retried_then_succeeds() {
        let server = MockServer::start().await;
        let file = temp_export();
        Mock::given(method("PUT"))
            .and(path(upload_path(&file)))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(upload_path(&file)))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let uploader =
            Uploader::new(vec![format!("{}/up", server.uri())], 5, "vendcrawl-test/0.1").unwrap();
        let retry = RetryPolicy::new(2, std::time::Duration::ZERO, 1.0);
        uploader.upload_all(file.path(), &retry).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let uploader =
            Uploader::new(vec!["https://x.example/up".to_string()], 5, "t/0.1").unwrap();
        let err = uploader
            .upload_all(Path::new("/nonexistent/file.csv"), &RetryPolicy::no_retries())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Io { .. }));
    }
}
