use thiserror::Error;

/// Errors from the durable progress layer.
///
/// Note that a *corrupt or missing* progress file is not an error here —
/// [`crate::ProgressStore::load`] repairs those with defaults. These
/// variants cover failures while writing checkpoints.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize progress document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ProgressError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ProgressError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
