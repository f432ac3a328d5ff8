use std::path::PathBuf;

/// Runtime configuration for the crawler, loaded from environment variables.
///
/// See [`crate::config::load_config`] for the variable names and defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the persisted progress documents.
    pub data_dir: PathBuf,
    /// Directory the CSV exports are written to.
    pub output_dir: PathBuf,
    /// Path to the YAML regions file.
    pub regions_path: PathBuf,
    /// Base URL of the catalog, used to resolve relative links.
    pub base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Self-throttle between consecutive entity fetches.
    pub inter_request_delay_ms: u64,
    /// Self-throttle between listing pages.
    pub inter_page_delay_ms: u64,
    /// Total attempts per fallible external call (1 = no retries).
    pub retry_max_attempts: u32,
    pub retry_initial_delay_ms: u64,
    pub retry_backoff_factor: f64,
    pub retry_max_delay_ms: u64,
    /// Optional off-box store the progress documents are pushed to after
    /// every checkpoint. `None` disables the backup sink.
    pub backup_base_url: Option<String>,
    /// Destinations the finalized region exports are uploaded to. A region
    /// is only marked completed once every destination has accepted the
    /// files. Empty means no upload gating.
    pub upload_destinations: Vec<String>,
}
