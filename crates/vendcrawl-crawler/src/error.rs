use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("progress persistence failed: {0}")]
    Progress(#[from] vendcrawl_progress::ProgressError),

    #[error("region export failed: {0}")]
    Export(#[from] vendcrawl_export::ExportError),

    #[error("region upload failed: {0}")]
    Upload(#[from] vendcrawl_export::UploadError),

    #[error("crawl interrupted — progress checkpointed")]
    Interrupted,
}
