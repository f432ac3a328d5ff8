pub mod csv_export;
pub mod error;
pub mod upload;

pub use csv_export::{write_menu_csv, write_summary_csv};
pub use error::ExportError;
pub use upload::{UploadError, Uploader};
