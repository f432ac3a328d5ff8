pub mod client;
pub mod error;
pub mod retry;
pub mod source;
pub mod types;

pub use client::CatalogClient;
pub use error::FetchError;
pub use retry::RetryPolicy;
pub use source::CatalogSource;
