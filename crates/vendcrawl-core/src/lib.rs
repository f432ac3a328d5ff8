pub mod app_config;
pub mod config;
pub mod error;
pub mod record;
pub mod regions;

pub use app_config::AppConfig;
pub use config::{load_config, load_config_from_env};
pub use error::ConfigError;
pub use record::{
    DetailBlock, MenuItem, MenuSection, ReviewSnippet, ReviewsBlock, VendorListing, VendorRecord,
};
pub use regions::{load_regions, RegionConfig, RegionsFile};
