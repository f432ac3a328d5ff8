use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One catalog partition: a named area with its own paginated listing URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Display name, possibly non-ASCII (e.g. an Arabic area name).
    pub name: String,
    /// URL-safe identifier used as the progress/export key.
    pub slug: String,
    /// Absolute URL of the region's first listing page.
    pub url: String,
}

/// The parsed regions file: the ordered region list plus the category
/// exclusion set applied before any per-entity I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsFile {
    #[serde(default)]
    pub skip_categories: Vec<String>,
    pub regions: Vec<RegionConfig>,
}

impl RegionsFile {
    /// Returns `true` if `cuisine` matches any configured skip category.
    ///
    /// This is a pure substring-membership test; it must never trigger I/O.
    #[must_use]
    pub fn is_skipped_category(&self, cuisine: &str) -> bool {
        self.skip_categories.iter().any(|c| cuisine.contains(c))
    }

    /// Finds a region by slug.
    #[must_use]
    pub fn region(&self, slug: &str) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.slug == slug)
    }
}

/// Load and validate the regions configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_regions(path: &Path) -> Result<RegionsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let regions_file: RegionsFile = serde_yaml::from_str(&content)?;
    validate_regions(&regions_file)?;
    Ok(regions_file)
}

fn validate_regions(file: &RegionsFile) -> Result<(), ConfigError> {
    if file.regions.is_empty() {
        return Err(ConfigError::Validation(
            "regions file must list at least one region".to_string(),
        ));
    }

    let mut seen_slugs = HashSet::new();
    for region in &file.regions {
        if region.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "region name must be non-empty".to_string(),
            ));
        }
        if region.slug.trim().is_empty() || region.slug.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "region '{}' has an invalid slug '{}'",
                region.name, region.slug
            )));
        }
        if !region.url.starts_with("http://") && !region.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "region '{}' has a non-absolute url '{}'",
                region.name, region.url
            )));
        }
        if !seen_slugs.insert(region.slug.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate region slug '{}'",
                region.slug
            )));
        }
    }
    Ok(())
}
