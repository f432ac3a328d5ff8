//! Tabular renderings of a region's collected records.
//!
//! Two files per region: a summary sheet (one row per vendor, nested
//! blocks flattened into named columns) and a menu sheet (one row per
//! vendor with the line items concatenated into a single text column).
//! Both are pure functions of their input — no crawl state is touched.

use std::path::{Path, PathBuf};

use serde::Serialize;

use vendcrawl_core::VendorRecord;

use crate::error::ExportError;

/// Summary sheet columns, in field order of [`SummaryRow`]. Written
/// explicitly so an empty region still produces a self-describing file.
const SUMMARY_COLUMNS: [&str; 14] = [
    "Name",
    "Cuisine",
    "Rating",
    "Delivery Time",
    "Delivery Fee",
    "Min Order",
    "URL",
    "Address",
    "Working Hours",
    "Rating Value",
    "Ratings Count",
    "Reviews Count",
    "Menu Categories",
    "Menu Items",
];

const MENU_COLUMNS: [&str; 3] = ["Name", "URL", "Menu"];

/// One summary row, flattening listing, detail, and review fields.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SummaryRow {
    pub name: String,
    pub cuisine: String,
    pub rating: String,
    pub delivery_time: String,
    pub delivery_fee: String,
    pub min_order: String,
    pub url: String,
    pub address: String,
    pub working_hours: String,
    pub rating_value: String,
    pub ratings_count: String,
    pub reviews_count: String,
    pub menu_categories: usize,
    pub menu_items: usize,
}

impl From<&VendorRecord> for SummaryRow {
    fn from(r: &VendorRecord) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        SummaryRow {
            name: r.name.clone(),
            cuisine: r.cuisine.clone(),
            rating: opt(&r.rating),
            delivery_time: opt(&r.delivery_time),
            delivery_fee: opt(&r.delivery_fee),
            min_order: opt(&r.min_order),
            url: r.url.clone(),
            address: opt(&r.details.address),
            working_hours: opt(&r.details.working_hours),
            rating_value: opt(&r.reviews.rating_value),
            ratings_count: opt(&r.reviews.ratings_count),
            reviews_count: opt(&r.reviews.reviews_count),
            menu_categories: r.menu.len(),
            menu_items: r.menu_item_count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MenuRow {
    name: String,
    url: String,
    menu: String,
}

/// Concatenates a vendor's line items into `category: name (price)` text,
/// sections separated by `; `.
fn menu_text(record: &VendorRecord) -> String {
    let mut parts = Vec::new();
    for section in &record.menu {
        for item in &section.items {
            let price = item
                .offer_price
                .as_deref()
                .or(item.price.as_deref())
                .unwrap_or("-");
            parts.push(format!("{}: {} ({price})", section.category, item.name));
        }
    }
    parts.join("; ")
}

/// Writes the summary sheet to `{dir}/{region}.csv`.
///
/// # Errors
///
/// Returns [`ExportError`] on I/O or CSV failure.
pub fn write_summary_csv(
    dir: &Path,
    region: &str,
    records: &[VendorRecord],
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{region}.csv"));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    writer.write_record(SUMMARY_COLUMNS)?;
    for record in records {
        writer.serialize(SummaryRow::from(record))?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}

/// Writes the menu line-item sheet to `{dir}/{region}_menu.csv`.
///
/// # Errors
///
/// Returns [`ExportError`] on I/O or CSV failure.
pub fn write_menu_csv(
    dir: &Path,
    region: &str,
    records: &[VendorRecord],
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{region}_menu.csv"));
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    writer.write_record(MENU_COLUMNS)?;
    for record in records {
        writer.serialize(MenuRow {
            name: record.name.clone(),
            url: record.url.clone(),
            menu: menu_text(record),
        })?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}
