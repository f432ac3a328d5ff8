//! Catalog API response types.
//!
//! The render/extraction layer in front of the catalog exposes the listing,
//! info, reviews, and menu data as JSON documents; these types mirror the
//! observed shapes. Fields the catalog omits for sparse vendors are modeled
//! with `#[serde(default)]` so a partial document still deserializes.
//!
//! The catalog marks absent links with the literal placeholder string
//! `"Not Available"` rather than `null`; [`placeholder_to_none`] maps that
//! to `None` at the boundary so nothing downstream has to know about it.

use serde::Deserialize;

use vendcrawl_core::{DetailBlock, MenuItem, MenuSection, ReviewSnippet, ReviewsBlock, VendorListing};

/// Placeholder the catalog uses for missing links and values.
pub(crate) const PLACEHOLDER: &str = "Not Available";

pub(crate) fn placeholder_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != PLACEHOLDER)
}

/// One page of a region's vendor listing.
#[derive(Debug, Deserialize)]
pub struct ListingPageResponse {
    #[serde(default)]
    pub vendors: Vec<ListedVendor>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination control attached to a listing page. `total_pages` may be
/// missing or zero on single-page regions.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ListedVendor {
    pub name: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub delivery_fee: Option<String>,
    #[serde(default)]
    pub min_order: Option<String>,
    pub url: String,
}

impl From<ListedVendor> for VendorListing {
    fn from(v: ListedVendor) -> Self {
        VendorListing {
            name: v.name,
            cuisine: v.cuisine,
            rating: placeholder_to_none(v.rating),
            delivery_time: placeholder_to_none(v.delivery_time),
            delivery_fee: placeholder_to_none(v.delivery_fee),
            min_order: placeholder_to_none(v.min_order),
            url: v.url,
        }
    }
}

/// The vendor info page: address, hours, payment methods and an optional
/// link to the reviews page.
#[derive(Debug, Deserialize)]
pub struct VendorInfoResponse {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub reviews_url: Option<String>,
}

impl From<VendorInfoResponse> for DetailBlock {
    fn from(v: VendorInfoResponse) -> Self {
        DetailBlock {
            address: placeholder_to_none(v.address),
            working_hours: placeholder_to_none(v.working_hours),
            payment_methods: v.payment_methods,
            reviews_url: placeholder_to_none(v.reviews_url),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewsResponse {
    #[serde(default)]
    pub rating_value: Option<String>,
    #[serde(default)]
    pub ratings_count: Option<String>,
    #[serde(default)]
    pub reviews_count: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<ReviewEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewEntry {
    #[serde(default)]
    pub reviewer: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<ReviewsResponse> for ReviewsBlock {
    fn from(v: ReviewsResponse) -> Self {
        ReviewsBlock {
            rating_value: placeholder_to_none(v.rating_value),
            ratings_count: placeholder_to_none(v.ratings_count),
            reviews_count: placeholder_to_none(v.reviews_count),
            highlights: v.highlights,
            reviews: v
                .reviews
                .into_iter()
                .map(|r| ReviewSnippet {
                    reviewer: r.reviewer,
                    rating: r.rating,
                    date: r.date,
                    text: r.text,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuResponse {
    #[serde(default)]
    pub sections: Vec<MenuSectionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MenuSectionEntry {
    pub category: String,
    #[serde(default)]
    pub items: Vec<MenuItemEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MenuItemEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub offer_price: Option<String>,
}

impl From<MenuSectionEntry> for MenuSection {
    fn from(v: MenuSectionEntry) -> Self {
        MenuSection {
            category: v.category,
            items: v
                .items
                .into_iter()
                .map(|i| MenuItem {
                    name: i.name,
                    description: i.description,
                    price: i.price,
                    offer_price: i.offer_price,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_maps_to_none() {
        assert_eq!(placeholder_to_none(Some("Not Available".to_string())), None);
        assert_eq!(placeholder_to_none(Some(String::new())), None);
        assert_eq!(
            placeholder_to_none(Some("KD 0.500".to_string())),
            Some("KD 0.500".to_string())
        );
        assert_eq!(placeholder_to_none(None), None);
    }

    #[test]
    fn sparse_listing_page_deserializes() {
        let json = r#"{"vendors":[{"name":"X","url":"https://x.example"}]}"#;
        let page: ListingPageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.vendors.len(), 1);
        assert!(page.pagination.is_none());
        let listing: vendcrawl_core::VendorListing = page.vendors.into_iter().next().unwrap().into();
        assert!(listing.rating.is_none());
    }

    #[test]
    fn info_with_placeholder_reviews_url_converts_to_none() {
        let json = r#"{"address":"Block 1","reviews_url":"Not Available"}"#;
        let info: VendorInfoResponse = serde_json::from_str(json).unwrap();
        let details: vendcrawl_core::DetailBlock = info.into();
        assert_eq!(details.address.as_deref(), Some("Block 1"));
        assert!(details.reviews_url.is_none());
    }
}
