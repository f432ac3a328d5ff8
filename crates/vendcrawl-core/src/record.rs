use serde::{Deserialize, Serialize};

/// Listing-derived identity and scalar attributes for one vendor, as shown
/// on a region's listing page. This is all the crawler knows about a vendor
/// before any follow-up fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VendorListing {
    pub name: String,
    /// Comma-separated cuisine/category string, e.g. `"Burgers, Sandwiches"`.
    pub cuisine: String,
    pub rating: Option<String>,
    pub delivery_time: Option<String>,
    pub delivery_fee: Option<String>,
    pub min_order: Option<String>,
    /// Absolute URL of the vendor's own page.
    pub url: String,
}

/// Detail block scraped from the vendor's info page. All fields are optional;
/// a failed detail fetch degrades to `DetailBlock::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailBlock {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    /// Link to the vendor's ratings-and-reviews page, when the info page
    /// exposes one. Placeholder values must be mapped to `None` upstream.
    #[serde(default)]
    pub reviews_url: Option<String>,
}

/// One customer review snippet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewSnippet {
    #[serde(default)]
    pub reviewer: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Secondary detail block: aggregate rating figures plus free-text and
/// structured review snippets. Absent when the vendor has no reviews page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewsBlock {
    #[serde(default)]
    pub rating_value: Option<String>,
    #[serde(default)]
    pub ratings_count: Option<String>,
    #[serde(default)]
    pub reviews_count: Option<String>,
    /// Free-text paragraphs shown above the review list.
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<ReviewSnippet>,
}

impl ReviewsBlock {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rating_value.is_none()
            && self.ratings_count.is_none()
            && self.reviews_count.is_none()
            && self.highlights.is_empty()
            && self.reviews.is_empty()
    }
}

/// One priced line item on a vendor's menu.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    /// Discounted price when the item is on offer.
    #[serde(default)]
    pub offer_price: Option<String>,
}

/// A categorized group of menu items, e.g. "Appetizers".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuSection {
    pub category: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// The fully collected unit: listing attributes plus the three optional
/// follow-up blocks. Partial records are valid and must round-trip — a
/// vendor whose detail fetch failed still carries its listing fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VendorRecord {
    pub name: String,
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
    #[serde(default)]
    pub details: DetailBlock,
    #[serde(default)]
    pub reviews: ReviewsBlock,
    #[serde(default)]
    pub menu: Vec<MenuSection>,
}

impl VendorRecord {
    /// Starts a record from listing data, with every follow-up block empty.
    #[must_use]
    pub fn from_listing(listing: &VendorListing) -> Self {
        Self {
            name: listing.name.clone(),
            cuisine: listing.cuisine.clone(),
            rating: listing.rating.clone(),
            delivery_time: listing.delivery_time.clone(),
            delivery_fee: listing.delivery_fee.clone(),
            min_order: listing.min_order.clone(),
            url: listing.url.clone(),
            details: DetailBlock::default(),
            reviews: ReviewsBlock::default(),
            menu: Vec::new(),
        }
    }

    /// Total number of line items across all menu sections.
    #[must_use]
    pub fn menu_item_count(&self) -> usize {
        self.menu.iter().map(|s| s.items.len()).sum()
    }
}

/// Stable dedup identity for a vendor within a region.
///
/// The catalog assigns no usable ID, so the key is name + page. Keyed by
/// page as well as name because listing ordinals can shift between two
/// fetches of the same page.
#[must_use]
pub fn entity_key(name: &str, page: u32) -> String {
    format!("{name}@p{page}")
}
