use vendcrawl_core::{DetailBlock, MenuSection, RegionConfig, ReviewsBlock, VendorListing};

use crate::error::FetchError;

/// Boundary to the render/extraction layer that turns catalog URLs into
/// structured values.
///
/// The crawl engine only ever asks four questions: how many pages does a
/// region have, who is listed on a page, what are a vendor's details, and
/// what does its menu/reviews data look like. Everything about *how* those
/// answers are produced (HTTP, rendering, selectors) lives behind this
/// trait; the engine's resume and retry semantics are tested against
/// scripted implementations.
pub trait CatalogSource {
    /// Total listing pages for the region. Implementations must default to
    /// 1 when the pagination control is absent or ambiguous, so a region
    /// never stalls in page-count discovery.
    fn page_count(
        &self,
        region: &RegionConfig,
    ) -> impl std::future::Future<Output = Result<u32, FetchError>> + Send;

    /// Vendors listed on one page of the region, in listing order.
    fn listing_page(
        &self,
        region: &RegionConfig,
        page: u32,
    ) -> impl std::future::Future<Output = Result<Vec<VendorListing>, FetchError>> + Send;

    /// The vendor's detail block (address, hours, payment, reviews link).
    fn vendor_details(
        &self,
        vendor_url: &str,
    ) -> impl std::future::Future<Output = Result<DetailBlock, FetchError>> + Send;

    /// The vendor's reviews block, fetched from the link exposed by the
    /// detail block.
    fn vendor_reviews(
        &self,
        reviews_url: &str,
    ) -> impl std::future::Future<Output = Result<ReviewsBlock, FetchError>> + Send;

    /// The vendor's itemized menu.
    fn vendor_menu(
        &self,
        vendor_url: &str,
    ) -> impl std::future::Future<Output = Result<Vec<MenuSection>, FetchError>> + Send;
}
