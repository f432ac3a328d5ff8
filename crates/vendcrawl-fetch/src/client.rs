//! HTTP client for the catalog's JSON endpoints.

use std::time::Duration;

use reqwest::Client;

use vendcrawl_core::{DetailBlock, MenuSection, RegionConfig, ReviewsBlock, VendorListing};

use crate::error::FetchError;
use crate::source::CatalogSource;
use crate::types::{ListingPageResponse, MenuResponse, ReviewsResponse, VendorInfoResponse};

/// HTTP implementation of [`CatalogSource`].
///
/// Handles rate limiting (429), not-found (404), and other non-2xx
/// responses as typed errors. Retry is deliberately **not** performed here:
/// the crawl engine wraps each call in its own [`crate::RetryPolicy`] so the
/// budget is visible at the call site.
pub struct CatalogClient {
    client: Client,
}

impl CatalogClient {
    /// Creates a `CatalogClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Builds the URL for a region's listing page.
    ///
    /// Page 1 is the region URL unchanged; later pages carry a `page` query
    /// parameter, replacing any `page` parameter already present.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the region URL does not parse.
    pub fn listing_url(region_url: &str, page: u32) -> Result<String, FetchError> {
        let mut url = reqwest::Url::parse(region_url).map_err(|e| FetchError::InvalidUrl {
            url: region_url.to_owned(),
            reason: e.to_string(),
        })?;
        if page <= 1 {
            return Ok(url.to_string());
        }
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "page")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &kept {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("page", &page.to_string());
        }
        Ok(url.to_string())
    }

    async fn get_json<T>(&self, url: &str, context: &str) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| FetchError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    fn vendor_endpoint(vendor_url: &str, leaf: &str) -> String {
        format!("{}/{leaf}", vendor_url.trim_end_matches('/'))
    }
}

impl CatalogSource for CatalogClient {
    async fn page_count(&self, region: &RegionConfig) -> Result<u32, FetchError> {
        let url = Self::listing_url(&region.url, 1)?;
        let page: ListingPageResponse = self
            .get_json(&url, &format!("listing page 1 of {}", region.slug))
            .await?;
        // Missing or zero pagination means a single page, never an error.
        let total = page
            .pagination
            .and_then(|p| p.total_pages)
            .filter(|&n| n >= 1)
            .unwrap_or(1);
        Ok(total)
    }

    async fn listing_page(
        &self,
        region: &RegionConfig,
        page: u32,
    ) -> Result<Vec<VendorListing>, FetchError> {
        let url = Self::listing_url(&region.url, page)?;
        let response: ListingPageResponse = self
            .get_json(&url, &format!("listing page {page} of {}", region.slug))
            .await?;
        Ok(response.vendors.into_iter().map(Into::into).collect())
    }

    async fn vendor_details(&self, vendor_url: &str) -> Result<DetailBlock, FetchError> {
        let url = Self::vendor_endpoint(vendor_url, "info");
        let response: VendorInfoResponse = self
            .get_json(&url, &format!("vendor info from {vendor_url}"))
            .await?;
        Ok(response.into())
    }

    async fn vendor_reviews(&self, reviews_url: &str) -> Result<ReviewsBlock, FetchError> {
        let response: ReviewsResponse = self
            .get_json(reviews_url, &format!("reviews from {reviews_url}"))
            .await?;
        Ok(response.into())
    }

    async fn vendor_menu(&self, vendor_url: &str) -> Result<Vec<MenuSection>, FetchError> {
        let url = Self::vendor_endpoint(vendor_url, "menu");
        let response: MenuResponse = self
            .get_json(&url, &format!("menu from {vendor_url}"))
            .await?;
        Ok(response.sections.into_iter().map(Into::into).collect())
    }
}
