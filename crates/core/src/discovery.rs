//! Paginated discovery of the protocol's address population.

use liquidation_export_api::AddressPageSource;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::SourceConfig;
use crate::error::DiscoveryError;

/// Pages through an indexing API until it returns a short page.
///
/// Pagination is strictly sequential: the next offset is only known once the
/// previous page came back full.
#[derive(Debug, Clone)]
pub struct AddressSource {
    pages: Arc<dyn AddressPageSource>,
    page_size: usize,
    max_pages: usize,
}

impl AddressSource {
    /// Create a source with the default page size (1000) and page bound.
    pub fn new(pages: Arc<dyn AddressPageSource>) -> Self {
        let defaults = SourceConfig::default();
        Self {
            pages,
            page_size: defaults.page_size,
            max_pages: defaults.max_pages,
        }
    }

    /// Create a source using the configured page size and bound.
    pub fn from_config(pages: Arc<dyn AddressPageSource>, config: &SourceConfig) -> Self {
        Self::new(pages)
            .with_page_size(config.page_size)
            .with_max_pages(config.max_pages)
    }

    /// Set the number of addresses requested per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the maximum number of pages fetched before giving up.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetch every raw address, in source order, duplicates included.
    ///
    /// Any page failure aborts discovery. Hitting the page bound without
    /// seeing a short page is also an error, since the population would be
    /// silently truncated otherwise.
    #[instrument(skip(self), fields(page_size = self.page_size))]
    pub async fn fetch_all_addresses(&self) -> Result<Vec<String>, DiscoveryError> {
        let mut addresses = Vec::new();
        let mut skip = 0;

        for page in 1..=self.max_pages {
            let batch = self
                .pages
                .fetch_page(skip, self.page_size)
                .await
                .map_err(|source| DiscoveryError::Page { skip, source })?;

            let fetched = batch.len();
            addresses.extend(batch);

            debug!(
                page = page,
                skip = skip,
                fetched = fetched,
                total_so_far = addresses.len(),
                "Fetched address page"
            );

            if fetched < self.page_size {
                info!(
                    pages = page,
                    total = addresses.len(),
                    "Address discovery complete"
                );
                return Ok(addresses);
            }

            skip += self.page_size;
        }

        Err(DiscoveryError::PageLimit {
            pages: self.max_pages,
            fetched: addresses.len(),
        })
    }
}
