//! List traits for fetching collections of entities.

use async_trait::async_trait;

use crate::client::OdpClient;
use crate::error::{OdpError, Result};
use crate::pagination::Page;

/// Default page size for paginated list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum pages `list_all` fetches before giving up.
pub const MAX_PAGES: u32 = 1000;

/// List entities from an endpoint that returns everything at once.
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// List all entities matching the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list(client: &OdpClient, query: &Self::Query) -> Result<Vec<Self>>;
}

/// List entities with offset/limit pagination.
///
/// # Example
///
/// ```ignore
/// use odp::{ListPaged, MetadataListQuery, MetadataRecord, OdpClient};
///
/// let client = OdpClient::from_env()?;
/// let query = MetadataListQuery::new("saeon");
///
/// // Fetch a single page
/// let page = MetadataRecord::list_page(&client, &query, 0, 50).await?;
///
/// // Fetch all pages
/// let all_records = MetadataRecord::list_all(&client, &query).await?;
/// ```
#[async_trait]
pub trait ListPaged: Sized + Send {
    /// Query parameters for filtering.
    type Query: Send + Sync;

    /// List entities matching the query (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - The ODP API client
    /// * `query` - Query parameters for filtering
    /// * `offset` - Number of items to skip
    /// * `limit` - Maximum number of items to return
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &OdpClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>>;

    /// List all entities matching the query (fetches all pages).
    ///
    /// Pages are requested until one comes back short.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails, or
    /// [`OdpError::PageLimitExceeded`] if [`MAX_PAGES`] full pages were read
    /// without reaching the end.
    async fn list_all(client: &OdpClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut all_items = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        loop {
            let result = Self::list_page(client, query, offset, DEFAULT_PAGE_SIZE).await?;
            let has_more = result.has_more;
            offset = result.next_offset();
            all_items.extend(result.items);

            if !has_more {
                break;
            }

            pages += 1;
            if pages >= MAX_PAGES {
                tracing::warn!(pages, "pagination limit reached before the last page");
                return Err(OdpError::PageLimitExceeded { pages });
            }
        }

        Ok(all_items)
    }
}
