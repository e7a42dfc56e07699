use async_trait::async_trait;
use novelscout_types::{Book, CatalogDetails, CatalogEntry, SearchResult, SearchType};

use crate::error::{Result, SourceError};

/// A primary search domain backed by one upstream site.
///
/// Implementations never panic on upstream garbage: a missing optional field
/// becomes `None`, a record without id or title is skipped, and anything that
/// prevents producing a result at all is reported as a [`SourceError`].
#[async_trait]
pub trait Source: Send + Sync {
    /// Partition key for session state and the command name users type.
    fn search_type(&self) -> SearchType;

    /// Fetches one page (1-based) of hits for `query`.
    ///
    /// A query without hits is `Ok` with no books and `total_pages == 0`.
    async fn search(&self, query: &str, page: u32) -> Result<SearchResult>;

    /// Fetches the full record for `id`, including reviews when the site
    /// exposes them.
    async fn get_book_details(&self, id: &str) -> Result<Book>;

    /// Highest book id currently listed by the site, used to pick random
    /// books.
    async fn latest_book_id(&self) -> Result<u64> {
        Err(SourceError::Unsupported("latest_book_id"))
    }
}

/// The canonical catalog used to enrich books from a primary source.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Ranked candidates for a title, best first.
    async fn search(&self, title: &str) -> Result<Vec<CatalogEntry>>;

    async fn details(&self, entry: &CatalogEntry) -> Result<CatalogDetails>;
}
