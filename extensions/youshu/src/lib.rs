//! Youshu book ratings, served by one of two interchangeable backends.
//!
//! Which backend is used depends on the configured base url: the ypshuo.com
//! host gets the JSON API, anything else is treated as a youshu.me mirror and
//! scraped as HTML.

mod raw;
mod youshu_me;
mod ypshuo;

use async_trait::async_trait;
use novelscout_extension::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use youshu_me::{CATEGORIES, PLATFORMS, STATUSES, YoushuMe};
pub use ypshuo::Ypshuo;

pub const DEFAULT_BASE_URL: &str = "https://www.ypshuo.com/";

const YPSHUO_HOST: &str = "ypshuo.com";

static BOOK_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="/novel/(\d+)\.html"|href="/book/(\d+)""#).unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoushuConfig {
    pub base_url: String,
    /// Session cookie sent to youshu.me mirrors. Ignored by the JSON API.
    #[serde(default)]
    pub cookie: Option<String>,
}

impl Default for YoushuConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchStrategy {
    Ypshuo(Ypshuo),
    YoushuMe(YoushuMe),
}

impl SearchStrategy {
    pub fn from_config(config: &YoushuConfig) -> Self {
        let host = url::Url::parse(&config.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();

        if host == YPSHUO_HOST || host.ends_with(&format!(".{YPSHUO_HOST}")) {
            SearchStrategy::Ypshuo(Ypshuo::new(&config.base_url))
        } else {
            SearchStrategy::YoushuMe(YoushuMe::new(&config.base_url, config.cookie.clone()))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::Ypshuo(_) => "ypshuo",
            SearchStrategy::YoushuMe(_) => "youshu.me",
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            SearchStrategy::Ypshuo(s) => s.base_url(),
            SearchStrategy::YoushuMe(s) => s.base_url(),
        }
    }

    async fn search(&self, client: &Client, keyword: &str, page: u32) -> Result<raw::RawListing> {
        match self {
            SearchStrategy::Ypshuo(s) => s.search(client, keyword, page).await,
            SearchStrategy::YoushuMe(s) => s.search(client, keyword, page).await,
        }
    }

    async fn details(&self, client: &Client, id: &str) -> Result<raw::RawBook> {
        match self {
            SearchStrategy::Ypshuo(s) => s.details(client, id).await,
            SearchStrategy::YoushuMe(s) => s.details(client, id).await,
        }
    }

    fn home_request(&self) -> Request {
        match self {
            SearchStrategy::Ypshuo(s) => s.request(s.base_url().to_string()),
            SearchStrategy::YoushuMe(s) => s.request(s.base_url().to_string()),
        }
    }
}

pub struct YoushuSource {
    client: Client,
    strategy: SearchStrategy,
}

impl YoushuSource {
    pub fn new(client: Client, config: &YoushuConfig) -> Self {
        let strategy = SearchStrategy::from_config(config);
        tracing::info!(
            "Youshu source using {} backend at {}",
            strategy.name(),
            strategy.base_url()
        );
        Self { client, strategy }
    }
}

#[async_trait]
impl Source for YoushuSource {
    fn search_type(&self) -> SearchType {
        SearchType::Youshu
    }

    async fn search(&self, query: &str, page: u32) -> Result<SearchResult> {
        let listing = self.strategy.search(&self.client, query, page).await?;
        let result = listing.into_result(page);
        tracing::info!(
            "Youshu search '{query}' page {page}: {} books, {} pages",
            result.books.len(),
            result.total_pages
        );
        Ok(result)
    }

    async fn get_book_details(&self, id: &str) -> Result<Book> {
        self.strategy.details(&self.client, id).await?.into_details(id)
    }

    async fn latest_book_id(&self) -> Result<u64> {
        let text = self
            .strategy
            .home_request()
            .timeout(std::time::Duration::from_secs(10))
            .send(&self.client)
            .await?
            .error_for_status()?
            .text();

        capture_all(&BOOK_LINK, &text)
            .into_iter()
            .flatten()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .ok_or_else(|| SourceError::Parse("No book links on the home page".to_string()))
    }
}
