use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Book;

/// Number of hits every supported source returns per page.
pub const PAGE_SIZE: u32 = 20;

/// Discriminates the search domains. Session state is partitioned by it and
/// commands are routed by its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchType {
    /// youshu and its mirrors, addressed as `ys`.
    #[serde(rename = "ys")]
    Youshu,
    /// uaa, addressed as `hs`.
    #[serde(rename = "hs")]
    Uaa,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Youshu => "ys",
            SearchType::Uaa => "hs",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown search type: {0}")]
pub struct ParseSearchTypeError(pub String);

impl FromStr for SearchType {
    type Err = ParseSearchTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ys" => Ok(SearchType::Youshu),
            "hs" => Ok(SearchType::Uaa),
            _ => Err(ParseSearchTypeError(s.to_string())),
        }
    }
}

/// One page of search hits, in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub books: Vec<Book>,
    /// `0` when the query matched nothing.
    pub total_pages: u32,
    /// 1-based.
    pub current_page: u32,
}

impl SearchResult {
    pub fn new(books: Vec<Book>, total_pages: u32, current_page: u32) -> Self {
        Self {
            books,
            total_pages,
            current_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Computes the page count from a total hit count.
    pub fn pages_for(total_hits: u32) -> u32 {
        total_hits.div_ceil(PAGE_SIZE)
    }
}
