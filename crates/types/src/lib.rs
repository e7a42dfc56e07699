//! Canonical data model shared by every source adapter and the engine.
//!
//! Adapters translate upstream payloads into these types at their boundary, so
//! a missing value is always `None` (or an empty list) and never an upstream
//! placeholder string.

mod book;
mod catalog;
mod search;

pub use book::{Book, BookSummary, Review, WordCount};
pub use catalog::{CatalogDetails, CatalogEntry};
pub use search::{PAGE_SIZE, ParseSearchTypeError, SearchResult, SearchType};
