//! Toolkit for writing novelscout source adapters.
//!
//! An adapter implements [`Source`] (a primary search domain) or [`Catalog`]
//! (the canonical metadata catalog) on top of the HTTP [`Client`] and the
//! scraping helpers exposed here. Every adapter is expected to normalize
//! upstream placeholders with [`present`] before building a
//! [`Book`](novelscout_types::Book).

mod common;
mod error;
pub mod http;
pub mod prelude;
mod source;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use common::json::{json_text, json_u32};
pub use common::net::make_absolute_url;
pub use common::scraping::{Element, Html, capture, capture_all};
pub use common::text::{
    PLACEHOLDERS, clean_fragment, decode_entities, fragment_text, non_blank, present,
    present_count, present_tags, reflow_synopsis, strip_tags,
};
pub use error::{Result, SourceError};
pub use http::{Client, HttpExecutor, ReqwestExecutor, Request, Response};
pub use source::{Catalog, Source};
