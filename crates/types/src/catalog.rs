use serde::{Deserialize, Serialize};

/// A ranked hit from the canonical catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub url: String,
}

/// Authoritative metadata from the canonical catalog. Carries no community
/// rating fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDetails {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub word_count: Option<String>,
    pub last_update: Option<String>,
    pub last_chapter: Option<String>,
    pub intro: Option<String>,
    pub cover: Option<String>,
    pub rank: Option<String>,
    pub collection: Option<String>,
    pub recommendations: Option<String>,
}
