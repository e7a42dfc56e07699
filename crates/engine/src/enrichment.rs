//! Fills a book's metadata from the canonical catalog.

use std::sync::Arc;

use novelscout_extension::Catalog;
use novelscout_types::{Book, CatalogDetails, WordCount};

/// Only the top candidates are checked; lower ranked hits are almost never
/// the same work.
const CANDIDATES: usize = 2;

pub struct Enricher {
    catalog: Arc<dyn Catalog>,
}

impl Enricher {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Overlays catalog metadata onto `book` when the catalog lists a work
    /// titled exactly `title`. Any failure returns the book untouched.
    pub async fn enrich(&self, mut book: Book, title: &str) -> Book {
        let candidates = match self.catalog.search(title).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!("Catalog search for '{title}' failed: {err}");
                return book;
            }
        };

        let Some(entry) = candidates
            .iter()
            .take(CANDIDATES)
            .find(|entry| entry.title == title)
        else {
            tracing::debug!("No exact catalog match for '{title}'");
            return book;
        };

        match self.catalog.details(entry).await {
            Ok(details) => {
                tracing::info!("Enriched '{title}' from catalog entry {}", entry.id);
                overlay(&mut book, details);
            }
            Err(err) => tracing::warn!("Catalog details for '{title}' failed: {err}"),
        }
        book
    }
}

/// Copies every present catalog field over the book. Score and scorer stay
/// as the primary source reported them.
pub fn overlay(book: &mut Book, details: CatalogDetails) {
    fn set<T>(target: &mut Option<T>, value: Option<T>) {
        if value.is_some() {
            *target = value;
        }
    }

    let popularity = popularity(&details);

    set(&mut book.author, details.author);
    set(&mut book.status, details.status);
    set(&mut book.category, details.category);
    if !details.tags.is_empty() {
        book.tags = details.tags;
    }
    set(&mut book.word_count, details.word_count.map(WordCount::Formatted));
    set(&mut book.update_time, details.last_update);
    set(&mut book.last_chapter, details.last_chapter);
    set(&mut book.synopsis, details.intro);
    set(&mut book.image_url, details.cover);
    set(&mut book.popularity, popularity);
}

fn popularity(details: &CatalogDetails) -> Option<String> {
    let parts = [
        details.rank.as_ref().map(|rank| format!("排名:{rank}")),
        details
            .collection
            .as_ref()
            .map(|count| format!("收藏:{count}")),
        details
            .recommendations
            .as_ref()
            .map(|count| format!("推荐:{count}")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    (!parts.is_empty()).then(|| parts.join(" | "))
}
