use novelscout_extension::prelude::*;

/// A record as scraped, before placeholder normalization.
#[derive(Debug, Default, Clone)]
pub(crate) struct RawBook {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub score: Option<String>,
    pub scorer: Option<String>,
    pub status: Option<String>,
    pub platform: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub word_count: Option<f64>,
    pub update_time: Option<String>,
    pub synopsis: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub reviews: Vec<RawReview>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct RawReview {
    pub author: Option<String>,
    pub rating: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct RawListing {
    pub books: Vec<RawBook>,
    pub total_pages: u32,
}

impl RawBook {
    /// Normalizes a search hit. Hits with a blank id or title are dropped.
    pub fn into_hit(self) -> Option<Book> {
        let id = self.id.as_deref().and_then(non_blank)?;
        let title = self.title.as_deref().and_then(non_blank)?;
        Some(self.normalize(id, title))
    }

    /// Normalizes a detail page fetched for `id`.
    pub fn into_details(self, id: &str) -> Result<Book> {
        let title = self
            .title
            .as_deref()
            .and_then(non_blank)
            .ok_or(SourceError::MissingIdentity)?;
        Ok(self.normalize(id.to_string(), title))
    }

    fn normalize(self, id: String, title: String) -> Book {
        let opt = |value: Option<String>| value.as_deref().and_then(present);
        let count = |value: Option<String>| value.as_deref().and_then(present_count);

        Book {
            id,
            title,
            author: opt(self.author),
            score: count(self.score),
            scorer: count(self.scorer),
            status: opt(self.status),
            platform: opt(self.platform),
            category: opt(self.category),
            categories: Vec::new(),
            tags: present_tags(self.tags),
            word_count: self
                .word_count
                .filter(|count| *count > 0.0)
                .map(WordCount::Characters),
            update_time: opt(self.update_time),
            last_chapter: None,
            meat_ratio: None,
            popularity: None,
            synopsis: opt(self.synopsis),
            link: opt(self.link),
            image_url: opt(self.image_url),
            reviews: self
                .reviews
                .into_iter()
                .filter_map(RawReview::normalize)
                .collect(),
        }
    }
}

impl RawReview {
    fn normalize(self) -> Option<Review> {
        Some(Review {
            content: self.content.as_deref().and_then(present)?,
            author: self.author.as_deref().and_then(present),
            rating: self.rating.as_deref().and_then(present_count),
            time: None,
        })
    }
}

impl RawListing {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A query with no hits on its first page has zero pages, whatever the
    /// site claims.
    pub fn into_result(self, page: u32) -> SearchResult {
        let books = self
            .books
            .into_iter()
            .filter_map(RawBook::into_hit)
            .collect::<Vec<_>>();

        let total_pages = if books.is_empty() && page <= 1 {
            0
        } else {
            self.total_pages
        };
        SearchResult::new(books, total_pages, page)
    }
}
