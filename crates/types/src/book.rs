use std::fmt;

use serde::{Deserialize, Serialize};

/// A novel as reported by one source.
///
/// `id` is only unique within the source that produced it; pair it with the
/// adapter's [`SearchType`](crate::SearchType) to identify a book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub score: Option<String>,
    pub scorer: Option<String>,
    pub status: Option<String>,
    /// Origin site of the work. Only youshu reports this.
    pub platform: Option<String>,
    pub category: Option<String>,
    /// Some sources classify a book under several subjects at once.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub word_count: Option<WordCount>,
    pub update_time: Option<String>,
    pub last_chapter: Option<String>,
    pub meat_ratio: Option<String>,
    pub popularity: Option<String>,
    /// Raw synopsis, possibly still carrying markup.
    pub synopsis: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Book {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Returns the lightweight projection kept in session state.
    pub fn summary(&self) -> BookSummary {
        BookSummary::from(self)
    }
}

/// A single user review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: Option<String>,
    pub rating: Option<String>,
    pub content: String,
    pub time: Option<String>,
}

/// Length of a work.
///
/// Sources either report a display-ready string with its own unit suffix
/// (`"12.3K"`) or a raw character count that still needs unit conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WordCount {
    Formatted(String),
    Characters(f64),
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordCount::Formatted(text) => match text.parse::<f64>() {
                Ok(count) if !text.contains(['K', 'M']) => {
                    write!(f, "{:.2}万字", count / 10_000.0)
                }
                _ => f.write_str(text),
            },
            WordCount::Characters(count) => write!(f, "{:.2}万字", count / 10_000.0),
        }
    }
}

/// The subset of a [`Book`] needed to resolve "item N" without refetching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub score: Option<String>,
    pub scorer: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            score: book.score.clone(),
            scorer: book.scorer.clone(),
        }
    }
}
