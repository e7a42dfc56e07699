use std::fmt;

use novelscout_types::{Book, SearchResult, SearchType};

use crate::render;

/// One message produced by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Notice(Notice),
    Listing {
        search_type: SearchType,
        keyword: String,
        result: SearchResult,
    },
    Details {
        book: Book,
        cover: Cover,
    },
}

impl Reply {
    /// The reply as chat text.
    pub fn text(&self) -> String {
        match self {
            Reply::Notice(notice) => notice.to_string(),
            Reply::Listing {
                search_type,
                keyword,
                result,
            } => render::listing(*search_type, keyword, result),
            Reply::Details { book, cover } => {
                render::details(book, matches!(cover, Cover::Failed))
            }
        }
    }
}

impl From<Notice> for Reply {
    fn from(notice: Notice) -> Self {
        Reply::Notice(notice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cover {
    /// The book has no cover url.
    None,
    Loaded(Vec<u8>),
    Failed,
}

/// Every user-visible outcome that is not a listing or a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Usage(SearchType),
    SourceUnavailable(SearchType),
    /// A bare number was given before any search in this domain.
    SearchFirst(SearchType),
    /// `next`/`prev` without a search in this domain.
    NothingToPage(SearchType),
    NotFound { keyword: String },
    SearchFailed { keyword: String },
    PageOutOfRange {
        keyword: String,
        page: u32,
        total_pages: u32,
    },
    Jumping { number: u32, page: u32 },
    ItemNotFound { number: u32, page: u32 },
    LastPage,
    FirstPage,
    PageLoadFailed { page: u32 },
    DetailsUnavailable,
    RandomUnavailable,
    RandomExhausted { attempts: u32 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Usage(t) => write!(
                f,
                "❌ Usage: /{t} <title> [<number> | -<page>]\n💡 Example: /{t} 剑来 1 (first item), /{t} 剑来 -2 (second page)"
            ),
            Notice::SourceUnavailable(t) => write!(f, "❌ The {t} source is not configured."),
            Notice::SearchFirst(t) => write!(f, "🤔 Search first with /{t} <title>."),
            Notice::NothingToPage(t) => write!(
                f,
                "🤔 There are no results to page through, search first with /{t} <title>."
            ),
            Notice::NotFound { keyword } => write!(f, "😢 No books found for [{keyword}]."),
            Notice::SearchFailed { keyword } => {
                write!(f, "❌ Searching for [{keyword}] failed, please try again later.")
            }
            Notice::PageOutOfRange {
                keyword,
                page,
                total_pages,
            } => write!(
                f,
                "❌ Page {page} does not exist, [{keyword}] only has {total_pages} page(s) of results."
            ),
            Notice::Jumping { number, page } => {
                write!(f, "⏳ Item {number} is on page {page}, jumping there...")
            }
            Notice::ItemNotFound { number, page } => {
                write!(f, "❌ Item {number} does not exist on page {page}.")
            }
            Notice::LastPage => f.write_str("➡️ This is already the last page."),
            Notice::FirstPage => f.write_str("⬅️ This is already the first page."),
            Notice::PageLoadFailed { page } => write!(f, "😢 Could not load page {page}."),
            Notice::DetailsUnavailable => f.write_str("😢 Could not load the book details."),
            Notice::RandomUnavailable => {
                f.write_str("❌ Could not find the latest book id, random pick is unavailable.")
            }
            Notice::RandomExhausted { attempts } => write!(
                f,
                "😢 No valid book found after {attempts} attempts, please try again later."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        assert_eq!(
            Notice::ItemNotFound { number: 41, page: 3 }.to_string(),
            "❌ Item 41 does not exist on page 3."
        );
        assert_eq!(
            Reply::from(Notice::SearchFirst(SearchType::Uaa)).text(),
            "🤔 Search first with /hs <title>."
        );
        assert!(Notice::Usage(SearchType::Youshu).to_string().contains("/ys 剑来 -2"));
    }
}
