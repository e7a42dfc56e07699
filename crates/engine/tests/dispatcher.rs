//! Drives the dispatcher end to end against scripted sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use novelscout_engine::{
    Cover, Dispatcher, DispatcherConfig, Notice, RandomConfig, Reply, UserSearchState,
};
use novelscout_extension::testing::MockHttpExecutor;
use novelscout_extension::{Catalog, Client, Result, Source, SourceError};
use novelscout_types::{
    Book, CatalogDetails, CatalogEntry, PAGE_SIZE, SearchResult, SearchType,
};

struct MockSource {
    search_type: SearchType,
    books: Vec<Book>,
    fail_search: bool,
    latest: Option<u64>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockSource {
    fn new(search_type: SearchType, count: usize) -> Self {
        Self {
            search_type,
            books: (1..=count)
                .map(|n| Book::new(n.to_string(), format!("Book {n}")))
                .collect(),
            fail_search: false,
            latest: None,
            search_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    fn with_books(search_type: SearchType, books: Vec<Book>) -> Self {
        Self {
            books,
            ..Self::new(search_type, 0)
        }
    }

    fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn details(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn search_type(&self) -> SearchType {
        self.search_type
    }

    async fn search(&self, _query: &str, page: u32) -> Result<SearchResult> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(SourceError::Timeout);
        }
        let total_pages = SearchResult::pages_for(self.books.len() as u32);
        let books = self
            .books
            .iter()
            .skip(((page - 1) * PAGE_SIZE) as usize)
            .take(PAGE_SIZE as usize)
            .cloned()
            .collect();
        Ok(SearchResult::new(books, total_pages, page))
    }

    async fn get_book_details(&self, id: &str) -> Result<Book> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(SourceError::Status(404))
    }

    async fn latest_book_id(&self) -> Result<u64> {
        self.latest.ok_or(SourceError::Unsupported("latest_book_id"))
    }
}

struct MockCatalog {
    entries: Vec<CatalogEntry>,
    details: CatalogDetails,
    fail_search: bool,
    fail_details: bool,
    detail_calls: AtomicUsize,
}

impl MockCatalog {
    fn new(titles: &[&str]) -> Self {
        Self {
            entries: titles
                .iter()
                .enumerate()
                .map(|(i, title)| CatalogEntry {
                    id: i.to_string(),
                    title: title.to_string(),
                    author: None,
                    url: format!("https://catalog.example/{i}"),
                })
                .collect(),
            details: CatalogDetails {
                author: Some("Official Author".into()),
                status: Some("完本".into()),
                collection: Some("100".into()),
                ..Default::default()
            },
            fail_search: false,
            fail_details: false,
            detail_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn search(&self, _title: &str) -> Result<Vec<CatalogEntry>> {
        if self.fail_search {
            return Err(SourceError::Timeout);
        }
        Ok(self.entries.clone())
    }

    async fn details(&self, _entry: &CatalogEntry) -> Result<CatalogDetails> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_details {
            return Err(SourceError::Parse("no book info".into()));
        }
        Ok(self.details.clone())
    }
}

fn offline_client() -> Client {
    MockHttpExecutor::new().into_client().1
}

fn dispatcher(source: Arc<MockSource>) -> Dispatcher {
    Dispatcher::new(offline_client(), DispatcherConfig::default()).with_source(source)
}

fn details_id(reply: &Reply) -> &str {
    match reply {
        Reply::Details { book, .. } => &book.id,
        other => panic!("expected details, got {other:?}"),
    }
}

#[tokio::test]
async fn test_item_on_another_page_is_fetched_from_that_page() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 45));
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book 25").await;

    assert_eq!(replies.len(), 2);
    assert_eq!(
        replies[0],
        Reply::Notice(Notice::Jumping {
            number: 25,
            page: 2
        })
    );
    assert_eq!(details_id(&replies[1]), "25");
    assert_eq!(source.searches(), 2);

    let state = dispatcher.states().get_state("alice");
    assert_eq!(state.current_page, 2);
    assert_eq!(state.max_pages, 3);
    assert_eq!(state.results.len(), 20);
    assert_eq!(state.results[0].id, "21");
}

#[tokio::test]
async fn test_listing_then_bare_number_uses_cached_page() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 45));
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book").await;
    match &replies[..] {
        [Reply::Listing { result, keyword, .. }] => {
            assert_eq!(keyword, "book");
            assert_eq!(result.books.len(), 20);
            assert_eq!(result.total_pages, 3);
        }
        other => panic!("expected listing, got {other:?}"),
    }

    let replies = dispatcher.handle("alice", SearchType::Youshu, "3").await;
    assert_eq!(details_id(&replies[0]), "3");
    assert_eq!(source.searches(), 1);

    let replies = dispatcher.handle("alice", SearchType::Youshu, "41").await;
    assert_eq!(
        replies[0],
        Reply::Notice(Notice::Jumping {
            number: 41,
            page: 3
        })
    );
    assert_eq!(details_id(&replies[1]), "41");
    assert_eq!(source.searches(), 2);
}

#[tokio::test]
async fn test_item_past_last_page_is_rejected_without_fetch() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 45));
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book 70").await;
    assert_eq!(
        replies,
        vec![Reply::Notice(Notice::ItemNotFound {
            number: 70,
            page: 4
        })]
    );
    assert_eq!(source.searches(), 1);
}

#[tokio::test]
async fn test_item_past_end_of_short_page() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 45));
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book 50").await;
    assert_eq!(
        replies,
        vec![
            Reply::Notice(Notice::Jumping {
                number: 50,
                page: 3
            }),
            Reply::Notice(Notice::ItemNotFound {
                number: 50,
                page: 3
            }),
        ]
    );
    assert_eq!(source.details(), 0);
}

#[tokio::test]
async fn test_page_beyond_total_is_rejected() {
    let source = Arc::new(MockSource::new(SearchType::Uaa, 45));
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("bob", SearchType::Uaa, "book -5").await;
    assert_eq!(
        replies,
        vec![Reply::Notice(Notice::PageOutOfRange {
            keyword: "book".into(),
            page: 5,
            total_pages: 3
        })]
    );
    assert_eq!(source.searches(), 1);
    assert_eq!(dispatcher.states().get_state("bob"), UserSearchState::default());
}

#[tokio::test]
async fn test_zero_hits_is_not_found() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 0));
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "nothing").await;
    assert_eq!(
        replies,
        vec![Reply::Notice(Notice::NotFound {
            keyword: "nothing".into()
        })]
    );
    assert_eq!(dispatcher.states().get_state("alice"), UserSearchState::default());
}

#[tokio::test]
async fn test_failed_search_keeps_state() {
    let source = Arc::new(MockSource {
        fail_search: true,
        ..MockSource::new(SearchType::Youshu, 10)
    });
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "x").await;
    assert_eq!(
        replies,
        vec![Reply::Notice(Notice::SearchFailed {
            keyword: "x".into()
        })]
    );
    assert_eq!(dispatcher.states().get_state("alice"), UserSearchState::default());
}

#[tokio::test]
async fn test_paging_forward_and_back() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 45));
    let dispatcher = dispatcher(source.clone());

    dispatcher.handle("alice", SearchType::Youshu, "book").await;
    assert_eq!(
        dispatcher.handle("alice", SearchType::Youshu, "prev").await,
        vec![Reply::Notice(Notice::FirstPage)]
    );

    for expected in [2, 3] {
        let replies = dispatcher.handle("alice", SearchType::Youshu, "next").await;
        match &replies[..] {
            [Reply::Listing { result, .. }] => assert_eq!(result.current_page, expected),
            other => panic!("expected listing, got {other:?}"),
        }
    }
    assert_eq!(source.searches(), 3);

    assert_eq!(
        dispatcher.handle("alice", SearchType::Youshu, "next").await,
        vec![Reply::Notice(Notice::LastPage)]
    );
    assert_eq!(source.searches(), 3);

    let replies = dispatcher.handle("alice", SearchType::Youshu, "prev").await;
    assert!(matches!(&replies[..], [Reply::Listing { result, .. }] if result.current_page == 2));
    assert_eq!(dispatcher.states().get_state("alice").current_page, 2);
}

#[tokio::test]
async fn test_domains_are_isolated() {
    let youshu = Arc::new(MockSource::new(SearchType::Youshu, 45));
    let uaa = Arc::new(MockSource::new(SearchType::Uaa, 45));
    let dispatcher = Dispatcher::new(offline_client(), DispatcherConfig::default())
        .with_source(youshu.clone())
        .with_source(uaa.clone());

    dispatcher.handle("alice", SearchType::Youshu, "book").await;

    assert_eq!(
        dispatcher.handle("alice", SearchType::Uaa, "3").await,
        vec![Reply::Notice(Notice::SearchFirst(SearchType::Uaa))]
    );
    assert_eq!(
        dispatcher.handle("alice", SearchType::Uaa, "next").await,
        vec![Reply::Notice(Notice::NothingToPage(SearchType::Uaa))]
    );
    assert_eq!(uaa.searches(), 0);
}

#[tokio::test]
async fn test_single_hit_shows_details() {
    let source = Arc::new(MockSource::new(SearchType::Uaa, 1));
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.handle("bob", SearchType::Uaa, "book").await;
    assert_eq!(details_id(&replies[0]), "1");
    assert_eq!(replies.len(), 1);
}

#[tokio::test]
async fn test_usage_and_missing_source() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 1));
    let dispatcher = dispatcher(source);

    assert_eq!(
        dispatcher.handle("alice", SearchType::Youshu, "  ").await,
        vec![Reply::Notice(Notice::Usage(SearchType::Youshu))]
    );
    assert_eq!(
        dispatcher.handle("alice", SearchType::Uaa, "book").await,
        vec![Reply::Notice(Notice::SourceUnavailable(SearchType::Uaa))]
    );
    assert_eq!(
        dispatcher.handle("alice", SearchType::Youshu, "0").await,
        vec![Reply::Notice(Notice::SearchFirst(SearchType::Youshu))]
    );
}

#[tokio::test]
async fn test_enrichment_requires_exact_match_in_top_two() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 1));
    let catalog = Arc::new(MockCatalog::new(&["Book 1 (remake)", "Other", "Book 1"]));
    let config = DispatcherConfig {
        enrichment: true,
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(offline_client(), config)
        .with_source(source)
        .with_catalog(catalog.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book").await;
    match &replies[..] {
        [Reply::Details { book, .. }] => {
            assert_eq!(book, &Book::new("1", "Book 1"));
        }
        other => panic!("expected details, got {other:?}"),
    }
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_enrichment_overlays_youshu_only() {
    let youshu = Arc::new(MockSource::new(SearchType::Youshu, 1));
    let uaa = Arc::new(MockSource::new(SearchType::Uaa, 1));
    let catalog = Arc::new(MockCatalog::new(&["Other", "Book 1"]));
    let config = DispatcherConfig {
        enrichment: true,
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(offline_client(), config)
        .with_source(youshu)
        .with_source(uaa)
        .with_catalog(catalog.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book").await;
    let Reply::Details { book, .. } = &replies[0] else {
        panic!("expected details");
    };
    assert_eq!(book.author.as_deref(), Some("Official Author"));
    assert_eq!(book.status.as_deref(), Some("完本"));
    assert_eq!(book.popularity.as_deref(), Some("收藏:100"));

    let replies = dispatcher.handle("alice", SearchType::Uaa, "book").await;
    let Reply::Details { book, .. } = &replies[0] else {
        panic!("expected details");
    };
    assert_eq!(book.author, None);
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 1);
}

fn enriching_dispatcher(source: Arc<MockSource>, catalog: Arc<MockCatalog>) -> Dispatcher {
    let config = DispatcherConfig {
        enrichment: true,
        ..Default::default()
    };
    Dispatcher::new(offline_client(), config)
        .with_source(source)
        .with_catalog(catalog)
}

#[tokio::test]
async fn test_catalog_search_failure_leaves_book_untouched() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 1));
    let catalog = Arc::new(MockCatalog {
        fail_search: true,
        ..MockCatalog::new(&["Book 1"])
    });
    let dispatcher = enriching_dispatcher(source, catalog.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book").await;
    match &replies[..] {
        [Reply::Details { book, .. }] => assert_eq!(book, &Book::new("1", "Book 1")),
        other => panic!("expected details, got {other:?}"),
    }
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_catalog_details_failure_leaves_selected_book_untouched() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 3));
    let catalog = Arc::new(MockCatalog {
        fail_details: true,
        ..MockCatalog::new(&["Book 2"])
    });
    let dispatcher = enriching_dispatcher(source.clone(), catalog.clone());

    let replies = dispatcher.handle("alice", SearchType::Youshu, "book").await;
    assert!(matches!(&replies[..], [Reply::Listing { .. }]));

    let replies = dispatcher.handle("alice", SearchType::Youshu, "2").await;
    match &replies[..] {
        [Reply::Details { book, .. }] => assert_eq!(book, &Book::new("2", "Book 2")),
        other => panic!("expected details, got {other:?}"),
    }
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.details(), 1);
}

#[tokio::test]
async fn test_enrichment_disabled_by_default() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 1));
    let catalog = Arc::new(MockCatalog::new(&["Book 1"]));
    let dispatcher = Dispatcher::new(offline_client(), DispatcherConfig::default())
        .with_source(source)
        .with_catalog(catalog.clone());

    dispatcher.handle("alice", SearchType::Youshu, "book").await;
    assert_eq!(catalog.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cover_download() {
    let mut with_cover = Book::new("b1", "Covered");
    with_cover.image_url = Some("https://img.example/ok.jpg".into());
    let mut broken_cover = Book::new("b2", "Broken");
    broken_cover.image_url = Some("https://img.example/missing.jpg".into());

    let (mock, client) = MockHttpExecutor::new()
        .route("ok.jpg", 200, vec![1u8, 2, 3])
        .route("missing.jpg", 404, "")
        .into_client();
    let source = Arc::new(MockSource::with_books(
        SearchType::Youshu,
        vec![with_cover, broken_cover],
    ));
    let dispatcher = Dispatcher::new(client, DispatcherConfig::default()).with_source(source);

    let replies = dispatcher.handle("alice", SearchType::Youshu, "c 1").await;
    assert!(matches!(&replies[0], Reply::Details { cover: Cover::Loaded(bytes), .. } if bytes == &[1, 2, 3]));

    let replies = dispatcher.handle("alice", SearchType::Youshu, "c 2").await;
    assert!(matches!(&replies[0], Reply::Details { cover: Cover::Failed, .. }));
    assert!(replies[0].text().starts_with("🖼️ Cover failed to load"));
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_details_failure() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 3));
    let dispatcher = dispatcher(source);
    dispatcher.handle("alice", SearchType::Youshu, "book").await;

    // Cached page points at an id the source no longer knows.
    dispatcher
        .states()
        .update_state("alice", "book", 1, 1, SearchType::Youshu, &[Book::new("gone", "Gone")]);
    assert_eq!(
        dispatcher.handle("alice", SearchType::Youshu, "1").await,
        vec![Reply::Notice(Notice::DetailsUnavailable)]
    );
}

#[tokio::test]
async fn test_random_pick() {
    let source = Arc::new(MockSource {
        latest: Some(5),
        ..MockSource::new(SearchType::Youshu, 5)
    });
    let dispatcher = dispatcher(source.clone());

    let replies = dispatcher.random().await;
    let id = details_id(&replies[0]);
    let n = id.parse::<u64>().unwrap();
    assert!((1..=5).contains(&n));
    assert_eq!(source.details(), 1);
}

#[tokio::test]
async fn test_random_gives_up_after_max_attempts() {
    let source = Arc::new(MockSource {
        latest: Some(1000),
        ..MockSource::new(SearchType::Youshu, 0)
    });
    let config = DispatcherConfig {
        random: RandomConfig { max_attempts: 3 },
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(offline_client(), config).with_source(source.clone());

    assert_eq!(
        dispatcher.random().await,
        vec![Reply::Notice(Notice::RandomExhausted { attempts: 3 })]
    );
    assert_eq!(source.details(), 3);
}

#[tokio::test]
async fn test_random_without_latest_id() {
    let source = Arc::new(MockSource::new(SearchType::Youshu, 5));
    let dispatcher = dispatcher(source.clone());

    assert_eq!(
        dispatcher.random().await,
        vec![Reply::Notice(Notice::RandomUnavailable)]
    );
    assert_eq!(source.details(), 0);
}
