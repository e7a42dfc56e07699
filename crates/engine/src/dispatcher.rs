use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use novelscout_extension::{Catalog, Client, Source};
use novelscout_types::{Book, SearchResult, SearchType};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::enrichment::Enricher;
use crate::pagination::{ItemPosition, locate};
use crate::reply::{Cover, Notice, Reply};
use crate::state::{SearchStateManager, SessionConfig};

const COVER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomConfig {
    /// Random ids tried before giving up.
    pub max_attempts: u32,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self { max_attempts: 10 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    pub session: SessionConfig,
    pub random: RandomConfig,
    /// Overlay catalog metadata on youshu books.
    pub enrichment: bool,
}

/// Runs chat commands against the configured sources.
///
/// Every call returns the replies to send, in order. Failures are turned into
/// [`Notice`]s; nothing is returned as an error.
pub struct Dispatcher {
    client: Client,
    sources: HashMap<SearchType, Arc<dyn Source>>,
    enricher: Option<Enricher>,
    states: SearchStateManager,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// `client` is used for cover downloads and should be the one the
    /// sources share.
    pub fn new(client: Client, config: DispatcherConfig) -> Self {
        Self {
            client,
            sources: HashMap::new(),
            enricher: None,
            states: SearchStateManager::new(config.session),
            config,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn Source>) -> Self {
        self.sources.insert(source.search_type(), source);
        self
    }

    /// Registers the enrichment catalog. It is only consulted when
    /// enrichment is enabled in the config.
    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        if self.config.enrichment {
            self.enricher = Some(Enricher::new(catalog));
        }
        self
    }

    pub fn states(&self) -> &SearchStateManager {
        &self.states
    }

    /// Handles `/<search_type> <args>` sent by `user_id`.
    pub async fn handle(&self, user_id: &str, search_type: SearchType, args: &str) -> Vec<Reply> {
        let Some(source) = self.sources.get(&search_type) else {
            return vec![Notice::SourceUnavailable(search_type).into()];
        };
        let Ok(command) = Command::parse(args) else {
            return vec![Notice::Usage(search_type).into()];
        };

        tracing::info!("User {user_id} ran /{search_type} {command:?}");
        match command {
            Command::Next => self.turn_page(source.as_ref(), user_id, true).await,
            Command::Prev => self.turn_page(source.as_ref(), user_id, false).await,
            Command::Select(number) => self.select(source.as_ref(), user_id, number).await,
            Command::Search {
                keyword,
                page,
                item,
            } => {
                self.search(source.as_ref(), user_id, &keyword, page, item)
                    .await
            }
        }
    }

    async fn search(
        &self,
        source: &dyn Source,
        user_id: &str,
        keyword: &str,
        page: u32,
        item: Option<u32>,
    ) -> Vec<Reply> {
        let search_type = source.search_type();
        let result = match source.search(keyword, page).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!("Search '{keyword}' page {page} on {search_type} failed: {err}");
                return vec![
                    Notice::SearchFailed {
                        keyword: keyword.to_string(),
                    }
                    .into(),
                ];
            }
        };

        if result.total_pages > 0 && page > result.total_pages {
            return vec![
                Notice::PageOutOfRange {
                    keyword: keyword.to_string(),
                    page,
                    total_pages: result.total_pages,
                }
                .into(),
            ];
        }
        if result.is_empty() {
            return vec![
                Notice::NotFound {
                    keyword: keyword.to_string(),
                }
                .into(),
            ];
        }

        self.states.update_state(
            user_id,
            keyword,
            page,
            result.total_pages,
            search_type,
            &result.books,
        );

        let Some(number) = item else {
            if result.books.len() == 1 && result.total_pages == 1 {
                let book = &result.books[0];
                return vec![self.details(source, &book.id, &book.title).await];
            }
            return vec![Reply::Listing {
                search_type,
                keyword: keyword.to_string(),
                result,
            }];
        };

        let Some(position) = locate(number) else {
            return vec![Notice::ItemNotFound { number, page }.into()];
        };
        if position.page == page {
            return self.pick(source, &result, position, number).await;
        }
        self.jump(source, user_id, keyword, position, number, result.total_pages)
            .await
    }

    /// A bare number: resolve against the cached page when possible,
    /// otherwise fetch the page that holds it.
    async fn select(&self, source: &dyn Source, user_id: &str, number: u32) -> Vec<Reply> {
        let search_type = source.search_type();
        let state = self.states.get_state(user_id);
        if !state.is_active_for(search_type) {
            return vec![Notice::SearchFirst(search_type).into()];
        }

        let Some(position) = locate(number) else {
            return vec![
                Notice::ItemNotFound {
                    number,
                    page: state.current_page,
                }
                .into(),
            ];
        };

        if position.page != state.current_page {
            return self
                .jump(
                    source,
                    user_id,
                    &state.keyword,
                    position,
                    number,
                    state.max_pages,
                )
                .await;
        }

        let on_page = position.index as u32 + 1;
        match self.states.resolve_by_number(user_id, on_page, search_type) {
            Some(summary) => vec![self.details(source, &summary.id, &summary.title).await],
            None => vec![
                Notice::ItemNotFound {
                    number,
                    page: position.page,
                }
                .into(),
            ],
        }
    }

    /// Loads the page holding `number` and shows that item.
    async fn jump(
        &self,
        source: &dyn Source,
        user_id: &str,
        keyword: &str,
        position: ItemPosition,
        number: u32,
        total_pages: u32,
    ) -> Vec<Reply> {
        let not_found = Notice::ItemNotFound {
            number,
            page: position.page,
        };
        if total_pages > 0 && position.page > total_pages {
            return vec![not_found.into()];
        }

        let mut replies = vec![Reply::from(Notice::Jumping {
            number,
            page: position.page,
        })];

        let result = match source.search(keyword, position.page).await {
            Ok(result) if !result.is_empty() => result,
            Ok(_) => {
                replies.push(not_found.into());
                return replies;
            }
            Err(err) => {
                tracing::error!("Loading page {} of '{keyword}' failed: {err}", position.page);
                replies.push(
                    Notice::SearchFailed {
                        keyword: keyword.to_string(),
                    }
                    .into(),
                );
                return replies;
            }
        };

        self.states.update_state(
            user_id,
            keyword,
            position.page,
            result.total_pages,
            source.search_type(),
            &result.books,
        );
        replies.extend(self.pick(source, &result, position, number).await);
        replies
    }

    async fn pick(
        &self,
        source: &dyn Source,
        result: &SearchResult,
        position: ItemPosition,
        number: u32,
    ) -> Vec<Reply> {
        match result.books.get(position.index) {
            Some(book) => vec![self.details(source, &book.id, &book.title).await],
            None => vec![
                Notice::ItemNotFound {
                    number,
                    page: position.page,
                }
                .into(),
            ],
        }
    }

    async fn turn_page(&self, source: &dyn Source, user_id: &str, forward: bool) -> Vec<Reply> {
        let search_type = source.search_type();
        let state = self.states.get_state(user_id);
        if !state.is_active_for(search_type) {
            return vec![Notice::NothingToPage(search_type).into()];
        }

        let target = if forward {
            if state.current_page >= state.max_pages {
                return vec![Notice::LastPage.into()];
            }
            state.current_page + 1
        } else {
            if state.current_page <= 1 {
                return vec![Notice::FirstPage.into()];
            }
            state.current_page - 1
        };

        let result = match source.search(&state.keyword, target).await {
            Ok(result) if !result.is_empty() => result,
            Ok(_) => return vec![Notice::PageLoadFailed { page: target }.into()],
            Err(err) => {
                tracing::error!("Loading page {target} of '{}' failed: {err}", state.keyword);
                return vec![Notice::PageLoadFailed { page: target }.into()];
            }
        };

        self.states.update_state(
            user_id,
            &state.keyword,
            target,
            result.total_pages,
            search_type,
            &result.books,
        );
        vec![Reply::Listing {
            search_type,
            keyword: state.keyword,
            result,
        }]
    }

    /// Shows a random youshu book.
    ///
    /// Ids are drawn uniformly up to the newest id on the site's home page;
    /// ids that do not resolve to a book are retried a bounded number of
    /// times.
    pub async fn random(&self) -> Vec<Reply> {
        let Some(source) = self.sources.get(&SearchType::Youshu) else {
            return vec![Notice::SourceUnavailable(SearchType::Youshu).into()];
        };

        let latest = match source.latest_book_id().await {
            Ok(latest) if latest > 0 => latest,
            Ok(_) => return vec![Notice::RandomUnavailable.into()],
            Err(err) => {
                tracing::warn!("Could not determine the latest book id: {err}");
                return vec![Notice::RandomUnavailable.into()];
            }
        };

        let attempts = self.config.random.max_attempts;
        for attempt in 1..=attempts {
            let id = rand::thread_rng().gen_range(1..=latest).to_string();
            tracing::info!("Random pick attempt {attempt}/{attempts}: book {id}");

            match self.fetch_book(source.as_ref(), &id, None).await {
                Ok(book) => return vec![self.present(book).await],
                Err(err) => tracing::warn!("Random book {id} unusable: {err}"),
            }
        }
        vec![Notice::RandomExhausted { attempts }.into()]
    }

    async fn details(&self, source: &dyn Source, id: &str, title: &str) -> Reply {
        match self.fetch_book(source, id, Some(title)).await {
            Ok(book) => self.present(book).await,
            Err(err) => {
                tracing::error!("Details for {} book {id} failed: {err}", source.search_type());
                Notice::DetailsUnavailable.into()
            }
        }
    }

    /// Fetches a book and, for youshu, overlays catalog metadata. The
    /// catalog is searched by `title` when given, else by the fetched title.
    async fn fetch_book(
        &self,
        source: &dyn Source,
        id: &str,
        title: Option<&str>,
    ) -> novelscout_extension::Result<Book> {
        let book = source.get_book_details(id).await?;
        match &self.enricher {
            Some(enricher) if source.search_type() == SearchType::Youshu => {
                let title = title.unwrap_or(&book.title).to_string();
                Ok(enricher.enrich(book, &title).await)
            }
            _ => Ok(book),
        }
    }

    async fn present(&self, book: Book) -> Reply {
        let cover = match &book.image_url {
            None => Cover::None,
            Some(url) => match self.client.bytes(url, COVER_TIMEOUT).await {
                Ok(bytes) => Cover::Loaded(bytes),
                Err(err) => {
                    tracing::warn!("Failed to download cover {url}: {err}");
                    Cover::Failed
                }
            },
        };
        Reply::Details { book, cover }
    }
}
