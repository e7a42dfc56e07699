//! Per-user search context.
//!
//! Each user has at most one [`UserSearchState`], overwritten by every
//! successful search or page turn. Concurrent commands from the same user
//! race and the last write wins. The map is bounded: idle entries expire and
//! the least recently used ones are dropped once `capacity` is exceeded.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use novelscout_types::{Book, BookSummary, SearchType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearchState {
    pub keyword: String,
    pub current_page: u32,
    pub max_pages: u32,
    /// Domain of the last search. Cached items only resolve for the same
    /// domain.
    pub search_type: Option<SearchType>,
    /// Hits of `current_page`, in upstream order.
    pub results: Vec<BookSummary>,
}

impl Default for UserSearchState {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            current_page: 1,
            max_pages: 1,
            search_type: None,
            results: Vec::new(),
        }
    }
}

impl UserSearchState {
    /// Whether this state holds a search of `search_type` that can be
    /// continued.
    pub fn is_active_for(&self, search_type: SearchType) -> bool {
        !self.keyword.is_empty() && self.search_type == Some(search_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Most users tracked at once.
    pub capacity: usize,
    /// Entries untouched for this long are dropped.
    #[serde(rename = "idle_ttl_secs", with = "secs")]
    pub idle_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            idle_ttl: Duration::from_secs(3600),
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

struct Entry {
    state: UserSearchState,
    touched: Instant,
}

impl Entry {
    fn new(state: UserSearchState) -> Self {
        Self {
            state,
            touched: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.touched.elapsed() > ttl
    }
}

pub struct SearchStateManager {
    states: DashMap<String, Entry>,
    config: SessionConfig,
}

impl Default for SearchStateManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SearchStateManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            states: DashMap::new(),
            config,
        }
    }

    /// Returns the user's state, creating the default one on first use.
    ///
    /// Reading refreshes the idle timer. Calling this repeatedly without an
    /// update in between always yields the same value.
    pub fn get_state(&self, user_id: &str) -> UserSearchState {
        let state = {
            let mut entry = self
                .states
                .entry(user_id.to_string())
                .or_insert_with(|| Entry::new(UserSearchState::default()));
            if entry.is_expired(self.config.idle_ttl) {
                tracing::debug!("Session for {user_id} expired");
                entry.state = UserSearchState::default();
            }
            entry.touched = Instant::now();
            entry.state.clone()
        };
        self.evict();
        state
    }

    /// Replaces the user's state wholesale. `results` are reduced to their
    /// summaries.
    pub fn update_state(
        &self,
        user_id: &str,
        keyword: &str,
        current_page: u32,
        max_pages: u32,
        search_type: SearchType,
        results: &[Book],
    ) {
        let state = UserSearchState {
            keyword: keyword.to_string(),
            current_page,
            max_pages,
            search_type: Some(search_type),
            results: results.iter().map(Book::summary).collect(),
        };
        tracing::debug!(
            "Session for {user_id}: '{keyword}' [{search_type}] page {current_page}/{max_pages}, {} results",
            state.results.len()
        );
        self.states.insert(user_id.to_string(), Entry::new(state));
        self.evict();
    }

    /// Looks up the `number`-th (1-based) cached result of the user's current
    /// page. Nothing resolves across search domains.
    pub fn resolve_by_number(
        &self,
        user_id: &str,
        number: u32,
        expected: SearchType,
    ) -> Option<BookSummary> {
        let entry = self.states.get(user_id)?;
        if entry.is_expired(self.config.idle_ttl) || entry.state.search_type != Some(expected) {
            return None;
        }
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        entry.state.results.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn evict(&self) {
        if self.states.len() <= self.config.capacity {
            return;
        }

        let ttl = self.config.idle_ttl;
        self.states.retain(|_, entry| !entry.is_expired(ttl));

        let excess = self.states.len().saturating_sub(self.config.capacity);
        if excess == 0 {
            return;
        }

        let mut by_age = self
            .states
            .iter()
            .map(|entry| (entry.key().clone(), entry.touched))
            .collect::<Vec<_>>();
        by_age.sort_by_key(|(_, touched)| *touched);

        for (user_id, _) in by_age.into_iter().take(excess) {
            tracing::debug!("Evicting session for {user_id}");
            self.states.remove(&user_id);
        }
    }
}
