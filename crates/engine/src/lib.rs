//! Conversational search over the novelscout sources.
//!
//! The [`Dispatcher`] turns the arguments of a chat command into source
//! calls, keeps each user's last search in a [`SearchStateManager`] so that
//! follow-up commands can say "item 7" or "next", and answers with
//! [`Reply`] values that render to chat text.

pub mod command;
mod dispatcher;
pub mod enrichment;
pub mod pagination;
pub mod render;
mod reply;
pub mod state;

pub use command::{Command, UsageError};
pub use dispatcher::{Dispatcher, DispatcherConfig, RandomConfig};
pub use enrichment::Enricher;
pub use pagination::{ItemPosition, locate};
pub use reply::{Cover, Notice, Reply};
pub use state::{SearchStateManager, SessionConfig, UserSearchState};
