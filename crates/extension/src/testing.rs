//! Scripted transport for adapter and engine tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Result, SourceError};
use crate::http::{Client, HttpExecutor, Request, Response};

/// Answers requests from a fixed route table.
///
/// A route matches when its pattern is a substring of the full request url;
/// the first matching route wins. Unmatched requests fail with a transport
/// error, as an unreachable host would.
#[derive(Default)]
pub struct MockHttpExecutor {
    routes: Vec<(String, Response)>,
    calls: Mutex<Vec<Request>>,
    call_count: AtomicUsize,
}

impl MockHttpExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes
            .push((pattern.into(), Response::new(status, body)));
        self
    }

    /// Wraps the executor in a [`Client`], keeping a handle for assertions.
    pub fn into_client(self) -> (Arc<Self>, Client) {
        let executor = Arc::new(self);
        let client = Client::new(executor.clone());
        (executor, client)
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Full urls requested so far, in order.
    pub fn urls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|request| request.full_url().ok())
            .collect()
    }
}

#[async_trait]
impl HttpExecutor for MockHttpExecutor {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let url = request.full_url()?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }

        self.routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| SourceError::Transport(format!("no route for {url}")))
    }
}
