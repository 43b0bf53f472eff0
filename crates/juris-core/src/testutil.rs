//! Test utilities: a scripted [`Fetcher`] keyed by host.
//!
//! Handwritten mock for dependency injection in unit and integration
//! tests. Calls are recorded behind `Arc<Mutex<_>>` so tests can assert on
//! which URLs were requested.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::traits::Fetcher;

/// Scripted reply for one host.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this body.
    Body(String),
    /// Return this body after a delay.
    Delayed(Duration, String),
    /// Fail with a network error carrying this message.
    Fail(String),
    /// Never complete.
    Hang,
}

/// Mock fetcher that answers by host and records every requested URL.
#[derive(Clone, Default)]
pub struct MockFetcher {
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    /// Reply for hosts with no scripted entry.
    default: Arc<Mutex<Option<MockReply>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Every host gets an empty page unless scripted otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unscripted host replies with `reply`.
    pub fn with_default(reply: MockReply) -> Self {
        let fetcher = Self::default();
        *fetcher.default.lock().unwrap() = Some(reply);
        fetcher
    }

    pub fn reply(self, host: &str, reply: MockReply) -> Self {
        self.replies.lock().unwrap().insert(host.to_string(), reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn reply_for(&self, url: &str) -> MockReply {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        if let Some(reply) = self.replies.lock().unwrap().get(&host) {
            return reply.clone();
        }
        self.default
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| MockReply::Body("<html><body>default</body></html>".to_string()))
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());

        match self.reply_for(url) {
            MockReply::Body(body) => Ok(body),
            MockReply::Delayed(delay, body) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            MockReply::Fail(message) => Err(AppError::NetworkError(message)),
            MockReply::Hang => std::future::pending().await,
        }
    }
}
