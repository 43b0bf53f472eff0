use crate::models::Scope;

/// Events emitted by the search coordinator for monitoring/logging.
#[derive(Debug, Clone)]
pub enum SearchEvent<'a> {
    Started {
        query: &'a str,
        scope: Scope,
        sources: usize,
    },
    SourceSucceeded {
        source_id: &'a str,
        items: usize,
    },
    /// Fetched fine but nothing was parsed; only the fallback link is returned.
    SourceFellBack {
        source_id: &'a str,
        url: &'a str,
    },
    SourceFailed {
        source_id: &'a str,
        error: &'a str,
    },
    Finished {
        results: usize,
        errors: usize,
        took_ms: u64,
    },
}

/// Trait for receiving search events (decoupled logging).
pub trait SearchReporter: Send + Sync {
    fn report(&self, event: SearchEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSearchReporter;

impl SearchReporter for TracingSearchReporter {
    fn report(&self, event: SearchEvent<'_>) {
        match event {
            SearchEvent::Started {
                query,
                scope,
                sources,
            } => {
                tracing::info!(%query, %scope, %sources, "Search started");
            }
            SearchEvent::SourceSucceeded { source_id, items } => {
                tracing::debug!(%source_id, %items, "Source parsed");
            }
            SearchEvent::SourceFellBack { source_id, url } => {
                tracing::debug!(%source_id, %url, "Nothing parsed, returning search link");
            }
            SearchEvent::SourceFailed { source_id, error } => {
                tracing::warn!(%source_id, %error, "Source failed");
            }
            SearchEvent::Finished {
                results,
                errors,
                took_ms,
            } => {
                tracing::info!(%results, %errors, %took_ms, "Search finished");
            }
        }
    }
}

/// Reporter that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl SearchReporter for SilentReporter {}
