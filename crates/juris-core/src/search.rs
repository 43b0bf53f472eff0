use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::error::AppError;
use crate::models::{ResultItem, Scope, SearchResponse, SourceError};
use crate::registry::{CourtSource, Registry};
use crate::reporter::{SearchEvent, SearchReporter, TracingSearchReporter};
use crate::traits::Fetcher;

/// Shortest accepted query, in characters, after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

/// Message returned when a query is too short.
pub const QUERY_TOO_SHORT: &str = "Consulta muito curta";

/// Result of one fetch-and-parse task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// At least one item was parsed from the page.
    Success(Vec<ResultItem>),
    /// The page arrived but yielded nothing; carries the fallback link.
    Unparsed(ResultItem),
    /// The fetch never produced a body.
    Failure {
        error: SourceError,
        fallback_url: String,
    },
}

/// Trim and check a raw query.
pub fn validate_query(query: &str) -> Result<&str, AppError> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::Validation(QUERY_TOO_SHORT.to_string()));
    }
    Ok(trimmed)
}

/// Fetch one source's results page and extract items from it.
///
/// The deadline covers the whole fetch including the body. Any completed
/// body counts as success, even when nothing can be parsed from it.
pub async fn execute<F: Fetcher>(
    fetcher: &F,
    source: &CourtSource,
    query: &str,
    scope: Scope,
) -> TaskOutcome {
    let url = source.search_url(query, scope);

    let fetched = match tokio::time::timeout(source.timeout, fetcher.fetch(&url)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(source.timeout.as_millis() as u64)),
    };

    match fetched {
        Ok(body) => {
            let mut items = source.parse(&body, &url);
            if items.is_empty() {
                return TaskOutcome::Unparsed(source.fallback_item(url));
            }
            items.truncate(source.max_results);
            TaskOutcome::Success(items)
        }
        Err(e) => TaskOutcome::Failure {
            error: SourceError {
                source_id: source.id.to_string(),
                source_name: source.name.to_string(),
                error: e.source_reason(),
            },
            fallback_url: url,
        },
    }
}

/// Fans one query out to every registered source and merges the outcomes.
///
/// Generic over the [`Fetcher`] so tests run without real HTTP.
pub struct SearchService<F: Fetcher> {
    fetcher: F,
    registry: Arc<Registry>,
    reporter: Arc<dyn SearchReporter>,
}

impl<F: Fetcher> SearchService<F> {
    pub fn new(fetcher: F, registry: Arc<Registry>) -> Self {
        Self {
            fetcher,
            registry,
            reporter: Arc::new(TracingSearchReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn SearchReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the full search.
    ///
    /// 1. Validate the query (the only hard failure)
    /// 2. Start one task per source, all at once
    /// 3. Wait for every task to settle
    /// 4. Merge in registry order; failed sources contribute an error and a fallback link
    pub async fn search(&self, query: &str, scope: Scope) -> Result<SearchResponse, AppError> {
        let query = validate_query(query)?;
        let sources = self.registry.sources();

        self.reporter.report(SearchEvent::Started {
            query,
            scope,
            sources: sources.len(),
        });

        let started = Instant::now();
        let outcomes = join_all(
            sources
                .iter()
                .map(|source| execute(&self.fetcher, source, query, scope)),
        )
        .await;
        let took_ms = started.elapsed().as_millis() as u64;

        let mut response = SearchResponse {
            took_ms,
            ..Default::default()
        };

        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                TaskOutcome::Success(items) => {
                    self.reporter.report(SearchEvent::SourceSucceeded {
                        source_id: source.id,
                        items: items.len(),
                    });
                    response.results.extend(items);
                }
                TaskOutcome::Unparsed(fallback) => {
                    self.reporter.report(SearchEvent::SourceFellBack {
                        source_id: source.id,
                        url: &fallback.url,
                    });
                    response.results.push(fallback);
                }
                TaskOutcome::Failure {
                    error,
                    fallback_url,
                } => {
                    self.reporter.report(SearchEvent::SourceFailed {
                        source_id: source.id,
                        error: &error.error,
                    });
                    response.errors.push(error);
                    response.results.push(source.fallback_item(fallback_url));
                }
            }
        }

        response.results.retain(|item| {
            let known = self.registry.contains(&item.source_id);
            debug_assert!(known, "item stamped with unregistered source {}", item.source_id);
            if !known {
                tracing::warn!(
                    source_id = %item.source_id,
                    "Dropping item from unregistered source"
                );
            }
            known
        });

        self.reporter.report(SearchEvent::Finished {
            results: response.results.len(),
            errors: response.errors.len(),
            took_ms,
        });

        Ok(response)
    }
}
