pub mod config;
pub mod error;
pub mod models;
pub mod parse;
pub mod registry;
pub mod reporter;
pub mod search;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::SearchConfig;
pub use error::AppError;
pub use models::{ResultItem, Scope, SearchResponse, SourceError};
pub use registry::{CourtSource, Registry};
pub use reporter::{SearchEvent, SearchReporter, TracingSearchReporter};
pub use search::{SearchService, TaskOutcome};
pub use traits::Fetcher;
