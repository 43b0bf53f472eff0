use juris_client::ReqwestFetcher;
use juris_core::{Fetcher, SearchService};

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState<F: Fetcher = ReqwestFetcher> {
    pub search: SearchService<F>,
}
