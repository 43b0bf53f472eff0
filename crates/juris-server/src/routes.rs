use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use juris_core::{Fetcher, Scope};

use crate::dto::{
    HealthResponse, SearchQuery, SearchResponseBody, SourceEntryResponse, SourceListResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes.
pub fn router<F: Fetcher + 'static>(state: Arc<AppState<F>>) -> Router {
    Router::new()
        .route("/api/search", get(search::<F>))
        .route("/api/sources", get(list_sources::<F>))
        .route("/health", get(health::<F>))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Merged results and per-source errors", body = SearchResponseBody),
        (status = 400, description = "Query too short", body = SearchResponseBody),
    ),
    tag = "search"
)]
pub async fn search<F: Fetcher + 'static>(
    State(state): State<Arc<AppState<F>>>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.q.unwrap_or_default();
    let scope = parse_scope(params.scope.as_deref());

    let response = state.search.search(&query, scope).await?;

    Ok(axum::Json(SearchResponseBody::from(response)))
}

/// Unknown or missing scopes search everything.
fn parse_scope(raw: Option<&str>) -> Scope {
    match raw {
        None => Scope::All,
        Some(raw) => raw.parse().unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "Falling back to scope 'all'");
            Scope::All
        }),
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/sources",
    responses(
        (status = 200, description = "Registered tribunals in search order", body = SourceListResponse),
    ),
    tag = "search"
)]
pub async fn list_sources<F: Fetcher + 'static>(
    State(state): State<Arc<AppState<F>>>,
) -> impl IntoResponse {
    let sources: Vec<SourceEntryResponse> = state
        .search
        .registry()
        .sources()
        .iter()
        .map(SourceEntryResponse::from)
        .collect();
    let total = sources.len();

    axum::Json(SourceListResponse { sources, total })
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health<F: Fetcher + 'static>(
    State(state): State<Arc<AppState<F>>>,
) -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "healthy",
        sources: state.search.registry().len(),
    })
}
