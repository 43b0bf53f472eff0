use serde::{Deserialize, Serialize};

use juris_core::models::{ResultItem, SearchResponse, SourceError};
use juris_core::registry::CourtSource;

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text query; at least 2 characters after trimming
    pub q: Option<String>,
    /// Scope: `all` (default), `temas` or `vinculantes`
    #[serde(rename = "type")]
    pub scope: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultItemResponse {
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub source_id: String,
    pub source_name: String,
}

impl From<ResultItem> for ResultItemResponse {
    fn from(item: ResultItem) -> Self {
        Self {
            title: item.title,
            snippet: item.snippet,
            url: item.url,
            source_id: item.source_id,
            source_name: item.source_name,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceErrorResponse {
    pub source_id: String,
    pub source_name: String,
    pub error: String,
}

impl From<SourceError> for SourceErrorResponse {
    fn from(e: SourceError) -> Self {
        Self {
            source_id: e.source_id,
            source_name: e.source_name,
            error: e.error,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseBody {
    pub results: Vec<ResultItemResponse>,
    pub errors: Vec<SourceErrorResponse>,
    pub took_ms: u64,
}

impl From<SearchResponse> for SearchResponseBody {
    fn from(r: SearchResponse) -> Self {
        Self {
            results: r.results.into_iter().map(ResultItemResponse::from).collect(),
            errors: r.errors.into_iter().map(SourceErrorResponse::from).collect(),
            took_ms: r.took_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntryResponse {
    pub id: String,
    pub name: String,
    pub max_results: usize,
    pub timeout_ms: u64,
}

impl From<&CourtSource> for SourceEntryResponse {
    fn from(source: &CourtSource) -> Self {
        Self {
            id: source.id.to_string(),
            name: source.name.to_string(),
            max_results: source.max_results,
            timeout_ms: source.timeout.as_millis() as u64,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SourceListResponse {
    pub sources: Vec<SourceEntryResponse>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sources: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
