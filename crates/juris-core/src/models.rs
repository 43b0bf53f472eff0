use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Title used for synthesized links that open a source's own results page.
pub const FALLBACK_TITLE: &str = "Abrir resultados no site";

/// Pseudo-source reported when the request itself is rejected.
pub const VALIDATION_SOURCE_ID: &str = "input";
pub const VALIDATION_SOURCE_NAME: &str = "Validação";

/// Search category filter forwarded to every source's URL builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Temas,
    Vinculantes,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Temas => "temas",
            Scope::Vinculantes => "vinculantes",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Scope::All),
            "temas" => Ok(Scope::Temas),
            "vinculantes" => Ok(Scope::Vinculantes),
            other => Err(format!("Invalid scope: {other}")),
        }
    }
}

/// A single link returned to the caller, either parsed from a source page
/// or synthesized as a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub title: String,
    pub snippet: String,
    /// Always absolute.
    pub url: String,
    pub source_id: String,
    pub source_name: String,
}

impl ResultItem {
    /// Link pointing straight at a source's search results page.
    pub fn fallback(source_id: &str, source_name: &str, url: impl Into<String>) -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            snippet: String::new(),
            url: url.into(),
            source_id: source_id.to_string(),
            source_name: source_name.to_string(),
        }
    }

    /// Identity used for deduplication.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.source_id, &self.url)
    }
}

/// A source that failed to complete its fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceError {
    pub source_id: String,
    pub source_name: String,
    /// `"timeout"` or the underlying failure message.
    pub error: String,
}

/// Merged outcome of one fan-out search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<ResultItem>,
    pub errors: Vec<SourceError>,
    pub took_ms: u64,
}

impl SearchResponse {
    /// Response body for a request rejected before fan-out.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            errors: vec![SourceError {
                source_id: VALIDATION_SOURCE_ID.to_string(),
                source_name: VALIDATION_SOURCE_NAME.to_string(),
                error: message.into(),
            }],
            took_ms: 0,
        }
    }
}
