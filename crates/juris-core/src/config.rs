use std::time::Duration;

use crate::error::AppError;
use crate::registry::Registry;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; JurisAgentBR/1.0; +https://example.local)";

/// Settings shared by every entry point that runs searches.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Sent with every outbound request.
    pub user_agent: String,
    /// Replaces every source's own deadline when set.
    pub timeout: Option<Duration>,
    /// Replaces every source's own result cap when set.
    pub max_results: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            max_results: None,
        }
    }
}

impl SearchConfig {
    /// Read configuration from environment variables.
    ///
    /// - `JURIS_USER_AGENT` (optional)
    /// - `JURIS_TIMEOUT_MS` (optional, positive integer)
    /// - `JURIS_MAX_RESULTS` (optional, positive integer)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let user_agent = lookup("JURIS_USER_AGENT")
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let timeout = lookup("JURIS_TIMEOUT_MS")
            .map(|raw| positive("JURIS_TIMEOUT_MS", &raw))
            .transpose()?
            .map(Duration::from_millis);

        let max_results = lookup("JURIS_MAX_RESULTS")
            .map(|raw| positive("JURIS_MAX_RESULTS", &raw))
            .transpose()?
            .map(|n| n as usize);

        Ok(Self {
            user_agent,
            timeout,
            max_results,
        })
    }

    /// The built-in registry with this config's overrides applied.
    pub fn registry(&self) -> Result<Registry, AppError> {
        let mut registry = Registry::builtin()?;
        if let Some(timeout) = self.timeout {
            registry = registry.with_timeout(timeout);
        }
        if let Some(max_results) = self.max_results {
            registry = registry.with_max_results(max_results);
        }
        Ok(registry)
    }
}

fn positive(key: &str, raw: &str) -> Result<u64, AppError> {
    let parsed: u64 = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!("Invalid {key} '{raw}': must be a positive integer"))
    })?;
    if parsed == 0 {
        return Err(AppError::ConfigError(format!("{key} must be at least 1")));
    }
    Ok(parsed)
}
