use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use juris_client::ReqwestFetcher;
use juris_core::search::MIN_QUERY_CHARS;
use juris_core::{AppError, Registry, Scope, SearchConfig, SearchResponse, SearchService};

#[derive(Parser)]
#[command(name = "juris", version, about = "Jurisprudence search across Brazilian courts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every registered tribunal for a query
    Search {
        /// Free-text query (e.g. "tema 246", "súmula 331")
        query: String,

        /// Search scope
        #[arg(short, long, value_enum, default_value_t = ScopeArg::All)]
        scope: ScopeArg,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Per-source deadline in milliseconds (overrides each source's own)
        #[arg(long, env = "JURIS_TIMEOUT_MS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout_ms: Option<u64>,

        /// Maximum parsed results per source
        #[arg(long, env = "JURIS_MAX_RESULTS", value_parser = clap::value_parser!(u64).range(1..))]
        max_results: Option<u64>,

        /// User-Agent sent to tribunal sites
        #[arg(long, env = "JURIS_USER_AGENT")]
        user_agent: Option<String>,
    },

    /// List the registered tribunals
    Sources,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    All,
    Temas,
    Vinculantes,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::All => Scope::All,
            ScopeArg::Temas => Scope::Temas,
            ScopeArg::Vinculantes => Scope::Vinculantes,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("juris=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            query,
            scope,
            format,
            timeout_ms,
            max_results,
            user_agent,
        } => {
            let config = search_config(timeout_ms, max_results, user_agent);
            cmd_search(&query, scope.into(), format, &config).await?;
        }
        Commands::Sources => {
            cmd_sources()?;
        }
    }

    Ok(())
}

/// Clap has already rejected zero and non-numeric values, env included.
fn search_config(
    timeout_ms: Option<u64>,
    max_results: Option<u64>,
    user_agent: Option<String>,
) -> SearchConfig {
    let mut config = SearchConfig::default();
    if let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) {
        config.user_agent = ua;
    }
    config.timeout = timeout_ms.map(Duration::from_millis);
    config.max_results = max_results.map(|n| n as usize);
    config
}

fn search_error(err: AppError) -> anyhow::Error {
    match err {
        AppError::Validation(message) => {
            anyhow::anyhow!("{message} (at least {MIN_QUERY_CHARS} characters required)")
        }
        other => anyhow::anyhow!(other),
    }
}

async fn cmd_search(
    query: &str,
    scope: Scope,
    format: OutputFormat,
    config: &SearchConfig,
) -> Result<()> {
    let registry = config.registry().context("Failed to build source registry")?;
    let fetcher = ReqwestFetcher::from_config(config).context("Failed to create HTTP client")?;
    let service = SearchService::new(fetcher, Arc::new(registry));

    let response = service.search(query, scope).await.map_err(search_error)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;
        }
        OutputFormat::Csv => write_csv(&response, &mut out)?,
        OutputFormat::Text => write_text(&response, &mut out)?,
    }

    Ok(())
}

fn cmd_sources() -> Result<()> {
    let registry = Registry::builtin().context("Failed to build source registry")?;

    for source in registry.sources() {
        println!(
            "  {:<6} {} (max {} results, {} ms)",
            source.id,
            source.name,
            source.max_results,
            source.timeout.as_millis()
        );
    }
    println!("\nTotal: {} sources", registry.len());

    Ok(())
}

/// One row per result; failed sources get an extra row carrying the error.
fn write_csv(response: &SearchResponse, out: impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["source_id", "source_name", "title", "url", "snippet", "error"])?;

    for item in &response.results {
        writer.write_record([
            item.source_id.as_str(),
            item.source_name.as_str(),
            item.title.as_str(),
            item.url.as_str(),
            item.snippet.as_str(),
            "",
        ])?;
    }
    for error in &response.errors {
        writer.write_record([
            error.source_id.as_str(),
            error.source_name.as_str(),
            "",
            "",
            "",
            error.error.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Results grouped by source, in the order sources were searched.
fn write_text(response: &SearchResponse, mut out: impl Write) -> Result<()> {
    let mut current: Option<&str> = None;
    for item in &response.results {
        if current != Some(item.source_id.as_str()) {
            writeln!(out, "\n[{}]", item.source_name)?;
            current = Some(item.source_id.as_str());
        }
        writeln!(out, "  {}", item.title)?;
        if !item.snippet.is_empty() {
            writeln!(out, "    {}", item.snippet)?;
        }
        writeln!(out, "    {}", item.url)?;
    }

    if !response.errors.is_empty() {
        writeln!(out, "\nSources with errors:")?;
        for error in &response.errors {
            writeln!(out, "  {}: {}", error.source_name, error.error)?;
        }
    }

    writeln!(
        out,
        "\n{} results, {} errors in {} ms",
        response.results.len(),
        response.errors.len(),
        response.took_ms
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use juris_core::{ResultItem, SourceError};

    use super::*;

    fn sample() -> SearchResponse {
        SearchResponse {
            results: vec![
                ResultItem {
                    title: "Acórdão".into(),
                    snippet: "REsp 1, \"tema\"".into(),
                    url: "https://scon.stj.jus.br/doc?id=1".into(),
                    source_id: "stj".into(),
                    source_name: "STJ".into(),
                },
                ResultItem::fallback(
                    "tst",
                    "TST",
                    "https://jurisprudencia.tst.jus.br/busca-unificada?q=x",
                ),
            ],
            errors: vec![SourceError {
                source_id: "tst".into(),
                source_name: "TST".into(),
                error: "timeout".into(),
            }],
            took_ms: 42,
        }
    }

    #[test]
    fn test_csv_quotes_fields_and_lists_errors() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "source_id,source_name,title,url,snippet,error");
        assert!(lines[1].contains("\"REsp 1, \"\"tema\"\"\""));
        assert_eq!(lines[3], "tst,TST,,,,timeout");
    }

    #[test]
    fn test_zero_limits_rejected_like_server_config() {
        for args in [
            ["juris", "search", "tema", "--timeout-ms", "0"],
            ["juris", "search", "tema", "--max-results", "0"],
        ] {
            let err = Cli::try_parse_from(args).err().expect("zero must be rejected");
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_search_config_applies_flags() {
        let config = search_config(Some(1500), Some(3), Some("test-agent".into()));
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.max_results, Some(3));
        assert_eq!(config.user_agent, "test-agent");

        let config = search_config(None, None, Some("  ".into()));
        assert_eq!(config.user_agent, SearchConfig::default().user_agent);
        assert!(config.timeout.is_none());
    }

    #[tokio::test]
    async fn test_short_query_fails_before_fetching() {
        let config = SearchConfig::default();
        let err = cmd_search(" a ", Scope::All, OutputFormat::Json, &config)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Consulta muito curta (at least 2 characters required)"
        );
    }

    #[test]
    fn test_text_groups_by_source() {
        let mut buf = Vec::new();
        write_text(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("[STJ]\n  Acórdão\n    REsp 1, \"tema\"\n"));
        assert!(text.contains("[TST]\n  Abrir resultados no site\n"));
        assert!(text.contains("TST: timeout"));
        assert!(text.contains("2 results, 1 errors in 42 ms"));
    }
}
