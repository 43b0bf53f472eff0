//! The fixed table of tribunal search endpoints.
//!
//! Each [`CourtSource`] is plain data: an endpoint, the query parameter it
//! expects, an optional [`Extraction`] rule and per-source limits. The
//! table is built once at startup and shared read-only afterwards.

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::models::{ResultItem, Scope};
use crate::parse::Extraction;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Link text patterns, written against folded text.
const STJ_PATTERN: &str = r"processo|acord|decis|juris";
const TST_PATTERN: &str = r"acord|sumula|\boj\b|precedente|juris";
const GENERIC_PATTERN: &str = r"acord|decis|ement|juris|tema|repet";

/// One tribunal search endpoint.
#[derive(Debug, Clone)]
pub struct CourtSource {
    pub id: &'static str,
    pub name: &'static str,
    /// Search page, possibly carrying fixed query parameters already.
    endpoint: Url,
    /// Name of the parameter that receives the user's query.
    query_param: &'static str,
    pub parser: Option<Extraction>,
    pub max_results: usize,
    pub timeout: Duration,
}

impl CourtSource {
    /// Define a source with default limits and no parser.
    pub fn new(
        id: &'static str,
        name: &'static str,
        endpoint: &str,
        query_param: &'static str,
    ) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::RegistryError(format!("Invalid endpoint for {id}: {e}")))?;

        Ok(Self {
            id,
            name,
            endpoint,
            query_param,
            parser: None,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_parser(mut self, parser: Extraction) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the search URL for a query.
    ///
    /// The scope is accepted for every source; none of the built-in
    /// endpoints expose a category filter, so all scopes share one URL.
    ///
    /// The query is percent-encoded (spaces become `%20`) and appended after
    /// any fixed parameters the endpoint already carries.
    pub fn search_url(&self, query: &str, _scope: Scope) -> String {
        let pair = format!("{}={}", self.query_param, urlencoding::encode(query));
        let mut url = self.endpoint.clone();
        let full = match url.query() {
            Some(fixed) if !fixed.is_empty() => format!("{fixed}&{pair}"),
            _ => pair,
        };
        url.set_query(Some(&full));
        url.to_string()
    }

    /// Run this source's parser over a fetched page. Sources without a
    /// parser yield nothing.
    pub fn parse(&self, html: &str, base_url: &str) -> Vec<ResultItem> {
        match &self.parser {
            Some(parser) => parser.extract(html, base_url, self.id, self.name),
            None => Vec::new(),
        }
    }

    /// Fallback link for this source.
    pub fn fallback_item(&self, url: impl Into<String>) -> ResultItem {
        ResultItem::fallback(self.id, self.name, url)
    }

    pub fn host(&self) -> Option<&str> {
        self.endpoint.host_str()
    }
}

/// Ordered, immutable set of sources with unique ids.
#[derive(Debug, Clone)]
pub struct Registry {
    sources: Vec<CourtSource>,
}

impl Registry {
    /// Validate and wrap a source list. Order is preserved.
    pub fn new(sources: Vec<CourtSource>) -> Result<Self, AppError> {
        if sources.is_empty() {
            return Err(AppError::RegistryError("Registry has no sources".into()));
        }

        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.id) {
                return Err(AppError::RegistryError(format!(
                    "Duplicate source id: {}",
                    source.id
                )));
            }
            if source.max_results == 0 {
                return Err(AppError::RegistryError(format!(
                    "Source {} must allow at least one result",
                    source.id
                )));
            }
        }

        Ok(Self { sources })
    }

    /// The built-in tribunals: STF, STJ, TST, TRF1-6, three TRTs and three TJs.
    pub fn builtin() -> Result<Self, AppError> {
        let generic = || Extraction::anchors(GENERIC_PATTERN, "div, li, tr", "p, span, td");

        let sources = vec![
            CourtSource::new(
                "stf",
                "STF – Supremo Tribunal Federal",
                "https://jurisprudencia.stf.jus.br/pages/search?sinonimo=false&plural=false&stemmer=true",
                "busca",
            )?
            .with_parser(Extraction::listing("div.resultado, div.card, li", "p, span, small")?)
            .with_max_results(6),
            CourtSource::new(
                "stj",
                "STJ – Superior Tribunal de Justiça",
                "https://scon.stj.jus.br/SCON/decisoes/toc.jsp",
                "livre",
            )?
            .with_parser(Extraction::anchors(STJ_PATTERN, "tr, li, div", "td, p, span")?)
            .with_max_results(6),
            CourtSource::new(
                "tst",
                "TST – Tribunal Superior do Trabalho",
                "https://jurisprudencia.tst.jus.br/busca-unificada",
                "q",
            )?
            .with_parser(Extraction::anchors(TST_PATTERN, "div, li", "p, span")?)
            .with_max_results(6),
            CourtSource::new(
                "trf1",
                "TRF1 – Tribunal Regional Federal da 1ª Região",
                "https://portal.trf1.jus.br/portaltrf1/pesquisar.htm",
                "query",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trf2",
                "TRF2 – Tribunal Regional Federal da 2ª Região",
                "https://www10.trf2.jus.br/portal/pesquisa/",
                "s",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trf3",
                "TRF3 – Tribunal Regional Federal da 3ª Região",
                "https://www.trf3.jus.br/pfma/public/pesquisa",
                "q",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trf4",
                "TRF4 – Tribunal Regional Federal da 4ª Região",
                "https://www.trf4.jus.br/busca/apresentar.php",
                "q",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trf5",
                "TRF5 – Tribunal Regional Federal da 5ª Região",
                "https://www.trf5.jus.br/busca/",
                "q",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trf6",
                "TRF6 – Tribunal Regional Federal da 6ª Região",
                "https://www.trf6.jus.br/portal/pesquisar",
                "q",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trt2",
                "TRT-2 – Tribunal Regional do Trabalho da 2ª Região",
                "https://www.trt2.jus.br/busca",
                "q",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trt15",
                "TRT-15 – Tribunal Regional do Trabalho da 15ª Região",
                "https://www.trt15.jus.br/busca",
                "q",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "trt3",
                "TRT-3 – Tribunal Regional do Trabalho da 3ª Região",
                "https://portal.trt3.jus.br/internet/Biblioteca/pesquisa",
                "SearchableText",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "tjsp",
                "TJSP – Tribunal de Justiça de São Paulo",
                "https://esaj.tjsp.jus.br/cjsg/resultadoCompleta.do",
                "dados.busca",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "tjrj",
                "TJRJ – Tribunal de Justiça do Rio de Janeiro",
                "https://www.tjrj.jus.br/consultas/jurisprudencia",
                "texto",
            )?
            .with_parser(generic()?),
            CourtSource::new(
                "tjmg",
                "TJMG – Tribunal de Justiça de Minas Gerais",
                "https://www.tjmg.jus.br/portal/jurisprudencia/pesquisa-ementario.htm",
                "palavraChave",
            )?
            .with_parser(generic()?),
        ];

        Self::new(sources)
    }

    /// Override every source's deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        for source in &mut self.sources {
            source.timeout = timeout;
        }
        self
    }

    /// Override every source's result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        for source in &mut self.sources {
            source.max_results = max_results.max(1);
        }
        self
    }

    pub fn sources(&self) -> &[CourtSource] {
        &self.sources
    }

    pub fn get(&self, id: &str) -> Option<&CourtSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
