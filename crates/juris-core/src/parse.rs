//! Best-effort extraction of result links from tribunal search pages.
//!
//! Every rule here is a heuristic over arbitrary markup: unknown or broken
//! pages simply yield no items. Nothing in this module returns an error
//! once a rule has been built.

use std::collections::HashSet;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::AppError;
use crate::models::ResultItem;

/// How a source's result page is turned into [`ResultItem`]s.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// Walk result containers and take the first link of each.
    Listing(ListingRule),
    /// Keep every link whose text matches a keyword pattern.
    Anchors(AnchorRule),
}

#[derive(Debug, Clone)]
pub struct ListingRule {
    containers: Selector,
    link: Selector,
    snippet: Selector,
}

#[derive(Debug, Clone)]
pub struct AnchorRule {
    /// Matched against lower-cased, diacritic-folded link text.
    pattern: Regex,
    link: Selector,
    /// Closest ancestor the snippet is taken from.
    context: Selector,
    snippet: Selector,
}

impl Extraction {
    /// Container-based rule: each container contributes its first link.
    pub fn listing(containers: &str, snippet: &str) -> Result<Self, AppError> {
        Ok(Extraction::Listing(ListingRule {
            containers: selector(containers)?,
            link: selector("a")?,
            snippet: selector(snippet)?,
        }))
    }

    /// Keyword rule over all links in the document.
    ///
    /// `pattern` is written against folded text (`acord`, not `acórd`).
    pub fn anchors(pattern: &str, context: &str, snippet: &str) -> Result<Self, AppError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| AppError::ParseError(format!("Invalid link pattern '{pattern}': {e}")))?;

        Ok(Extraction::Anchors(AnchorRule {
            pattern,
            link: selector("a[href]")?,
            context: selector(context)?,
            snippet: selector(snippet)?,
        }))
    }

    /// Extract deduplicated items in document order.
    ///
    /// `base_url` is the URL the page was fetched from; relative links are
    /// resolved against it.
    pub fn extract(
        &self,
        html: &str,
        base_url: &str,
        source_id: &str,
        source_name: &str,
    ) -> Vec<ResultItem> {
        let Ok(base) = Url::parse(base_url) else {
            tracing::debug!(%base_url, "Unparseable base URL, skipping extraction");
            return Vec::new();
        };

        let document = Html::parse_document(html);
        let found = match self {
            Extraction::Listing(rule) => rule.candidates(&document, &base),
            Extraction::Anchors(rule) => rule.candidates(&document, &base),
        };

        let items = found
            .into_iter()
            .map(|c| ResultItem {
                title: c.title,
                snippet: c.snippet,
                url: c.url,
                source_id: source_id.to_string(),
                source_name: source_name.to_string(),
            })
            .collect();

        dedupe(items)
    }
}

struct Candidate {
    title: String,
    snippet: String,
    url: String,
}

impl ListingRule {
    fn candidates(&self, document: &Html, base: &Url) -> Vec<Candidate> {
        let mut out = Vec::new();
        for container in document.select(&self.containers) {
            let Some(link) = container.select(&self.link).next() else {
                continue;
            };
            let title = element_text(&link);
            let href = link.value().attr("href").unwrap_or("").trim();
            if title.is_empty() || href.is_empty() {
                continue;
            }
            let Some(url) = resolve_link(base, href) else {
                continue;
            };
            out.push(Candidate {
                title,
                snippet: first_text(&container, &self.snippet),
                url,
            });
        }
        out
    }
}

impl AnchorRule {
    fn candidates(&self, document: &Html, base: &Url) -> Vec<Candidate> {
        let mut out = Vec::new();
        for link in document.select(&self.link) {
            let title = element_text(&link);
            let href = link.value().attr("href").unwrap_or("").trim();
            if title.is_empty() || href.is_empty() {
                continue;
            }
            if !self.pattern.is_match(&fold(&title)) {
                continue;
            }
            let Some(url) = resolve_link(base, href) else {
                continue;
            };

            let snippet = link
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| self.context.matches(el))
                .map(|ctx| first_text(&ctx, &self.snippet))
                .unwrap_or_default();

            out.push(Candidate {
                title,
                snippet,
                url,
            });
        }
        out
    }
}

/// Drop repeated `(source_id, url)` pairs, keeping the first occurrence.
pub fn dedupe(items: Vec<ResultItem>) -> Vec<ResultItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert((item.source_id.clone(), item.url.clone())))
        .collect()
}

/// Lower-case and strip the diacritics found in Portuguese text.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Resolve `href` against the page URL. Only web links survive.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

/// Visible text of an element with whitespace collapsed.
fn element_text(element: &ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Text of the first descendant matching `selector` that has any.
fn first_text(scope: &ElementRef, selector: &Selector) -> String {
    scope
        .select(selector)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css)
        .map_err(|e| AppError::ParseError(format!("Invalid CSS selector '{css}': {e}")))
}
