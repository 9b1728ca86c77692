use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use scraper::{ElementRef, Html, Node};
use tracing::{debug, info};
use url::Url;

use crate::config::Settings;
use crate::error::FetchError;

/// Subtrees that never carry edital content.
const SKIP_TAGS: &[&str] = &["script", "style", "nav", "footer"];

/// Elements that start and end a line of text.
const BLOCK_TAGS: &[&str] = &[
    "title", "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "td", "th",
    "article", "section", "main", "header", "blockquote", "pre", "figcaption", "dt", "dd",
    "table", "ul", "ol",
];

/// One retrieved page. Built once per request, never mutated.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub raw_html: String,
    pub plain_text: String,
}

pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(&settings.accept)?);
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.fetch_timeout())
            .build()?;
        Ok(Fetcher { client })
    }

    /// GET the page and reduce it to plain text. No retry.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = validate_url(url)?;

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let raw_html = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        let plain_text = html_to_text(&raw_html);
        info!(
            url,
            bytes = raw_html.len(),
            chars = plain_text.chars().count(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Fetched page"
        );

        Ok(FetchedPage {
            url: url.to_string(),
            raw_html,
            plain_text,
        })
    }
}

fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::UnsupportedScheme {
            url: url.to_string(),
            scheme: other.to_string(),
        }),
    }
}

/// Strip non-content elements and return one line per block element, with
/// inline markup joined into its surrounding text.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut buf = String::with_capacity(html.len() / 2);
    collect_text(&doc.root_element(), &mut buf);

    let lines: Vec<String> = buf
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    debug!(lines = lines.len(), "Collected text blocks");
    lines.join("\n")
}

fn collect_text(el: &ElementRef<'_>, buf: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(e) if SKIP_TAGS.contains(&e.name()) => {}
            Node::Element(e) => {
                let block = BLOCK_TAGS.contains(&e.name());
                if block {
                    buf.push('\n');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, buf);
                }
                if block {
                    buf.push('\n');
                }
            }
            _ => {}
        }
    }
}

// ── Tests ──
