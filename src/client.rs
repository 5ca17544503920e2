//! Upstream backlink sources.
//!
//! [`SeRankingClient`] talks to the SE Ranking raw backlinks endpoint;
//! [`FileSource`] replays a saved response from disk. Both are built once at
//! startup and handed to whatever runs the analysis.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{ApiToken, AuthScheme, Settings};
use crate::error::{Error, Result};
use crate::record::BacklinksPage;

pub const BACKLINKS_ENDPOINT: &str = "/v1/backlinks/raw";

/// Longest slice of an error body kept in [`Error::Status`].
const MAX_ERROR_BODY: usize = 500;

#[async_trait]
pub trait BacklinkSource: Send + Sync {
    /// Fetch up to `limit` backlinks for an already-normalized domain.
    async fn fetch(&self, domain: &str, limit: usize) -> Result<BacklinksPage>;
}

pub struct SeRankingClient {
    http: reqwest::Client,
    base_url: String,
    token: ApiToken,
    auth_scheme: AuthScheme,
}

impl SeRankingClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let token = settings.require_token()?.clone();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("backlink-checker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token,
            auth_scheme: settings.auth_scheme,
        })
    }

    /// The GET request for one domain, not yet sent.
    pub fn build_request(&self, domain: &str, limit: usize) -> Result<reqwest::Request> {
        let url = format!("{}{}", self.base_url, BACKLINKS_ENDPOINT);
        let limit = limit.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("target", domain),
            ("mode", "domain"),
            ("limit", limit.as_str()),
            ("output", "json"),
        ];

        let mut request = self.http.get(url);
        match self.auth_scheme {
            AuthScheme::Bearer => request = request.bearer_auth(self.token.expose()),
            AuthScheme::Query => query.push(("apiKey", self.token.expose())),
        }

        Ok(request.query(&query).build()?)
    }
}

#[async_trait]
impl BacklinkSource for SeRankingClient {
    async fn fetch(&self, domain: &str, limit: usize) -> Result<BacklinksPage> {
        let start_time = Instant::now();
        info!(action = "start", component = "backlinks_fetch", domain = domain, limit = limit, "Requesting backlinks");

        let request = self.build_request(domain, limit)?;
        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(action = "fetch", component = "backlinks_fetch", status = status.as_u16(), "Upstream returned an error status");
            return Err(Error::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let page = BacklinksPage::from_json(&body)?;
        info!(
            action = "complete",
            component = "backlinks_fetch",
            backlinks = page.backlinks.len(),
            has_more = page.has_more,
            duration_ms = start_time.elapsed().as_millis(),
            "Fetched backlinks"
        );
        Ok(page)
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Reads a previously saved API response instead of calling the API.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BacklinkSource for FileSource {
    async fn fetch(&self, domain: &str, limit: usize) -> Result<BacklinksPage> {
        info!(action = "load", component = "file_source", file_path = ?self.path, domain = domain, "Loading saved backlinks response");
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut page = BacklinksPage::from_json(&content)?;
        if page.backlinks.len() > limit {
            page.backlinks.truncate(limit);
            page.has_more = true;
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings(scheme: AuthScheme) -> Settings {
        Settings {
            api_token: Some(ApiToken::new("tok123")),
            base_url: "https://api.example.test/".to_string(),
            auth_scheme: scheme,
            ..Default::default()
        }
    }

    fn query_pairs(request: &reqwest::Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn client_requires_token() {
        let err = SeRankingClient::new(&Settings::default()).err().unwrap();
        assert!(matches!(err, Error::MissingToken));
    }

    #[test]
    fn bearer_request_shape() {
        let client = SeRankingClient::new(&settings(AuthScheme::Bearer)).unwrap();
        let request = client.build_request("example.com", 100).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/v1/backlinks/raw");
        assert_eq!(request.url().host_str(), Some("api.example.test"));
        let pairs = query_pairs(&request);
        assert!(pairs.contains(&("target".into(), "example.com".into())));
        assert!(pairs.contains(&("mode".into(), "domain".into())));
        assert!(pairs.contains(&("limit".into(), "100".into())));
        assert!(pairs.contains(&("output".into(), "json".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "apiKey"));
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer tok123"
        );
    }

    #[test]
    fn query_scheme_puts_token_in_url() {
        let client = SeRankingClient::new(&settings(AuthScheme::Query)).unwrap();
        let request = client.build_request("example.com", 5).unwrap();

        assert!(query_pairs(&request).contains(&("apiKey".into(), "tok123".into())));
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn long_error_bodies_are_cut() {
        let body = "x".repeat(2000);
        let cut = truncate_body(&body);
        assert_eq!(cut.len(), MAX_ERROR_BODY + 3);
        assert_eq!(truncate_body("  short "), "short");
    }

    #[tokio::test]
    async fn file_source_reads_saved_response() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"backlinks": [{{"url_from": "https://a.com/"}}, {{"url_from": "https://b.com/"}}]}}"#
        )
        .unwrap();

        let source = FileSource::new(file.path());
        let page = source.fetch("example.com", 100).await.unwrap();
        assert_eq!(page.backlinks.len(), 2);
        assert!(!page.has_more);

        let page = source.fetch("example.com", 1).await.unwrap();
        assert_eq!(page.backlinks.len(), 1);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn file_source_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = FileSource::new(file.path()).fetch("x.com", 10).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn file_source_reports_missing_file() {
        let err = FileSource::new("/no/such/backlinks.json")
            .fetch("x.com", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
