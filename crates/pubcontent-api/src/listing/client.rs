//! `ContentListingClient` - `PublishedContent` listing API client implementation.

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::api::ContentListingApi;
use super::error::ListingError;
use super::path::ListingPath;
use super::types::{AvailablePath, DirectoryListing, FileEntry, RawAvailablePath, RawListing};
use super::xml::{XmlValue, parse_xml};

/// Listing endpoint path.
const LIST_PATH: &str = "/PublishedContent/List";

/// Default User-Agent when the builder creates the HTTP client.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Base used to resolve relative listing URLs when extracting `root`.
const ROOT_PARSE_BASE: &str = "https://example.org";

/// `PublishedContent` listing API client.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct ContentListingClient {
    /// HTTP client (reqwest, connection pooling).
    http_client: Client,
    /// Base URL (`https://<hostname>`).
    base_url: Url,
}

/// Builder for `ContentListingClient`.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ContentListingClientBuilder {
    hostname: Option<String>,
    base_url: Option<Url>,
    http_client: Option<Client>,
    user_agent: Option<String>,
}

impl ContentListingClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            hostname: None,
            base_url: None,
            http_client: None,
            user_agent: None,
        }
    }

    /// Sets the host to query; requests go to `https://<hostname>`.
    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Overrides the base URL (for wiremock in tests). Takes precedence
    /// over `hostname`.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Uses a caller-configured HTTP client (keep-alive, TLS, proxies).
    #[must_use]
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the User-Agent. Ignored when `http_client` is supplied.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - Neither `hostname` nor `base_url` is set.
    /// - `hostname` does not form a valid URL.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<ContentListingClient> {
        let base_url = match (self.base_url, self.hostname) {
            (Some(url), _) => url,
            (None, Some(hostname)) => Url::parse(&format!("https://{hostname}"))
                .with_context(|| format!("invalid hostname: {hostname}"))?,
            (None, None) => bail!("hostname is required"),
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
                .gzip(true)
                .build()
                .context("failed to build HTTP client")?,
        };

        Ok(ContentListingClient {
            http_client,
            base_url,
        })
    }
}

impl ContentListingClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> ContentListingClientBuilder {
        ContentListingClientBuilder::new()
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends a GET request and returns the body of a 2xx response.
    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let mut request = self.http_client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let request = request
            .build()
            .with_context(|| format!("failed to build request: {path}"))?;

        tracing::debug!(url = %request.url(), "PublishedContent request");

        let response = self
            .http_client
            .execute(request)
            .await
            .with_context(|| format!("request failed: {path}"))?;
        let status = response.status();
        let response = response
            .error_for_status()
            .with_context(|| format!("unexpected status {status}: {path}"))?;

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;

        tracing::debug!(%status, body_len = body.len(), "Response body received");
        Ok(body)
    }

    /// Like [`ContentListingApi::get_items_for_path`], but takes the path as
    /// untyped JSON (a string or an array of strings).
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::InvalidPathType`] without sending any request
    /// if `path` has another shape, otherwise the errors of
    /// `get_items_for_path`.
    pub async fn get_items_for_json_path(
        &self,
        root: &str,
        path: &Value,
    ) -> Result<DirectoryListing, ListingError> {
        let path = ListingPath::try_from(path)?;
        self.get_items_for_path(root, &path).await
    }

    /// Fetches the file at `full_web_path` and parses it as XML.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::PublishedFile`] if the request fails, or
    /// [`ListingError::Xml`] if the body is not well-formed XML.
    #[instrument(skip(self))]
    pub async fn fetch_published_file(&self, full_web_path: &str) -> Result<XmlValue, ListingError> {
        let body = self.get_text(full_web_path, &[]).await.map_err(|e| {
            tracing::warn!(error = ?e, "Published file request failed");
            ListingError::PublishedFile {
                full_web_path: String::from(full_web_path),
            }
        })?;

        parse_xml(&body).map_err(|e| {
            tracing::warn!(error = %e, body_len = body.len(), "Published file is not valid XML");
            ListingError::Xml(e)
        })
    }
}

/// Extracts the `root` query parameter from a (usually relative) listing URL.
pub fn extract_root(url: &str) -> Option<String> {
    let base = Url::parse(ROOT_PARSE_BASE).ok()?;
    let parsed = base.join(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key.as_ref() == "root")
        .map(|(_, value)| value.into_owned())
}

impl ContentListingApi for ContentListingClient {
    #[instrument(skip_all)]
    async fn list_available_paths(&self) -> Result<Vec<AvailablePath>, ListingError> {
        let body = self
            .get_text(LIST_PATH, &[("fmt", "json")])
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, "Available paths request failed");
                ListingError::AvailablePaths
            })?;

        let raw: Vec<RawAvailablePath> =
            serde_json::from_str(&body).map_err(|source| ListingError::Json {
                operation: "available paths",
                source,
            })?;

        Ok(raw
            .into_iter()
            .map(|entry| {
                let mut extra = entry.extra;
                extra.remove("Root");
                AvailablePath {
                    root: extract_root(&entry.url),
                    display_name: entry.display_name,
                    url: entry.url,
                    extra,
                }
            })
            .collect())
    }

    #[instrument(skip_all, fields(root = %root, path = %path))]
    async fn get_items_for_path(
        &self,
        root: &str,
        path: &ListingPath,
    ) -> Result<DirectoryListing, ListingError> {
        let path_value = path.to_query_value();
        let query = [("root", root), ("path", path_value.as_str()), ("fmt", "json")];

        let body = self.get_text(LIST_PATH, &query).await.map_err(|e| {
            tracing::warn!(error = ?e, "Directory listing request failed");
            ListingError::ItemsForPath {
                path: path_value,
                root: String::from(root),
            }
        })?;

        let raw = RawListing::from_body(&body).map_err(|source| ListingError::Json {
            operation: "directory listing",
            source,
        })?;

        Ok(raw.into_listing(path))
    }

    #[instrument(skip_all)]
    async fn get_published_file(&self, entry: &FileEntry) -> Result<XmlValue, ListingError> {
        self.fetch_published_file(&entry.full_web_path).await
    }
}
