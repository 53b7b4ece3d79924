// Hand-crafted async HTTP client for the report platform REST API.
//
// Base path: /api/ (the presign endpoint lives outside it, at /reports/)
// Auth: optional Bearer token from /api/auth/login

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

/// Default server address used when no profile overrides it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the report platform.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL (e.g. `http://localhost:8080`) and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized server address (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::ClientSetup(format!("not a base URL: {raw}")));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    ///
    /// `endpoint(&["api", "subscriptions", id, "approve"])`
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::ClientSetup(format!("not a base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Endpoint under the `/api/` prefix.
    pub(crate) fn api(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut all = Vec::with_capacity(segments.len() + 1);
        all.push("api");
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }

    /// Endpoint with a query string appended.
    pub fn endpoint_with_query(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_bytes(&self, url: Url) -> Result<Bytes, Error> {
        debug!("GET {url} (binary)");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await?)
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn post_bytes<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Bytes, Error> {
        debug!("POST {url} (binary)");

        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await?)
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// POST a raw `text/plain` body (the member endpoints take a bare email).
    pub(crate) async fn post_text<T: DeserializeOwned>(
        &self,
        url: Url,
        body: String,
    ) -> Result<T, Error> {
        debug!("POST {url} (text)");

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put_no_body<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn delete_with_response<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<T, Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete_with_body<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// Turn a non-success response into [`Error::Api`].
    ///
    /// The server answers most failures with a plain-text message body;
    /// auth endpoints and favorites use JSON `{message}` / `{error}`.
    pub(crate) async fn parse_error(
        &self,
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let trimmed = raw.trim();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(trimmed) {
            return Error::Api {
                status: status.as_u16(),
                message: err.message.filter(|m| !m.trim().is_empty()),
                code: err.error,
            };
        }

        Error::Api {
            status: status.as_u16(),
            message: if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            },
            code: None,
        }
    }
}
