//! HTTP bindings for the platform's REST API.
//!
//! [`ApiClient`] is a thin wrapper over `reqwest`: it turns typed query
//! parameters into query strings and drafts into JSON bodies, attaches the
//! bearer header on admin calls, and converts non-2xx responses into
//! [`ApiError`]. The per-resource calls live in the submodules.

pub mod articles;
pub mod auth;
pub mod podcasts;
pub mod public;
pub mod videos;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::types::{ContentStatus, Listing, Pagination};

pub use auth::Credentials;

/// `{success, data, pagination?, message?}` envelope wrapped around every response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool { true }

impl<T: DeserializeOwned> Envelope<T> {
    /// Parse a 2xx body; `success: false` is a rejection.
    pub(crate) fn decode(body: &str, op: &str) -> ApiResult<Self> {
        let env: Envelope<T> = serde_json::from_str(body)?;
        if !env.success {
            let message = env.message.unwrap_or_else(|| format!("{op} was not successful"));
            return Err(ApiError::Rejected { message });
        }
        Ok(env)
    }

    pub(crate) fn into_data(self, op: &str) -> ApiResult<T> {
        self.data.ok_or_else(|| ApiError::Rejected { message: format!("{op} returned no data") })
    }
}

/// An empty 2xx body counts as success.
fn check_unit(body: &str, op: &str) -> ApiResult<()> {
    if body.trim().is_empty() { return Ok(()); }
    Envelope::<serde_json::Value>::decode(body, op).map(|_| ())
}

/// Filters and paging accepted by the list endpoints. Unset fields are omitted
/// from the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editors_pick: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    pub fn limit(n: usize) -> Self {
        Self { limit: Some(u32::try_from(n).unwrap_or(u32::MAX)), ..Default::default() }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    credentials: Credentials,
    slow_warn: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("masthead/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base = config.api_url.clone();
        if base.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base.to_string()));
        }
        Ok(Self {
            http,
            base,
            credentials: Credentials::from_token(config.token.clone()),
            slow_warn: config.slow_warn,
        })
    }

    pub fn base_url(&self) -> &Url { &self.base }
    pub fn credentials(&self) -> &Credentials { &self.credentials }

    /// Append path segments to the base url, keeping any path the base already has.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str], authed: bool) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        let mut rb = self.http.request(method, url).header(reqwest::header::ACCEPT, "application/json");
        if authed { rb = self.credentials.apply(rb); }
        Ok(rb)
    }

    /// Send and decode a `{success, data}` response, keeping the pagination block.
    pub(crate) async fn send_envelope<T: DeserializeOwned>(&self, rb: RequestBuilder, op: &str) -> ApiResult<(Option<T>, Option<Pagination>)> {
        let body = self.send_raw(rb, op).await?;
        let env = Envelope::<T>::decode(&body, op)?;
        Ok((env.data, env.pagination))
    }

    pub(crate) async fn fetch_one<T: DeserializeOwned>(&self, rb: RequestBuilder, op: &str) -> ApiResult<T> {
        let body = self.send_raw(rb, op).await?;
        Envelope::<T>::decode(&body, op)?.into_data(op)
    }

    pub(crate) async fn fetch_list<T: DeserializeOwned>(&self, rb: RequestBuilder, op: &str) -> ApiResult<Listing<T>> {
        let (data, pagination) = self.send_envelope::<Vec<T>>(rb, op).await?;
        Ok(Listing { items: data.unwrap_or_default(), pagination })
    }

    /// Send a request whose response body is ignored beyond the success flag.
    pub(crate) async fn send_unit(&self, rb: RequestBuilder, op: &str) -> ApiResult<()> {
        let body = self.send_raw(rb, op).await?;
        check_unit(&body, op)
    }

    // Generic admin CRUD over `/<resource>`; the typed wrappers live in the submodules.

    pub(crate) async fn list_resource<T: DeserializeOwned>(&self, resource: &str, query: &ListQuery) -> ApiResult<Listing<T>> {
        let rb = self.request(Method::GET, &[resource], true)?.query(query);
        self.fetch_list(rb, &format!("list {resource}")).await
    }

    pub(crate) async fn get_resource<T: DeserializeOwned>(&self, resource: &str, id: &str) -> ApiResult<T> {
        let rb = self.request(Method::GET, &[resource, id], true)?;
        self.fetch_one(rb, &format!("get {resource}")).await
    }

    pub(crate) async fn create_resource<T: DeserializeOwned, B: Serialize + ?Sized>(&self, resource: &str, body: &B) -> ApiResult<T> {
        let rb = self.request(Method::POST, &[resource], true)?.json(body);
        self.fetch_one(rb, &format!("create {resource}")).await
    }

    pub(crate) async fn update_resource<T: DeserializeOwned, B: Serialize + ?Sized>(&self, resource: &str, id: &str, body: &B) -> ApiResult<T> {
        let rb = self.request(Method::PUT, &[resource, id], true)?.json(body);
        self.fetch_one(rb, &format!("update {resource}")).await
    }

    pub(crate) async fn delete_resource(&self, resource: &str, id: &str) -> ApiResult<()> {
        let rb = self.request(Method::DELETE, &[resource, id], true)?;
        self.send_unit(rb, &format!("delete {resource}")).await
    }

    async fn send_raw(&self, rb: RequestBuilder, op: &str) -> ApiResult<String> {
        let start = Instant::now();
        let resp = rb.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        self.warn_if_slow(start, op);
        tracing::debug!(op, status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "api call");
        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            tracing::warn!(op, status = status.as_u16(), error = %err, "api call failed");
            return Err(err);
        }
        Ok(body)
    }

    fn warn_if_slow(&self, start: Instant, op: &str) {
        let elapsed = start.elapsed();
        if elapsed > self.slow_warn {
            tracing::warn!(op, ?elapsed, "slow api call");
        }
    }
}
