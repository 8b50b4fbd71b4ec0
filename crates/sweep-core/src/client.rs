//! Backend API surface: the [`BacktestApi`] trait and its reqwest
//! implementation.
//!
//! Status-code policy lives here so the orchestration layers only ever see
//! the crate's error taxonomy:
//!
//! | call | 404 | 405/501 | 409 |
//! |---|---|---|---|
//! | job listing | `Ok(None)` | `UnsupportedEndpoint` | — |
//! | job delete | `Ok(())` (already gone) | `UnsupportedEndpoint` | — |
//! | strategy delete | `StrategyNotFound` | `UnsupportedEndpoint` | `Conflict` |
//!
//! Everything else non-success maps to `UnexpectedStatus` with the detail
//! string pulled from the response body. No timeout is configured; the
//! transport's own behavior applies.

use reqwest::{Method, StatusCode, Url};

use crate::error::{Result, SweepError};
use crate::payload;
use crate::rename_map::RenameMap;
use crate::types::Job;

pub const EP_RENAME_MAP: &str = "GET /api/backtest/strategy-renames";
pub const EP_LIST_JOBS: &str = "GET /api/backtest/strategies/{id}/jobs";
pub const EP_DELETE_JOB: &str = "DELETE /api/backtest/jobs/{id}";
pub const EP_DELETE_STRATEGY: &str = "DELETE /api/backtest/strategies/{id}";

/// Remote calls the cascade subsystem depends on.
///
/// Implemented by [`ApiClient`] for the real backend; tests substitute an
/// in-memory fake.
#[allow(async_fn_in_trait)]
pub trait BacktestApi {
    /// Fetch the authoritative rename map. The returned map is raw; the
    /// store normalizes it before use.
    async fn fetch_rename_map(&self) -> Result<RenameMap>;

    /// Fetch one page of jobs for `strategy_id`. `Ok(None)` means the
    /// listing itself was not found upstream.
    async fn list_jobs(
        &self,
        strategy_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Option<Vec<Job>>>;

    /// Delete one job. Idempotent from the caller's perspective: an
    /// already-absent job is success.
    async fn delete_job(&self, job_id: &str) -> Result<()>;

    /// Delete the strategy record itself. Not idempotent: a missing
    /// strategy surfaces as [`SweepError::StrategyNotFound`].
    async fn delete_strategy(&self, strategy_id: &str) -> Result<()>;
}

/// reqwest-backed [`BacktestApi`] implementation.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl ApiClient {
    /// Build a client for the service at `base_url` (scheme + host, with
    /// an optional path prefix).
    pub fn new(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| SweepError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(SweepError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(ApiClient {
            http: reqwest::Client::new(),
            base_url: url,
            bearer_token: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Build `<base>/api/backtest/<segments...>` with percent-encoded
    /// segments, so ids containing `/` or spaces stay single segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("base url validated at construction")
            .pop_if_empty()
            .extend(["api", "backtest"])
            .extend(segments);
        url
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn unexpected(endpoint: &'static str, resp: reqwest::Response) -> SweepError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        SweepError::UnexpectedStatus {
            endpoint,
            status,
            detail: payload::error_detail(&body),
        }
    }
}

fn is_unsupported(status: StatusCode) -> bool {
    status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED
}

impl BacktestApi for ApiClient {
    async fn fetch_rename_map(&self) -> Result<RenameMap> {
        let url = self.endpoint(&["strategy-renames"]);
        let resp = self.request(Method::GET, url).send().await?;
        if !resp.status().is_success() {
            return Err(Self::unexpected(EP_RENAME_MAP, resp).await);
        }
        let body = resp.text().await?;
        payload::parse_rename_map(&body)
    }

    async fn list_jobs(
        &self,
        strategy_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Option<Vec<Job>>> {
        let url = self.endpoint(&["strategies", strategy_id, "jobs"]);
        let resp = self
            .request(Method::GET, url)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if is_unsupported(status) {
            return Err(SweepError::UnsupportedEndpoint {
                endpoint: EP_LIST_JOBS,
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(Self::unexpected(EP_LIST_JOBS, resp).await);
        }
        let body = resp.text().await?;
        Ok(Some(payload::parse_job_page(&body)?))
    }

    async fn delete_job(&self, job_id: &str) -> Result<()> {
        let url = self.endpoint(&["jobs", job_id]);
        let resp = self.request(Method::DELETE, url).send().await?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if is_unsupported(status) {
            return Err(SweepError::UnsupportedEndpoint {
                endpoint: EP_DELETE_JOB,
                status: status.as_u16(),
            });
        }
        Err(Self::unexpected(EP_DELETE_JOB, resp).await)
    }

    async fn delete_strategy(&self, strategy_id: &str) -> Result<()> {
        let url = self.endpoint(&["strategies", strategy_id]);
        let resp = self.request(Method::DELETE, url).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        match status {
            StatusCode::NOT_FOUND => Err(SweepError::StrategyNotFound(strategy_id.to_string())),
            StatusCode::CONFLICT => {
                let body = resp.text().await.unwrap_or_default();
                Err(SweepError::Conflict {
                    strategy_id: strategy_id.to_string(),
                    detail: payload::error_detail(&body),
                })
            }
            s if is_unsupported(s) => Err(SweepError::UnsupportedEndpoint {
                endpoint: EP_DELETE_STRATEGY,
                status: s.as_u16(),
            }),
            _ => Err(Self::unexpected(EP_DELETE_STRATEGY, resp).await),
        }
    }
}
