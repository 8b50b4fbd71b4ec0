//! Response-shape adapter for the backtest backend.
//!
//! Several backend versions are in the field and they disagree on payload
//! framing. Every accepted shape is enumerated here so the orchestration
//! code never sniffs responses itself:
//!
//! - Any payload may arrive bare or wrapped in a `{"data": ...}` envelope
//!   (newer backends wrap everything in `{code, message, data}`).
//! - Rename map: flat `{"old": "new"}` or keyed `{"map": {"old": "new"}}`.
//! - Job listing: bare `[...]`, paged `{"jobs": [...], "total": n}`, or
//!   `{"items": [...]}`.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::types::Job;

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MapShape {
    Keyed { map: BTreeMap<String, String> },
    Flat(BTreeMap<String, String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobsShape {
    Paged {
        jobs: Vec<Job>,
        #[serde(default)]
        #[allow(dead_code)]
        total: Option<u64>,
    },
    Items {
        items: Vec<Job>,
    },
    Bare(Vec<Job>),
}

/// Parse a rename-map response body into a raw (un-normalized) map.
pub(crate) fn parse_rename_map(body: &str) -> Result<BTreeMap<String, String>> {
    let envelope: Envelope<MapShape> = serde_json::from_str(body)?;
    Ok(match envelope.into_inner() {
        MapShape::Keyed { map } => map,
        MapShape::Flat(map) => map,
    })
}

/// Parse one page of a job-listing response body.
pub(crate) fn parse_job_page(body: &str) -> Result<Vec<Job>> {
    let envelope: Envelope<JobsShape> = serde_json::from_str(body)?;
    Ok(match envelope.into_inner() {
        JobsShape::Paged { jobs, .. } => jobs,
        JobsShape::Items { items } => items,
        JobsShape::Bare(jobs) => jobs,
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorInner>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorInner {
    #[serde(default)]
    message: Option<String>,
}

/// Pull a human-readable detail string out of a non-success response body.
///
/// Accepts `{"error": {"message": ...}}`, `{"message": ...}`, or raw text.
pub(crate) fn error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let message = parsed
            .error
            .and_then(|e| e.message)
            .or(parsed.message)
            .unwrap_or_default();
        let message = message.trim();
        if !message.is_empty() {
            return message.to_string();
        }
    }
    let text = body.trim();
    if text.is_empty() {
        "(empty response body)".to_string()
    } else {
        text.to_string()
    }
}
