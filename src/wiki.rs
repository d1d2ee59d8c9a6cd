//! Fetching and decoding the wiki's event query.
//!
//! The wiki exposes events through a Semantic MediaWiki `Special:Ask` query
//! that returns JSON. The URL below asks for all events from the cutoff date
//! onward and returns their name, start, end, status and location.

use crate::error::ExportResult;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Pre-built query: category Event, Start >= cutoff, fields
/// Start/End/Status/EventLocation, empty mainlabel, limit 50, sorted
/// ascending by Start, JSON output.
pub const DEFAULT_QUERY_URL: &str = "https://bitlair.nl/Special:Ask/-5B-5BCategory:Event-5D-5D-20-5B-5BStart::%E2%89%A519-20August-202024-5D-5D/-3FStart/-3FEnd/-3FStatus/-3FEvent-20location/mainlabel%3D/limit%3D50/order%3DASC/sort%3DStart/prettyprint%3Dtrue/format%3Djson";

/// Top-level query response: a mapping from wiki page path to its record.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiResponse {
    #[serde(default)]
    pub results: BTreeMap<String, WikiPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikiPage {
    pub fullurl: String,
    pub printouts: Printouts,
}

/// The typed attribute values requested by the query. Each is a sequence;
/// an attribute missing from a page comes back absent or empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Printouts {
    #[serde(rename = "Start", default)]
    pub start: Vec<WikiTimestamp>,
    #[serde(rename = "End", default)]
    pub end: Vec<WikiTimestamp>,
    #[serde(rename = "Status", default)]
    pub status: Vec<WikiText>,
    // Older wiki versions exposed this attribute as "Event location"
    #[serde(rename = "EventLocation", alias = "Event location", default)]
    pub location: Vec<WikiText>,
}

/// A temporal attribute value. The timestamp is seconds since epoch in the
/// wiki's local time, not UTC.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiTimestamp {
    #[serde(deserialize_with = "string_or_int")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikiText {
    pub fulltext: String,
}

/// SMW serializes timestamps as strings; accept integers too.
fn string_or_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Fetch the event query and parse the body as JSON.
///
/// Network failures, non-2xx responses and unparseable bodies are all fatal;
/// there is no retry.
pub async fn fetch(client: &reqwest::Client, url: &str) -> ExportResult<WikiResponse> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let response = serde_json::from_str(strip_leading_garbage(&body))?;
    Ok(response)
}

/// The wiki used to inject one spurious script-tag line before the JSON
/// payload. Strip a single leading non-JSON line if present.
fn strip_leading_garbage(body: &str) -> &str {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match trimmed.split_once('\n') {
        Some((_garbage, rest)) => rest.trim_start(),
        None => trimmed,
    }
}
