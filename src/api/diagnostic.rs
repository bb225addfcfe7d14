use axum::{
    extract::{rejection::QueryRejection, ConnectInfo, Query, State},
    http::{header, HeaderMap, Method, Uri},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::{btree_map::Entry, BTreeMap};
use std::net::SocketAddr;

use crate::{
    api::error::ApiError,
    load::{LoadKind, LoadResult},
    state::AppState,
};

/// Forwarding header set by the DigitalOcean load balancer
const DO_CONNECTING_IP: &str = "do-connecting-ip";
const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Deserialize)]
pub struct DiagnosticQuery {
    pub fib: Option<i64>,
}

/// Everything the receiver saw about one request
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub app: String,
    pub pod: String,
    pub load_test: LoadTestReport,
    pub client_ip: String,
    pub specific_headers: SpecificHeaders,
    pub all_headers: BTreeMap<String, String>,
    pub method: String,
    pub path: String,
    pub full_url: String,
}

#[derive(Debug, Serialize)]
pub struct LoadTestReport {
    #[serde(rename = "type")]
    pub kind: LoadKind,
    pub input: u64,
    pub result: Option<u64>,
    pub duration_seconds: f64,
}

impl From<&LoadResult> for LoadTestReport {
    fn from(result: &LoadResult) -> Self {
        Self {
            kind: result.kind,
            input: result.input,
            result: result.output,
            duration_seconds: round_centis(result.duration_seconds),
        }
    }
}

/// Headers that reveal which network path a request took
#[derive(Debug, Serialize)]
pub struct SpecificHeaders {
    #[serde(rename = "x-forwarded-for")]
    pub x_forwarded_for: Option<String>,
    #[serde(rename = "x-real-ip")]
    pub x_real_ip: Option<String>,
    #[serde(rename = "do-connecting-ip")]
    pub do_connecting_ip: Option<String>,
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
    pub host: Option<String>,
}

impl SpecificHeaders {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            x_forwarded_for: header_value(headers, X_FORWARDED_FOR),
            x_real_ip: header_value(headers, X_REAL_IP),
            do_connecting_ip: header_value(headers, DO_CONNECTING_IP),
            user_agent: header_value(headers, header::USER_AGENT.as_str()),
            host: header_value(headers, header::HOST.as_str()),
        }
    }
}

/// GET /diagnostic - Echo request metadata after generating load
///
/// `?fib=<n>` burns CPU computing fib(n); without it the request sleeps for
/// a random number of seconds.
pub async fn diagnostic(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<DiagnosticQuery>, QueryRejection>,
) -> Result<Json<DiagnosticReport>, ApiError> {
    let Query(query) = query?;

    let load = state.generator.generate(query.fib).await?;

    let client_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::debug!(%client_ip, %method, path = uri.path(), "diagnostic request served");

    let fallback_host = format!("{}:{}", state.cfg.server.host, state.cfg.server.port);

    Ok(Json(DiagnosticReport {
        app: state.cfg.app.name.clone(),
        pod: load.pod_identity.clone(),
        load_test: LoadTestReport::from(&load),
        client_ip,
        specific_headers: SpecificHeaders::from_headers(&headers),
        all_headers: collect_headers(&headers),
        method: method.to_string(),
        path: uri.path().to_string(),
        full_url: full_url(&uri, &headers, &fallback_host),
    }))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let mut values = headers.get_all(name).iter().peekable();
    values.peek()?;
    Some(
        values
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Lowercase name to value; repeated headers are comma-joined.
pub(crate) fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut all = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match all.entry(name.as_str().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                let joined: &mut String = slot.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
        }
    }
    all
}

pub(crate) fn full_url(uri: &Uri, headers: &HeaderMap, fallback_host: &str) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(fallback_host);
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("http://{host}{path_and_query}")
}

fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
