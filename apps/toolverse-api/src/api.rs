//! API handlers for the Toolverse server
//!
//! Provides REST endpoints for:
//! - IP lookups proxied to ipinfo.io
//! - Server-assisted page reordering
//! - Server-side split/extract

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use toolverse_core::{
    assemble, load_document, package, parse_pages_order, Download, FileInput, NoProgress,
    PageSelection, PdfToolError, SourceDocument, SPLIT_BUNDLE_NAME,
};

use crate::error::ApiError;
use crate::geo::{is_public, IpInfo, IpSummary};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "toolverse-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct IpQuery {
    pub ip: Option<String>,
}

/// Handler: GET /api/ip-proxy?ip=...
///
/// Passes the upstream JSON through untouched.
pub async fn handle_ip_proxy(
    State(state): State<AppState>,
    Query(query): Query<IpQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = query
        .ip
        .as_deref()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .ok_or(ApiError::MissingIp)?;
    let ip: IpAddr = raw.parse().map_err(|_| ApiError::InvalidIp)?;

    let body = state.geo.lookup::<serde_json::Value>(Some(ip)).await?;
    Ok(Json(body))
}

/// Handler: GET /api/my-ip
pub async fn handle_my_ip(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Json<IpSummary>, ApiError> {
    let caller = client_ip(&headers, peer.map(|ConnectInfo(addr)| addr.ip()));
    let target = caller.filter(is_public);
    debug!(caller = ?caller, "my-ip lookup");

    let info = state.geo.lookup::<IpInfo>(target).await?;
    Ok(Json(IpSummary::from(info)))
}

/// First `X-Forwarded-For` entry, else the socket peer
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .or(peer)
}

/// Handler: POST /api/pdf/reorder
///
/// Multipart fields: `file` and `pagesOrder`, a JSON array of 1-based pages.
pub async fn handle_reorder(multipart: Multipart) -> Result<Response, ApiError> {
    let (input, pages_order) = read_upload(multipart, "pagesOrder").await?;
    info!(file = %input.name, size = input.bytes.len(), "reorder request");

    let download = run_blocking(move || {
        let source = load_document(input, &mut NoProgress)?;
        let order = parse_pages_order(&pages_order, source.page_count())?;
        build_download(&source, &PageSelection::Reorder { order })
    })
    .await?;

    Ok(download_response(download))
}

/// Handler: POST /api/pdf/split
///
/// Multipart fields: `file` and `selection`, a JSON page selection such as
/// `{"mode":"range","expression":"1-3","output":"each"}`.
pub async fn handle_split(multipart: Multipart) -> Result<Response, ApiError> {
    let (input, selection) = read_upload(multipart, "selection").await?;
    let selection: PageSelection = serde_json::from_str(&selection)
        .map_err(|e| ApiError::BadRequest(format!("Invalid selection: {}", e)))?;
    info!(file = %input.name, size = input.bytes.len(), "split request");

    let download = run_blocking(move || {
        let source = load_document(input, &mut NoProgress)?;
        build_download(&source, &selection)
    })
    .await?;

    Ok(download_response(download))
}

/// Pull the `file` part and one text part out of a multipart body
async fn read_upload(
    mut multipart: Multipart,
    text_field: &str,
) -> Result<(FileInput, String), ApiError> {
    let mut file = None;
    let mut text = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("document.pdf").to_string();
                let mime = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                file = Some(FileInput::new(file_name, mime.as_deref(), bytes.to_vec()));
            }
            Some(name) if name == text_field => text = Some(field.text().await?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Missing file".to_string()))?;
    let text = text.ok_or_else(|| ApiError::BadRequest(format!("Missing {}", text_field)))?;
    Ok((file, text))
}

fn build_download(
    source: &SourceDocument,
    selection: &PageSelection,
) -> Result<Download, PdfToolError> {
    let units = selection.work_units(source.page_count())?;
    let artifacts = assemble(source, &units, &mut NoProgress)?;
    package(artifacts, SPLIT_BUNDLE_NAME)
}

/// PDF work is CPU bound; keep it off the async workers
async fn run_blocking<F>(work: F) -> Result<Download, ApiError>
where
    F: FnOnce() -> Result<Download, PdfToolError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

fn download_response(download: Download) -> Response {
    debug!(file = %download.file_name, size = download.bytes.len(), "sending download");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, download.mime),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.file_name),
            ),
        ],
        download.bytes,
    )
        .into_response()
}
