//! HTTP endpoint tests using axum-test
//!
//! IP lookups run against a small fake ipinfo server bound to a local port.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{HeaderName, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::geo::IpInfoClient;
use crate::{app, AppState};

const UPLOAD_LIMIT: usize = 50 * 1024 * 1024;

/// Fake ipinfo.io: `9.9.9.9` fails, everything else answers
fn fake_ipinfo() -> Router {
    async fn lookup(
        Path(ip): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Result<Json<Value>, StatusCode> {
        if ip == "9.9.9.9" {
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Ok(Json(json!({
            "ip": ip,
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "org": "AS15169 Google LLC",
            "timezone": "America/Los_Angeles",
            "token": query.get("token"),
        })))
    }

    async fn lookup_self() -> Json<Value> {
        Json(json!({
            "ip": "203.0.113.7",
            "country": "KR",
            "loc": "37.5660,126.9784",
        }))
    }

    Router::new()
        .route("/json", get(lookup_self))
        .route("/:ip/json", get(lookup))
}

async fn spawn_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, fake_ipinfo()).await.unwrap();
    });
    format!("http://{}", addr)
}

fn create_test_server(base_url: &str, token: Option<&str>) -> TestServer {
    let state = AppState {
        geo: Arc::new(IpInfoClient::new(base_url, token.map(str::to_string))),
    };
    TestServer::new(app(state, UPLOAD_LIMIT)).unwrap()
}

/// Server whose upstream is never reached
fn offline_server() -> TestServer {
    create_test_server("http://127.0.0.1:9", None)
}

/// Create a valid test PDF whose pages print `Page n`
fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {}", i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// `Page n` label of every page, in document order
fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let content = doc.get_page_content(*id).unwrap();
            let content = Content::decode(&content).unwrap();
            content
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|obj| obj.as_str().ok())
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .unwrap_or_default()
        })
        .collect()
}

fn pdf_part(pages: u32) -> Part {
    Part::bytes(create_test_pdf(pages))
        .file_name("doc.pdf")
        .mime_type("application/pdf")
}

fn forwarded_for(value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_static(value),
    )
}

#[tokio::test]
async fn test_health_returns_200() {
    let server = offline_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "toolverse-api");
}

// ============================================================
// IP lookups
// ============================================================

#[tokio::test]
async fn test_ip_proxy_missing_ip() {
    let server = offline_server();
    let response = server.get("/api/ip-proxy").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "error": "Missing IP" }));
}

#[tokio::test]
async fn test_ip_proxy_empty_ip_is_missing() {
    let server = offline_server();
    let response = server.get("/api/ip-proxy?ip=").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "error": "Missing IP" }));
}

#[tokio::test]
async fn test_ip_proxy_invalid_ip() {
    let server = offline_server();
    let response = server.get("/api/ip-proxy?ip=not-an-ip").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>(), json!({ "error": "Invalid IP" }));
}

#[tokio::test]
async fn test_ip_proxy_passes_upstream_json_through() {
    let base = spawn_upstream().await;
    let server = create_test_server(&base, Some("secret"));

    let response = server.get("/api/ip-proxy?ip=8.8.8.8").await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["ip"], "8.8.8.8");
    assert_eq!(json["org"], "AS15169 Google LLC");
    assert_eq!(json["token"], "secret");
}

#[tokio::test]
async fn test_ip_proxy_upstream_error() {
    let base = spawn_upstream().await;
    let server = create_test_server(&base, None);

    let response = server.get("/api/ip-proxy?ip=9.9.9.9").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to fetch data" })
    );
}

#[tokio::test]
async fn test_ip_proxy_unreachable_upstream() {
    let server = offline_server();
    let response = server.get("/api/ip-proxy?ip=1.1.1.1").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to fetch data" })
    );
}

#[tokio::test]
async fn test_my_ip_uses_first_forwarded_address() {
    let base = spawn_upstream().await;
    let server = create_test_server(&base, None);
    let (name, value) = forwarded_for("8.8.4.4, 10.0.0.1");

    let response = server.get("/api/my-ip").add_header(name, value).await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["ip"], "8.8.4.4");
    assert_eq!(json["flag"], "🇺🇸");
    assert_eq!(json["latitude"], 37.4056);
    assert_eq!(json["longitude"], -122.0775);
    assert_eq!(json["timezone"], "America/Los_Angeles");
}

#[tokio::test]
async fn test_my_ip_private_caller_looks_up_self() {
    let base = spawn_upstream().await;
    let server = create_test_server(&base, None);
    let (name, value) = forwarded_for("192.168.1.20");

    let response = server.get("/api/my-ip").add_header(name, value).await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["ip"], "203.0.113.7");
    assert_eq!(json["flag"], "🇰🇷");
}

#[tokio::test]
async fn test_my_ip_without_address_looks_up_self() {
    let base = spawn_upstream().await;
    let server = create_test_server(&base, None);

    let response = server.get("/api/my-ip").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["country"], "KR");
}

// ============================================================
// PDF reorder
// ============================================================

#[tokio::test]
async fn test_reorder_returns_pdf_in_requested_order() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(4))
        .add_text("pagesOrder", "[3, 1, 4, 2]");

    let response = server.post("/api/pdf/reorder").multipart(form).await;
    response.assert_status_ok();

    assert_eq!(response.header("content-type"), "application/pdf");
    let disposition = response.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"toolverse-reordered_"));
    assert!(disposition.ends_with(".pdf\""));

    assert_eq!(
        page_labels(response.as_bytes()),
        vec!["Page 3", "Page 1", "Page 4", "Page 2"]
    );
}

#[tokio::test]
async fn test_reorder_may_drop_pages() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(3))
        .add_text("pagesOrder", "[2]");

    let response = server.post("/api/pdf/reorder").multipart(form).await;
    response.assert_status_ok();
    assert_eq!(page_labels(response.as_bytes()), vec!["Page 2"]);
}

#[tokio::test]
async fn test_reorder_rejects_out_of_range_page() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(2))
        .add_text("pagesOrder", "[1, 5]");

    let response = server.post("/api/pdf/reorder").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_reorder_rejects_bad_order_json() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(2))
        .add_text("pagesOrder", "first, then second");

    let response = server.post("/api/pdf/reorder").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reorder_missing_order_field() {
    let server = offline_server();
    let form = MultipartForm::new().add_part("file", pdf_part(2));

    let response = server.post("/api/pdf/reorder").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Missing pagesOrder" })
    );
}

#[tokio::test]
async fn test_reorder_corrupt_pdf_is_unprocessable() {
    let server = offline_server();
    let part = Part::bytes(b"%PDF-1.7 this is not really a pdf".to_vec())
        .file_name("broken.pdf")
        .mime_type("application/pdf");
    let form = MultipartForm::new()
        .add_part("file", part)
        .add_text("pagesOrder", "[1]");

    let response = server.post("/api/pdf/reorder").multipart(form).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_reorder_rejects_non_pdf_upload() {
    let server = offline_server();
    let part = Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_type("text/plain");
    let form = MultipartForm::new()
        .add_part("file", part)
        .add_text("pagesOrder", "[1]");

    let response = server.post("/api/pdf/reorder").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================
// PDF split
// ============================================================

#[tokio::test]
async fn test_split_group_range_returns_single_pdf() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(5))
        .add_text(
            "selection",
            r#"{"mode":"range","expression":"1-2,4","output":"group"}"#,
        );

    let response = server.post("/api/pdf/split").multipart(form).await;
    response.assert_status_ok();

    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"merged.pdf\""
    );
    assert_eq!(
        page_labels(response.as_bytes()),
        vec!["Page 1", "Page 2", "Page 4"]
    );
}

#[tokio::test]
async fn test_split_all_returns_zip() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(3))
        .add_text("selection", r#"{"mode":"all"}"#);

    let response = server.post("/api/pdf/split").multipart(form).await;
    response.assert_status_ok();

    assert_eq!(response.header("content-type"), "application/zip");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"split-pages.zip\""
    );
    assert!(response.as_bytes().starts_with(b"PK"));
}

#[tokio::test]
async fn test_split_rejects_bad_selection() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(3))
        .add_text("selection", r#"{"mode":"sideways"}"#);

    let response = server.post("/api/pdf/split").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_split_empty_manual_selection() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(3))
        .add_text("selection", r#"{"mode":"manual","pages":[]}"#);

    let response = server.post("/api/pdf/split").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "No pages selected" })
    );
}

#[tokio::test]
async fn test_split_each_range_past_the_end_is_bad_request() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(5))
        .add_text(
            "selection",
            r#"{"mode":"range","expression":"7","output":"each"}"#,
        );

    let response = server.post("/api/pdf/split").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "No pages selected" })
    );
}

#[tokio::test]
async fn test_split_group_range_past_the_end_returns_empty_pdf() {
    let server = offline_server();
    let form = MultipartForm::new()
        .add_part("file", pdf_part(5))
        .add_text(
            "selection",
            r#"{"mode":"range","expression":"7","output":"group"}"#,
        );

    let response = server.post("/api/pdf/split").multipart(form).await;
    response.assert_status_ok();
    assert!(page_labels(response.as_bytes()).is_empty());
}
