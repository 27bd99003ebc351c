#![cfg(test)]

use actix_web::{
    http::{header, StatusCode},
    test, web, App,
};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::modules::share::{
    model::ShareConfig, repository::ShareRepository, route, ShareRepositoryMemory, ShareService,
};

const BOUNDARY: &str = "----dropcode-test-boundary";

struct Harness {
    dir: tempfile::TempDir,
    repo: Arc<ShareRepositoryMemory>,
    service: ShareService,
}

impl Harness {
    fn new(tweak: impl FnOnce(&mut ShareConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ShareConfig {
            upload_dir: dir.path().join("uploads"),
            qr_dir: dir.path().join("static/qr"),
            ..Default::default()
        };
        tweak(&mut config);
        let repo = Arc::new(ShareRepositoryMemory::new());
        let service = ShareService::with_dependencies(repo.clone(), config);
        Harness { dir, repo, service }
    }

    fn files_in(&self, sub: &str) -> usize {
        std::fs::read_dir(self.dir.path().join(sub)).map(|it| it.count()).unwrap_or(0)
    }
}

macro_rules! init_app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($harness.service.clone()))
                .configure(route::configure),
        )
        .await
    };
}

/// (field name, filename, content)
fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[(&str, &str, &[u8])]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/upload")
        .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")))
        .set_payload(multipart_body(parts))
}

fn header_value(resp: &actix_web::dev::ServiceResponse, name: header::HeaderName) -> String {
    resp.headers().get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string()
}

#[actix_web::test]
async fn test_index_renders_landing_page() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let html = std::str::from_utf8(&body).unwrap();
    assert!(html.contains("<form id=\"upload-form\">"));
    assert!(html.contains("Up to 100MB in total"));
    assert!(html.contains("after 60 minutes"));
}

#[actix_web::test]
async fn test_single_file_round_trip() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let req = upload_request(&[("files", "a.txt", b"hello")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = test::read_body_json(resp).await;

    let code = json["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(json["files"], 1);
    assert!(json["link"].as_str().unwrap().ends_with(&format!("/download/{code}")));
    assert_eq!(json["qr"], format!("/static/qr/{code}.png"));

    let req = test::TestRequest::get().uri(&format!("/download/{code}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = header_value(&resp, header::CONTENT_DISPOSITION);
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("filename=\"a.txt\""));
    assert!(header_value(&resp, header::CONTENT_TYPE).starts_with("text/plain"));

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"hello");
}

#[actix_web::test]
async fn test_multi_file_upload_downloads_archive() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let req = upload_request(&[("files", "a.txt", b"alpha"), ("files", "b.txt", b"bravo!")])
        .to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let code = json["code"].as_str().unwrap().to_string();
    assert_eq!(json["files"], 2);

    let req = test::TestRequest::get().uri(&format!("/download/{code}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = header_value(&resp, header::CONTENT_DISPOSITION);
    assert!(disposition.contains(&format!("filename=\"{code}.zip\"")));
    assert_eq!(header_value(&resp, header::CONTENT_TYPE), "application/zip");

    let body = test::read_body(resp).await;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(body.to_vec())).unwrap();
    assert_eq!(archive.len(), 2);
    for (name, expected) in [("a.txt", &b"alpha"[..]), ("b.txt", &b"bravo!"[..])] {
        let mut entry = archive.by_name(name).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, expected);
    }
}

#[actix_web::test]
async fn test_oversized_upload_is_rejected_without_side_effects() {
    let harness = Harness::new(|c| c.max_upload_size = 8);
    let app = init_app!(harness);

    let req = upload_request(&[("files", "a.txt", b"12345"), ("files", "b.txt", b"6789")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Total size exceeds 8 bytes");

    assert!(harness.repo.all_codes().await.is_empty());
    assert_eq!(harness.files_in("uploads"), 0);
    assert_eq!(harness.files_in("static/qr"), 0);
}

#[actix_web::test]
async fn test_upload_without_files_is_rejected() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    // an unrelated field plus the empty part a browser sends when nothing is picked
    let req = upload_request(&[("note", "n.txt", b"ignored"), ("files", "", b"")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json, serde_json::json!({ "error": "No files selected" }));
}

#[actix_web::test]
async fn test_getfile_returns_download_link() {
    let harness = Harness::new(|c| c.base_url = Some("https://drop.example.com".into()));
    let app = init_app!(harness);

    let req = upload_request(&[("files", "a.txt", b"hello")]).to_request();
    let uploaded: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let code = uploaded["code"].as_str().unwrap();

    let req =
        test::TestRequest::post().uri("/getfile").set_form([("code", code)]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        json,
        serde_json::json!({ "link": format!("https://drop.example.com/download/{code}") })
    );
    assert_eq!(json["link"], uploaded["link"]);
}

#[actix_web::test]
async fn test_unknown_code_is_invalid_on_both_endpoints() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let req =
        test::TestRequest::post().uri("/getfile").set_form([("code", "000000")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json, serde_json::json!({ "error": "Invalid or expired code" }));

    let req = test::TestRequest::get().uri("/download/000000").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"Invalid or expired");
}

#[actix_web::test]
async fn test_getfile_requires_code_field() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let req = test::TestRequest::post().uri("/getfile").set_form([("other", "1")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert!(json["error"].is_string());
}

#[actix_web::test]
async fn test_code_is_unresolvable_after_expiry_and_sweep() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let req = upload_request(&[("files", "a.txt", b"hello")]).to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let code = json["code"].as_str().unwrap().to_string();
    let record = harness.repo.get(&code).await.unwrap();

    let later = chrono::Utc::now() + chrono::Duration::seconds(3601);
    let report = harness.service.sweep_expired(later).await;
    assert_eq!(report.removed, 1);

    let req =
        test::TestRequest::post().uri("/getfile").set_form([("code", code.as_str())]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&format!("/download/{code}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert!(!Path::new(&record.file_path).exists());
    assert!(!Path::new(&record.qr_path).exists());
    assert_eq!(harness.files_in("uploads"), 0);
    assert_eq!(harness.files_in("static/qr"), 0);
}

#[actix_web::test]
async fn test_qr_image_is_served_as_png() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let req = upload_request(&[("files", "a.txt", b"hello")]).to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let qr = json["qr"].as_str().unwrap().to_string();

    let resp = test::call_service(&app, test::TestRequest::get().uri(&qr).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_value(&resp, header::CONTENT_TYPE), "image/png");
    let body = test::read_body(resp).await;
    assert_eq!(&body[..4], b"\x89PNG");

    let req = test::TestRequest::get().uri("/static/qr/000000.png").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_download_reports_vanished_file() {
    let harness = Harness::new(|_| {});
    let app = init_app!(harness);

    let req = upload_request(&[("files", "a.txt", b"hello")]).to_request();
    let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let code = json["code"].as_str().unwrap().to_string();
    let record = harness.repo.get(&code).await.unwrap();
    std::fs::remove_file(&record.file_path).unwrap();

    let req = test::TestRequest::get().uri(&format!("/download/{code}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::GONE);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"File no longer available");
}
