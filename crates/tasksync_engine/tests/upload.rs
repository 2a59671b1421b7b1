use std::io::Write;
use std::path::Path;

use serde_json::json;
use tasksync_core::TaskId;
use tasksync_engine::{ReqwestTaskIssuer, SyncSettings, TaskIssuer, UploadError};
use tempfile::NamedTempFile;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pdf_fixture() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"%PDF-1.4\n%fake\n").unwrap();
    file
}

fn issuer_for(server: &MockServer) -> ReqwestTaskIssuer {
    let settings = SyncSettings::default()
        .with_api_base(&server.uri())
        .unwrap();
    ReqwestTaskIssuer::new(&settings).unwrap()
}

#[tokio::test]
async fn upload_returns_issued_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload-pdf/"))
        .and(header("authorization", "Bearer secret"))
        .and(body_string_contains("name=\"job_id\""))
        .and(body_string_contains("%PDF-1.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "PDF uploaded successfully",
            "pdf_id": 12,
            "task_id": "c0ffee"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issuer = issuer_for(&server);
    assert!(issuer.endpoint().as_str().ends_with("/api/v1/upload-pdf/"));

    let file = pdf_fixture();
    let issued = issuer.issue(42, file.path(), "secret").await.unwrap();
    assert_eq!(issued.task_id, TaskId::from("c0ffee"));
    assert_eq!(issued.pdf_id, Some(12));
}

#[tokio::test]
async fn upload_surfaces_detail_of_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upload-pdf/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"detail": "Not authorized for this job"})),
        )
        .mount(&server)
        .await;

    let file = pdf_fixture();
    let err = issuer_for(&server)
        .issue(1, file.path(), "secret")
        .await
        .unwrap_err();
    match err {
        UploadError::HttpStatus { status, detail } => {
            assert_eq!(status, 403);
            assert_eq!(detail, "Not authorized for this job");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn upload_without_task_id_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let file = pdf_fixture();
    let err = issuer_for(&server)
        .issue(1, file.path(), "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::InvalidResponse(_)));
}

#[tokio::test]
async fn missing_file_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = issuer_for(&server)
        .issue(1, Path::new("/definitely/not/here.pdf"), "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::ReadFile { .. }));
}
