//! Router tests against a wiremock-backed rendering service.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;
use tmpl_api::{create_router, ApiConfig, AppState};
use tmpl_creatomate::{CreatomateClient, CreatomateConfig, RetryConfig};
use tmpl_importer::ImporterConfig;
use tmpl_models::{ImportedTemplate, Platform, VariableMap};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEMPLATE_ID: &str = "36481fd5-8dfe-4359-9544-76d8857acf3d";

struct TestApp {
    router: Router,
    state: AppState,
    server: MockServer,
}

impl TestApp {
    async fn start() -> Self {
        let server = MockServer::start().await;
        let client = CreatomateClient::new(
            CreatomateConfig::new("test-key")
                .with_base_url(server.uri())
                .with_retry(RetryConfig {
                    max_retries: 0,
                    base_delay_ms: 1,
                    max_delay_ms: 1,
                }),
        )
        .unwrap();

        let config = ApiConfig {
            webhook_base_url: Some("https://hooks.example.com".to_string()),
            ..Default::default()
        };
        let state = AppState::new(config, client, ImporterConfig::default());
        let router = create_router(state.clone(), None);

        Self {
            router,
            state,
            server,
        }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn mount_template(&self) {
        Mock::given(method("GET"))
            .and(path(format!("/templates/{}", TEMPLATE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": TEMPLATE_ID,
                "name": "Summer Promo",
                "source": {
                    "width": 1080,
                    "height": 1920,
                    "elements": [
                        { "name": "Heading", "type": "text", "text": "Default heading" },
                        { "name": "Background", "type": "image", "dynamic": true },
                        { "name": "Panel", "type": "shape", "fill_color": "#ff0000" }
                    ]
                }
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/renders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "renders": [] })))
            .mount(&self.server)
            .await;
    }

    async fn stored_template(&self, name: &str, active: bool) -> ImportedTemplate {
        let mut template = ImportedTemplate::new(name, TEMPLATE_ID);
        template.is_active = active;
        template.platforms = vec![Platform::new("story", "Story", 1080, 1920)];
        template.variables = match json!({ "Heading.text": "Hello" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        self.state.templates.save(template.clone()).await.unwrap();
        template
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::start().await;
    let (status, body) = app.request(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_import_by_template_id() {
    let app = TestApp::start().await;
    app.mount_template().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/templates/import",
            Some(json!({ "template_id": TEMPLATE_ID, "category": "promo" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Summer Promo");
    assert_eq!(body["category"], "promo");
    assert_eq!(
        body["variables"],
        json!({
            "Heading.text": "Default heading",
            "Background.source": "",
            "Panel.fill": "#ff0000"
        })
    );

    let id = body["id"].as_str().unwrap().to_string();
    let (status, list) = app.request(Method::GET, "/api/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["templates"][0]["id"], id.as_str());

    let (status, variables) = app
        .request(Method::GET, &format!("/api/templates/{}/variables", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(variables["has_variables"], true);
    assert_eq!(variables["text_variables"][0]["key"], "Heading.text");
    assert_eq!(variables["media_variables"][0]["key"], "Background.source");
    assert_eq!(variables["color_variables"][0]["value"], "#ff0000");
}

#[tokio::test]
async fn test_import_from_curl_command() {
    let app = TestApp::start().await;
    app.mount_template().await;

    let curl = format!(
        r#"curl -X POST https://api.creatomate.com/v1/renders -H 'Authorization: Bearer KEY' -d '{{"template_id": "{}", "modifications": {{"Heading.text": "From curl"}}}}'"#,
        TEMPLATE_ID
    );
    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/templates/import",
            Some(json!({ "curl_command": curl, "name": "Pasted" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Pasted");
    assert_eq!(body["creatomate_template_id"], TEMPLATE_ID);
    assert_eq!(body["variables"]["Heading.text"], "From curl");
}

#[tokio::test]
async fn test_import_requires_a_source() {
    let app = TestApp::start().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/templates/import",
            Some(json!({ "name": "Nothing" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("template_id"));
}

#[tokio::test]
async fn test_import_curl_without_template_id() {
    let app = TestApp::start().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/admin/templates/import",
            Some(json!({ "curl_command": "curl https://example.com" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_remote_not_found() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/templates/{}", TEMPLATE_ID)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.server)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/templates/import",
            Some(json!({ "template_id": TEMPLATE_ID })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("not found or could not be fetched"));
    assert!(app.state.templates.list(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_remote_failure_is_bad_gateway() {
    let app = TestApp::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/templates/{}", TEMPLATE_ID)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.server)
        .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/templates/import",
            Some(json!({ "template_id": TEMPLATE_ID })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "fetch_template");
}

#[tokio::test]
async fn test_list_hides_inactive_templates() {
    let app = TestApp::start().await;
    app.stored_template("Live", true).await;
    app.stored_template("Hidden", false).await;

    let (_, active) = app.request(Method::GET, "/api/templates", None).await;
    assert_eq!(active["total"], 1);
    assert_eq!(active["templates"][0]["name"], "Live");

    let (_, all) = app
        .request(Method::GET, "/api/templates?include_inactive=true", None)
        .await;
    assert_eq!(all["total"], 2);
}

#[tokio::test]
async fn test_get_unknown_template() {
    let app = TestApp::start().await;
    let (status, _) = app.request(Method::GET, "/api/templates/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_renormalizes_variables() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/admin/templates/{}", template.id),
            Some(json!({
                "name": "Renamed",
                "is_active": false,
                "variables": {
                    "Title.text.text": "Nested",
                    "Title.text": "Flat",
                    "Logo.source": "https://x/logo.png"
                }
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["is_active"], false);
    assert_eq!(
        body["variables"],
        json!({ "Title.text": "Flat", "Logo.source": "https://x/logo.png" })
    );

    let stored = app.state.templates.get(&template.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert!(stored.updated_at >= template.updated_at);
}

#[tokio::test]
async fn test_update_rejects_empty_name() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;

    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/admin/templates/{}", template.id),
            Some(json!({ "name": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_template() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;
    let uri = format!("/api/admin/templates/{}", template.id);

    let (status, _) = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_render_and_webhook_lifecycle() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;

    Mock::given(method("POST"))
        .and(path("/renders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "render-1", "status": "planned", "template_id": TEMPLATE_ID }
        ])))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, job) = app
        .request(
            Method::POST,
            "/api/renders",
            Some(json!({
                "template_id": template.id,
                "platform_id": "story",
                "modifications": { "Heading.text": "Buy now", "Heading.text.text": "Stale" }
            })),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(job["status"], "planned");
    assert_eq!(job["creatomate_render_id"], "render-1");
    assert_eq!(job["modifications"], json!({ "Heading.text": "Buy now" }));
    let job_id = job["id"].as_str().unwrap().to_string();

    let requests = app.server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["template_id"], TEMPLATE_ID);
    assert_eq!(
        sent["metadata"],
        format!("job_id:{}|platform_id:story", job_id).as_str()
    );
    assert_eq!(
        sent["webhook_url"],
        "https://hooks.example.com/api/webhooks/creatomate"
    );

    let (status, ack) = app
        .request(
            Method::POST,
            "/api/webhooks/creatomate",
            Some(json!({
                "id": "render-1",
                "status": "succeeded",
                "url": "https://cdn.example.com/render-1.mp4",
                "snapshot_url": "https://cdn.example.com/render-1.jpg",
                "metadata": format!("job_id:{}|platform_id:story", job_id)
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["job_id"], job_id.as_str());

    // A late callback must not undo the final status
    app.request(
        Method::POST,
        "/api/webhooks/creatomate",
        Some(json!({
            "id": "render-1",
            "status": "rendering",
            "metadata": format!("job_id:{}", job_id)
        })),
    )
    .await;

    let (status, job) = app
        .request(Method::GET, &format!("/api/renders/{}", job_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "succeeded");
    assert_eq!(job["output_url"], "https://cdn.example.com/render-1.mp4");
}

impl TestApp {
    /// Post a `succeeded` callback as soon as the render request reaches the mock.
    async fn deliver_success_webhook(&self) -> String {
        let metadata = loop {
            let requests = self.server.received_requests().await.unwrap();
            if let Some(request) = requests.first() {
                let sent: Value = serde_json::from_slice(&request.body).unwrap();
                break sent["metadata"].as_str().unwrap().to_string();
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        };

        let (status, ack) = self
            .request(
                Method::POST,
                "/api/webhooks/creatomate",
                Some(json!({
                    "id": "render-1",
                    "status": "succeeded",
                    "url": "https://cdn.example.com/render-1.mp4",
                    "metadata": metadata
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        ack["job_id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_webhook_during_submission_is_kept() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;

    Mock::given(method("POST"))
        .and(path("/renders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": "render-1", "status": "planned" }]))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&app.server)
        .await;

    let submit = app.request(
        Method::POST,
        "/api/renders",
        Some(json!({ "template_id": template.id, "platform_id": "story" })),
    );
    let ((status, submitted), job_id) = tokio::join!(submit, app.deliver_success_webhook());

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(submitted["id"], job_id.as_str());
    assert_eq!(submitted["status"], "succeeded");
    assert_eq!(submitted["creatomate_render_id"], "render-1");

    let (status, job) = app
        .request(Method::GET, &format!("/api/renders/{}", job_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "succeeded");
    assert_eq!(job["output_url"], "https://cdn.example.com/render-1.mp4");
}

#[tokio::test]
async fn test_failed_submission_keeps_webhook_result() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;

    Mock::given(method("POST"))
        .and(path("/renders"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(600)))
        .mount(&app.server)
        .await;

    let submit = app.request(
        Method::POST,
        "/api/renders",
        Some(json!({ "template_id": template.id })),
    );
    let ((status, _), job_id) = tokio::join!(submit, app.deliver_success_webhook());
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, job) = app
        .request(Method::GET, &format!("/api/renders/{}", job_id), None)
        .await;
    assert_eq!(job["status"], "succeeded");
    assert_eq!(job["output_url"], "https://cdn.example.com/render-1.mp4");
    assert_eq!(job["error_message"], Value::Null);
}

#[tokio::test]
async fn test_render_unknown_platform() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/renders",
            Some(json!({ "template_id": template.id, "platform_id": "billboard" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_render_inactive_template() {
    let app = TestApp::start().await;
    let template = app.stored_template("Old", false).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/renders",
            Some(json!({ "template_id": template.id, "modifications": {} })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_render_submission_failure() {
    let app = TestApp::start().await;
    let template = app.stored_template("Promo", true).await;

    Mock::given(method("POST"))
        .and(path("/renders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.server)
        .await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/renders",
            Some(json!({ "template_id": template.id, "modifications": VariableMap::new() })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_webhook_for_unknown_job_is_acknowledged() {
    let app = TestApp::start().await;

    let (status, ack) = app
        .request(
            Method::POST,
            "/api/webhooks/creatomate",
            Some(json!({
                "id": "render-9",
                "status": "failed",
                "error_message": "boom",
                "metadata": "job_id:missing"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["received"], true);
    assert!(ack.get("job_id").is_none());

    let (status, _) = app
        .request(
            Method::POST,
            "/api/webhooks/creatomate",
            Some(json!({ "id": "render-9", "status": "failed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::start().await;
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .header("X-Request-ID", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
