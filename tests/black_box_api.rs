use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mailcast_core::api::{build_app, AppState};
use mailcast_core::{AppError, Config, MailTransport, OutgoingMessage, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Rejects addresses whose local part starts with "bounce", after a short delay.
struct FakeRelay {
    delay: Duration,
}

#[async_trait]
impl MailTransport for FakeRelay {
    async fn send(&self, message: &OutgoingMessage) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        if message.to.starts_with("bounce") {
            Err(AppError::Rejected(format!("550 5.1.1 <{}>: user unknown", message.to)))
        } else {
            Ok("250 2.0.0 queued".to_string())
        }
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    _logs: tempfile::TempDir,
}

impl TestServer {
    async fn spawn(delay: Duration) -> Self {
        let logs = tempfile::tempdir().expect("failed to create log dir");
        let config = Config {
            log_dir: logs.path().to_path_buf(),
            ..Config::default()
        };
        let state = Arc::new(AppState::new(&config, Arc::new(FakeRelay { delay })));
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            _logs: logs,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_status_eventually(client: &reqwest::Client, base_url: &str, id: &str) -> Value {
    for _ in 0..100 {
        let res = client
            .get(format!("{}/api/status/{}", base_url, id))
            .send()
            .await
            .unwrap();
        if res.status() == StatusCode::OK {
            return res.json().await.unwrap();
        }
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {id} never reached a persisted state");
}

#[tokio::test]
async fn submit_returns_accepted_then_status_resolves() {
    let server = TestServer::spawn(Duration::from_millis(10)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/send", server.base_url))
        .json(&json!({
            "to": ["a@x.com", "b@x.com"],
            "subject": "Hi",
            "body": "Hello"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let accepted: Value = res.json().await.unwrap();
    assert_eq!(accepted["status"], "accepted");
    let id = accepted["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let record = get_status_eventually(&client, &server.base_url, &id).await;
    assert_eq!(record["id"], id.as_str());
    assert_eq!(record["overall_status"], "success");
    let details = record["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    for entry in details {
        assert_eq!(entry["status"], "success");
        assert!(entry.get("error").is_none());
    }
}

#[tokio::test]
async fn mixed_outcomes_are_partial_success() {
    let server = TestServer::spawn(Duration::from_millis(5)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/send", server.base_url))
        .json(&json!({
            "to": ["ok@x.com", "bounce@x.com", "ok@x.com"],
            "subject": "Newsletter",
            "body": "<h1>News</h1>",
            "is_html": true,
            "message_id": "newsletter-7"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let record = get_status_eventually(&client, &server.base_url, "newsletter-7").await;
    assert_eq!(record["overall_status"], "partial_success");
    let details = record["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    let bounced = details.iter().find(|d| d["email"] == "bounce@x.com").unwrap();
    assert_eq!(bounced["status"], "error");
    assert!(bounced["error"].as_str().unwrap().contains("user unknown"));
    assert!(bounced.get("message").is_none());
}

#[tokio::test]
async fn lookup_before_completion_is_not_found() {
    let server = TestServer::spawn(Duration::from_millis(300)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/send", server.base_url))
        .json(&json!({"to": ["bounce@x.com"], "subject": "Slow", "message_id": "slow-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let early = client
        .get(format!("{}/api/status/slow-1", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(early.status(), StatusCode::NOT_FOUND);

    let record = get_status_eventually(&client, &server.base_url, "slow-1").await;
    assert_eq!(record["overall_status"], "failed");
}

#[tokio::test]
async fn invalid_submissions_are_rejected() {
    let server = TestServer::spawn(Duration::ZERO).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/send", server.base_url);

    let cases = [
        json!({"to": [], "subject": "Hi"}),
        json!({"to": ["not-an-address"], "subject": "Hi"}),
        json!({"to": ["a@x.com"], "subject": "  "}),
        json!({"to": ["a@x.com"]}),
        json!({"to": ["a@x.com"], "subject": "Hi", "body": "x", "body_file": "body.txt"}),
        json!({"to": ["a@x.com"], "subject": "Hi", "message_id": "../escape"}),
    ];
    for body in cases {
        let res = client.post(&url).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "payload {body}");
        let error: Value = res.json().await.unwrap();
        assert!(error["error"].is_string());
    }
}

#[tokio::test]
async fn unknown_job_and_health() {
    let server = TestServer::spawn(Duration::ZERO).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/status/does-not-exist", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/api/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let health: Value = res.json().await.unwrap();
    assert_eq!(health["status"], "healthy");
}
