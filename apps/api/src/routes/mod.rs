pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route(
            "/api/v1/analyze",
            post(handlers::handle_analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::extraction::tests::build_pdf;
    use axum::{
        body::{to_bytes, Body},
        extract::State,
        http::{header, HeaderMap, Request, StatusCode},
        Json,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    const BOUNDARY: &str = "smartmatch-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"resume.pdf\"\r\n\
                             Content-Type: application/pdf\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        send_with(Config::for_tests(), request).await
    }

    async fn send_with(config: Config, request: Request<Body>) -> (StatusCode, Value) {
        let app = build_router(AppState { config });
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn text_pdf() -> Vec<u8> {
        build_pdf(&["BT /F1 12 Tf 72 720 Td (Jane Doe Rust Engineer) Tj ET"], false)
    }

    /// What the stand-in provider saw for one chat completion call.
    struct ReceivedCall {
        authorization: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct MockProvider {
        status: StatusCode,
        reply: Value,
        calls: Arc<Mutex<Vec<ReceivedCall>>>,
    }

    async fn mock_chat_completion(
        State(mock): State<MockProvider>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        mock.calls.lock().unwrap().push(ReceivedCall {
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
        (mock.status, Json(mock.reply.clone()))
    }

    /// Serves the chat completions route on an ephemeral port; returns its base URL.
    async fn spawn_provider(
        status: StatusCode,
        reply: Value,
    ) -> (String, Arc<Mutex<Vec<ReceivedCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mock = MockProvider {
            status,
            reply,
            calls: calls.clone(),
        };
        let app = Router::new()
            .route("/openai/v1/chat/completions", post(mock_chat_completion))
            .with_state(mock);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), calls)
    }

    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-test",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": content}}
            ],
            "usage": {"prompt_tokens": 900, "completion_tokens": 60, "total_tokens": 960}
        })
    }

    fn config_for(api_base: &str, server_key: Option<&str>) -> Config {
        let mut config = Config::for_tests();
        config.llm.api_base = api_base.to_string();
        config.groq_api_key = server_key.map(str::to_string);
        config
    }

    const MATCH_REPLY: &str = r#"{"match_percentage": 81, "missing_keywords": ["Terraform", "Kafka"], "profile_summary": "Strong Rust background with production axum services."}"#;

    #[tokio::test]
    async fn test_health_ok() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_job_description_is_rejected() {
        let pdf = text_pdf();
        let (status, json) = send(analyze_request(&[
            Part::Text("job_description", "   "),
            Part::File("resume", &pdf),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Please paste a job description.");
    }

    #[tokio::test]
    async fn test_missing_resume_is_rejected() {
        let (status, json) = send(analyze_request(&[Part::Text(
            "job_description",
            "Senior Rust engineer",
        )]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"]["message"],
            "Please upload your resume (PDF format)."
        );
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_unprocessable() {
        let (status, json) = send(analyze_request(&[
            Part::Text("job_description", "Senior Rust engineer"),
            Part::File("resume", b"definitely not a pdf"),
        ]))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "EXTRACTION_ERROR");
        assert_eq!(json["error"]["kind"], "corrupt");
    }

    #[tokio::test]
    async fn test_encrypted_pdf_is_password_protected() {
        let pdf = build_pdf(&["BT (Secret) Tj ET"], true);
        let (status, json) = send(analyze_request(&[
            Part::Text("job_description", "Senior Rust engineer"),
            Part::File("resume", &pdf),
        ]))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["kind"], "password_protected");
    }

    #[tokio::test]
    async fn test_blank_key_without_fallback_is_missing_credential() {
        let pdf = text_pdf();
        let (status, json) = send(analyze_request(&[
            Part::Text("api_key", "  "),
            Part::Text("job_description", "Senior Rust engineer"),
            Part::File("resume", &pdf),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "ANALYSIS_ERROR");
        assert_eq!(json["error"]["kind"], "missing_credential");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let mut config = Config::for_tests();
        config.max_upload_bytes = 64;
        let app = build_router(AppState { config });

        let pdf = text_pdf();
        let response = app
            .oneshot(analyze_request(&[
                Part::Text("job_description", "Senior Rust engineer"),
                Part::File("resume", &pdf),
            ]))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::OK);
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_successful_analysis_returns_full_report() {
        let (base, calls) = spawn_provider(StatusCode::OK, completion(MATCH_REPLY)).await;
        let pdf = text_pdf();

        let (status, json) = send_with(
            config_for(&base, Some("gsk_server")),
            analyze_request(&[
                Part::Text("api_key", " gsk_request "),
                Part::Text("job_description", "Senior Rust engineer with Terraform"),
                Part::File("resume", &pdf),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["analysis_id"]
            .as_str()
            .and_then(|id| uuid::Uuid::parse_str(id).ok())
            .is_some());
        assert!(json["analyzed_at"]
            .as_str()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .is_some());

        let analysis = &json["analysis"];
        assert_eq!(analysis["match_percentage"], 81);
        assert_eq!(analysis["missing_keywords"], json!(["Terraform", "Kafka"]));
        assert_eq!(
            analysis["profile_summary"],
            "Strong Rust background with production axum services."
        );
        assert!(analysis["error"].is_null());

        let quality = json["quality"].as_object().unwrap();
        let checks: Vec<&str> = quality.keys().map(String::as_str).collect();
        for check in ["word_count", "email", "phone", "sections"] {
            assert!(checks.contains(&check), "missing check {check}");
        }
        assert_eq!(json["quality"]["word_count"]["value"], 4);
        assert_eq!(json["quality"]["word_count"]["status"], "fail");

        let dashboard = &json["dashboard"];
        assert_eq!(dashboard["gauge"]["value"], 81);
        assert_eq!(dashboard["verdict"]["tone"], "success");
        assert_eq!(dashboard["verdict"]["band"], "good");
        assert_eq!(dashboard["keywords"]["badges"][0]["label"], "Terraform");
        assert_eq!(dashboard["quality"].as_array().unwrap().len(), 4);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.authorization.as_deref(), Some("Bearer gsk_request"));
        assert_eq!(call.body["model"], "llama-3.3-70b-versatile");
        assert!((call.body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(call.body["max_tokens"], 500);
        assert_eq!(call.body["messages"][0]["role"], "system");
        assert_eq!(call.body["messages"][1]["role"], "user");
        let prompt = call.body["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains("Senior Rust engineer with Terraform"));
        assert!(prompt.contains("Jane Doe Rust Engineer"));
    }

    #[tokio::test]
    async fn test_server_key_is_used_when_request_has_none() {
        let (base, calls) = spawn_provider(StatusCode::OK, completion(MATCH_REPLY)).await;
        let pdf = text_pdf();

        let (status, _) = send_with(
            config_for(&base, Some("gsk_server")),
            analyze_request(&[
                Part::Text("api_key", ""),
                Part::Text("job_description", "Senior Rust engineer"),
                Part::File("resume", &pdf),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].authorization.as_deref(), Some("Bearer gsk_server"));
    }

    #[tokio::test]
    async fn test_provider_429_is_rate_limited() {
        let (base, calls) = spawn_provider(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "Too many requests, slow down", "type": "requests"}}),
        )
        .await;
        let pdf = text_pdf();

        let (status, json) = send_with(
            config_for(&base, Some("gsk_server")),
            analyze_request(&[
                Part::Text("job_description", "Senior Rust engineer"),
                Part::File("resume", &pdf),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["kind"], "rate_limited");
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_message_becomes_service_error() {
        let (base, _) = spawn_provider(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "Invalid API Key", "code": "invalid_api_key"}}),
        )
        .await;
        let pdf = text_pdf();

        let (status, json) = send_with(
            config_for(&base, None),
            analyze_request(&[
                Part::Text("api_key", "gsk_wrong"),
                Part::Text("job_description", "Senior Rust engineer"),
                Part::File("resume", &pdf),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["kind"], "service_error");
        assert_eq!(json["error"]["message"], "API error: Invalid API Key");
    }

    #[tokio::test]
    async fn test_blank_completion_is_invalid_format() {
        let (base, _) = spawn_provider(StatusCode::OK, completion("   ")).await;
        let pdf = text_pdf();

        let (status, json) = send_with(
            config_for(&base, Some("gsk_server")),
            analyze_request(&[
                Part::Text("job_description", "Senior Rust engineer"),
                Part::File("resume", &pdf),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["kind"], "invalid_response_format");
    }
}
