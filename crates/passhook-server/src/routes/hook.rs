//! Password import inline hook handlers

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use passhook_core::types::{CredentialStatus, HookResponse, ValidationRequest};
use passhook_core::HOOK_LIVENESS_MESSAGE;
use std::time::Instant;
use tracing::{info, warn};

use super::error_response;
use crate::metrics;
use crate::middleware::{authorize, RemoteAddr};
use crate::server::AppState;

/// GET on the hook route, for humans and load balancers
pub async fn liveness() -> &'static str {
    HOOK_LIVENESS_MESSAGE
}

/// POST on the hook route: verify the submitted credential.
///
/// The secret header is checked before the body is read, so an
/// unauthenticated caller never reaches the directory.
pub async fn password_import(
    State(state): State<AppState>,
    remote: RemoteAddr,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = authorize(&headers, &state.config.hook) {
        warn!(remote = %remote, "Unauthorized request received from {}", remote);
        metrics::record_unauthorized();
        return error_response(e);
    }

    let request = match ValidationRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(remote = %remote, error = %e, "Rejected malformed hook request");
            return error_response(e);
        }
    };

    let started = Instant::now();
    let valid = state
        .validator
        .validate(&request.username, &request.password)
        .await;
    let status = CredentialStatus::from(valid);
    metrics::record_validation(state.validator.backend(), status, started.elapsed());

    info!(
        remote = %remote,
        username = %request.username,
        result = %status,
        "Request received from {} to authenticate {}: {}",
        remote,
        request.username,
        status
    );

    Json(HookResponse::credential_update(status)).into_response()
}

#[cfg(test)]
mod tests {
    use crate::server::{create_router, AppState};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use passhook_auth::PasswordValidator;
    use passhook_core::{PasshookConfig, HOOK_LIVENESS_MESSAGE, HOOK_PATH};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    const FIELD: &str = "mydomain-authentication";
    const SECRET: &str = "secret";

    /// Accepts exactly one username/password pair and records every call
    struct StubValidator {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl StubValidator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PasswordValidator for StubValidator {
        async fn validate(&self, username: &str, password: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((username.to_string(), password.to_string()));
            username == "annebonny@potc.live" && password == "P!rates17"
        }

        fn backend(&self) -> &'static str {
            "stub"
        }
    }

    fn app(validator: Arc<StubValidator>) -> Router {
        let mut config = PasshookConfig::default();
        config.hook.authentication_field = FIELD.to_string();
        config.hook.authentication_secret = SECRET.to_string();

        create_router(AppState {
            config: Arc::new(config),
            validator,
            metrics: None,
        })
    }

    fn payload(username: &str, password: &str) -> String {
        json!({
            "eventType": "com.okta.user.credential.password.import",
            "eventTypeVersion": "1.0",
            "contentType": "application/json",
            "data": {
                "context": {
                    "request": { "method": "POST", "ipAddress": "98.124.153.138" },
                    "credential": { "username": username, "password": password }
                },
                "action": { "credential": "UNVERIFIED" }
            }
        })
        .to_string()
    }

    fn hook_request(secret: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(HOOK_PATH)
            .header("content-type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header(FIELD, secret);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn test_valid_credentials_are_verified() {
        let validator = StubValidator::new();
        let response = app(validator.clone())
            .oneshot(hook_request(Some(SECRET), payload("annebonny@potc.live", "P!rates17")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            r#"{"commands":[{"type":"com.okta.action.update","value":{"credential":"VERIFIED"}}]}"#
        );
        assert_eq!(
            validator.seen.lock().unwrap().as_slice(),
            &[("annebonny@potc.live".to_string(), "P!rates17".to_string())]
        );
    }

    #[tokio::test]
    async fn test_wrong_password_is_unverified() {
        let validator = StubValidator::new();
        let response = app(validator.clone())
            .oneshot(hook_request(Some(SECRET), payload("annebonny@potc.live", "P!rates18")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["commands"][0]["type"], "com.okta.action.update");
        assert_eq!(body["commands"][0]["value"]["credential"], "UNVERIFIED");
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_unauthorized() {
        let validator = StubValidator::new();
        let response = app(validator.clone())
            .oneshot(hook_request(
                Some("wrong-secret"),
                payload("annebonny@potc.live", "P!rates17"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_bytes(response).await.is_empty());
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_secret_is_unauthorized() {
        let validator = StubValidator::new();
        let response = app(validator.clone())
            .oneshot(hook_request(None, payload("annebonny@potc.live", "P!rates17")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_secret_is_checked_before_body() {
        let validator = StubValidator::new();
        let response = app(validator.clone())
            .oneshot(hook_request(Some("wrong-secret"), "not json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let validator = StubValidator::new();
        let response = app(validator.clone())
            .oneshot(hook_request(Some(SECRET), "{\"data\":".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_is_bad_request() {
        let validator = StubValidator::new();
        let body = json!({ "data": { "context": { "credential": { "username": "annebonny@potc.live" } } } });
        let response = app(validator.clone())
            .oneshot(hook_request(Some(SECRET), body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"], "MissingField");
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_password_reaches_validator() {
        let validator = StubValidator::new();
        let response = app(validator.clone())
            .oneshot(hook_request(Some(SECRET), payload("annebonny@potc.live", "")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["commands"][0]["value"]["credential"], "UNVERIFIED");
    }

    #[tokio::test]
    async fn test_liveness() {
        let response = app(StubValidator::new())
            .oneshot(Request::builder().uri(HOOK_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, HOOK_LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_recorder() {
        let response = app(StubValidator::new())
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
