#[cfg(test)]
mod tests {
    use super::super::http::{HttpCheckRequest, MAX_CLOCK_SKEW, RemainingResponse, router};
    use crate::actor::RateLimiterActor;
    use crate::config::QuotaConfig;
    use crate::metrics::Metrics;
    use crate::types::{CheckResponse, RATE_LIMITED_MESSAGE, RateLimitRejection};
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tower::ServiceExt;
    use windowcrab::{MemoryStore, Quota};

    fn app() -> Router {
        let limiter = RateLimiterActor::spawn(100, MemoryStore::new());
        let quotas = QuotaConfig {
            default: Quota::new(10, 60).unwrap(),
            presets: HashMap::from([("create-idea".to_string(), Quota::new(3, 60).unwrap())]),
        };
        router(limiter, quotas, Arc::new(Metrics::new()))
    }

    fn check(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/check")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_http_request_optional_fields() {
        let request_json = r#"{
            "identifier": "1.2.3.4",
            "action": "create-idea"
        }"#;

        let request: HttpCheckRequest = serde_json::from_str(request_json).unwrap();
        assert_eq!(request.max_requests, None);
        assert_eq!(request.window_seconds, None);
        assert_eq!(request.timestamp, None);
    }

    #[tokio::test]
    async fn test_preset_quota_then_429() {
        let app = app();
        let body = r#"{"identifier": "1.2.3.4", "action": "create-idea"}"#;

        for expected_remaining in [2, 1, 0] {
            let response = app.clone().oneshot(check(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let response: CheckResponse = body_json(response).await;
            assert!(response.allowed);
            assert_eq!(response.limit, 3);
            assert_eq!(response.remaining, expected_remaining);
        }

        let response = app.clone().oneshot(check(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after > 0 && retry_after <= 60);

        let rejection: RateLimitRejection = body_json(response).await;
        assert_eq!(rejection.error, RATE_LIMITED_MESSAGE);
        assert_eq!(rejection.retry_after, retry_after);
    }

    #[tokio::test]
    async fn test_explicit_zero_quota_is_bad_request() {
        let app = app();
        let body = r#"{"identifier": "1.2.3.4", "action": "login", "max_requests": 0}"#;

        let response = app.oneshot(check(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_identifier_is_bad_request() {
        let app = app();
        let body = r#"{"identifier": "", "action": "login"}"#;

        let response = app.oneshot(check(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timestamp_drives_window() {
        let app = app();
        let first = r#"{"identifier": "9.9.9.9", "action": "vote", "max_requests": 1, "window_seconds": 60, "timestamp": 1000000}"#;
        let same_window = r#"{"identifier": "9.9.9.9", "action": "vote", "max_requests": 1, "window_seconds": 60, "timestamp": 1059999}"#;
        let next_window = r#"{"identifier": "9.9.9.9", "action": "vote", "max_requests": 1, "window_seconds": 60, "timestamp": 1060000}"#;

        let response = app.clone().oneshot(check(first)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = app.clone().oneshot(check(same_window)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let response = app.clone().oneshot(check(next_window)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_future_timestamp_is_rejected() {
        let app = app();
        let far_future = r#"{"identifier": "5.6.7.8", "action": "vote", "max_requests": 1, "window_seconds": 60, "timestamp": 1000000000000000}"#;

        let response = app.clone().oneshot(check(far_future)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The rejected request opened no window
        let body = r#"{"identifier": "5.6.7.8", "action": "vote", "max_requests": 1, "window_seconds": 60}"#;
        let response = app.clone().oneshot(check(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_timestamp_within_skew_is_accepted() {
        let app = app();
        let slightly_ahead = now_millis() + MAX_CLOCK_SKEW.as_millis() as u64 / 2;
        let body = format!(
            r#"{{"identifier": "5.6.7.9", "action": "vote", "timestamp": {slightly_ahead}}}"#
        );

        let response = app.oneshot(check(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_remaining_rejects_zero_quota() {
        let response = app()
            .oneshot(get("/remaining?identifier=1.2.3.4&action=login&max_requests=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remaining_uses_timestamp() {
        let app = app();
        let body = r#"{"identifier": "9.9.9.8", "action": "vote", "max_requests": 2, "window_seconds": 60, "timestamp": 1000000}"#;
        let response = app.clone().oneshot(check(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get(
                "/remaining?identifier=9.9.9.8&action=vote&max_requests=2&timestamp=1030000",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let remaining: RemainingResponse = body_json(response).await;
        assert_eq!(remaining.limit, 2);
        assert_eq!(remaining.remaining, 1);

        let response = app
            .oneshot(get("/remaining?identifier=9.9.9.8&action=vote&max_requests=2"))
            .await
            .unwrap();
        let remaining: RemainingResponse = body_json(response).await;
        assert_eq!(remaining.remaining, 2);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(get("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
