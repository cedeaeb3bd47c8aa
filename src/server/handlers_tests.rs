//! Tests for HTTP request handlers.

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::logging::test_support::capture;
    use crate::secrets::test_support::{Script, ScriptedSource};
    use crate::secrets::{SecretLoader, SecretSource};
    use crate::server::middleware::REQUEST_ID_HEADER;
    use crate::server::state::AppState;
    use crate::server::{create_router, with_middleware};
    use crate::store::{MemoryStore, ShipStore};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
        routing::get,
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            &Config::default(),
            Arc::new(MemoryStore::seeded()),
        ))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_ships(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ships")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(create_test_state());

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/plain"));
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_identity_endpoint() {
        let app = create_router(create_test_state());

        let response = app.oneshot(get_request("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "application/json");
        assert_eq!(
            body_json(response).await,
            json!({"service": "porttrack-api", "env": "dev"})
        );
    }

    #[tokio::test]
    async fn test_list_ships_endpoint() {
        let (logs, _guard) = capture();
        let app = create_router(create_test_state());

        let response = app.oneshot(get_request("/ships")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ships"].as_array().unwrap().len(), 2);
        assert_eq!(body["ships"][0]["name"], "Andromeda");
        assert_eq!(body["ships"][1]["eta"], "2025-08-25T10:00:00Z");

        let listed = logs.with_msg("list ships");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["count"], 2);
    }

    #[tokio::test]
    async fn test_create_ship_defaults() {
        let (logs, _guard) = capture();
        let app = create_router(create_test_state());

        let response = app.oneshot(post_ships(r#"{"name":"Zeta"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({
                "id": 3,
                "name": "Zeta",
                "status": "docked",
                "cargo": null,
                "eta": null
            })
        );

        let created = logs.with_msg("ship created");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["id"], 3);
        assert_eq!(created[0]["name"], "Zeta");
    }

    #[tokio::test]
    async fn test_create_ship_with_all_fields() {
        let app = create_router(create_test_state());

        let body = r#"{"name":"Borealis","status":"arriving","cargo":"timber","eta":"2025-09-01T08:30:00Z"}"#;
        let response = app.oneshot(post_ships(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let ship = body_json(response).await;
        assert_eq!(ship["status"], "arriving");
        assert_eq!(ship["cargo"], "timber");
        assert_eq!(ship["eta"], "2025-09-01T08:30:00Z");
    }

    #[tokio::test]
    async fn test_create_ship_requires_name() {
        let state = create_test_state();

        for body in ["{}", r#"{"name":""}"#, "", "[]", "not json"] {
            let app = create_router(Arc::clone(&state));
            let response = app.oneshot(post_ships(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(content_type(&response), "application/json");
            assert_eq!(body_json(response).await, json!({"error": "name required"}));
        }

        assert_eq!(state.store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_ship_rejects_non_string_fields() {
        let (logs, _guard) = capture();
        let state = create_test_state();

        for (body, message) in [
            (r#"{"name":42}"#, "name must be a string"),
            (r#"{"name":"Zeta","cargo":7}"#, "cargo must be a string"),
        ] {
            let app = create_router(Arc::clone(&state));
            let response = app.oneshot(post_ships(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await, json!({"error": message}));
        }

        assert_eq!(state.store.len().await.unwrap(), 2);
        assert_eq!(logs.with_msg("ship rejected").len(), 2);
    }

    #[tokio::test]
    async fn test_bracketed_ship_name_is_logged_as_text() {
        let (logs, _guard) = capture();
        let app = create_router(create_test_state());

        let response = app
            .oneshot(post_ships(r#"{"name":"[1, 2]"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["name"], "[1, 2]");

        let created = logs.with_msg("ship created");
        assert!(created[0]["name"].is_string());
        assert_eq!(created[0]["name"], "[1, 2]");
    }

    #[tokio::test]
    async fn test_creations_append_in_order() {
        let state = create_test_state();

        let mut ids = Vec::new();
        for name in ["Zeta", "Eta"] {
            let app = create_router(Arc::clone(&state));
            let response = app
                .oneshot(post_ships(&format!(r#"{{"name":"{}"}}"#, name)))
                .await
                .unwrap();
            ids.push(body_json(response).await["id"].as_u64().unwrap());
        }
        assert!(ids[1] > ids[0]);

        let app = create_router(Arc::clone(&state));
        let response = app.oneshot(get_request("/ships")).await.unwrap();
        let body = body_json(response).await;

        let names: Vec<&str> = body["ships"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Andromeda", "Aurora", "Zeta", "Eta"]);
    }

    #[tokio::test]
    async fn test_error_endpoint_always_fails() {
        let (logs, _guard) = capture();
        let state = create_test_state();

        for _ in 0..3 {
            let app = create_router(Arc::clone(&state));
            let response = app.oneshot(get_request("/error")).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body_json(response).await,
                json!({"error": "simulated failure"})
            );
        }

        let hits = logs.with_msg("simulated error endpoint hit");
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|r| r["level"] == "error"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_router(create_test_state());

        let response = app.oneshot(get_request("/docks")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_access_log() {
        let (logs, _guard) = capture();
        let app = create_router(create_test_state());

        let response = app.oneshot(get_request("/ships")).await.unwrap();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let completed = logs.with_msg("request completed");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0]["status"], 200);
        assert_eq!(completed[0]["method"], "GET");
        assert_eq!(completed[0]["path"], "/ships");
        assert_eq!(completed[0]["request_id"], request_id.as_str());
        assert!(completed[0]["duration_ms"].is_u64());

        // Handler records carry the request id of their span.
        assert_eq!(logs.with_msg("list ships")[0]["request_id"], request_id.as_str());
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500() {
        let (logs, _guard) = capture();

        async fn boom() -> &'static str {
            panic!("handler exploded")
        }

        let app: Router = with_middleware(Router::new().route("/boom", get(boom)))
            .with_state(create_test_state());

        let response = app.oneshot(get_request("/boom")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "internal server error"})
        );

        let panicked = logs.with_msg("Handler panicked");
        assert_eq!(panicked.len(), 1);
        assert_eq!(panicked[0]["panic"], "handler exploded");
        assert_eq!(logs.with_msg("request completed")[0]["status"], 500);
    }

    #[tokio::test]
    async fn test_health_while_secret_load_in_flight() {
        let source = Arc::new(ScriptedSource::new(Script::Hang));
        let loader = SecretLoader::new(
            Some("porttrack/db".to_string()),
            Arc::clone(&source) as Arc<dyn SecretSource>,
        );
        let task = loader.spawn();
        tokio::task::yield_now().await;

        let app = create_router(create_test_state());
        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
        assert!(!task.is_finished());

        task.abort();
    }

    #[tokio::test]
    async fn test_health_after_secret_load_failure() {
        let (logs, _guard) = capture();
        let source = Arc::new(ScriptedSource::new(Script::Fail("ResourceNotFoundException")));
        let loader = SecretLoader::new(
            Some("porttrack/db".to_string()),
            Arc::clone(&source) as Arc<dyn SecretSource>,
        );
        loader.spawn().await.unwrap();
        assert_eq!(logs.with_msg("Failed to load secret").len(), 1);

        let app = create_router(create_test_state());
        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_log_records_have_required_fields() {
        let (logs, _guard) = capture();
        let state = create_test_state();

        let app = create_router(Arc::clone(&state));
        app.oneshot(get_request("/ships")).await.unwrap();
        let app = create_router(Arc::clone(&state));
        app.oneshot(get_request("/error")).await.unwrap();

        let records = logs.records();
        assert!(!records.is_empty());
        for record in records {
            for key in ["ts", "level", "service", "env", "msg"] {
                assert!(record.get(key).is_some(), "missing {} in {}", key, record);
            }
        }
    }
}
