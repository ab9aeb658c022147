pub mod api;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::Config, docs::ApiDoc, state::AppState, ws::websocket_handler};
use api::create_api_routes;

/// Full application: REST API, collaboration socket, Swagger UI
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let ws_path = state.config.ws_path.clone();

    Router::new()
        // Mount API routes
        .nest("/api", create_api_routes())
        .route(&ws_path, get(websocket_handler))
        .with_state(state)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config.cors_origin_list();
    if origins.is_empty() {
        return if config.is_development() {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollaborationEvent, EventKind};
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use futures_util::{SinkExt, StreamExt};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Config::default())
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn ada() -> Value {
        json!({ "username": "ada", "email": "ada@example.com", "displayName": "Ada", "color": "#ff0000" })
    }

    #[tokio::test]
    async fn user_lifecycle() {
        let app = create_app(test_state());

        let (status, user) = call(&app, Method::POST, "/api/users", Some(ada())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["id"], 1);
        assert_eq!(user["displayName"], "Ada");
        assert_eq!(user["isOnline"], true);

        let (status, fetched) = call(&app, Method::GET, "/api/users/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["username"], "ada");

        let (status, missing) = call(&app, Method::GET, "/api/users/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["code"], 404);
        assert_eq!(missing["error"], "User not found");

        let (status, _) = call(&app, Method::POST, "/api/users", Some(ada())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let mut same_email = ada();
        same_email["username"] = json!("lovelace");
        let (status, body) = call(&app, Method::POST, "/api/users", Some(same_email)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 409);
    }

    #[tokio::test]
    async fn invalid_bodies_are_bad_requests() {
        let app = create_app(test_state());

        let (status, _) = call(&app, Method::POST, "/api/users", Some(json!({ "username": "ada" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut blank = ada();
        blank["username"] = json!("  ");
        let (status, body) = call(&app, Method::POST, "/api/users", Some(blank)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "'username' must not be empty");

        let (status, _) = call(&app, Method::POST, "/api/documents", Some(json!({ "name": "a.js" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn documents_by_id_share_link_and_owner() {
        let app = create_app(test_state());
        call(&app, Method::POST, "/api/users", Some(ada())).await;

        let (status, doc) = call(&app, Method::POST, "/api/documents", Some(json!({ "name": "main.py", "ownerId": 1, "language": "python" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["content"], "");
        assert_eq!(doc["language"], "python");
        assert_eq!(doc["isPublic"], false);

        let share_link = doc["shareLink"].as_str().unwrap().to_string();
        let (status, shared) = call(&app, Method::GET, &format!("/api/documents/share/{}", share_link), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shared["id"], doc["id"]);

        let (status, _) = call(&app, Method::GET, "/api/documents/share/doc-missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, fetched) = call(&app, Method::GET, "/api/documents/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], "main.py");

        let (_, owned) = call(&app, Method::GET, "/api/users/1/documents", None).await;
        assert_eq!(owned.as_array().unwrap().len(), 1);
        let (_, others) = call(&app, Method::GET, "/api/users/2/documents", None).await;
        assert_eq!(others, json!([]));
    }

    #[tokio::test]
    async fn versions_take_document_from_path() {
        let app = create_app(test_state());

        for content in ["v1", "v2"] {
            let body = json!({ "content": content, "authorId": 1, "documentId": 99, "description": "checkpoint" });
            let (status, version) = call(&app, Method::POST, "/api/documents/3/versions", Some(body)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(version["documentId"], 3);
        }

        let (status, versions) = call(&app, Method::GET, "/api/documents/3/versions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(versions[0]["content"], "v2");
        assert_eq!(versions[1]["content"], "v1");
    }

    #[tokio::test]
    async fn messages_and_collaborators() {
        let state = test_state();
        let app = create_app(state.clone());
        call(&app, Method::POST, "/api/users", Some(ada())).await;
        state.store.add_collaborator(1, 1).await.unwrap();

        let (status, messages) = call(&app, Method::GET, "/api/documents/1/messages", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(messages, json!([]));

        let (_, collaborators) = call(&app, Method::GET, "/api/documents/1/collaborators", None).await;
        assert_eq!(collaborators[0]["username"], "ada");

        let (status, _) = call(&app, Method::DELETE, "/api/documents/1/collaborators/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, collaborators) = call(&app, Method::GET, "/api/documents/1/collaborators", None).await;
        assert_eq!(collaborators, json!([]));
    }

    #[tokio::test]
    async fn operational_endpoints() {
        let app = create_app(test_state());

        let (status, health) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");

        let (status, _) = call(&app, Method::GET, "/api/ready", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, diagnostics) = call(&app, Method::GET, "/api/diagnostics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(diagnostics["n_rooms"], 0);
        assert_eq!(diagnostics["n_conn"], 0);

        let (status, openapi) = call(&app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(openapi["paths"]["/api/documents/{id}"].is_object());
    }

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn next_event(client: &mut Client) -> CollaborationEvent {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(5), client.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("socket closed")
                .expect("socket error");
            if let Message::Text(text) = message {
                return CollaborationEvent::decode(text.as_str()).unwrap();
            }
        }
    }

    async fn wait_for_joined(state: &AppState, joined: usize) {
        for _ in 0..200 {
            if state.dispatcher.stats().await.map(|s| s.joined) == Some(joined) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("room never reached {} joined sessions", joined);
    }

    fn frame(kind: &str, payload: Value, user_id: i64) -> Message {
        let value = json!({ "type": kind, "payload": payload, "userId": user_id, "documentId": 7, "timestamp": 0 });
        Message::text(value.to_string())
    }

    #[tokio::test]
    async fn websocket_relay_end_to_end() {
        let state = test_state();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let url = format!("ws://{}/ws", addr);

        let (mut a, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        let (mut b, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();

        a.send(frame("user-join", json!({ "userId": 1 }), 1)).await.unwrap();
        wait_for_joined(&state, 1).await;
        b.send(frame("user-join", json!({ "userId": 2 }), 2)).await.unwrap();

        let joined = next_event(&mut a).await;
        assert_eq!(joined.kind, EventKind::UserJoin);
        assert_eq!(joined.payload["userId"], 2);

        a.send(Message::text("garbage".to_string())).await.unwrap();
        a.send(frame("content-change", json!({ "content": "x=1" }), 1)).await.unwrap();
        let changed = next_event(&mut b).await;
        assert_eq!(changed.kind, EventKind::ContentChange);
        assert_eq!(changed.payload["content"], "x=1");

        a.close(None).await.unwrap();
        let left = next_event(&mut b).await;
        assert_eq!(left.kind, EventKind::UserLeave);
        assert_eq!(left.payload["userId"], 1);
        wait_for_joined(&state, 1).await;
    }
}
