use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;

use crate::foods::dto::HealthResponse;
use crate::state::AppState;
use crate::{foods, import};

pub fn build_app(state: AppState) -> Router {
    let import_limit = state.config.import_max_bytes;
    Router::new()
        .merge(foods::router())
        .merge(import::router(import_limit))
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(log_response),
        )
}

fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = req.uri().path(),
        status = tracing::field::Empty,
    )
}

fn log_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", status.as_u16());
    let elapsed_ms = latency.as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%status, elapsed_ms, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%status, elapsed_ms, "request rejected");
    } else {
        tracing::debug!(%status, elapsed_ms, "request served");
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn serve(app: Router, state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = build_app(AppState::in_memory());
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn crud_roundtrip() {
        let app = build_app(AppState::in_memory());

        let (status, created) = send(
            &app,
            json_req("POST", "/foods", json!({ "food_name": "ABC Soup", "calorie": "1,050" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["calorie"], 1050.0);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, fetched) = send(&app, get(&format!("/foods/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["food_name"], "ABC Soup");

        let (status, replaced) = send(
            &app,
            json_req("PUT", &format!("/foods/{id}"), json!({ "food_code": "K-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(replaced["id"], id.as_str());
        assert!(replaced["food_name"].is_null());
        assert_eq!(replaced["food_code"], "K-1");

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/foods/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, deleted) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "deleted": id }));

        let (status, _) = send(&app, get(&format!("/foods/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_without_name_is_rejected() {
        let app = build_app(AppState::in_memory());
        let (status, body) =
            send(&app, json_req("POST", "/foods", json!({ "food_code": "X" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "food_name");
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let app = build_app(AppState::in_memory());
        let (status, _) = send(&app, get(&format!("/foods/{}", uuid::Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, get("/foods/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"][0]["field"], "id");

        let (status, _) = send(
            &app,
            json_req(
                "PUT",
                &format!("/foods/{}", uuid::Uuid::new_v4()),
                json!({ "food_name": "x" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let app = build_app(AppState::in_memory());
        for name in ["ABC Soup", "xabcx", "abc1", "ABC2", "abc3", "Bread"] {
            let (status, _) =
                send(&app, json_req("POST", "/foods", json!({ "food_name": name }))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        for page in 1..=2 {
            let (status, body) =
                send(&app, get(&format!("/foods?food_name=abc&perPage=2&page={page}"))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["total"], 5);
            assert_eq!(body["page"], page);
            assert_eq!(body["per_page"], 2);
            assert_eq!(body["items"].as_array().unwrap().len(), 2);
        }

        let (_, last) = send(&app, get("/foods?food_name=abc&per_page=2&page=3")).await;
        assert_eq!(last["total"], 5);
        assert_eq!(last["items"].as_array().unwrap().len(), 1);

        let (_, all) = send(&app, get("/foods")).await;
        assert_eq!(all["total"], 6);
        assert_eq!(all["per_page"], 20);
    }

    #[tokio::test]
    async fn invalid_pagination_is_rejected() {
        let app = build_app(AppState::in_memory());
        for uri in [
            "/foods?page=1&perPage=501",
            "/foods?per_page=0",
            "/foods?page=0",
            "/foods?page=two",
        ] {
            let (status, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "validation_error");
        }
    }
}
