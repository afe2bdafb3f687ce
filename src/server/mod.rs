//! HTTP surface of the relay.
//!
//! `/chat` (and the legacy `/api/deepseek-chat`) answer GET with a health
//! probe, POST with the chat relay, and OPTIONS with permissive CORS. Every
//! response, including rejections and caught panics, carries a JSON body
//! with an `ok` field.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::Result;
use crate::model::{ChatRequest, ChatResponse};
use crate::relay::{ChatRelay, RelayReply, VERSION};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Path the first site widget posted to; kept as an alias of `/chat`.
pub const LEGACY_CHAT_PATH: &str = "/api/deepseek-chat";

/// Shared state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
}

/// Build the router with CORS, body limit, panic catching and access logs.
pub fn router(relay: Arc<ChatRelay>, max_body_bytes: usize) -> Router {
    let chat_routes: MethodRouter<AppState> =
        get(health).post(chat).fallback(method_not_allowed);

    Router::new()
        .route("/chat", chat_routes.clone())
        .route(LEGACY_CHAT_PATH, chat_routes)
        .fallback(not_found)
        .with_state(AppState { relay })
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        ))
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(addr: &str, app: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, version = VERSION, "relay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;
    Ok(())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "version": VERSION }))
}

async fn chat(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            return envelope(rejection.status(), ChatResponse::failure(rejection.body_text()));
        }
    };
    let reply = match ChatRequest::from_json_bytes(&bytes) {
        Ok(request) => state.relay.answer(request).await,
        Err(e) => RelayReply::from_error(&e),
    };
    reply.into_response()
}

async fn method_not_allowed() -> Response {
    envelope(
        StatusCode::METHOD_NOT_ALLOWED,
        ChatResponse::failure("Method Not Allowed"),
    )
}

async fn not_found() -> Response {
    envelope(StatusCode::NOT_FOUND, ChatResponse::failure("Not Found"))
}

fn envelope(status: StatusCode, body: ChatResponse) -> Response {
    (status, Json(body)).into_response()
}

impl IntoResponse for RelayReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        envelope(status, self.body)
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    envelope(
        StatusCode::INTERNAL_SERVER_ERROR,
        ChatResponse::failure(format!("Internal error: {detail}")),
    )
}
