//! HTTP boundary
//!
//! The router layer consumed by browsers and the control UI. It is glue over
//! the core: `GET /stream` registers a listener and streams its channel as
//! the response body, `POST /controller` forwards a named command, and the
//! static control UI is served from the configured public directory.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, get_service, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::BroadcastConfig;
use crate::controller::BroadcastController;
use crate::error::Error;
use crate::registry::{ClientRegistry, ListenerStream};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<BroadcastConfig>,
    pub registry: Arc<ClientRegistry>,
    pub controller: Arc<BroadcastController>,
}

/// Inbound command payload
#[derive(Debug, Deserialize)]
pub struct CommandPayload {
    pub command: String,
}

/// Command acknowledgement
#[derive(Debug, Serialize)]
pub struct CommandAck {
    pub result: String,
}

/// Build the application router
pub fn router(ctx: AppContext) -> Router {
    let assets = ServeDir::new(&ctx.config.public_dir);

    // GET serves the control UI page; the same path accepts command POSTs,
    // so it cannot rely on the ServeDir fallback the way /home does.
    let controller_page =
        ServeFile::new(ctx.config.public_dir.join("controller/index.html"));

    Router::new()
        .route("/", get(|| async { Redirect::to("/home") }))
        .route("/stream", get(stream))
        .route("/controller", get_service(controller_page).post(command))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Open a persistent listener connection
async fn stream(State(ctx): State<AppContext>) -> Response {
    let (id, rx) = ctx.registry.register().await;
    tracing::info!(listener = %id, "Stream connection opened");

    let body = Body::from_stream(ListenerStream::new(id, rx, Arc::clone(&ctx.registry)));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::ACCEPT_RANGES, "bytes"),
        ],
        body,
    )
        .into_response()
}

/// Forward a control command to the broadcast controller
async fn command(
    State(ctx): State<AppContext>,
    Json(payload): Json<CommandPayload>,
) -> Response {
    match ctx.controller.handle(&payload.command).await {
        Ok(_) => ack(StatusCode::OK, "ok"),
        Err(Error::EffectNotFound(name)) => {
            tracing::warn!(effect = %name, "Effect not found");
            ack(StatusCode::NOT_FOUND, "effect not found")
        }
        Err(Error::PipelineStopped) => ack(StatusCode::CONFLICT, "not streaming"),
        Err(e) => {
            tracing::error!(command = %payload.command, error = %e, "Command failed");
            ack(StatusCode::INTERNAL_SERVER_ERROR, "error")
        }
    }
}

fn ack(status: StatusCode, result: &str) -> Response {
    (
        status,
        Json(CommandAck {
            result: result.to_string(),
        }),
    )
        .into_response()
}
