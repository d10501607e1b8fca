//! Overlay Hub HTTP API
//!
//! HTTP layer for the hub, built with Axum. Every path accepts a WebSocket
//! upgrade, HTTP routes included; the path picks the overlay topic. Plain
//! requests to unrouted paths get a 404.
//!
//! # Endpoints
//!
//! ## Events (producer)
//! - `POST /event/{gift,follow,like,chat,share,subscribe}`
//! - `POST /api/chat-event` - Chat, reporting overlays reached
//! - `POST /broadcast-event` - Arbitrary event to every overlay
//!
//! ## Overlay editors
//! - `POST /overlay/...` - Per-overlay configuration and state
//! - `GET|POST /api/goal-settings`, `POST /api/test/*`, `POST /api/cut/*`
//! - `GET|POST /api/giftvsgift`, `/api/topgift-settings`, `/api/topstreak-settings`
//! - `POST /api/chat-overlay`
//! - `GET|POST /api/actions`, `POST /api/execute-action`
//!
//! ## State and auth
//! - `GET /state/:overlayType` - Current snapshot
//! - `POST /tikhub/authenticate` - Producer session token
//!
//! ## Health
//! - `GET /ping` - Status with per-topic counters
//! - `GET /health/live` - Liveness probe
//!
//! # Example
//!
//! ```rust,ignore
//! use overlay_hub::api::{serve, ApiConfig, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     let state = AppState::new(config.clone());
//!     serve(state, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::LenientJson;
pub use state::{ApiConfig, AppState};

use axum::{
    extract::{
        ws::WebSocketUpgrade, DefaultBodyLimit, FromRequestParts, OriginalUri, Request, State,
    },
    http::{header, HeaderName, Method},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::websocket;

/// Header carrying a producer session token
pub const SESSION_HEADER: &str = "x-session-token";

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_size;

    let event_routes = Router::new()
        .route("/gift", post(routes::events::gift))
        .route("/follow", post(routes::events::follow))
        .route("/like", post(routes::events::like))
        .route("/chat", post(routes::events::chat))
        .route("/share", post(routes::events::share))
        .route("/subscribe", post(routes::events::subscribe));

    let overlay_routes = Router::new()
        .route("/luckywheel/config", post(routes::overlays::wheel_config))
        .route("/luckywheel/spin", post(routes::overlays::wheel_spin))
        .route("/luckywheel2/config", post(routes::overlays::wheel2_config))
        .route("/luckywheel2/spin", post(routes::overlays::wheel2_spin))
        .route("/songrequest/add", post(routes::overlays::song_request_add))
        .route("/songrequest/update", post(routes::overlays::song_request_update))
        .route("/likegoal/update", post(routes::overlays::like_goal_update))
        .route("/followgoal/update", post(routes::overlays::follow_goal_update))
        .route("/wingoal/update", post(routes::overlays::win_goal_update))
        .route("/timer/update", post(routes::overlays::timer_update))
        .route("/topgift/update", post(routes::overlays::top_gift_update))
        .route("/topstreak/update", post(routes::overlays::top_streak_update))
        .route("/giftvsgift/update", post(routes::overlays::gift_vs_gift_update))
        .route("/minigame-rect/update", post(routes::overlays::minigame_update));

    let api_routes = Router::new()
        // Producer
        .route("/chat-event", post(routes::events::chat_event))
        // Goals
        .route(
            "/goal-settings",
            get(routes::goals::get_goal_settings).post(routes::goals::save_goal_settings),
        )
        .route("/test/like", post(routes::goals::test_like))
        .route("/test/follow", post(routes::goals::test_follow))
        .route("/cut/like", post(routes::goals::cut_like))
        .route("/cut/follow", post(routes::goals::cut_follow))
        // Settings
        .route(
            "/giftvsgift",
            get(routes::settings::get_gift_vs_gift).post(routes::settings::save_gift_vs_gift),
        )
        .route(
            "/topgift-settings",
            get(routes::settings::get_top_gift_settings)
                .post(routes::settings::save_top_gift_settings),
        )
        .route(
            "/topstreak-settings",
            get(routes::settings::get_top_streak_settings)
                .post(routes::settings::save_top_streak_settings),
        )
        .route("/chat-overlay", post(routes::settings::save_chat_overlay))
        // Actions
        .route(
            "/actions",
            get(routes::actions::list_actions).post(routes::actions::save_actions),
        )
        .route("/execute-action", post(routes::actions::execute_action));

    let health_routes = Router::new().route("/live", get(routes::health::liveness));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/state/:overlay_type", get(routes::state::get_state))
        .route("/tikhub/authenticate", post(routes::auth::authenticate))
        .route("/broadcast-event", post(routes::events::broadcast_event))
        .nest("/event", event_routes)
        .nest("/overlay", overlay_routes)
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            upgrade_any_path,
        ))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            touch_session,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(shared_state)
}

/// Permissive CORS: overlays and editors are served from anywhere
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(SESSION_HEADER),
            HeaderName::from_static("x-auth-type"),
        ])
}

/// Refresh the producer session named by the session header, if any
async fn touch_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Some(token) = token {
        if !state.hub.touch_session(token).await {
            tracing::debug!("Unknown session token");
        }
    }

    next.run(request).await
}

/// Admit WebSocket upgrades on every path before route handlers run
async fn upgrade_any_path(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    if let Ok(ws) = WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        // Nested routers strip their prefix from `parts.uri`
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        return websocket::upgrade(ws, Arc::clone(&state.hub), &path);
    }

    next.run(Request::from_parts(parts, body)).await
}

async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    ApiError::NotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
    .into_response()
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Overlay hub listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Overlay hub shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
