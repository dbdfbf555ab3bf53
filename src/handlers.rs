use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, header},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    relay::{
        Relay,
        dto::{ChatRequest, ChatResponse, VisionRequest},
    },
    service,
};

pub const BANNER: &str = "🧠 Chat & Vision relay is running!";

pub fn build_router(state: Arc<Relay>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    Router::new()
        .route("/", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/vision", post(vision_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn health_handler() -> &'static str {
    BANNER
}

pub async fn chat_handler(
    State(relay): State<Arc<Relay>>,
    WithRejection(Json(request), _): WithRejection<Json<ChatRequest>, service::Error>,
) -> service::Result<Json<ChatResponse>> {
    relay.chat(request).await.map(Json)
}

pub async fn vision_handler(
    State(relay): State<Arc<Relay>>,
    WithRejection(Json(request), _): WithRejection<Json<VisionRequest>, service::Error>,
) -> service::Result<Json<ChatResponse>> {
    relay.vision(request).await.map(Json)
}
