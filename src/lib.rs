pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod validation;

use axum::{
    middleware::from_fn,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::realtime::ChannelSigner;
use crate::services::stats_cache::StatsCache;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub stats_cache: Arc<StatsCache>,
    pub signer: ChannelSigner,
    pub start_time: std::time::Instant,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/tours", get(handlers::tours::list_tours))
        .route("/api/tours/:id", get(handlers::tours::get_tour))
        .route("/api/stats/platform", get(handlers::stats::platform_stats))
        .route("/api/inquiries", post(handlers::inquiries::create_inquiry))
        .route("/api/reviews", post(handlers::reviews::create_review))
        .route(
            "/api/reviews/:id/helpful",
            post(handlers::reviews::toggle_helpful),
        )
        .route(
            "/api/client/bookings",
            post(handlers::client::create_booking).get(handlers::client::list_my_bookings),
        )
        .route("/api/agent/bookings", get(handlers::agent::list_bookings))
        .route(
            "/api/agent/bookings/:id",
            patch(handlers::agent::update_booking_status),
        )
        .route("/api/agent/earnings", get(handlers::agent::earnings))
        .route(
            "/api/agent/withdrawals",
            post(handlers::agent::create_withdrawal).get(handlers::agent::list_withdrawals),
        )
        .route("/api/realtime/auth", post(handlers::realtime::authorize))
        .nest("/api/admin", handlers::admin::admin_routes())
        .layer(from_fn(middleware::request_logger::request_logger_middleware))
        .with_state(state)
}
