pub mod agents;
pub mod bookings;
pub mod reports;
pub mod tiers;
pub mod withdrawals;

use crate::AppState;
use axum::{
    routing::{get, patch, put},
    Router,
};

/// Role-gated moderation and reporting surface. Every handler re-asserts
/// the ADMIN role via the session extractor before touching data.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/:id", patch(bookings::update_booking))
        .route("/agents", get(agents::list_agents))
        .route("/agents/:id/verify", patch(agents::set_verification))
        .route(
            "/commission-tiers",
            get(tiers::list_tiers).post(tiers::create_tier),
        )
        .route(
            "/commission-tiers/:id",
            put(tiers::update_tier).delete(tiers::delete_tier),
        )
        .route("/reports/top-agents", get(reports::top_agents))
        .route("/withdrawals", get(withdrawals::list_withdrawals))
        .route("/withdrawals/:id", patch(withdrawals::process_withdrawal))
}
