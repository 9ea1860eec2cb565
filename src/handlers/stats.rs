use axum::{extract::State, Json};

use crate::services::stats_cache::PlatformStats;
use crate::AppState;

/// Public marketing statistics. Always 200: a failed refresh serves the
/// fallback constants rather than an error.
pub async fn platform_stats(State(state): State<AppState>) -> Json<PlatformStats> {
    Json(state.stats_cache.get_or_refresh(&state.db).await)
}
