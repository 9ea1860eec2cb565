use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::queries;
use crate::error::Result;
use crate::services::commission::{month_start, rank_top_agents, TopAgent};
use crate::AppState;

#[derive(Deserialize)]
pub struct TopAgentsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

/// Verified, active agents ranked by summed booking earnings since the start
/// of the current calendar month, with their average approved-review rating.
pub async fn top_agents(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<TopAgentsQuery>,
) -> Result<Json<Vec<TopAgent>>> {
    session.require_admin()?;

    let since = month_start(Utc::now());
    let revenue = queries::monthly_agent_revenue(&state.db, since).await?;
    let ratings: HashMap<Uuid, f64> = queries::agent_average_ratings(&state.db)
        .await?
        .into_iter()
        .filter_map(|row| row.avg_rating.map(|avg| (row.agent_id, avg)))
        .collect();

    Ok(Json(rank_top_agents(revenue, &ratings, query.limit)))
}
