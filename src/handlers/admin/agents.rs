use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::audit::{AuditLog, RESOURCE_AGENT};
use crate::db::models::Agent;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub async fn list_agents(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Agent>>> {
    session.require_admin()?;
    let agents = queries::list_agents(&state.db, query.status).await?;
    Ok(Json(agents))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub verified: bool,
}

/// Verifying promotes a PENDING agent to ACTIVE; unverifying clears the flag
/// and leaves the status alone.
pub async fn set_verification(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Agent>> {
    session.require_admin()?;

    let mut tx = state.db.begin().await?;

    let before = queries::get_agent_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Agent {} not found", id)))?;

    let after = queries::set_agent_verification(&mut tx, id, req.verified)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Agent {} not found", id)))?;

    AuditLog::record(
        &mut tx,
        session.user_id,
        if req.verified { "agent_verify" } else { "agent_unverify" },
        RESOURCE_AGENT,
        id,
        json!({
            "is_verified": { "old": before.is_verified, "new": after.is_verified },
            "status": { "old": before.status, "new": after.status },
        }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(after))
}
