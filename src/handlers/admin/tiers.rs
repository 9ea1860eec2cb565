use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::audit::{AuditLog, RESOURCE_COMMISSION_TIER};
use crate::db::models::CommissionTier;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TierRequest {
    pub name: String,
    #[serde(default)]
    pub min_bookings: i32,
    #[serde(default)]
    pub min_revenue: BigDecimal,
    pub commission_rate: BigDecimal,
}

fn validate_tier(req: &TierRequest) -> Result<()> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Tier name must not be empty".to_string()));
    }
    if req.min_bookings < 0 {
        return Err(AppError::Validation(
            "min_bookings must not be negative".to_string(),
        ));
    }
    if req.min_revenue < BigDecimal::from(0) {
        return Err(AppError::Validation(
            "min_revenue must not be negative".to_string(),
        ));
    }
    if req.commission_rate <= BigDecimal::from(0) || req.commission_rate > BigDecimal::from(1) {
        return Err(AppError::Validation(
            "commission_rate must be within (0, 1]".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_tiers(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Vec<CommissionTier>>> {
    session.require_admin()?;
    let tiers = queries::list_tiers(&state.db).await?;
    Ok(Json(tiers))
}

pub async fn create_tier(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<TierRequest>,
) -> Result<(StatusCode, Json<CommissionTier>)> {
    session.require_admin()?;
    validate_tier(&req)?;

    let tier = queries::insert_tier(
        &state.db,
        req.name.trim(),
        req.min_bookings,
        &req.min_revenue,
        &req.commission_rate,
    )
    .await?;

    AuditLog::record_pool(
        &state.db,
        session.user_id,
        "tier_create",
        RESOURCE_COMMISSION_TIER,
        tier.id,
        json!({ "new": tier }),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(tier)))
}

pub async fn update_tier(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<TierRequest>,
) -> Result<Json<CommissionTier>> {
    session.require_admin()?;
    validate_tier(&req)?;

    let tier = queries::update_tier(
        &state.db,
        id,
        req.name.trim(),
        req.min_bookings,
        &req.min_revenue,
        &req.commission_rate,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Commission tier {} not found", id)))?;

    AuditLog::record_pool(
        &state.db,
        session.user_id,
        "tier_update",
        RESOURCE_COMMISSION_TIER,
        id,
        json!({ "new": tier }),
    )
    .await?;

    Ok(Json(tier))
}

pub async fn delete_tier(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;

    let deleted = queries::delete_tier(&state.db, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!(
            "Commission tier {} not found",
            id
        )));
    }

    AuditLog::record_pool(
        &state.db,
        session.user_id,
        "tier_delete",
        RESOURCE_COMMISSION_TIER,
        id,
        json!({}),
    )
    .await?;

    Ok(Json(json!({ "message": "Commission tier deleted" })))
}
