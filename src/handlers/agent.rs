use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::audit::{AuditLog, RESOURCE_BOOKING};
use crate::db::models::{booking_status, Booking, WithdrawalRequest};
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::services::commission::{classify_tier, month_start};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub async fn list_bookings(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Booking>>> {
    let agent_id = session.require_agent()?;
    let bookings = queries::list_agent_bookings(&state.db, agent_id, query.status).await?;
    Ok(Json(bookings))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Agents move their own bookings through the lifecycle (confirm, start,
/// complete, cancel). Same permissive semantics as the admin patch; bookings
/// on other agents' tours are invisible here.
pub async fn update_booking_status(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Booking>> {
    let agent_id = session.require_agent()?;

    if !booking_status::is_known(&req.status) {
        return Err(AppError::Validation(format!(
            "Unknown booking status '{}'",
            req.status
        )));
    }

    let before = queries::get_agent_booking(&state.db, agent_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

    let mut tx = state.db.begin().await?;

    let after = queries::update_booking(&mut tx, id, Some(&req.status), None)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

    AuditLog::record(
        &mut tx,
        session.user_id,
        "booking_status_update",
        RESOURCE_BOOKING,
        id,
        json!({ "status": { "old": before.status, "new": after.status } }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(after))
}

#[derive(Debug, Serialize)]
pub struct EarningsResponse {
    pub monthly_revenue: BigDecimal,
    pub lifetime_revenue: BigDecimal,
    pub booking_count: i64,
    pub withdrawable: BigDecimal,
    pub tier: Option<String>,
}

pub async fn earnings(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<EarningsResponse>> {
    let agent_id = session.require_agent()?;

    let totals =
        queries::agent_earnings_totals(&state.db, agent_id, month_start(Utc::now())).await?;
    let reserved = queries::agent_reserved_amount(&state.db, agent_id).await?;
    let tiers = queries::list_tiers(&state.db).await?;

    let tier = classify_tier(&tiers, totals.booking_count, &totals.lifetime_revenue)
        .map(|t| t.name.clone());
    let withdrawable = &totals.lifetime_revenue - &reserved;

    Ok(Json(EarningsResponse {
        monthly_revenue: totals.monthly_revenue,
        lifetime_revenue: totals.lifetime_revenue,
        booking_count: totals.booking_count,
        withdrawable,
        tier,
    }))
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequestBody {
    pub amount: BigDecimal,
}

pub async fn create_withdrawal(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<WithdrawalRequestBody>,
) -> Result<(StatusCode, Json<WithdrawalRequest>)> {
    let agent_id = session.require_agent()?;

    if req.amount <= BigDecimal::from(0) {
        return Err(AppError::Validation(
            "Withdrawal amount must be positive".to_string(),
        ));
    }

    let totals =
        queries::agent_earnings_totals(&state.db, agent_id, month_start(Utc::now())).await?;
    let reserved = queries::agent_reserved_amount(&state.db, agent_id).await?;
    let withdrawable = &totals.lifetime_revenue - &reserved;

    if req.amount > withdrawable {
        return Err(AppError::BadRequest(format!(
            "Requested amount exceeds withdrawable balance of {}",
            withdrawable
        )));
    }

    let withdrawal = queries::insert_withdrawal(&state.db, agent_id, &req.amount).await?;
    Ok((StatusCode::CREATED, Json(withdrawal)))
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<Vec<WithdrawalRequest>>> {
    let agent_id = session.require_agent()?;
    let withdrawals = queries::list_agent_withdrawals(&state.db, agent_id).await?;
    Ok(Json(withdrawals))
}
