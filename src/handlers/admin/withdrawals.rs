use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::db::audit::{AuditLog, RESOURCE_WITHDRAWAL};
use crate::db::models::{withdrawal_status, WithdrawalRequest};
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<WithdrawalRequest>>> {
    session.require_admin()?;
    let withdrawals = queries::list_withdrawals(&state.db, query.status).await?;
    Ok(Json(withdrawals))
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub status: String,
}

/// Settle or reject a pending payout request. Requests that already left
/// PENDING cannot be processed again.
pub async fn process_withdrawal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<WithdrawalRequest>> {
    session.require_admin()?;

    if req.status != withdrawal_status::COMPLETED && req.status != withdrawal_status::REJECTED {
        return Err(AppError::Validation(format!(
            "Withdrawal status must be '{}' or '{}'",
            withdrawal_status::COMPLETED,
            withdrawal_status::REJECTED
        )));
    }

    let existing = queries::get_withdrawal(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Withdrawal request {} not found", id)))?;
    if existing.status != withdrawal_status::PENDING {
        return Err(AppError::BadRequest(format!(
            "Withdrawal request is already {}",
            existing.status
        )));
    }

    let mut tx = state.db.begin().await?;

    let updated = queries::process_withdrawal(&mut tx, id, &req.status)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("Withdrawal request is no longer pending".to_string())
        })?;

    AuditLog::record(
        &mut tx,
        session.user_id,
        "withdrawal_process",
        RESOURCE_WITHDRAWAL,
        id,
        json!({
            "status": { "old": withdrawal_status::PENDING, "new": updated.status },
            "amount": updated.amount,
        }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(updated))
}
