use serde_json::{json, Value};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub const RESOURCE_BOOKING: &str = "booking";
pub const RESOURCE_AGENT: &str = "agent";
pub const RESOURCE_COMMISSION_TIER: &str = "commission_tier";
pub const RESOURCE_WITHDRAWAL: &str = "withdrawal_request";

/// Append-only writer for the audit trail of admin and agent mutations.
/// Rows are written, never read back or updated by the application.
pub struct AuditLog;

impl AuditLog {
    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        actor_id: Uuid,
        action: &str,
        resource: &str,
        resource_id: Uuid,
        metadata: Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO audit_logs (actor_id, action, resource, resource_id, metadata) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(actor_id)
        .bind(action)
        .bind(resource)
        .bind(resource_id)
        .bind(metadata)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Convenience wrapper capturing an old/new field diff.
    pub async fn record_update(
        tx: &mut Transaction<'_, Postgres>,
        actor_id: Uuid,
        resource: &str,
        resource_id: Uuid,
        field: &str,
        old_val: Value,
        new_val: Value,
    ) -> Result<(), sqlx::Error> {
        Self::record(
            tx,
            actor_id,
            &format!("{}_update", field),
            resource,
            resource_id,
            json!({ "field": field, "old": old_val, "new": new_val }),
        )
        .await
    }

    /// Standalone record outside an existing transaction.
    pub async fn record_pool(
        pool: &PgPool,
        actor_id: Uuid,
        action: &str,
        resource: &str,
        resource_id: Uuid,
        metadata: Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO audit_logs (actor_id, action, resource, resource_id, metadata) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(actor_id)
        .bind(action)
        .bind(resource)
        .bind(resource_id)
        .bind(metadata)
        .execute(pool)
        .await?;
        Ok(())
    }
}
