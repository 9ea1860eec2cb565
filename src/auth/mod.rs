use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Agent,
    User,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "AGENT" => Some(Role::Agent),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

/// The authenticated caller. Extracted once per request from the bearer
/// token; handlers assert the role they need instead of re-querying the
/// session themselves.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub role: Role,
    /// Present when the caller owns an agent profile.
    pub agent_id: Option<Uuid>,
}

impl AuthSession {
    pub fn require_admin(&self) -> Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Agents act on their own tenant; admins have no agent scope here.
    pub fn require_agent(&self) -> Result<Uuid> {
        match (self.role, self.agent_id) {
            (Role::Agent, Some(agent_id)) => Ok(agent_id),
            _ => Err(AppError::Forbidden),
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    user_id: Uuid,
    role: String,
    agent_id: Option<Uuid>,
}

async fn load_session(pool: &PgPool, token: &str) -> Result<AuthSession> {
    let row: Option<SessionRow> = sqlx::query_as(
        "SELECT s.user_id, u.role, a.id AS agent_id \
         FROM sessions s \
         JOIN users u ON u.id = s.user_id \
         LEFT JOIN agents a ON a.user_id = u.id \
         WHERE s.token = $1 AND s.expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or(AppError::Unauthenticated)?;
    let role = Role::parse(&row.role).ok_or(AppError::Unauthenticated)?;

    Ok(AuthSession {
        user_id: row.user_id,
        role,
        agent_id: row.agent_id,
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthenticated)?;
        load_session(&state.db, &token).await
    }
}
