use axum::{extract::State, Json};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::auth::{AuthSession, Role};
use crate::error::{AppError, Result};
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Signs channel subscriptions for the hosted pub/sub provider
/// (Pusher-compatible auth string).
#[derive(Clone)]
pub struct ChannelSigner {
    app_key: String,
    secret: String,
}

impl ChannelSigner {
    pub fn new(app_key: String, secret: String) -> Self {
        Self { app_key, secret }
    }

    pub fn sign(&self, socket_id: &str, channel_name: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(format!("{}:{}", socket_id, channel_name).as_bytes());
        format!("{}:{}", self.app_key, hex::encode(mac.finalize().into_bytes()))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Channel {
    User(Uuid),
    Agent(Uuid),
    AdminPresence,
}

/// Channel grammar: `private-user-<uuid>`, `private-agent-<uuid>`,
/// `presence-admin`. Malformed names are 400, unknown names 403.
pub fn parse_channel(name: &str) -> Result<Channel> {
    if name == "presence-admin" {
        return Ok(Channel::AdminPresence);
    }
    if let Some(rest) = name.strip_prefix("private-user-") {
        let id = Uuid::parse_str(rest)
            .map_err(|_| AppError::BadRequest("Malformed channel name".to_string()))?;
        return Ok(Channel::User(id));
    }
    if let Some(rest) = name.strip_prefix("private-agent-") {
        let id = Uuid::parse_str(rest)
            .map_err(|_| AppError::BadRequest("Malformed channel name".to_string()))?;
        return Ok(Channel::Agent(id));
    }
    Err(AppError::Forbidden)
}

/// A subscription is only signed for the identity the channel belongs to.
pub fn authorize_channel(session: &AuthSession, channel: &Channel) -> Result<()> {
    let allowed = match channel {
        Channel::User(id) => *id == session.user_id,
        Channel::Agent(id) => session.agent_id == Some(*id),
        Channel::AdminPresence => session.role == Role::Admin,
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn valid_socket_id(socket_id: &str) -> bool {
    let mut parts = socket_id.split('.');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(a), Some(b), None)
            if !a.is_empty() && !b.is_empty()
                && a.bytes().all(|c| c.is_ascii_digit())
                && b.bytes().all(|c| c.is_ascii_digit())
    )
}

#[derive(Debug, Deserialize)]
pub struct ChannelAuthRequest {
    pub socket_id: String,
    pub channel_name: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelAuthResponse {
    pub auth: String,
}

pub async fn authorize(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<ChannelAuthRequest>,
) -> Result<Json<ChannelAuthResponse>> {
    if !valid_socket_id(&req.socket_id) {
        return Err(AppError::BadRequest("Malformed socket id".to_string()));
    }

    let channel = parse_channel(&req.channel_name)?;
    authorize_channel(&session, &channel)?;

    Ok(Json(ChannelAuthResponse {
        auth: state.signer.sign(&req.socket_id, &req.channel_name),
    }))
}
