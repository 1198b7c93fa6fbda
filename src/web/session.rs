//! Signed-cookie sessions with flash messages.
//!
//! The whole session (signed-in user id plus pending flashes) lives in one
//! cookie: `base64url(json) "." base64url(hmac_sha256(payload))`. A cookie
//! whose signature does not verify, or that fails to decode, is treated as an
//! empty session.

use crate::{
    entities::user,
    errors::{Error, Result},
    web::AppState,
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponseParts, ResponseParts},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{convert::Infallible, sync::Arc};
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Severity of a flash message, matching the page styling classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Warning,
    Danger,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<Flash>,
}

/// Signs and verifies session cookies with the application secret.
#[derive(Clone)]
pub struct SessionSigner {
    key: Arc<[u8]>,
    cookie_name: Arc<str>,
}

impl SessionSigner {
    #[must_use]
    pub fn new(secret_key: &str, cookie_name: &str) -> Self {
        Self {
            key: Arc::from(secret_key.as_bytes()),
            cookie_name: Arc::from(cookie_name),
        }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| Error::Session {
            message: format!("invalid session key: {e}"),
        })
    }

    fn encode(&self, data: &SessionData) -> Result<String> {
        let json = serde_json::to_vec(data).map_err(|e| Error::Session {
            message: format!("failed to serialize session: {e}"),
        })?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    fn decode(&self, cookie: &str) -> Result<SessionData> {
        let invalid = |message: &str| Error::Session {
            message: message.to_string(),
        };
        let (payload, signature) = cookie
            .split_once('.')
            .ok_or_else(|| invalid("malformed session cookie"))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| invalid("malformed session signature"))?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| invalid("session signature mismatch"))?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| invalid("malformed session payload"))?;
        serde_json::from_slice(&json).map_err(|e| Error::Session {
            message: format!("unreadable session payload: {e}"),
        })
    }

    /// Reads this signer's cookie from request headers; anything unusable
    /// yields an empty session.
    fn read(&self, headers: &axum::http::HeaderMap) -> SessionData {
        let Some(value) = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name())
            .map(|(_, value)| value)
        else {
            return SessionData::default();
        };

        self.decode(value).unwrap_or_else(|e| {
            debug!(error = %e, "ignoring session cookie");
            SessionData::default()
        })
    }
}

/// The current request's session.
///
/// Extract it in a handler, mutate it, and return it as part of the response
/// so the updated cookie is written back.
pub struct Session {
    data: SessionData,
    signer: SessionSigner,
}

impl Session {
    /// Id of the signed-in user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    /// Loads the signed-in user. A session naming a removed user counts as
    /// signed out.
    pub async fn current_user(&self, db: &DatabaseConnection) -> Result<Option<user::Model>> {
        match self.data.user_id {
            Some(id) => crate::core::user::get_user_by_id(db, id).await,
            None => Ok(None),
        }
    }

    pub fn login(&mut self, account: &user::Model) {
        self.data.user_id = Some(account.id);
    }

    pub fn logout(&mut self) {
        self.data.user_id = None;
    }

    /// Queues a message for the next rendered page.
    pub fn flash(&mut self, category: FlashCategory, message: impl Into<String>) {
        self.data.flashes.push(Flash {
            category,
            message: message.into(),
        });
    }

    /// Drains every pending flash.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.data.flashes)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let signer = AppState::from_ref(state).signer;
        Ok(Self {
            data: signer.read(&parts.headers),
            signer,
        })
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(
        self,
        mut res: ResponseParts,
    ) -> std::result::Result<ResponseParts, Self::Error> {
        let cookie = self.signer.encode(&self.data).and_then(|value| {
            HeaderValue::from_str(&format!(
                "{}={value}; HttpOnly; SameSite=Lax; Path=/",
                self.signer.cookie_name()
            ))
            .map_err(|e| Error::Session {
                message: format!("session cookie is not a valid header: {e}"),
            })
        });
        match cookie {
            Ok(header) => {
                res.headers_mut().append(header::SET_COOKIE, header);
            }
            Err(e) => warn!(error = %e, "failed to write session cookie"),
        }
        Ok(res)
    }
}
