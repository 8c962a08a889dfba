//! Scroll cursor codec
//!
//! A cursor is a self-contained continuation token: the last hit's sort
//! values, the backend session id and the session's expiration instant,
//! serialized as JSON and wrapped in URL-safe base64 without padding. The
//! envelope is our own; it never embeds a backend-native pagination token.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use docsearch_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A session this close to expiring is not reused
pub const SESSION_REUSE_MARGIN_MS: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollCursor {
    sort: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pit_id: Option<String>,

    /// Epoch milliseconds; 0 when no session is bound
    #[serde(default)]
    expiration_time: i64,
}

impl ScrollCursor {
    pub fn new(sort: Vec<Value>, pit_id: Option<String>, expiration_time: i64) -> Result<Self> {
        if sort.is_empty() {
            return Err(Error::invalid_cursor("sort values must not be empty"));
        }
        Ok(Self {
            sort,
            pit_id,
            expiration_time,
        })
    }

    pub fn sort(&self) -> &[Value] {
        &self.sort
    }

    pub fn pit_id(&self) -> Option<&str> {
        self.pit_id.as_deref()
    }

    pub fn expiration_time(&self) -> i64 {
        self.expiration_time
    }

    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| Error::invalid_cursor(format!("not base64: {e}")))?;
        let cursor: Self = serde_json::from_slice(&bytes)
            .map_err(|e| Error::invalid_cursor(format!("malformed envelope: {e}")))?;
        if cursor.sort.is_empty() {
            return Err(Error::invalid_cursor("sort values must not be empty"));
        }
        Ok(cursor)
    }

    /// Session id worth resuming at `now_ms`
    ///
    /// Returns `None` when the cursor carries no session or the session
    /// expires within [`SESSION_REUSE_MARGIN_MS`].
    pub fn live_session_id(&self, now_ms: i64) -> Option<&str> {
        self.pit_id
            .as_deref()
            .filter(|_| self.expiration_time.saturating_sub(now_ms) > SESSION_REUSE_MARGIN_MS)
    }
}
