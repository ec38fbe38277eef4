//! Control-message reduction.
//!
//! The server sends JSON status messages such as
//! `{"type": "game_state", "status": 2, "leftScore": 3, "winner": 0}`.
//! Only the keys below are read. Every key is optional, and a missing key
//! leaves its slot alone.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

pub const KEY_ERROR: &str = "error";
pub const KEY_STATUS: &str = "status";
pub const KEY_LEFT_SCORE: &str = "leftScore";
pub const KEY_RIGHT_SCORE: &str = "rightScore";
pub const KEY_IS_DEUCE: &str = "isDeuce";
pub const KEY_IS_LEFT_ADVANTAGE: &str = "isLeftAdvantage";
pub const KEY_IS_RIGHT_ADVANTAGE: &str = "isRightAdvantage";
pub const KEY_WINNER: &str = "winner";

/// Scalar match state mirrored from the server's status messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    /// Server game status code.
    pub status: i64,
    pub left_score: u32,
    pub right_score: u32,
    pub is_deuce: bool,
    pub is_left_advantage: bool,
    pub is_right_advantage: bool,
    /// Winner identifier as sent by the server; `None` until one is sent.
    pub winner: Option<i64>,
    /// Last error reported by the server or the transport. Empty when none.
    pub error: String,
}

/// Apply one control message to `current`, returning the updated slots.
///
/// Non-object messages and unknown keys are ignored. A recognized key with a
/// value of the wrong type is logged and skipped; the rest of the message
/// still applies. `null` clears the optional slots (`winner`, `error`).
pub fn reduce(message: &Value, current: &Scoreboard) -> Scoreboard {
    let mut next = current.clone();
    let Some(fields) = message.as_object() else {
        return next;
    };

    if let Some(error) = nullable::<String>(fields, KEY_ERROR) {
        next.error = error.unwrap_or_default();
    }
    if let Some(status) = slot(fields, KEY_STATUS) {
        next.status = status;
    }
    if let Some(score) = slot(fields, KEY_LEFT_SCORE) {
        next.left_score = score;
    }
    if let Some(score) = slot(fields, KEY_RIGHT_SCORE) {
        next.right_score = score;
    }
    if let Some(flag) = slot(fields, KEY_IS_DEUCE) {
        next.is_deuce = flag;
    }
    if let Some(flag) = slot(fields, KEY_IS_LEFT_ADVANTAGE) {
        next.is_left_advantage = flag;
    }
    if let Some(flag) = slot(fields, KEY_IS_RIGHT_ADVANTAGE) {
        next.is_right_advantage = flag;
    }
    if let Some(winner) = nullable(fields, KEY_WINNER) {
        next.winner = winner;
    }

    next
}

fn slot<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(key, %value, error = %err, "ignoring mistyped control field");
            None
        }
    }
}

/// Like [`slot`], but a present `null` yields `Some(None)`.
fn nullable<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<Option<T>> {
    match fields.get(key)? {
        Value::Null => Some(None),
        _ => slot(fields, key).map(Some),
    }
}
