//! Outbound commands.
//!
//! Every command is one JSON object with an `action` discriminator:
//!
//! | action              | payload                                   |
//! |---------------------|-------------------------------------------|
//! | `start`             | `data`: settings, controllers as `{side, name}` |
//! | `stop`              | none                                      |
//! | `pause`             | none                                      |
//! | `resume`            | none                                      |
//! | `update_paddle`     | snake_case fields inline                  |
//! | `update_dimensions` | snake_case fields inline                  |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, SessionError};
use crate::settings::GameSettings;

pub const ACTION_START: &str = "start";
pub const ACTION_STOP: &str = "stop";
pub const ACTION_PAUSE: &str = "pause";
pub const ACTION_RESUME: &str = "resume";
pub const ACTION_UPDATE_PADDLE: &str = "update_paddle";
pub const ACTION_UPDATE_DIMENSIONS: &str = "update_dimensions";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start(GameSettings),
    Stop,
    Pause,
    Resume,
    /// Fields already converted to snake_case.
    UpdatePaddle(Map<String, Value>),
    /// Fields already converted to snake_case.
    UpdateDimensions(Map<String, Value>),
}

impl Command {
    /// Build an `update_paddle` command from any object-shaped payload.
    pub fn update_paddle<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        snake_case_fields(ACTION_UPDATE_PADDLE, data).map(Self::UpdatePaddle)
    }

    /// Build an `update_dimensions` command from any object-shaped payload.
    pub fn update_dimensions<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        snake_case_fields(ACTION_UPDATE_DIMENSIONS, data).map(Self::UpdateDimensions)
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Start(_) => ACTION_START,
            Self::Stop => ACTION_STOP,
            Self::Pause => ACTION_PAUSE,
            Self::Resume => ACTION_RESUME,
            Self::UpdatePaddle(_) => ACTION_UPDATE_PADDLE,
            Self::UpdateDimensions(_) => ACTION_UPDATE_DIMENSIONS,
        }
    }

    /// The JSON object sent on the wire.
    pub fn to_value(&self) -> Result<Value> {
        let mut message = Map::new();
        match self {
            Self::Start(settings) => {
                message.insert("data".to_string(), settings.to_wire()?);
            }
            Self::Stop | Self::Pause | Self::Resume => {}
            Self::UpdatePaddle(fields) | Self::UpdateDimensions(fields) => {
                message.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        // Inserted last so a payload field can never shadow it.
        message.insert("action".to_string(), Value::from(self.action()));
        Ok(Value::Object(message))
    }
}

fn snake_case_fields<T: Serialize + ?Sized>(
    action: &'static str,
    data: &T,
) -> Result<Map<String, Value>> {
    match serde_json::to_value(data)? {
        Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(key, value)| (to_snake_case(&key), value))
            .collect()),
        other => Err(SessionError::InvalidPayload {
            action,
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert a field name to the server's lowercase-with-underscores style.
///
/// `ballWidth` → `ball_width`, `HTTPServer` → `http_server`,
/// `paddle-name` → `paddle_name`. Already snake_case names pass through.
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}
