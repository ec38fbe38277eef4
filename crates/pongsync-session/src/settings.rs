//! Match configuration sent with the `start` command.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Which side of the court a controller plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One paddle controller.
///
/// `controlled_by` and any other extra fields describe the local control
/// scheme. They stay on the client; only `side` and `name` go on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub side: Side,
    pub name: String,
    #[serde(
        rename = "controlledBy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub controlled_by: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Controller {
    pub fn new(side: Side, name: impl Into<String>) -> Self {
        Self {
            side,
            name: name.into(),
            controlled_by: None,
            extra: Map::new(),
        }
    }

    /// The `{side, name}` form sent to the server.
    pub fn to_wire(&self) -> Value {
        serde_json::json!({ "side": self.side, "name": self.name })
    }
}

/// Scoring rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Points needed to win.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_score: Option<u32>,
    /// Deuce option code; the server enables deuce when this is 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deuce_on: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ball behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gameplay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_speed: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ball_curve: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings applied by `start`. Unknown keys are kept and forwarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gameplay: Option<Gameplay>,
    #[serde(default)]
    pub controllers: Vec<Controller>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameSettings {
    /// Parse settings from a JSON value.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Controller names in roster order.
    pub fn paddle_names(&self) -> impl Iterator<Item = &str> {
        self.controllers.iter().map(|controller| controller.name.as_str())
    }

    /// The `data` payload of the `start` command: every setting, with the
    /// controller list reduced to `{side, name}`.
    pub fn to_wire(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut value {
            fields.insert(
                "controllers".to_string(),
                self.controllers.iter().map(Controller::to_wire).collect(),
            );
        }
        Ok(value)
    }
}
