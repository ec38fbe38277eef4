use bytes::Bytes;

/// One inbound payload delivered by the transport.
///
/// A game socket carries two shapes on one logical channel: JSON control and
/// status messages, and binary physics frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A parsed text payload.
    Json(serde_json::Value),
    /// A raw binary payload.
    Binary(Bytes),
}

impl Message {
    /// Build a binary message from anything convertible into `Bytes`.
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::Binary(payload.into())
    }

    /// Returns true for binary payloads.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Short name of the payload shape, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Binary(_) => "binary",
        }
    }
}

impl From<serde_json::Value> for Message {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(Message::from(serde_json::json!({})).kind_name(), "json");
        assert_eq!(Message::binary(vec![1u8, 2]).kind_name(), "binary");
        assert!(Message::binary(Bytes::new()).is_binary());
    }
}
