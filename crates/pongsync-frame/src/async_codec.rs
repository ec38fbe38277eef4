//! `tokio_util` codec for game sockets.

use bytes::BytesMut;
use pongsync_transport::Message;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_envelope, encode_message, FrameConfig};
use crate::error::FrameError;

/// Decodes inbound [`Message`]s and encodes outbound ones over tokio I/O.
#[derive(Debug, Clone, Default)]
pub struct SocketCodec {
    config: FrameConfig,
}

impl SocketCodec {
    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for SocketCodec {
    type Item = Message;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match decode_envelope(src, self.config.max_payload_size)? {
            Some(envelope) => envelope.into_message().map(Some),
            None => Ok(None),
        }
    }
}

impl Encoder<Message> for SocketCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_message(&item, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;

    #[tokio::test]
    async fn framed_roundtrip() {
        let mut sink = FramedWrite::new(Vec::new(), SocketCodec::default());
        sink.send(Message::Json(json!({"status": 3}))).await.unwrap();
        sink.send(Message::binary(vec![5u8; 22])).await.unwrap();
        let wire = sink.into_inner();

        let mut stream = FramedRead::new(wire.as_slice(), SocketCodec::default());
        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            Message::Json(json!({"status": 3}))
        );
        assert_eq!(
            stream.next().await.unwrap().unwrap(),
            Message::binary(vec![5u8; 22])
        );
        assert!(stream.next().await.is_none());
    }
}
