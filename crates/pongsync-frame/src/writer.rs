use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use pongsync_transport::{Message, SocketStream};

use crate::codec::{encode_envelope, FrameConfig};
use crate::error::{FrameError, Result};
use crate::kind::{BINARY, TEXT};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete messages to any `Write` stream.
pub struct MessageWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> MessageWriter<T> {
    /// Create a new writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write one message, serializing JSON as text.
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        match message {
            Message::Json(value) => self.send_json(value),
            Message::Binary(payload) => self.send_binary(payload),
        }
    }

    /// Serialize and send a JSON value as a text message.
    pub fn send_json(&mut self, value: &serde_json::Value) -> Result<()> {
        let text = serde_json::to_vec(value)?;
        self.send(TEXT, &text)
    }

    /// Send a binary message.
    pub fn send_binary(&mut self, payload: &[u8]) -> Result<()> {
        self.send(BINARY, payload)
    }

    /// Encode and send a payload of the given kind.
    pub fn send(&mut self, kind: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_envelope(kind, payload, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl MessageWriter<SocketStream> {
    /// Create a writer for a game socket and apply the write timeout.
    pub fn with_config_socket(inner: SocketStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::json;

    use super::*;
    use crate::codec::{decode_envelope, DEFAULT_MAX_PAYLOAD};

    fn written(writer: MessageWriter<Cursor<Vec<u8>>>) -> BytesMut {
        BytesMut::from(writer.into_inner().into_inner().as_slice())
    }

    #[test]
    fn json_is_written_as_text() {
        let mut writer = MessageWriter::new(Cursor::new(Vec::new()));
        writer.send_json(&json!({"action": "stop"})).unwrap();

        let mut wire = written(writer);
        let envelope = decode_envelope(&mut wire, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(envelope.kind, TEXT);
        assert_eq!(envelope.payload.as_ref(), br#"{"action":"stop"}"#);
    }

    #[test]
    fn write_message_dispatches_on_shape() {
        let mut writer = MessageWriter::new(Cursor::new(Vec::new()));
        writer.write_message(&Message::binary(vec![1u8; 4])).unwrap();
        writer
            .write_message(&Message::Json(json!({"action": "pause"})))
            .unwrap();

        let mut wire = written(writer);
        let first = decode_envelope(&mut wire, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        let second = decode_envelope(&mut wire, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(first.kind, BINARY);
        assert_eq!(second.kind, TEXT);
    }

    #[test]
    fn oversized_payload_rejected_before_write() {
        let cfg = FrameConfig {
            max_payload_size: 8,
            ..FrameConfig::default()
        };
        let mut writer = MessageWriter::with_config(Cursor::new(Vec::new()), cfg);
        assert!(matches!(
            writer.send_binary(&[0u8; 9]),
            Err(FrameError::PayloadTooLarge { size: 9, max: 8 })
        ));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    #[test]
    fn zero_write_reports_closed() {
        let mut writer = MessageWriter::new(ZeroWriter);
        assert!(matches!(
            writer.send_json(&json!({})),
            Err(FrameError::ConnectionClosed)
        ));
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
