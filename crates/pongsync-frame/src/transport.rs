use std::io::Write;

use pongsync_transport::{SocketStream, Transport, TransportError};
use tracing::debug;

use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};
use crate::writer::MessageWriter;

/// A byte stream that can be closed after the last message.
pub trait CloseStream: Write {
    /// Close the stream. Defaults to a flush.
    fn close_stream(&mut self) -> std::io::Result<()> {
        self.flush()
    }
}

impl CloseStream for SocketStream {
    fn close_stream(&mut self) -> std::io::Result<()> {
        self.shutdown().map_err(|err| match err {
            TransportError::Io(io) => io,
            other => std::io::Error::other(other.to_string()),
        })
    }
}

impl CloseStream for Vec<u8> {}

impl CloseStream for std::io::Cursor<Vec<u8>> {}

/// [`Transport`] that sends commands as framed text messages.
pub struct FramedTransport<W> {
    writer: MessageWriter<W>,
    closed: bool,
}

impl<W: CloseStream> FramedTransport<W> {
    /// Wrap a writable stream.
    pub fn new(inner: W) -> Self {
        Self::from_writer(MessageWriter::new(inner))
    }

    /// Wrap an already configured writer.
    pub fn from_writer(writer: MessageWriter<W>) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    /// Borrow the underlying writer.
    pub fn writer(&self) -> &MessageWriter<W> {
        &self.writer
    }

    /// Returns true once `close` was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FramedTransport<SocketStream> {
    /// Wrap a game socket, applying the write timeout from `config`.
    pub fn socket(stream: SocketStream, config: FrameConfig) -> Result<Self> {
        Ok(Self::from_writer(MessageWriter::with_config_socket(
            stream, config,
        )?))
    }
}

impl<W: CloseStream> Transport for FramedTransport<W> {
    fn send(&mut self, message: &serde_json::Value) -> pongsync_transport::Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.writer.send_json(message).map_err(frame_to_transport_error)
    }

    fn close(&mut self) -> pongsync_transport::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("closing framed transport");
        self.writer.get_mut().close_stream()?;
        Ok(())
    }
}

fn frame_to_transport_error(err: FrameError) -> TransportError {
    match err {
        FrameError::Io(io) => TransportError::Io(io),
        FrameError::InvalidJson(json) => TransportError::Encode(json),
        FrameError::ConnectionClosed => TransportError::Closed,
        other => TransportError::Io(std::io::Error::other(other.to_string())),
    }
}
