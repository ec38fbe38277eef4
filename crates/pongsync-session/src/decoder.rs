//! Binary physics frame decoding.
//!
//! Layout, little-endian, no padding:
//!
//! ```text
//! offset  size  field
//!      0     4  ball position x      (f32)
//!      4     4  ball position y      (f32)
//!      8     4  ball velocity x      (f32)
//!     12     4  ball velocity y      (f32)
//!     16     1  out of bounds        (u8, 1 = true)
//!     17     4  ball curve           (f32)
//!     21     1  bounced off surface  (u8)
//!     22  16*n  paddles: width, height, position, speed (f32 each)
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tracing::trace;

use crate::error::DecodeError;

/// Size of the ball state that starts every frame.
pub const HEADER_SIZE: usize = 4 * 4 + 1 + 4 + 1;

/// Size of one paddle record.
pub const PADDLE_RECORD_SIZE: usize = 4 * 4;

/// Full frame length for `paddle_count` paddles.
pub fn frame_len(paddle_count: usize) -> usize {
    PADDLE_RECORD_SIZE
        .saturating_mul(paddle_count)
        .saturating_add(HEADER_SIZE)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Ball kinematics carried by every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BallState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub is_out_of_bounds: bool,
    pub curve: f32,
    /// Server-side counter of which surface the ball last bounced off.
    pub bounced_off_surface: u8,
}

/// Per-paddle physics carried by every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PaddleState {
    pub width: f32,
    pub height: f32,
    pub position: f32,
    pub speed: f32,
}

/// One fully decoded frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFrame {
    pub ball: BallState,
    /// Exactly `paddle_count` records, in roster order.
    pub paddles: Vec<PaddleState>,
}

/// Forward-only reader over a frame buffer.
///
/// Every typed read goes through [`FrameCursor::take`], the only place that
/// checks bounds and moves the offset.
struct FrameCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> FrameCursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.offset.checked_add(N)?;
        let bytes: [u8; N] = self.buf.get(self.offset..end)?.try_into().ok()?;
        self.offset = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[byte]| byte)
    }

    fn read_f32(&mut self) -> Option<f32> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }
}

fn read_ball(cursor: &mut FrameCursor<'_>) -> Option<BallState> {
    Some(BallState {
        position: Vec2::new(cursor.read_f32()?, cursor.read_f32()?),
        velocity: Vec2::new(cursor.read_f32()?, cursor.read_f32()?),
        is_out_of_bounds: cursor.read_u8()? == 1,
        curve: cursor.read_f32()?,
        bounced_off_surface: cursor.read_u8()?,
    })
}

fn read_paddle(cursor: &mut FrameCursor<'_>) -> Option<PaddleState> {
    Some(PaddleState {
        width: cursor.read_f32()?,
        height: cursor.read_f32()?,
        position: cursor.read_f32()?,
        speed: cursor.read_f32()?,
    })
}

/// Decode a frame carrying `paddle_count` paddle records.
///
/// Both length checks happen before anything is decoded, so an error never
/// comes with partial output. Bytes past the last paddle record are ignored.
pub fn decode(buf: &[u8], paddle_count: usize) -> Result<DecodedFrame, DecodeError> {
    let actual = buf.len();
    let header_err = DecodeError::TruncatedHeader {
        expected: HEADER_SIZE,
        actual,
    };
    if actual < HEADER_SIZE {
        return Err(header_err);
    }

    let expected = frame_len(paddle_count);
    let paddle_err = DecodeError::TruncatedPaddleData { expected, actual };
    if actual < expected {
        return Err(paddle_err);
    }

    let mut cursor = FrameCursor::new(buf);
    let ball = read_ball(&mut cursor).ok_or(header_err)?;
    let paddles = (0..paddle_count)
        .map(|_| read_paddle(&mut cursor))
        .collect::<Option<Vec<_>>>()
        .ok_or(paddle_err)?;

    if cursor.remaining() > 0 {
        trace!(trailing = cursor.remaining(), "ignoring trailing frame bytes");
    }

    Ok(DecodedFrame { ball, paddles })
}

/// Encode a frame in the layout [`decode`] reads.
pub fn encode(frame: &DecodedFrame) -> Bytes {
    let mut buf = BytesMut::with_capacity(frame_len(frame.paddles.len()));
    let ball = &frame.ball;
    buf.put_f32_le(ball.position.x);
    buf.put_f32_le(ball.position.y);
    buf.put_f32_le(ball.velocity.x);
    buf.put_f32_le(ball.velocity.y);
    buf.put_u8(u8::from(ball.is_out_of_bounds));
    buf.put_f32_le(ball.curve);
    buf.put_u8(ball.bounced_off_surface);
    for paddle in &frame.paddles {
        buf.put_f32_le(paddle.width);
        buf.put_f32_le(paddle.height);
        buf.put_f32_le(paddle.position);
        buf.put_f32_le(paddle.speed);
    }
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(paddle_count: usize) -> DecodedFrame {
        DecodedFrame {
            ball: BallState {
                position: Vec2::new(1.5, -2.0),
                velocity: Vec2::new(0.0, 0.0),
                is_out_of_bounds: false,
                curve: 0.1,
                bounced_off_surface: 2,
            },
            paddles: (0..paddle_count)
                .map(|i| PaddleState {
                    width: 10.0,
                    height: 50.0,
                    position: 100.0 + i as f32,
                    speed: 5.0,
                })
                .collect(),
        }
    }

    #[test]
    fn header_size_matches_layout() {
        assert_eq!(HEADER_SIZE, 22);
        assert_eq!(frame_len(0), 22);
        assert_eq!(frame_len(1), 38);
        assert_eq!(frame_len(usize::MAX), usize::MAX);
    }

    #[test]
    fn short_buffers_fail_with_truncated_header() {
        for len in 0..HEADER_SIZE {
            let buf = vec![0u8; len];
            for paddle_count in [0, 1, 4] {
                assert_eq!(
                    decode(&buf, paddle_count),
                    Err(DecodeError::TruncatedHeader {
                        expected: 22,
                        actual: len
                    })
                );
            }
        }
    }

    #[test]
    fn exact_length_decodes_every_paddle_in_order() {
        for paddle_count in 0..6 {
            let frame = sample_frame(paddle_count);
            let wire = encode(&frame);
            assert_eq!(wire.len(), frame_len(paddle_count));

            let decoded = decode(&wire, paddle_count).unwrap();
            assert_eq!(decoded.paddles.len(), paddle_count);
            assert_eq!(decoded, frame);
        }
    }

    #[test]
    fn partial_paddle_data_reports_expected_length() {
        let paddle_count = 3;
        let wire = encode(&sample_frame(paddle_count));
        for len in HEADER_SIZE..frame_len(paddle_count) {
            assert_eq!(
                decode(&wire[..len], paddle_count),
                Err(DecodeError::TruncatedPaddleData {
                    expected: 70,
                    actual: len
                })
            );
        }
    }

    #[test]
    fn twenty_three_bytes_with_one_paddle() {
        let buf = [0u8; 23];
        assert_eq!(
            decode(&buf, 1),
            Err(DecodeError::TruncatedPaddleData {
                expected: 38,
                actual: 23
            })
        );
    }

    #[test]
    fn decodes_hand_built_frame() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1.5f32.to_le_bytes());
        buf.extend_from_slice(&(-2.0f32).to_le_bytes());
        buf.extend_from_slice(&0.0f32.to_le_bytes());
        buf.extend_from_slice(&0.0f32.to_le_bytes());
        buf.push(0);
        buf.extend_from_slice(&0.1f32.to_le_bytes());
        buf.push(2);
        for value in [10.0f32, 50.0, 100.0, 5.0] {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        assert_eq!(buf.len(), 38);

        let frame = decode(&buf, 1).unwrap();
        assert_eq!(frame.ball.position, Vec2::new(1.5, -2.0));
        assert_eq!(frame.ball.velocity, Vec2::new(0.0, 0.0));
        assert!(!frame.ball.is_out_of_bounds);
        assert_eq!(frame.ball.curve, 0.1);
        assert_eq!(frame.ball.bounced_off_surface, 2);
        assert_eq!(
            frame.paddles,
            vec![PaddleState {
                width: 10.0,
                height: 50.0,
                position: 100.0,
                speed: 5.0,
            }]
        );
    }

    #[test]
    fn out_of_bounds_only_when_flag_is_one() {
        let mut wire = encode(&sample_frame(0)).to_vec();
        wire[16] = 1;
        assert!(decode(&wire, 0).unwrap().ball.is_out_of_bounds);
        wire[16] = 2;
        assert!(!decode(&wire, 0).unwrap().ball.is_out_of_bounds);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let frame = sample_frame(2);
        let mut wire = encode(&frame).to_vec();
        wire.extend_from_slice(&[0xAA; 7]);
        assert_eq!(decode(&wire, 2).unwrap(), frame);
    }

    #[test]
    fn decoding_is_deterministic() {
        let wire = encode(&sample_frame(2));
        assert_eq!(decode(&wire, 2), decode(&wire, 2));
    }
}
