use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::WireError;

/// Size of the length prefix in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Largest payload a frame may carry, guarding against a corrupt length
/// prefix turning into an unbounded allocation.
pub const MAX_FRAME_LEN: u32 = 1 << 20;

/// A length-delimited frame: `[u32 length BE][payload]`, `length` excluding
/// the header itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Bytes,
}

impl Frame {
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Attempts to split one complete frame off the front of `buf`.
    ///
    /// Returns `Ok(None)` when `buf` does not yet hold a full frame — the
    /// caller should keep reading from the socket and retry.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Frame>, WireError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let length = u32::from_be_bytes(buf[..FRAME_HEADER_SIZE].try_into().unwrap());
        if length > MAX_FRAME_LEN {
            return Err(WireError::FrameTooLarge {
                length,
                max: MAX_FRAME_LEN,
            });
        }

        let total = FRAME_HEADER_SIZE + length as usize;
        if buf.len() < total {
            return Ok(None);
        }

        let mut frame_bytes = buf.split_to(total);
        let payload = frame_bytes.split_off(FRAME_HEADER_SIZE).freeze();
        Ok(Some(Frame { payload }))
    }

    /// Appends this frame's header and payload to `out`.
    pub fn encode(&self, out: &mut BytesMut) {
        out.reserve(FRAME_HEADER_SIZE + self.payload.len());
        out.put_u32(self.payload.len() as u32);
        out.put_slice(&self.payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_waits_for_full_frame() {
        let mut buf = BytesMut::new();
        buf.put_u32(5);
        buf.put_slice(b"abc");
        assert_eq!(Frame::decode(&mut buf).unwrap(), None);

        buf.put_slice(b"de");
        let frame = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame.payload[..], b"abcde");
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_decode_round_trip() {
        let frame = Frame::new(Bytes::from_static(b"hello"));
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        let decoded = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn oversized_length_prefix_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAX_FRAME_LEN + 1);
        assert!(Frame::decode(&mut buf).is_err());
    }

    #[test]
    fn leaves_trailing_bytes_for_next_frame() {
        let mut buf = BytesMut::new();
        Frame::new(Bytes::from_static(b"one")).encode(&mut buf);
        Frame::new(Bytes::from_static(b"two")).encode(&mut buf);

        let first = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first.payload[..], b"one");
        let second = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(&second.payload[..], b"two");
        assert!(buf.is_empty());
    }
}
