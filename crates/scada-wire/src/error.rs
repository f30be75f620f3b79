use thiserror::Error;

/// Failures from encoding or decoding a [`crate::Packet`] on the wire.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to encode packet: {0}")]
    Encode(#[source] postcard::Error),

    #[error("failed to decode packet: {0}")]
    Decode(#[source] postcard::Error),

    #[error("frame length {length} exceeds the maximum of {max}")]
    FrameTooLarge { length: u32, max: u32 },
}
