//! Telemetry packet codec.
//!
//! Every datagram the producer sends is exactly [`PACKET_SIZE`] bytes, all
//! multi-byte fields little-endian:
//!
//! ```text
//! ┌────────┬──────────────┬────────────────────────────────────┬────────┐
//! │ "HND0" │ f64 unix ts  │ 371 × f32: left(182) right(182)     │ "HND1" │
//! │ 4 B    │ 8 B          │ head(7)                  1484 B     │ 4 B    │
//! └────────┴──────────────┴────────────────────────────────────┴────────┘
//! ```
//!
//! There is no version field. Changing the bone count or the float order
//! requires a new header tag.

use xrhand_math::HAND_BONES;
use xrhand_math::transform::TRANSFORM_FLOATS;

use crate::error::NetError;

/// Leading tag of every packet.
pub const HEADER_TAG: [u8; 4] = *b"HND0";

/// Trailing tag of every packet.
pub const FOOTER_TAG: [u8; 4] = *b"HND1";

/// Floats per encoded hand: root + 25 fingers, seven floats each.
pub const HAND_FLOATS: usize = HAND_BONES * TRANSFORM_FLOATS;

/// Floats for the head pose.
pub const HEAD_FLOATS: usize = TRANSFORM_FLOATS;

/// Total floats in a packet body.
pub const FLOAT_COUNT: usize = 2 * HAND_FLOATS + HEAD_FLOATS;

const TIMESTAMP_OFFSET: usize = HEADER_TAG.len();
const FLOATS_OFFSET: usize = TIMESTAMP_OFFSET + size_of::<f64>();
const FOOTER_OFFSET: usize = FLOATS_OFFSET + FLOAT_COUNT * size_of::<f32>();

/// Size of every telemetry datagram, in bytes.
pub const PACKET_SIZE: usize = FOOTER_OFFSET + FOOTER_TAG.len();

const _: () = assert!(PACKET_SIZE == 1500);

/// One broadcast tick worth of telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPacket {
    /// Wall-clock capture time, seconds since the Unix epoch (UTC).
    pub timestamp: f64,
    /// Packet body in wire order: left hand, right hand, head.
    pub floats: [f32; FLOAT_COUNT],
}

impl TelemetryPacket {
    /// Assemble a packet from its three encoded sections.
    #[must_use]
    pub fn new(
        timestamp: f64,
        left: &[f32; HAND_FLOATS],
        right: &[f32; HAND_FLOATS],
        head: &[f32; HEAD_FLOATS],
    ) -> Self {
        let mut floats = [0.0; FLOAT_COUNT];
        floats[..HAND_FLOATS].copy_from_slice(left);
        floats[HAND_FLOATS..2 * HAND_FLOATS].copy_from_slice(right);
        floats[2 * HAND_FLOATS..].copy_from_slice(head);
        Self { timestamp, floats }
    }

    #[must_use]
    pub fn left(&self) -> &[f32] {
        &self.floats[..HAND_FLOATS]
    }

    #[must_use]
    pub fn right(&self) -> &[f32] {
        &self.floats[HAND_FLOATS..2 * HAND_FLOATS]
    }

    #[must_use]
    pub fn head(&self) -> &[f32] {
        &self.floats[2 * HAND_FLOATS..]
    }

    /// Serialise into a datagram.
    #[must_use]
    pub fn encode(&self) -> [u8; PACKET_SIZE] {
        encode(self.timestamp, &self.floats)
    }

    /// Parse a datagram.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, NetError> {
        decode(bytes)
    }
}

/// Encode a timestamp and packet body into a datagram.
#[must_use]
pub fn encode(timestamp: f64, floats: &[f32; FLOAT_COUNT]) -> [u8; PACKET_SIZE] {
    let mut buf = [0u8; PACKET_SIZE];
    buf[..TIMESTAMP_OFFSET].copy_from_slice(&HEADER_TAG);
    buf[TIMESTAMP_OFFSET..FLOATS_OFFSET].copy_from_slice(&timestamp.to_le_bytes());
    for (slot, value) in buf[FLOATS_OFFSET..FOOTER_OFFSET]
        .chunks_exact_mut(size_of::<f32>())
        .zip(floats)
    {
        slot.copy_from_slice(&value.to_le_bytes());
    }
    buf[FOOTER_OFFSET..].copy_from_slice(&FOOTER_TAG);
    buf
}

/// Decode a datagram into a [`TelemetryPacket`].
///
/// # Errors
///
/// Returns [`NetError::BadLength`] unless `bytes` is exactly
/// [`PACKET_SIZE`] long, then [`NetError::BadHeader`] or
/// [`NetError::BadFooter`] if either tag does not match.
pub fn decode(bytes: &[u8]) -> Result<TelemetryPacket, NetError> {
    if bytes.len() != PACKET_SIZE {
        return Err(NetError::BadLength {
            expected: PACKET_SIZE,
            actual: bytes.len(),
        });
    }

    let header: [u8; 4] = read_array(bytes, 0);
    if header != HEADER_TAG {
        return Err(NetError::BadHeader(header));
    }
    let footer: [u8; 4] = read_array(bytes, FOOTER_OFFSET);
    if footer != FOOTER_TAG {
        return Err(NetError::BadFooter(footer));
    }

    let timestamp = f64::from_le_bytes(read_array(bytes, TIMESTAMP_OFFSET));
    let mut floats = [0.0f32; FLOAT_COUNT];
    for (value, chunk) in floats
        .iter_mut()
        .zip(bytes[FLOATS_OFFSET..FOOTER_OFFSET].chunks_exact(size_of::<f32>()))
    {
        *value = f32::from_le_bytes(read_array(chunk, 0));
    }

    Ok(TelemetryPacket { timestamp, floats })
}

// Callers validate the length up front.
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}
