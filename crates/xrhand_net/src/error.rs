//! Wire-layer error types.

/// Errors that can occur while decoding telemetry datagrams.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    /// The datagram is not exactly one packet long.
    #[error("malformed packet: expected {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },

    /// The leading tag is not `HND0`.
    #[error("malformed packet: bad header tag {0:?}")]
    BadHeader([u8; 4]),

    /// The trailing tag is not `HND1`.
    #[error("malformed packet: bad footer tag {0:?}")]
    BadFooter([u8; 4]),
}
