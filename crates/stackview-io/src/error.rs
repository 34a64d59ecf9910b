use std::io;
use thiserror::Error;

use stackview_core::Facing;

use crate::varint::VarintEncoding;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 stream: {0}")]
    Base64(#[from] base64::DecodeError),

    // ── Malformed streams ────────────────────────────────────────────

    #[error("Varint stream is empty (missing encoding selector)")]
    EmptyStream,

    #[error("Unknown varint encoding selector {0}")]
    UnknownEncoding(u8),

    #[error("Truncated integer at offset {offset}: needs {width} bytes, {available} available")]
    Truncated {
        offset: usize,
        width: usize,
        available: usize,
    },

    #[error("Ring {ring} declares {size} points")]
    InvalidRingSize { ring: usize, size: i64 },

    #[error("Stream ended inside a ring ({remaining} values still expected)")]
    UnfinishedRing { remaining: usize },

    // ── Dataset consistency ──────────────────────────────────────────

    #[error("Declared {field} of {declared} exceeds the {limit} the stream can hold")]
    DeclaredCountTooLarge {
        field: &'static str,
        declared: usize,
        limit: usize,
    },

    #[error("Ring stream holds more than the declared {declared} points")]
    PointOverflow { declared: usize },

    #[error("Declared {declared} ring points but decoded {decoded}")]
    PointCountMismatch { declared: usize, decoded: usize },

    #[error("More {} walls than the {capacity} reserved", .facing.name())]
    EdgeOverflow { facing: Facing, capacity: usize },

    #[error("Declared {declared} {} walls but decoded {decoded}", .facing.name())]
    EdgeCountMismatch {
        facing: Facing,
        declared: usize,
        decoded: usize,
    },

    #[error("Cap index {index} outside vertex buffer of {vertices} vertices")]
    CapIndexOutOfRange { index: i64, vertices: usize },

    #[error("Declared {declared} cap indices but decoded {decoded}")]
    CapCountMismatch { declared: usize, decoded: usize },

    #[error("Coordinate range {0:?} is empty but the layer has points")]
    EmptyRange([u32; 2]),

    // ── Encoding ─────────────────────────────────────────────────────

    #[error("Value {value} does not fit the {encoding:?} encoding")]
    ValueOutOfRange { value: i64, encoding: VarintEncoding },

    #[error("Ring {ring} is not rectilinear at point {point}")]
    NonRectilinear { ring: usize, point: usize },

    #[error("Triangle index {index} refers past the {points} ring points")]
    TriangleIndexOutOfRange { index: u32, points: usize },
}

impl DatasetError {
    /// True for errors caused by bytes that cannot be a valid stream at all,
    /// as opposed to a stream that disagrees with its layer's declared counts.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DatasetError::Base64(_)
                | DatasetError::EmptyStream
                | DatasetError::UnknownEncoding(_)
                | DatasetError::Truncated { .. }
                | DatasetError::InvalidRingSize { .. }
                | DatasetError::UnfinishedRing { .. }
        )
    }
}

/// Reject a declared count the encoded data cannot back, and return the
/// element count `declared * stride` to allocate for it.
pub(crate) fn checked_capacity(
    field: &'static str,
    declared: usize,
    limit: usize,
    stride: usize,
) -> Result<usize, DatasetError> {
    let too_large = DatasetError::DeclaredCountTooLarge {
        field,
        declared,
        limit,
    };
    if declared > limit {
        return Err(too_large);
    }
    declared.checked_mul(stride).ok_or(too_large)
}
