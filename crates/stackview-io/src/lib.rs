//! # Stackview I/O
//!
//! Decoding and encoding of the layer dataset: the varint stream codec,
//! ring reconstruction into extruded vertex buffers, side-wall
//! classification, cap index decoding, and JSON dataset files.

pub mod caps;
pub mod error;
pub mod files;
pub mod rings;
pub mod tessellate;
pub mod varint;
pub mod walls;
pub mod writer;

pub use caps::{decode_cap_indices, CapIndexDecoder};
pub use error::DatasetError;
pub use files::{load_dataset, save_dataset, DatasetReader, DatasetWriter};
pub use rings::RingAssembler;
pub use tessellate::{tessellate_dataset, tessellate_layer};
pub use varint::{
    decode_base64, decode_varints, encode_base64, encode_varints, VarintEncoding, VarintReader,
    VarintWriter,
};
pub use walls::{side_quad, SideWallClassifier};
pub use writer::{write_dataset, LayerWriter};
