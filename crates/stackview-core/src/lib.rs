//! # Stackview Core
//!
//! Data model for the layer stack viewer: encoded per-layer datasets as they
//! arrive from the exporter, the technology layer stack presets, the integer
//! ring geometry used when writing datasets, and the GPU-ready mesh buffers
//! produced by tessellation.

pub mod dataset;
pub mod geometry;
pub mod layer;
pub mod mesh;

pub use dataset::{Dataset, LayerDataset};
pub use geometry::{BBox, Facing, GridPoint, Ring};
pub use layer::{LayerColor, LayerSpec, LayerStack};
pub use mesh::LayerMesh;
