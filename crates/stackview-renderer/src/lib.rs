//! # Stackview Renderer
//!
//! Camera model, pointer-anchored pan/zoom, and per-frame draw orchestration
//! for the extruded layer stack. Drawing goes through the [`RenderBackend`]
//! trait; shader and buffer management live in the backend implementation.

pub mod backend;
pub mod camera;
pub mod error;
pub mod pan_zoom;
pub mod render_data;
pub mod settings;
pub mod viewer;

pub use backend::RenderBackend;
pub use camera::{Camera, CameraState};
pub use error::ViewerError;
pub use pan_zoom::{PanZoomController, PointerEvent};
pub use render_data::{layer_alpha, IndexRange, RenderLayer};
pub use settings::ViewerSettings;
pub use viewer::Viewer;
