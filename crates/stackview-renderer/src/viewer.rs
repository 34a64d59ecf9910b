use stackview_core::{Dataset, Facing};
use stackview_io::tessellate_layer;

use crate::backend::RenderBackend;
use crate::camera::Camera;
use crate::error::ViewerError;
use crate::pan_zoom::{PanZoomController, PointerEvent};
use crate::render_data::{IndexRange, RenderLayer};
use crate::settings::ViewerSettings;

/// Owns the backend, the camera and every layer's uploaded buffers for one
/// viewing session.
pub struct Viewer<B: RenderBackend> {
    backend: B,
    settings: ViewerSettings,
    camera: Camera,
    layers: Vec<RenderLayer<B::Buffer>>,
    canvas: (u32, u32),
}

impl<B: RenderBackend> Viewer<B> {
    /// Decode every layer and upload its buffers. Any inconsistent layer or
    /// backend failure aborts setup.
    pub fn new(
        mut backend: B,
        dataset: &Dataset,
        settings: ViewerSettings,
    ) -> Result<Self, ViewerError> {
        if dataset.is_empty() {
            return Err(ViewerError::EmptyDataset);
        }
        backend.init_program().map_err(ViewerError::backend)?;

        let mut layers = Vec::with_capacity(dataset.layer_count());
        for layer in &dataset.layers {
            let mesh = tessellate_layer(layer)?;
            let uploaded =
                RenderLayer::upload(&mut backend, layer, &mesh).map_err(ViewerError::backend)?;
            layers.push(uploaded);
        }

        let extent = dataset.world_extent();
        if extent[0] == 0.0 && extent[1] == 0.0 {
            log::warn!("Dataset has zero world extent; panning is disabled");
        }
        let canvas = backend.canvas_size();
        let camera = Camera::new(&settings, extent, canvas.0, canvas.1);
        let (width, height) = camera.viewport();
        backend.set_viewport(width, height);

        log::info!(
            "Viewer ready: {} layers, extent {:.4} x {:.4}, canvas {}x{}",
            layers.len(),
            extent[0],
            extent[1],
            canvas.0,
            canvas.1
        );

        Ok(Self {
            backend,
            settings,
            camera,
            layers,
            canvas,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn layers(&self) -> &[RenderLayer<B::Buffer>] {
        &self.layers
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Apply one pointer event and redraw.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        PanZoomController::new(&mut self.camera, self.settings.zoom_scale).handle_event(event);
        self.draw_frame();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas = (width, height);
        self.camera.resize(width, height);
        let (width, height) = self.camera.viewport();
        self.backend.set_viewport(width, height);
    }

    pub fn draw_frame(&mut self) {
        let canvas = self.backend.canvas_size();
        if canvas != self.canvas {
            log::debug!("Canvas resized to {}x{}", canvas.0, canvas.1);
            self.resize(canvas.0, canvas.1);
        }

        self.backend.clear(self.settings.clear_color);
        self.backend.set_projection(&self.camera.projection().as_mat4());

        let model_view = self.camera.model_view();
        let z_position = self.camera.state().z_position;
        for layer in &self.layers {
            let alpha = layer.alpha(z_position, &self.settings);
            self.backend.set_model_view(&layer.model_view(model_view).as_mat4());
            self.backend.bind_vertex_buffer(&layer.vertices);

            if layer.extruded {
                let shade = layer.color.darken(self.settings.wall_darken_percent, alpha);
                self.backend.set_color(shade);
                draw(&mut self.backend, layer.walls(Facing::South));
                draw(&mut self.backend, layer.walls(Facing::East));

                let light = layer.color.lighten(self.settings.wall_lighten_percent, alpha);
                self.backend.set_color(light);
                draw(&mut self.backend, layer.walls(Facing::West));
                draw(&mut self.backend, layer.walls(Facing::North));
            }

            self.backend.set_color(layer.color.to_f32_array(alpha));
            draw(&mut self.backend, &layer.caps);
        }
    }
}

fn draw<B: RenderBackend>(backend: &mut B, range: &IndexRange<B::Buffer>) {
    if range.count > 0 {
        backend.draw_indexed(&range.buffer, range.count);
    }
}
