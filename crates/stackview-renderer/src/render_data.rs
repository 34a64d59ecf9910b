use glam::{DMat4, DVec3};
use stackview_core::{Facing, LayerColor, LayerDataset, LayerMesh};

use crate::backend::RenderBackend;
use crate::settings::ViewerSettings;

/// An index buffer and the number of indices it holds.
#[derive(Debug)]
pub struct IndexRange<Buf> {
    pub buffer: Buf,
    pub count: usize,
}

/// One layer's uploaded buffers and the scalars needed to draw it.
#[derive(Debug)]
pub struct RenderLayer<Buf> {
    pub label: String,
    pub elevation: f64,
    pub thickness: f64,
    /// Whether side walls are drawn.
    pub extruded: bool,
    pub z_scale: f64,
    pub color: LayerColor,
    pub vertices: Buf,
    pub caps: IndexRange<Buf>,
    /// In [`Facing`] order.
    pub walls: [IndexRange<Buf>; 4],
}

impl<Buf> RenderLayer<Buf> {
    pub fn upload<B>(
        backend: &mut B,
        dataset: &LayerDataset,
        mesh: &LayerMesh,
    ) -> Result<Self, B::Error>
    where
        B: RenderBackend<Buffer = Buf>,
    {
        let vertices = backend.create_vertex_buffer(&mesh.positions)?;
        let caps = IndexRange {
            buffer: backend.create_index_buffer(&mesh.caps)?,
            count: mesh.caps.len(),
        };
        let [south, east, north, west] = &mesh.walls;
        let walls = [
            upload_indices(backend, south)?,
            upload_indices(backend, east)?,
            upload_indices(backend, north)?,
            upload_indices(backend, west)?,
        ];
        Ok(Self {
            label: dataset.layer.clone(),
            elevation: dataset.elevation,
            thickness: dataset.thickness,
            extruded: dataset.is_extruded(),
            z_scale: dataset.z_scale(),
            color: dataset.color,
            vertices,
            caps,
            walls,
        })
    }

    pub fn walls(&self, facing: Facing) -> &IndexRange<Buf> {
        &self.walls[facing.index()]
    }

    /// Camera model-view lifted to this layer's upper surface.
    pub fn model_view(&self, camera_model_view: DMat4) -> DMat4 {
        let lift = DVec3::new(0.0, 0.0, self.elevation * self.z_scale);
        camera_model_view * DMat4::from_translation(lift)
    }

    pub fn alpha(&self, z_position: f64, settings: &ViewerSettings) -> f32 {
        layer_alpha(
            self.elevation,
            self.thickness,
            self.z_scale,
            z_position,
            settings.z_near,
            settings.fade_distance_nm,
        )
    }
}

fn upload_indices<B: RenderBackend>(
    backend: &mut B,
    indices: &[u32],
) -> Result<IndexRange<B::Buffer>, B::Error> {
    Ok(IndexRange {
        buffer: backend.create_index_buffer(indices)?,
        count: indices.len(),
    })
}

/// Opacity of a layer for a camera at depth `z_position`.
///
/// Layers whose vertical center is above the camera's physical height are
/// hidden; they fade in over `fade_distance` as the camera rises. A layer
/// centered at height zero is always opaque.
pub fn layer_alpha(
    elevation: f64,
    thickness: f64,
    z_scale: f64,
    z_position: f64,
    z_near: f64,
    fade_distance: f64,
) -> f32 {
    let center = elevation - thickness / 2.0;
    if center == 0.0 {
        return 1.0;
    }
    let camera_height = (-z_near - z_position) / z_scale;
    ((camera_height - center) / fade_distance - 1.0).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 normalized unit = 10 um.
    const Z_SCALE: f64 = 1.0e-4;

    #[test]
    fn test_alpha_ground_layer_always_opaque() {
        assert_eq!(layer_alpha(0.0, 0.0, Z_SCALE, -0.1, 0.1, 500.0), 1.0);
        assert_eq!(layer_alpha(100.0, 200.0, Z_SCALE, -0.1, 0.1, 500.0), 1.0);
    }

    #[test]
    fn test_alpha_fades_with_camera_height() {
        // Layer centered at 1000 nm.
        let alpha = |z| layer_alpha(1100.0, 200.0, Z_SCALE, z, 0.1, 500.0);
        // Camera height 1000 nm: level with the layer.
        assert_eq!(alpha(-0.2), 0.0);
        // 1500 nm: fade just starting.
        assert!(alpha(-0.25) < 1e-5);
        // 1750 nm: halfway.
        assert!((alpha(-0.275) - 0.5).abs() < 1e-5);
        // 2000 nm and above: opaque.
        assert!((alpha(-0.3) - 1.0).abs() < 1e-5);
        assert_eq!(alpha(-8.0), 1.0);
    }

    #[test]
    fn test_layer_model_view_lifts_by_elevation() {
        let layer = RenderLayer {
            label: "68/20".into(),
            elevation: 2000.0,
            thickness: 100.0,
            extruded: true,
            z_scale: Z_SCALE,
            color: LayerColor::default(),
            vertices: (),
            caps: IndexRange { buffer: (), count: 0 },
            walls: [(); 4].map(|buffer| IndexRange { buffer, count: 0 }),
        };
        let camera = DMat4::from_translation(DVec3::new(-0.5, -0.5, -4.0));
        let p = layer.model_view(camera).transform_point3(DVec3::ZERO);
        assert!((p.z - (-4.0 + 0.2)).abs() < 1e-12);
        assert!((p.x + 0.5).abs() < 1e-12);
    }
}
