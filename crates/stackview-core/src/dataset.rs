use serde::{Deserialize, Serialize};

use crate::geometry::Facing;
use crate::layer::LayerColor;

/// One layer as produced by the exporter: encoded ring and cap streams plus
/// the counts needed to size the decoded buffers up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDataset {
    /// Free-form label, conventionally `"<gds layer>/<gds datatype>"`.
    #[serde(default)]
    pub layer: String,
    /// Upper surface height in physical units (nm).
    pub elevation: f64,
    pub thickness: f64,
    pub color: LayerColor,
    /// Width and height of the coordinate domain, in layout units.
    pub xy_range: [u32; 2],
    #[serde(default = "default_nm_per_unit")]
    pub xy_nm_per_unit: f64,
    /// Total ring points over all rings.
    pub points_count: usize,
    /// Base64 varint stream of ring sizes and delta-coded coordinates.
    pub points_str: String,
    /// Number of cap triangle indices (three per triangle).
    pub triangles_points_count: usize,
    /// Base64 varint stream of delta-coded cap indices.
    pub triangles_str: String,
    /// Side-wall edges per bucket, in [`Facing`] order.
    pub edge_counts: [usize; 4],
}

fn default_nm_per_unit() -> f64 {
    1.0
}

impl LayerDataset {
    /// Largest side of the coordinate domain; coordinates are divided by
    /// this to normalize them into `[0, 1]`.
    pub fn xy_max(&self) -> f64 {
        f64::from(self.xy_range[0].max(self.xy_range[1]))
    }

    /// Scale from physical units to normalized model units.
    pub fn z_scale(&self) -> f64 {
        1.0 / (self.xy_max() * self.xy_nm_per_unit)
    }

    /// Size of the layer in normalized model units. Zero for an empty domain.
    pub fn world_extent(&self) -> [f64; 2] {
        let scale = self.z_scale();
        if !scale.is_finite() {
            return [0.0, 0.0];
        }
        [
            f64::from(self.xy_range[0]) * scale,
            f64::from(self.xy_range[1]) * scale,
        ]
    }

    /// Model-space z of the lower vertex of each extruded pair.
    pub fn bottom_z(&self) -> f32 {
        (-self.thickness * self.z_scale()) as f32
    }

    pub fn is_extruded(&self) -> bool {
        self.thickness > 0.0
    }

    /// Height of the layer's vertical center, in physical units.
    pub fn vertical_center(&self) -> f64 {
        self.elevation - self.thickness / 2.0
    }

    pub fn edge_count(&self, facing: Facing) -> usize {
        self.edge_counts[facing.index()]
    }

    pub fn total_edges(&self) -> usize {
        self.edge_counts.iter().sum()
    }
}

/// A full layer stack dataset. Serialized as a bare JSON array of layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub layers: Vec<LayerDataset>,
}

impl Dataset {
    pub fn new(layers: Vec<LayerDataset>) -> Self {
        Self { layers }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Largest world extent over all layers, per axis. Pan is bounded by this.
    pub fn world_extent(&self) -> [f64; 2] {
        self.layers.iter().fold([0.0, 0.0], |acc, l| {
            let e = l.world_extent();
            [acc[0].max(e[0]), acc[1].max(e[1])]
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let dataset: Self = serde_json::from_str(json)?;
        log::debug!("Parsed dataset with {} layers", dataset.layer_count());
        Ok(dataset)
    }
}
