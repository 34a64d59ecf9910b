use stackview_core::{Dataset, Facing, LayerDataset, LayerMesh};

use crate::caps::decode_cap_indices;
use crate::error::DatasetError;
use crate::rings::RingAssembler;
use crate::varint::{decode_base64, VarintReader};

/// Decode one layer's ring and cap streams into GPU-ready buffers.
pub fn tessellate_layer(dataset: &LayerDataset) -> Result<LayerMesh, DatasetError> {
    let point_bytes = decode_base64(&dataset.points_str)?;
    let points = VarintReader::new(&point_bytes)?;
    log::debug!(
        "Layer {}: ring stream {:?}, {} bytes",
        dataset.layer,
        points.encoding(),
        point_bytes.len()
    );
    let mut assembler = RingAssembler::new(dataset, points.max_values())?;
    for value in points {
        assembler.feed(value?)?;
    }
    let ring_count = assembler.ring_count();
    let (positions, walls) = assembler.finish()?;

    let triangle_bytes = decode_base64(&dataset.triangles_str)?;
    let triangles = VarintReader::new(&triangle_bytes)?;
    let max_indices = triangles.max_values();
    let caps = decode_cap_indices(
        triangles,
        dataset.triangles_points_count,
        dataset.points_count,
        max_indices,
    )?;

    let mesh = LayerMesh {
        positions,
        caps,
        walls,
    };
    log::info!(
        "Layer {}: {} rings, {} points, {} cap triangles, walls s/e/n/w {}/{}/{}/{}",
        dataset.layer,
        ring_count,
        mesh.point_count(),
        mesh.cap_triangle_count(),
        mesh.wall_edge_count(Facing::South),
        mesh.wall_edge_count(Facing::East),
        mesh.wall_edge_count(Facing::North),
        mesh.wall_edge_count(Facing::West),
    );
    Ok(mesh)
}

/// Tessellate every layer, stopping at the first inconsistent one.
pub fn tessellate_dataset(dataset: &Dataset) -> Result<Vec<LayerMesh>, DatasetError> {
    dataset.layers.iter().map(tessellate_layer).collect()
}
