use crate::geometry::Facing;

/// GPU-ready buffers for one layer, built once at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerMesh {
    /// Six floats per ring point: the upper vertex `(x, y, 0)` followed by
    /// the lower vertex `(x, y, bottom_z)`. Vertex `2i` is upper, `2i + 1` lower.
    pub positions: Vec<f32>,
    /// Cap triangle indices into the even (upper) vertex slots.
    pub caps: Vec<u32>,
    /// Side-wall triangle indices per bucket, in [`Facing`] order. Six per edge.
    pub walls: [Vec<u32>; 4],
}

impl LayerMesh {
    pub fn point_count(&self) -> usize {
        self.positions.len() / 6
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn walls(&self, facing: Facing) -> &[u32] {
        &self.walls[facing.index()]
    }

    pub fn wall_edge_count(&self, facing: Facing) -> usize {
        self.walls(facing).len() / 6
    }

    pub fn cap_triangle_count(&self) -> usize {
        self.caps.len() / 3
    }

    /// Ring point `i` as `(x, y)`.
    pub fn point(&self, i: usize) -> Option<(f32, f32)> {
        let base = i.checked_mul(6)?;
        let p = self.positions.get(base..base + 2)?;
        Some((p[0], p[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_counts() {
        let mesh = LayerMesh {
            positions: vec![0.0, 0.0, 0.0, 0.0, 0.0, -1.0, 1.0, 0.5, 0.0, 1.0, 0.5, -1.0],
            caps: vec![0, 2, 0],
            walls: [vec![0, 1, 2, 2, 1, 3], Vec::new(), Vec::new(), Vec::new()],
        };
        assert_eq!(mesh.point_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.cap_triangle_count(), 1);
        assert_eq!(mesh.wall_edge_count(Facing::South), 1);
        assert_eq!(mesh.wall_edge_count(Facing::West), 0);
        assert_eq!(mesh.point(1), Some((1.0, 0.5)));
        assert_eq!(mesh.point(2), None);
    }
}
