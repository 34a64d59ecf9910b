use stackview_core::Facing;

use crate::error::{checked_capacity, DatasetError};

/// Two triangles joining the upper/lower vertex pairs of ring points
/// `from` and `to`.
pub fn side_quad(from: u32, to: u32) -> [u32; 6] {
    [from * 2, from * 2 + 1, to * 2, to * 2, from * 2 + 1, to * 2 + 1]
}

/// Collects side-wall quads into four buckets whose sizes are fixed up front
/// by the dataset's declared edge counts.
#[derive(Debug)]
pub struct SideWallClassifier {
    walls: [Vec<u32>; 4],
    capacity: [usize; 4],
}

impl SideWallClassifier {
    /// `max_edges` bounds the declared total; a layer has at most one edge
    /// per ring point.
    pub fn new(edge_counts: [usize; 4], max_edges: usize) -> Result<Self, DatasetError> {
        let total = edge_counts
            .iter()
            .try_fold(0usize, |sum, &n| sum.checked_add(n))
            .unwrap_or(usize::MAX);
        checked_capacity("edge_counts", total, max_edges, 6)?;
        let mut walls: [Vec<u32>; 4] = Default::default();
        for (bucket, &n) in walls.iter_mut().zip(&edge_counts) {
            bucket.reserve_exact(checked_capacity("edge_counts", n, max_edges, 6)?);
        }
        Ok(Self {
            walls,
            capacity: edge_counts,
        })
    }

    pub fn push_edge(&mut self, facing: Facing, from: u32, to: u32) -> Result<(), DatasetError> {
        let i = facing.index();
        if self.walls[i].len() / 6 >= self.capacity[i] {
            return Err(DatasetError::EdgeOverflow {
                facing,
                capacity: self.capacity[i],
            });
        }
        self.walls[i].extend_from_slice(&side_quad(from, to));
        Ok(())
    }

    pub fn edge_count(&self, facing: Facing) -> usize {
        self.walls[facing.index()].len() / 6
    }

    /// Hand out the buckets once every one is exactly full.
    pub fn finish(self) -> Result<[Vec<u32>; 4], DatasetError> {
        for facing in Facing::ALL {
            let decoded = self.edge_count(facing);
            let declared = self.capacity[facing.index()];
            if decoded != declared {
                return Err(DatasetError::EdgeCountMismatch {
                    facing,
                    declared,
                    decoded,
                });
            }
        }
        Ok(self.walls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_quad_layout() {
        assert_eq!(side_quad(3, 4), [6, 7, 8, 8, 7, 9]);
        assert_eq!(side_quad(5, 0), [10, 11, 0, 0, 11, 1]);
    }

    #[test]
    fn test_bucket_overflow_is_rejected() {
        let mut walls = SideWallClassifier::new([1, 0, 0, 0], 4).unwrap();
        walls.push_edge(Facing::South, 0, 1).unwrap();
        let err = walls.push_edge(Facing::South, 1, 2).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::EdgeOverflow {
                facing: Facing::South,
                capacity: 1
            }
        ));
        assert!(matches!(
            walls.push_edge(Facing::East, 1, 2),
            Err(DatasetError::EdgeOverflow { facing: Facing::East, .. })
        ));
        assert_eq!(walls.edge_count(Facing::South), 1);
    }

    #[test]
    fn test_declared_total_bounded_by_points() {
        assert!(SideWallClassifier::new([1, 1, 1, 1], 4).is_ok());
        assert!(matches!(
            SideWallClassifier::new([2, 1, 1, 1], 4),
            Err(DatasetError::DeclaredCountTooLarge {
                field: "edge_counts",
                declared: 5,
                limit: 4
            })
        ));
        // The sum itself overflows.
        assert!(matches!(
            SideWallClassifier::new([usize::MAX, usize::MAX, 0, 0], 4),
            Err(DatasetError::DeclaredCountTooLarge { .. })
        ));
    }

    #[test]
    fn test_underfilled_bucket_is_rejected() {
        let mut walls = SideWallClassifier::new([1, 1, 0, 0], 4).unwrap();
        walls.push_edge(Facing::South, 0, 1).unwrap();
        let err = walls.finish().unwrap_err();
        assert!(matches!(
            err,
            DatasetError::EdgeCountMismatch {
                facing: Facing::East,
                declared: 1,
                decoded: 0
            }
        ));
    }
}
