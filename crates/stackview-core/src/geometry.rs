use serde::{Deserialize, Serialize};

/// A 2D point in integer layout units (as stored in the source layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

impl GridPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An axis-aligned bounding box in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub min: GridPoint,
    pub max: GridPoint,
}

impl BBox {
    pub fn new(min: GridPoint, max: GridPoint) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GridPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self::new(*first, *first);
        for p in points {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }

    pub fn union(&self, other: &BBox) -> Self {
        Self {
            min: GridPoint::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: GridPoint::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

/// A closed contour. The closing edge from the last point back to the first
/// is implicit and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    pub points: Vec<GridPoint>,
}

impl Ring {
    pub fn new(points: Vec<GridPoint>) -> Self {
        Self { points }
    }

    /// Build a ring from `[x, y]` pairs.
    pub fn from_coords(coords: &[[i64; 2]]) -> Self {
        Self::new(coords.iter().map(|c| GridPoint::new(c[0], c[1])).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.points)
    }
}

/// Direction a side wall faces, in dataset bucket order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    South,
    East,
    North,
    West,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::South, Facing::East, Facing::North, Facing::West];

    /// Position of this bucket in `edge_counts` and in the mesh wall arrays.
    pub fn index(self) -> usize {
        match self {
            Facing::South => 0,
            Facing::East => 1,
            Facing::North => 2,
            Facing::West => 3,
        }
    }

    /// Edge that moves along x. Increasing x faces south.
    pub fn of_x_step<T: PartialOrd>(prev_x: T, x: T) -> Self {
        if prev_x < x {
            Facing::South
        } else {
            Facing::North
        }
    }

    /// Edge that moves along y. Increasing y faces east.
    pub fn of_y_step<T: PartialOrd>(prev_y: T, y: T) -> Self {
        if prev_y < y {
            Facing::East
        } else {
            Facing::West
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Facing::South => "south",
            Facing::East => "east",
            Facing::North => "north",
            Facing::West => "west",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_points() {
        let ring = Ring::from_coords(&[[0, 0], [10, 0], [10, 5], [-3, 5]]);
        let bb = ring.bbox().unwrap();
        assert_eq!(bb.min, GridPoint::new(-3, 0));
        assert_eq!(bb.max, GridPoint::new(10, 5));
        assert_eq!(bb.width(), 13);
        assert_eq!(bb.height(), 5);
    }

    #[test]
    fn test_bbox_empty() {
        assert!(Ring::new(Vec::new()).bbox().is_none());
    }

    #[test]
    fn test_facing_steps() {
        assert_eq!(Facing::of_x_step(1, 2), Facing::South);
        assert_eq!(Facing::of_x_step(2, 1), Facing::North);
        assert_eq!(Facing::of_x_step(2, 2), Facing::North);
        assert_eq!(Facing::of_y_step(1.0, 2.0), Facing::East);
        assert_eq!(Facing::of_y_step(2.0, 2.0), Facing::West);
    }

    #[test]
    fn test_facing_index_order() {
        for (i, facing) in Facing::ALL.iter().enumerate() {
            assert_eq!(facing.index(), i);
        }
    }
}
