//! Ring stream reconstruction.
//!
//! ## Stream grammar
//! Per ring: `size, dx0, dy0, dx1, dy2, dx3, ...`. The first point carries a
//! delta for both axes; every later point moves along one axis only,
//! alternating x then y. Deltas accumulate across ring boundaries. The ring
//! closes implicitly from its last point back to its first.

use stackview_core::{Facing, LayerDataset};

use crate::error::{checked_capacity, DatasetError};
use crate::walls::SideWallClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingState {
    RingSize,
    FirstX,
    FirstY,
    X,
    Y,
}

/// Rebuilds extruded ring vertices and side walls from the decoded stream.
#[derive(Debug)]
pub struct RingAssembler {
    state: RingState,
    xy_max: f64,
    bottom_z: f32,
    positions: Vec<f32>,
    declared_points: usize,
    next_point: usize,
    walls: SideWallClassifier,
    rings_done: usize,
    /// Points of the current ring not yet emitted.
    remaining: usize,
    x_acc: i64,
    y_acc: i64,
    start_x: i64,
    start_y: i64,
    start_index: u32,
}

impl RingAssembler {
    /// `max_values` is the most values the ring stream can hold; every
    /// point costs at least one.
    pub fn new(dataset: &LayerDataset, max_values: usize) -> Result<Self, DatasetError> {
        let declared_points = dataset.points_count;
        let floats = checked_capacity("points_count", declared_points, max_values, 6)?;
        if declared_points > 0 && dataset.xy_max() <= 0.0 {
            return Err(DatasetError::EmptyRange(dataset.xy_range));
        }
        // Wall indices address vertex 2i + 1 as u32.
        if declared_points > (u32::MAX / 2) as usize {
            return Err(DatasetError::PointOverflow {
                declared: declared_points,
            });
        }
        let walls = SideWallClassifier::new(dataset.edge_counts, declared_points)?;
        Ok(Self {
            state: RingState::RingSize,
            xy_max: dataset.xy_max(),
            bottom_z: dataset.bottom_z(),
            positions: vec![0.0; floats],
            declared_points,
            next_point: 0,
            walls,
            rings_done: 0,
            remaining: 0,
            x_acc: 0,
            y_acc: 0,
            start_x: 0,
            start_y: 0,
            start_index: 0,
        })
    }

    pub fn ring_count(&self) -> usize {
        self.rings_done
    }

    pub fn feed(&mut self, value: i32) -> Result<(), DatasetError> {
        let value = i64::from(value);
        match self.state {
            RingState::RingSize => {
                if value < 1 {
                    return Err(DatasetError::InvalidRingSize {
                        ring: self.rings_done,
                        size: value,
                    });
                }
                self.remaining = value as usize;
                self.state = RingState::FirstX;
            }
            RingState::FirstX => {
                self.x_acc += value;
                self.state = RingState::FirstY;
            }
            RingState::FirstY => {
                self.y_acc += value;
                self.start_index = self.emit_point()?;
                self.start_x = self.x_acc;
                self.start_y = self.y_acc;
                self.state = if self.remaining == 0 {
                    self.rings_done += 1;
                    RingState::RingSize
                } else {
                    RingState::X
                };
            }
            RingState::X => {
                let prev_x = self.x_acc;
                self.x_acc += value;
                let i = self.emit_point()?;
                self.walls
                    .push_edge(Facing::of_x_step(prev_x, self.x_acc), i - 1, i)?;
                if self.remaining == 0 {
                    // Closing edge runs along y.
                    let facing = Facing::of_y_step(self.y_acc, self.start_y);
                    self.close_ring(facing, i)?;
                } else {
                    self.state = RingState::Y;
                }
            }
            RingState::Y => {
                let prev_y = self.y_acc;
                self.y_acc += value;
                let i = self.emit_point()?;
                self.walls
                    .push_edge(Facing::of_y_step(prev_y, self.y_acc), i - 1, i)?;
                if self.remaining == 0 {
                    let facing = Facing::of_x_step(self.x_acc, self.start_x);
                    self.close_ring(facing, i)?;
                } else {
                    self.state = RingState::X;
                }
            }
        }
        Ok(())
    }

    /// Consume the assembler, returning vertex positions and wall buckets.
    pub fn finish(self) -> Result<(Vec<f32>, [Vec<u32>; 4]), DatasetError> {
        let pending = match self.state {
            RingState::RingSize => 0,
            RingState::FirstX => self.remaining + 1,
            RingState::FirstY | RingState::X | RingState::Y => self.remaining,
        };
        if pending > 0 {
            return Err(DatasetError::UnfinishedRing { remaining: pending });
        }
        if self.next_point != self.declared_points {
            return Err(DatasetError::PointCountMismatch {
                declared: self.declared_points,
                decoded: self.next_point,
            });
        }
        let walls = self.walls.finish()?;
        Ok((self.positions, walls))
    }

    fn emit_point(&mut self) -> Result<u32, DatasetError> {
        if self.next_point >= self.declared_points {
            return Err(DatasetError::PointOverflow {
                declared: self.declared_points,
            });
        }
        let x = (self.x_acc as f64 / self.xy_max) as f32;
        let y = (self.y_acc as f64 / self.xy_max) as f32;
        let base = self.next_point * 6;
        self.positions[base..base + 6].copy_from_slice(&[x, y, 0.0, x, y, self.bottom_z]);
        let index = self.next_point as u32;
        self.next_point += 1;
        self.remaining -= 1;
        Ok(index)
    }

    fn close_ring(&mut self, facing: Facing, last: u32) -> Result<(), DatasetError> {
        self.walls.push_edge(facing, last, self.start_index)?;
        self.rings_done += 1;
        self.state = RingState::RingSize;
        Ok(())
    }
}
