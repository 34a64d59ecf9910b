use crate::error::{checked_capacity, DatasetError};

/// Decodes the flat delta-coded cap stream into triangle indices.
///
/// Each running sum names a ring point; the emitted index is `2 * sum`, the
/// upper vertex of that point's pair.
#[derive(Debug)]
pub struct CapIndexDecoder {
    acc: i64,
    declared: usize,
    decoded: usize,
    vertices: usize,
    indices: Vec<u32>,
}

impl CapIndexDecoder {
    /// `max_values` bounds `declared` by what the cap stream can hold.
    pub fn new(
        declared: usize,
        ring_points: usize,
        max_values: usize,
    ) -> Result<Self, DatasetError> {
        let capacity = checked_capacity("triangles_points_count", declared, max_values, 1)?;
        let vertices = ring_points
            .checked_mul(2)
            .ok_or(DatasetError::PointOverflow {
                declared: ring_points,
            })?;
        Ok(Self {
            acc: 0,
            declared,
            decoded: 0,
            vertices,
            indices: Vec::with_capacity(capacity),
        })
    }

    pub fn feed(&mut self, delta: i32) -> Result<(), DatasetError> {
        self.acc += i64::from(delta);
        let index = self.acc * 2;
        if index < 0 || index >= self.vertices as i64 {
            return Err(DatasetError::CapIndexOutOfRange {
                index,
                vertices: self.vertices,
            });
        }
        self.decoded += 1;
        if self.decoded <= self.declared {
            self.indices.push(index as u32);
        }
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u32>, DatasetError> {
        if self.decoded != self.declared {
            return Err(DatasetError::CapCountMismatch {
                declared: self.declared,
                decoded: self.decoded,
            });
        }
        Ok(self.indices)
    }
}

pub fn decode_cap_indices<I>(
    values: I,
    declared: usize,
    ring_points: usize,
    max_values: usize,
) -> Result<Vec<u32>, DatasetError>
where
    I: IntoIterator<Item = Result<i32, DatasetError>>,
{
    let mut decoder = CapIndexDecoder::new(declared, ring_points, max_values)?;
    for value in values {
        decoder.feed(value?)?;
    }
    decoder.finish()
}
