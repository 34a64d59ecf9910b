//! Dataset writer: integer rectilinear rings in, encoded [`LayerDataset`] out.
//!
//! Cap triangulation is not computed here; callers pass triangle indices
//! alongside each polygon.

use stackview_core::{BBox, Dataset, Facing, GridPoint, LayerDataset, LayerSpec, Ring};

use crate::error::DatasetError;
use crate::varint::{encode_base64, encode_varints, VarintEncoding};

/// A polygon: outer contour first, then holes, with its cap triangles
/// indexing the concatenated ring points.
#[derive(Debug, Clone)]
struct PolygonEntry {
    rings: Vec<Ring>,
    triangles: Vec<u32>,
}

/// Collects one layer's polygons and encodes them.
///
/// Coordinates are written relative to a frame: by default the layer's own
/// bounding box, or a shared one from [`with_bounds`](Self::with_bounds) or
/// [`write_dataset`] so every layer of a stack lines up.
pub struct LayerWriter {
    spec: LayerSpec,
    xy_nm_per_unit: f64,
    bounds: Option<BBox>,
    polygons: Vec<PolygonEntry>,
}

impl LayerWriter {
    pub fn new(spec: &LayerSpec) -> Self {
        Self {
            spec: spec.clone(),
            xy_nm_per_unit: 1.0,
            bounds: None,
            polygons: Vec::new(),
        }
    }

    pub fn with_nm_per_unit(mut self, xy_nm_per_unit: f64) -> Self {
        self.xy_nm_per_unit = xy_nm_per_unit;
        self
    }

    /// Write relative to `bounds` instead of the layer's own extent. The
    /// frame grows to cover any geometry outside it.
    pub fn with_bounds(mut self, bounds: BBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Add a polygon. `triangles` index the points of `rings` in order,
    /// starting at zero for this polygon.
    pub fn add_polygon(&mut self, rings: Vec<Ring>, triangles: &[u32]) {
        self.polygons.push(PolygonEntry {
            rings,
            triangles: triangles.to_vec(),
        });
    }

    /// Bounding box of every ring added so far.
    pub fn geometry_bounds(&self) -> Option<BBox> {
        self.polygons
            .iter()
            .flat_map(|p| p.rings.iter())
            .filter_map(Ring::bbox)
            .reduce(|a, b| a.union(&b))
    }

    fn frame(&self) -> Option<BBox> {
        match (self.bounds, self.geometry_bounds()) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        }
    }

    pub fn write(&self) -> Result<LayerDataset, DatasetError> {
        self.write_in(self.frame())
    }

    fn write_in(&self, frame: Option<BBox>) -> Result<LayerDataset, DatasetError> {
        let bbox = frame.unwrap_or(BBox::new(GridPoint::new(0, 0), GridPoint::new(0, 0)));

        let mut values: Vec<i64> = Vec::new();
        let mut edge_counts = [0usize; 4];
        let mut triangles: Vec<i64> = Vec::new();
        let mut points_count = 0usize;
        let mut acc = GridPoint::new(0, 0);
        let mut ring_no = 0usize;

        for polygon in &self.polygons {
            let polygon_base = points_count;
            // Local point index (input order) -> global index (written order).
            let mut remap: Vec<u32> = Vec::new();

            for ring in &polygon.rings {
                if ring.is_empty() {
                    log::warn!("Skipping empty ring {} on layer {}", ring_no, self.spec.name);
                    ring_no += 1;
                    continue;
                }
                let n = ring.len();
                let shift = first_rising_edge(ring, ring_no)?;
                let points: Vec<GridPoint> = (0..n)
                    .map(|k| ring.points[(k + shift) % n].translate(-bbox.min.x, -bbox.min.y))
                    .collect();
                check_alternation(&points, ring_no)?;

                let ring_base = points_count;
                remap.extend((0..n).map(|k| (ring_base + (k + n - shift) % n) as u32));

                values.push(n as i64);
                values.push(points[0].x - acc.x);
                values.push(points[0].y - acc.y);
                acc = points[0];
                for (i, p) in points.iter().enumerate().skip(1) {
                    if i % 2 == 1 {
                        values.push(p.x - acc.x);
                    } else {
                        values.push(p.y - acc.y);
                    }
                    acc = *p;
                }
                for facing in ring_facings(&points) {
                    edge_counts[facing.index()] += 1;
                }

                points_count += n;
                ring_no += 1;
            }

            for &t in &polygon.triangles {
                let mapped = remap
                    .get(t as usize)
                    .ok_or_else(|| DatasetError::TriangleIndexOutOfRange {
                        index: t,
                        points: points_count - polygon_base,
                    })?;
                triangles.push(i64::from(*mapped));
            }
        }

        let mut prev = 0i64;
        let triangle_deltas: Vec<i64> = triangles
            .iter()
            .map(|&t| {
                let d = t - prev;
                prev = t;
                d
            })
            .collect();
        let triangle_encoding = if triangle_deltas.iter().all(|&d| i16::try_from(d).is_ok()) {
            VarintEncoding::Binary
        } else {
            VarintEncoding::Quaternary
        };

        let xy_range = [range_u32(bbox.width())?, range_u32(bbox.height())?];
        log::info!(
            "Wrote layer {} ({}): {} rings, {} points, {} triangle indices",
            self.spec.name,
            self.spec.label(),
            ring_no,
            points_count,
            triangles.len()
        );

        Ok(LayerDataset {
            layer: self.spec.label(),
            elevation: self.spec.elevation,
            thickness: self.spec.thickness,
            color: self.spec.color,
            xy_range,
            xy_nm_per_unit: self.xy_nm_per_unit,
            points_count,
            points_str: encode_base64(&encode_varints(VarintEncoding::Quaternary, values)?),
            triangles_points_count: triangles.len(),
            triangles_str: encode_base64(&encode_varints(triangle_encoding, triangle_deltas)?),
            edge_counts,
        })
    }
}

/// Encode a whole stack in one frame: the union of every layer's bounds.
pub fn write_dataset(writers: &[LayerWriter]) -> Result<Dataset, DatasetError> {
    let frame = writers
        .iter()
        .filter_map(LayerWriter::frame)
        .reduce(|a, b| a.union(&b));
    let layers = writers
        .iter()
        .map(|writer| writer.write_in(frame))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Dataset::new(layers))
}

/// Rotation that makes the ring start with an edge of increasing x.
fn first_rising_edge(ring: &Ring, ring_no: usize) -> Result<usize, DatasetError> {
    let n = ring.len();
    if n == 1 {
        return Ok(0);
    }
    (0..n)
        .find(|&j| ring.points[(j + 1) % n].x > ring.points[j].x)
        .ok_or(DatasetError::NonRectilinear {
            ring: ring_no,
            point: 0,
        })
}

/// Every step must move along x then y alternately, closing edge included.
fn check_alternation(points: &[GridPoint], ring_no: usize) -> Result<(), DatasetError> {
    let n = points.len();
    let bad = |point| DatasetError::NonRectilinear {
        ring: ring_no,
        point,
    };
    for i in 1..n {
        let (prev, p) = (points[i - 1], points[i]);
        let ok = if i % 2 == 1 { p.y == prev.y } else { p.x == prev.x };
        if !ok {
            return Err(bad(i));
        }
    }
    if n >= 2 {
        let (last, first) = (points[n - 1], points[0]);
        let ok = if n % 2 == 0 { last.x == first.x } else { last.y == first.y };
        if !ok {
            return Err(bad(0));
        }
    }
    Ok(())
}

/// Wall buckets for each edge, using the same comparisons as the decoder.
fn ring_facings(points: &[GridPoint]) -> Vec<Facing> {
    let n = points.len();
    let mut facings = Vec::with_capacity(n);
    for i in 1..n {
        let (prev, p) = (points[i - 1], points[i]);
        facings.push(if i % 2 == 1 {
            Facing::of_x_step(prev.x, p.x)
        } else {
            Facing::of_y_step(prev.y, p.y)
        });
    }
    if n >= 2 {
        let (last, first) = (points[n - 1], points[0]);
        facings.push(if n % 2 == 0 {
            Facing::of_y_step(last.y, first.y)
        } else {
            Facing::of_x_step(last.x, first.x)
        });
    }
    facings
}

fn range_u32(extent: i64) -> Result<u32, DatasetError> {
    u32::try_from(extent).map_err(|_| DatasetError::ValueOutOfRange {
        value: extent,
        encoding: VarintEncoding::Quaternary,
    })
}
