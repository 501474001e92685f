//! Point and surface geometry attached to a frame
//!
//! Segmentation outlines and similar geometry ride along with a tracked frame
//! but have a lifetime independent of the image: frames share one immutable
//! geometry snapshot behind an `Arc`, so cloning a frame never duplicates or
//! exposes mutation of the arrays.

/// Point cloud / mesh connectivity arrays
///
/// Index arrays use the count-prefixed cell layout: each cell is written as
/// `n, i0, i1, ... i(n-1)` into the flat array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyData {
    /// 3D points (x, y, z)
    pub points: Vec<[f32; 3]>,
    /// Vertex indices
    pub vertices: Vec<u32>,
    /// Line connectivity cells
    pub lines: Vec<u32>,
    /// Polygon connectivity cells
    pub polygons: Vec<u32>,
    /// Triangle strip connectivity cells
    pub triangle_strips: Vec<u32>,
}

impl PolyData {
    /// Create geometry from a set of points
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        PolyData {
            points,
            ..PolyData::default()
        }
    }

    /// Attach polygon connectivity cells
    pub fn with_polygons(mut self, polygons: Vec<u32>) -> Self {
        self.polygons = polygons;
        self
    }

    /// Attach line connectivity cells
    pub fn with_lines(mut self, lines: Vec<u32>) -> Self {
        self.lines = lines;
        self
    }

    /// Number of points
    pub fn num_points(&self) -> usize {
        self.points.len()
    }
}
