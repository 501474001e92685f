//! POLYDATA message body
//!
//! Point and topology arrays converted from the frame geometry
//! representation; the envelope timestamp carries the frame time. Segmented
//! contours and surface meshes travel through this kind.

use std::sync::Arc;

use crate::error::{FusionError, Result};
use crate::frame::geometry::PolyData;
use crate::protocol::message::Message;
use bytes::{Buf, BufMut};

/// Geometry arrays on the wire
///
/// Body format: POINT COUNT u32 + `f32[3]` points, then four index arrays
/// (vertices, lines, polygons, triangle strips), each COUNT u32 + u32 data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyDataMessage {
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

impl PolyDataMessage {
    /// Convert from the frame geometry representation
    pub fn from_poly_data(poly: &PolyData) -> Self {
        PolyDataMessage {
            points: poly.points.clone(),
            vertices: poly.vertices.clone(),
            lines: poly.lines.clone(),
            polygons: poly.polygons.clone(),
            triangle_strips: poly.triangle_strips.clone(),
        }
    }

    /// Convert into a shared frame geometry snapshot
    pub fn into_poly_data(self) -> Arc<PolyData> {
        Arc::new(PolyData {
            points: self.points,
            vertices: self.vertices,
            lines: self.lines,
            polygons: self.polygons,
            triangle_strips: self.triangle_strips,
        })
    }

    /// Number of points
    pub fn num_points(&self) -> usize {
        self.points.len()
    }
}

fn put_index_array(buf: &mut Vec<u8>, array: &[u32]) {
    buf.put_u32(array.len() as u32);
    for &index in array {
        buf.put_u32(index);
    }
}

fn get_index_array(data: &mut &[u8]) -> Result<Vec<u32>> {
    if data.remaining() < 4 {
        return Err(FusionError::InvalidSize {
            expected: 4,
            actual: data.remaining(),
        });
    }
    let count = data.get_u32() as usize;
    if data.remaining() < count * 4 {
        return Err(FusionError::InvalidSize {
            expected: count * 4,
            actual: data.remaining(),
        });
    }
    let mut array = Vec::with_capacity(count);
    for _ in 0..count {
        array.push(data.get_u32());
    }
    Ok(array)
}

impl Message for PolyDataMessage {
    fn message_type() -> &'static str {
        "POLYDATA"
    }

    fn encode_content(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        buf.put_u32(self.points.len() as u32);
        for point in &self.points {
            for &coord in point {
                buf.put_f32(coord);
            }
        }

        put_index_array(&mut buf, &self.vertices);
        put_index_array(&mut buf, &self.lines);
        put_index_array(&mut buf, &self.polygons);
        put_index_array(&mut buf, &self.triangle_strips);

        Ok(buf)
    }

    fn decode_content(mut data: &[u8]) -> Result<Self> {
        if data.remaining() < 4 {
            return Err(FusionError::InvalidSize {
                expected: 4,
                actual: data.remaining(),
            });
        }

        let num_points = data.get_u32() as usize;
        if data.remaining() < num_points * 12 {
            return Err(FusionError::InvalidSize {
                expected: num_points * 12,
                actual: data.remaining(),
            });
        }
        let mut points = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            points.push([data.get_f32(), data.get_f32(), data.get_f32()]);
        }

        let vertices = get_index_array(&mut data)?;
        let lines = get_index_array(&mut data)?;
        let polygons = get_index_array(&mut data)?;
        let triangle_strips = get_index_array(&mut data)?;

        if !data.is_empty() {
            return Err(FusionError::InvalidSize {
                expected: 0,
                actual: data.len(),
            });
        }

        Ok(PolyDataMessage {
            points,
            vertices,
            lines,
            polygons,
            triangle_strips,
        })
    }
}
