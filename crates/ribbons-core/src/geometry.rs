//! Strip mesh for one ribbon.
//!
//! Each polyline point produces two vertices, one per side of the strip. The
//! extrusion itself happens in the vertex shader; this buffer only carries the
//! point, its neighbours, the side sign and the parametric uv.

use glam::Vec3;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RibbonVertex {
    pub position: [f32; 3],
    pub prev: [f32; 3],
    pub next: [f32; 3],
    pub side: f32,
    pub uv: [f32; 2],
}

pub const RIBBON_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x3,
    3 => Float32,
    4 => Float32x2
];

impl RibbonVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RibbonVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &RIBBON_VERTEX_ATTRIBUTES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PolylineGeometry {
    point_count: usize,
    vertices: Vec<RibbonVertex>,
    indices: Vec<u32>,
}

impl PolylineGeometry {
    pub fn new(point_count: usize) -> Self {
        let mut geometry = Self {
            point_count,
            vertices: vec![RibbonVertex::default(); point_count * 2],
            indices: strip_indices(point_count),
        };
        geometry.update(&vec![Vec3::ZERO; point_count]);
        geometry
    }

    /// Regenerate every vertex from `points`. Topology never changes, so a
    /// point sequence of a different length is ignored with a warning.
    pub fn update(&mut self, points: &[Vec3]) {
        if points.len() != self.point_count {
            log::warn!(
                "[geometry] expected {} points, got {}",
                self.point_count,
                points.len()
            );
            return;
        }
        let last = self.point_count.saturating_sub(1);
        let denom = last.max(1) as f32;
        for (i, p) in points.iter().enumerate() {
            // ends mirror their neighbour so the end tangent spans a full segment
            let prev = if i == 0 {
                *p * 2.0 - points[1.min(last)]
            } else {
                points[i - 1]
            };
            let next = if i == last {
                *p * 2.0 - points[last.saturating_sub(1)]
            } else {
                points[i + 1]
            };
            let v = i as f32 / denom;
            for (j, side) in [-1.0_f32, 1.0].into_iter().enumerate() {
                self.vertices[i * 2 + j] = RibbonVertex {
                    position: p.to_array(),
                    prev: prev.to_array(),
                    next: next.to_array(),
                    side,
                    uv: [j as f32, v],
                };
            }
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[RibbonVertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

/// Two triangles per segment over the interleaved side vertices.
pub fn strip_indices(point_count: usize) -> Vec<u32> {
    let segments = point_count.saturating_sub(1);
    let mut out = Vec::with_capacity(segments * 6);
    for i in 0..segments as u32 {
        let a = i * 2;
        out.extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
    }
    out
}
