//! Vertex types for the textured quads.

use bytemuck::{Pod, Zeroable};

/// A vertex with position, color, and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl QuadVertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Vertex buffer layout descriptor.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }

    const fn textured(position: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            color: [1.0, 1.0, 1.0],
            tex_coords,
        }
    }
}

// Texture rows run top to bottom, so v = 0 is the top edge of the image.

/// Rose billboard: two triangles, left edge on the origin.
pub const ROSE_QUAD: [QuadVertex; 6] = [
    QuadVertex::textured([0.0, 0.5, 0.0], [0.0, 0.0]),
    QuadVertex::textured([0.0, -0.5, 0.0], [0.0, 1.0]),
    QuadVertex::textured([1.0, -0.5, 0.0], [1.0, 1.0]),
    QuadVertex::textured([0.0, 0.5, 0.0], [0.0, 0.0]),
    QuadVertex::textured([1.0, -0.5, 0.0], [1.0, 1.0]),
    QuadVertex::textured([1.0, 0.5, 0.0], [1.0, 0.0]),
];

/// Bin quad corners: top right, bottom right, bottom left, top left.
pub const BIN_QUAD: [QuadVertex; 4] = [
    QuadVertex {
        position: [0.5, 0.5, 0.0],
        color: [1.0, 0.0, 0.0],
        tex_coords: [1.0, 0.0],
    },
    QuadVertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0],
        tex_coords: [1.0, 1.0],
    },
    QuadVertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0],
        tex_coords: [0.0, 1.0],
    },
    QuadVertex {
        position: [-0.5, 0.5, 0.0],
        color: [1.0, 1.0, 0.0],
        tex_coords: [0.0, 0.0],
    },
];

pub const BIN_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_vertex_stride() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 32);
        assert_eq!(QuadVertex::desc().array_stride, 32);
    }

    #[test]
    fn bin_indices_cover_both_triangles() {
        assert!(BIN_INDICES.iter().all(|&i| (i as usize) < BIN_QUAD.len()));
        let mut used: Vec<u32> = BIN_INDICES.to_vec();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, [0, 1, 2, 3]);
    }

    #[test]
    fn rose_top_edge_samples_image_top() {
        for vertex in ROSE_QUAD.iter().filter(|v| v.position[1] > 0.0) {
            assert_eq!(vertex.tex_coords[1], 0.0);
        }
    }
}
