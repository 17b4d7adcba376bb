//! Mesh data and GPU upload.
//!
//! Procedural meshes are arrays of triangles with position, normal and
//! texture coordinate data. Loaded models may be indexed.

use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

/// Vertex with position, normal and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl MeshVertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            tex_coords: tex_coords.into(),
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Built mesh data ready for GPU upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of vertices a draw call consumes.
    pub fn element_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertex_count(),
        }
    }
}

/// Fluent mesh builder for procedural geometry.
pub struct MeshBuilder {
    vertices: Vec<MeshVertex>,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    /// Add a triangle with a face normal and explicit texture coordinates.
    pub fn add_triangle(&mut self, points: [Vec3; 3], uvs: [Vec2; 3]) -> &mut Self {
        let normal = (points[1] - points[0])
            .cross(points[2] - points[0])
            .normalize_or_zero();

        for (point, uv) in points.into_iter().zip(uvs) {
            self.vertices.push(MeshVertex::new(point, normal, uv));
        }
        self
    }

    /// Add a quad (two triangles), corners counter-clockwise from bottom left.
    pub fn add_quad(&mut self, p1: Vec3, p2: Vec3, p3: Vec3, p4: Vec3) -> &mut Self {
        let (uv1, uv2, uv3, uv4) = (
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        );
        self.add_triangle([p1, p2, p3], [uv1, uv2, uv3]);
        self.add_triangle([p1, p3, p4], [uv1, uv3, uv4]);
        self
    }

    /// Add a box centered at origin.
    pub fn add_box(&mut self, width: f32, height: f32, depth: f32) -> &mut Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        let hd = depth / 2.0;
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x * hw, y * hh, z * hd);

        // Front face (Z+)
        self.add_quad(
            corner(-1.0, -1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        );
        // Back face (Z-)
        self.add_quad(
            corner(1.0, -1.0, -1.0),
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
            corner(1.0, 1.0, -1.0),
        );
        // Top face (Y+)
        self.add_quad(
            corner(-1.0, 1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(1.0, 1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
        );
        // Bottom face (Y-)
        self.add_quad(
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, -1.0, 1.0),
            corner(-1.0, -1.0, 1.0),
        );
        // Right face (X+)
        self.add_quad(
            corner(1.0, -1.0, 1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(1.0, 1.0, 1.0),
        );
        // Left face (X-)
        self.add_quad(
            corner(-1.0, -1.0, -1.0),
            corner(-1.0, -1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
            corner(-1.0, 1.0, -1.0),
        );

        self
    }

    /// Get current vertex count.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Build and consume the builder.
    pub fn finish(self) -> MeshData {
        MeshData {
            vertices: self.vertices,
            indices: None,
        }
    }
}

/// Unit cube drawn at each light.
pub fn marker_cube() -> MeshData {
    let mut builder = MeshBuilder::new();
    builder.add_box(1.0, 1.0, 1.0);
    builder.finish()
}

/// The 36-vertex skybox cube, spanning -1..1 on each axis.
pub fn skybox_cube() -> MeshData {
    let mut builder = MeshBuilder::new();
    builder.add_box(2.0, 2.0, 2.0);
    builder.finish()
}

/// Vertex and optional index buffers on the GPU.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub element_count: u32,
}

impl GpuMesh {
    /// Upload raw vertex data with optional `u32` indices.
    pub fn from_slices<V: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        vertices: &[V],
        indices: Option<&[u32]>,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertices")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = indices.map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let element_count = match indices {
            Some(indices) => indices.len() as u32,
            None => vertices.len() as u32,
        };

        Self {
            vertex_buffer,
            index_buffer,
            element_count,
        }
    }

    pub fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        Self::from_slices(device, label, &mesh.vertices, mesh.indices.as_deref())
    }

    /// Record the draw into `pass`. Bind groups must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.element_count, 0, 0..1);
            }
            None => pass.draw(0..self.element_count, 0..1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_builder_triangle() {
        let mut builder = MeshBuilder::new();
        builder.add_triangle(
            [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.5, 1.0, 0.0),
            ],
            [Vec2::ZERO; 3],
        );
        assert_eq!(builder.vertex_count(), 3);
        let mesh = builder.finish();
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mesh_builder_box() {
        let mesh = marker_cube();
        // 6 faces * 2 triangles * 3 vertices = 36
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.element_count(), 36);
    }

    #[test]
    fn box_normals_point_outwards() {
        let mesh = marker_cube();
        for vertex in &mesh.vertices {
            let position = Vec3::from(vertex.position);
            let normal = Vec3::from(vertex.normal);
            assert!(position.dot(normal) > 0.0, "inward normal at {position}");
        }
    }

    #[test]
    fn skybox_spans_unit_cube() {
        let mesh = skybox_cube();
        assert_eq!(mesh.vertex_count(), 36);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 1.0)));
    }

    #[test]
    fn indexed_element_count() {
        let mesh = MeshData {
            vertices: vec![MeshVertex::new(Vec3::ZERO, Vec3::Y, Vec2::ZERO); 4],
            indices: Some(vec![0, 1, 3, 1, 2, 3]),
        };
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.element_count(), 6);
    }
}
