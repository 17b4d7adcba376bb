//! glTF model loader.
//!
//! Loads .glb/.gltf files and flattens every primitive into a world-space
//! triangle mesh paired with its base color:
//! - Node transforms are baked into positions and normals
//! - Missing normals are generated from the triangles
//! - The base color texture, or a solid pixel of the base color factor

use std::path::Path;

use glam::{Mat3, Mat4, Vec2, Vec3};

use super::mesh::{MeshData, MeshVertex};
use super::texture::RgbaPixels;

/// Error type for glTF loading.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to load glTF file: {0}")]
    LoadError(#[from] gltf::Error),

    #[error("Missing position data for mesh: {0}")]
    MissingPositions(String),

    #[error("Model contains no triangles")]
    Empty,
}

/// One drawable part of a model.
#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub mesh: MeshData,
    pub base_color: RgbaPixels,
}

/// Load a glTF/GLB file from disk.
pub fn load_model(path: impl AsRef<Path>) -> Result<Vec<ModelPrimitive>, ModelError> {
    let path = path.as_ref();
    let (document, buffers, images) = gltf::import(path)?;
    let primitives = collect_primitives(&document, &buffers, &images)?;

    tracing::info!(
        "Loaded glTF model {}: {} primitives, {} vertices",
        path.display(),
        primitives.len(),
        primitives.iter().map(|p| p.mesh.vertex_count()).sum::<u32>()
    );

    Ok(primitives)
}

/// Load glTF data already in memory.
pub fn load_model_from_bytes(data: &[u8]) -> Result<Vec<ModelPrimitive>, ModelError> {
    let (document, buffers, images) = gltf::import_slice(data)?;
    collect_primitives(&document, &buffers, &images)
}

fn collect_primitives(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<Vec<ModelPrimitive>, ModelError> {
    let mut primitives = Vec::new();

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            process_node(&node, Mat4::IDENTITY, buffers, images, &mut primitives)?;
        }
    }

    if primitives.is_empty() {
        return Err(ModelError::Empty);
    }
    Ok(primitives)
}

/// Process a glTF node and its children recursively.
fn process_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    primitives: &mut Vec<ModelPrimitive>,
) -> Result<(), ModelError> {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = mesh.name().unwrap_or("unnamed");

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!("Skipping non-triangle primitive in mesh {name}");
                continue;
            }
            let data = extract_primitive_data(&primitive, buffers, transform, name)?;
            primitives.push(ModelPrimitive {
                mesh: data,
                base_color: base_color(&primitive.material(), images),
            });
        }
    }

    for child in node.children() {
        process_node(&child, transform, buffers, images, primitives)?;
    }

    Ok(())
}

/// Extract world-space vertices and indices from a glTF primitive.
fn extract_primitive_data(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
    name: &str,
) -> Result<MeshData, ModelError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

    // Extract positions (required)
    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| ModelError::MissingPositions(name.to_string()))?
        .map(|p| transform.transform_point3(Vec3::from(p)))
        .collect();

    // Extract indices (generate if missing)
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(iter) => iter
            .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero())
            .collect(),
        None => generate_normals(&positions, &indices),
    };

    let tex_coords: Vec<Vec2> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().map(Vec2::from).collect())
        .unwrap_or_else(|| vec![Vec2::ZERO; positions.len()]);

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            MeshVertex::new(
                position,
                normals.get(i).copied().unwrap_or(Vec3::Y),
                tex_coords.get(i).copied().unwrap_or(Vec2::ZERO),
            )
        })
        .collect();

    Ok(MeshData {
        vertices,
        indices: Some(indices),
    })
}

/// Smooth normals: each vertex averages the faces that use it.
fn generate_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (Some(&pa), Some(&pb), Some(&pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// Base color texture as RGBA8, or a single pixel of the base color factor.
fn base_color(material: &gltf::Material, images: &[gltf::image::Data]) -> RgbaPixels {
    let pbr = material.pbr_metallic_roughness();

    let texture = pbr
        .base_color_texture()
        .and_then(|info| images.get(info.texture().source().index()))
        .and_then(to_rgba);
    if let Some(pixels) = texture {
        return pixels;
    }

    let factor = pbr.base_color_factor();
    RgbaPixels::solid(factor.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}

fn to_rgba(image: &gltf::image::Data) -> Option<RgbaPixels> {
    use gltf::image::Format;

    let data = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            tracing::warn!("Unsupported glTF image format {other:?}, using base color factor");
            return None;
        }
    };

    Some(RgbaPixels {
        width: image.width,
        height: image.height,
        data,
    })
}
