//! Texture loading.
//!
//! Every texture the scene binds exists after startup. A file that fails to
//! decode is logged with its path and replaced by a 1x1 placeholder, so the
//! frame loop never checks handles.

use std::path::{Path, PathBuf};

/// Error type for texture loading.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cubemap face {path} is {width}x{height}, expected {expected}x{expected}")]
    FaceSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: u32,
    },

    #[error("Cubemap face {path} is not square ({width}x{height})")]
    NotSquare { path: PathBuf, width: u32, height: u32 },

    #[error("Image is {width}x{height}, the device allows at most {max}x{max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaPixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaPixels {
    /// A single opaque pixel.
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
        }
    }

    /// Decode an image file into RGBA8.
    pub fn open(path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            data: image.into_raw(),
        })
    }

    /// Fail if either side exceeds `max` texels.
    pub fn check_size(&self, max: u32) -> Result<(), TextureError> {
        if self.width > max || self.height > max {
            return Err(TextureError::TooLarge {
                width: self.width,
                height: self.height,
                max,
            });
        }
        Ok(())
    }
}

/// Placeholder for a missing 2D texture.
pub const PLACEHOLDER_COLOR: [u8; 4] = [255, 0, 255, 255];
/// Placeholder for a missing skybox face.
pub const PLACEHOLDER_SKY: [u8; 4] = [40, 40, 48, 255];

/// Decode all six faces, requiring square faces of one size no larger than `max_edge`.
pub fn decode_cubemap(paths: &[PathBuf; 6], max_edge: u32) -> Result<Vec<RgbaPixels>, TextureError> {
    let mut faces: Vec<RgbaPixels> = Vec::with_capacity(6);
    for path in paths {
        let face = RgbaPixels::open(path)?;
        face.check_size(max_edge)?;
        if face.width != face.height {
            return Err(TextureError::NotSquare {
                path: path.clone(),
                width: face.width,
                height: face.height,
            });
        }
        if let Some(first) = faces.first() {
            if face.width != first.width {
                return Err(TextureError::FaceSize {
                    path: path.clone(),
                    width: face.width,
                    height: face.height,
                    expected: first.width,
                });
            }
        }
        faces.push(face);
    }
    Ok(faces)
}

/// A sampled GPU texture.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Upload RGBA8 pixels as an sRGB 2D texture. Pixels the device cannot
    /// hold are replaced by the placeholder.
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        pixels: &RgbaPixels,
    ) -> Self {
        let placeholder;
        let pixels = match pixels.check_size(device.limits().max_texture_dimension_2d) {
            Ok(()) => pixels,
            Err(e) => {
                tracing::error!("Texture {label} replaced by placeholder: {e}");
                placeholder = RgbaPixels::solid(PLACEHOLDER_COLOR);
                &placeholder
            }
        };

        let size = wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_layer(queue, &texture, 0, pixels);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Load a 2D texture, falling back to the placeholder on failure.
    pub fn load_or_placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        path: &Path,
    ) -> Self {
        let pixels = match RgbaPixels::open(path) {
            Ok(pixels) => {
                tracing::debug!("Loaded texture {} ({}x{})", path.display(), pixels.width, pixels.height);
                pixels
            }
            Err(e) => {
                tracing::error!("Texture failed to load at path {}: {e}", path.display());
                RgbaPixels::solid(PLACEHOLDER_COLOR)
            }
        };
        Self::from_pixels(device, queue, label, &pixels)
    }

    /// Load a six-face cubemap, falling back to a flat placeholder on failure.
    pub fn load_cubemap_or_placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        paths: &[PathBuf; 6],
    ) -> Self {
        let max_edge = device.limits().max_texture_dimension_2d;
        let faces = match decode_cubemap(paths, max_edge) {
            Ok(faces) => faces,
            Err(e) => {
                tracing::error!("Cubemap failed to load: {e}");
                vec![RgbaPixels::solid(PLACEHOLDER_SKY); 6]
            }
        };
        Self::cubemap_from_faces(device, queue, &faces)
    }

    fn cubemap_from_faces(device: &wgpu::Device, queue: &wgpu::Queue, faces: &[RgbaPixels]) -> Self {
        let edge = faces.first().map_or(1, |face| face.width);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("skybox_cubemap"),
            size: wgpu::Extent3d {
                width: edge,
                height: edge,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, face) in faces.iter().enumerate() {
            write_layer(queue, &texture, layer as u32, face);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("skybox_cubemap_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Bind group exposing this texture at bindings 0 (view) and 1 (sampler).
    pub fn bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, pixels: &RgbaPixels) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        &pixels.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * pixels.width),
            rows_per_image: Some(pixels.height),
        },
        wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RgbaPixels::open(Path::new("no/such/texture.png")).unwrap_err();
        assert!(err.to_string().contains("no/such/texture.png"));
    }

    #[test]
    fn decodes_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        write_png(&path, 3, 2);

        let pixels = RgbaPixels::open(&path).unwrap();
        assert_eq!((pixels.width, pixels.height), (3, 2));
        assert_eq!(pixels.data.len(), 3 * 2 * 4);
        assert_eq!(&pixels.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn cubemap_faces_must_match() {
        let dir = tempfile::tempdir().unwrap();
        let paths: [PathBuf; 6] = std::array::from_fn(|i| dir.path().join(format!("face{i}.png")));
        for path in &paths {
            write_png(path, 4, 4);
        }
        assert_eq!(decode_cubemap(&paths, 8192).unwrap().len(), 6);

        write_png(&paths[4], 8, 8);
        assert!(matches!(
            decode_cubemap(&paths, 8192),
            Err(TextureError::FaceSize { expected: 4, .. })
        ));

        write_png(&paths[0], 4, 2);
        assert!(matches!(
            decode_cubemap(&paths, 8192),
            Err(TextureError::NotSquare { .. })
        ));
    }

    #[test]
    fn oversized_images_are_rejected() {
        let pixels = RgbaPixels {
            width: 8193,
            height: 16,
            data: Vec::new(),
        };
        assert!(matches!(
            pixels.check_size(8192),
            Err(TextureError::TooLarge { width: 8193, height: 16, max: 8192 })
        ));
        assert!(RgbaPixels::solid(PLACEHOLDER_COLOR).check_size(1).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let paths: [PathBuf; 6] = std::array::from_fn(|i| dir.path().join(format!("face{i}.png")));
        for path in &paths {
            write_png(path, 8, 8);
        }
        assert!(matches!(
            decode_cubemap(&paths, 4),
            Err(TextureError::TooLarge { max: 4, .. })
        ));
    }

    #[test]
    fn solid_is_one_pixel() {
        let pixel = RgbaPixels::solid(PLACEHOLDER_COLOR);
        assert_eq!((pixel.width, pixel.height), (1, 1));
        assert_eq!(pixel.data, PLACEHOLDER_COLOR);
    }
}
