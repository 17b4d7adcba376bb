//! wgpu renderer for the viewer.
//!
//! Loads every mesh and texture once at startup, then executes one
//! [`FramePlan`] per frame in a single render pass.

pub mod gltf_loader;
pub mod mesh;
pub mod pipelines;
pub mod schedule;
pub mod texture;
pub mod uniforms;
pub mod vertex;

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::{
    Backends, BindGroup, Device, DeviceDescriptor, Instance, InstanceDescriptor, PowerPreference,
    Queue, RequestAdapterOptions, Surface, SurfaceConfiguration, TextureUsages,
};
use winit::{dpi::PhysicalSize, window::Window};

use yardview_core::{FramePlan, GeometryId, TextureId};

use crate::config::{aspect_ratio, ViewerConfig};
use mesh::GpuMesh;
use pipelines::{BindGroupLayouts, PipelineCache, TextureBinding, DEPTH_FORMAT};
use schedule::FrameSchedule;
use texture::{RgbaPixels, Texture, PLACEHOLDER_COLOR};
use uniforms::{GlobalUniforms, InstanceUniforms};

/// A drawable piece of a geometry.
struct GeometryPart {
    mesh: GpuMesh,
    /// Material texture for lit meshes.
    material: Option<BindGroup>,
}

/// Uniform buffers with bind groups, grown to the largest frame seen.
/// Every slot is written once per frame.
struct UniformPool {
    label: &'static str,
    size: wgpu::BufferAddress,
    slots: Vec<(wgpu::Buffer, BindGroup)>,
}

impl UniformPool {
    fn new(label: &'static str, size: usize) -> Self {
        Self {
            label,
            size: size as wgpu::BufferAddress,
            slots: Vec::new(),
        }
    }

    fn ensure(&mut self, device: &Device, layout: &wgpu::BindGroupLayout, count: usize) {
        while self.slots.len() < count {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: self.size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(self.label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.slots.push((buffer, bind_group));
        }
    }

    fn write<T: bytemuck::Pod>(&self, queue: &Queue, slot: usize, value: &T) {
        if let Some((buffer, _)) = self.slots.get(slot) {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(value));
        }
    }

    fn bind_group(&self, slot: usize) -> Option<&BindGroup> {
        self.slots.get(slot).map(|(_, bind_group)| bind_group)
    }
}

/// The main renderer.
pub struct Renderer {
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth_view: wgpu::TextureView,
    layouts: BindGroupLayouts,
    pipelines: PipelineCache,
    globals: UniformPool,
    instances: UniformPool,
    geometry: HashMap<GeometryId, Vec<GeometryPart>>,
    textures: HashMap<TextureId, BindGroup>,
    placeholder: BindGroup,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, viewer: &ViewerConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No suitable GPU adapter found"))?;

        tracing::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("yardview_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Surface is not supported by the adapter"))?;

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);
        let layouts = BindGroupLayouts::new(&device);

        let placeholder = Texture::from_pixels(
            &device,
            &queue,
            "placeholder",
            &RgbaPixels::solid(PLACEHOLDER_COLOR),
        )
        .bind_group(&device, &layouts.texture_2d);
        let geometry = load_geometry(&device, &queue, &layouts, viewer);
        let textures = load_textures(&device, &queue, &layouts, viewer);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_view,
            layouts,
            pipelines: PipelineCache::new(surface_format),
            globals: UniformPool::new(
                "global_uniform_buffer",
                std::mem::size_of::<GlobalUniforms>(),
            ),
            instances: UniformPool::new(
                "instance_uniform_buffer",
                std::mem::size_of::<InstanceUniforms>(),
            ),
            geometry,
            textures,
            placeholder,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
            tracing::debug!("Resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Reconfigure the surface at its current size.
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    /// Viewport width over height.
    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.size.width, self.size.height)
    }

    pub fn render(&mut self, plan: &FramePlan) -> Result<(), wgpu::SurfaceError> {
        let schedule = FrameSchedule::from_plan(plan);

        for key in schedule.pipeline_keys() {
            self.pipelines.prepare(&self.device, &self.layouts, key);
        }
        self.globals
            .ensure(&self.device, &self.layouts.globals, schedule.globals.len());
        self.instances
            .ensure(&self.device, &self.layouts.instance, schedule.draws.len());
        for (slot, globals) in schedule.globals.iter().enumerate() {
            self.globals.write(&self.queue, slot, globals);
        }
        for (slot, draw) in schedule.draws.iter().enumerate() {
            self.instances.write(&self.queue, slot, &draw.instance);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let clear = schedule.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x as f64,
                            g: clear.y as f64,
                            b: clear.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, draw) in schedule.draws.iter().enumerate() {
                let (Some(pipeline), Some(globals), Some(instance)) = (
                    self.pipelines.get(&draw.pipeline),
                    self.globals.bind_group(draw.globals_slot),
                    self.instances.bind_group(slot),
                ) else {
                    continue;
                };
                let Some(parts) = self.geometry.get(&draw.geometry) else {
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, globals, &[]);
                render_pass.set_bind_group(1, instance, &[]);

                let binding = TextureBinding::for_shader(draw.pipeline.shader);
                let bound = draw.texture.and_then(|id| self.textures.get(&id));
                for part in parts {
                    if binding != TextureBinding::None {
                        let Some(texture) = bound
                            .or(part.material.as_ref())
                            .or((binding == TextureBinding::Texture2d).then_some(&self.placeholder))
                        else {
                            continue;
                        };
                        render_pass.set_bind_group(2, texture, &[]);
                    }
                    part.mesh.draw(&mut render_pass);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_view(device: &Device, config: &SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Upload every geometry the scene names. Models that fail to load are
/// logged and left empty, so their draws produce nothing.
fn load_geometry(
    device: &Device,
    queue: &Queue,
    layouts: &BindGroupLayouts,
    viewer: &ViewerConfig,
) -> HashMap<GeometryId, Vec<GeometryPart>> {
    let mut geometry = HashMap::new();

    for id in GeometryId::ALL {
        let label = format!("{id:?}");
        let parts = match id {
            GeometryId::RoseQuad => vec![plain_part(GpuMesh::from_slices(
                device,
                &label,
                &vertex::ROSE_QUAD,
                None,
            ))],
            GeometryId::BinQuad => vec![plain_part(GpuMesh::from_slices(
                device,
                &label,
                &vertex::BIN_QUAD,
                Some(&vertex::BIN_INDICES[..]),
            ))],
            GeometryId::MarkerCube => {
                vec![plain_part(GpuMesh::upload(device, &label, &mesh::marker_cube()))]
            }
            GeometryId::SkyboxCube => {
                vec![plain_part(GpuMesh::upload(device, &label, &mesh::skybox_cube()))]
            }
            GeometryId::Dog | GeometryId::Ball | GeometryId::Crate | GeometryId::Orange => {
                load_model_parts(device, queue, layouts, viewer, id)
            }
        };
        geometry.insert(id, parts);
    }

    geometry
}

fn plain_part(mesh: GpuMesh) -> GeometryPart {
    GeometryPart {
        mesh,
        material: None,
    }
}

fn load_model_parts(
    device: &Device,
    queue: &Queue,
    layouts: &BindGroupLayouts,
    viewer: &ViewerConfig,
    id: GeometryId,
) -> Vec<GeometryPart> {
    let Some(path) = viewer.model_path(id) else {
        return Vec::new();
    };

    let primitives = match gltf_loader::load_model(&path) {
        Ok(primitives) => primitives,
        Err(e) => {
            tracing::error!("Model failed to load at path {}: {e}", path.display());
            return Vec::new();
        }
    };

    primitives
        .iter()
        .enumerate()
        .map(|(index, primitive)| {
            let label = format!("{id:?}_{index}");
            let material = Texture::from_pixels(device, queue, &label, &primitive.base_color)
                .bind_group(device, &layouts.texture_2d);
            GeometryPart {
                mesh: GpuMesh::upload(device, &label, &primitive.mesh),
                material: Some(material),
            }
        })
        .collect()
}

fn load_textures(
    device: &Device,
    queue: &Queue,
    layouts: &BindGroupLayouts,
    viewer: &ViewerConfig,
) -> HashMap<TextureId, BindGroup> {
    let mut textures = HashMap::new();

    for id in [TextureId::Rose, TextureId::Bin] {
        if let Some(path) = viewer.texture_path(id) {
            let texture = Texture::load_or_placeholder(device, queue, &format!("{id:?}"), &path);
            textures.insert(id, texture.bind_group(device, &layouts.texture_2d));
        }
    }

    let skybox = Texture::load_cubemap_or_placeholder(device, queue, &viewer.skybox_paths());
    textures.insert(TextureId::Skybox, skybox.bind_group(device, &layouts.cube));

    textures
}
