//! Render pipelines, one per shader and fixed-function state.

use std::collections::HashMap;

use wgpu::{BindGroupLayout, Device, RenderPipeline, ShaderModule, TextureFormat};

use yardview_core::{BlendMode, DepthCompare, ShaderKind};

use super::mesh::MeshVertex;
use super::schedule::PipelineKey;
use super::vertex::QuadVertex;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const COMMON_SHADER: &str = include_str!("shaders/common.wgsl");
const LIT_SHADER: &str = include_str!("shaders/lit.wgsl");
const TRANSPARENT_SHADER: &str = include_str!("shaders/transparent.wgsl");
const BIN_SHADER: &str = include_str!("shaders/bin.wgsl");
const MARKER_SHADER: &str = include_str!("shaders/marker.wgsl");
const SKYBOX_SHADER: &str = include_str!("shaders/skybox.wgsl");

/// Full WGSL source for a shader: the shared bindings plus its own stages.
pub fn shader_source(kind: ShaderKind) -> String {
    let stages = match kind {
        ShaderKind::Lit => LIT_SHADER,
        ShaderKind::Transparent => TRANSPARENT_SHADER,
        ShaderKind::BinQuad => BIN_SHADER,
        ShaderKind::LightMarker => MARKER_SHADER,
        ShaderKind::Skybox => SKYBOX_SHADER,
    };
    format!("{COMMON_SHADER}\n{stages}")
}

/// What a shader samples at bind group 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureBinding {
    None,
    Texture2d,
    Cube,
}

impl TextureBinding {
    pub fn for_shader(kind: ShaderKind) -> Self {
        match kind {
            ShaderKind::Lit | ShaderKind::Transparent | ShaderKind::BinQuad => Self::Texture2d,
            ShaderKind::LightMarker => Self::None,
            ShaderKind::Skybox => Self::Cube,
        }
    }
}

fn vertex_layout(kind: ShaderKind) -> wgpu::VertexBufferLayout<'static> {
    match kind {
        ShaderKind::Transparent | ShaderKind::BinQuad => QuadVertex::desc(),
        ShaderKind::Lit | ShaderKind::LightMarker | ShaderKind::Skybox => MeshVertex::desc(),
    }
}

pub fn blend_state(blend: BlendMode) -> Option<wgpu::BlendState> {
    match blend {
        BlendMode::Opaque => None,
        BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
    }
}

pub fn compare_function(compare: DepthCompare) -> wgpu::CompareFunction {
    match compare {
        DepthCompare::Less => wgpu::CompareFunction::Less,
        DepthCompare::LessEqual => wgpu::CompareFunction::LessEqual,
    }
}

fn uniform_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_layout_entries(
    dimension: wgpu::TextureViewDimension,
) -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: dimension,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

/// Bind group layouts shared by every pipeline.
pub struct BindGroupLayouts {
    /// Group 0: camera and lights.
    pub globals: BindGroupLayout,
    /// Group 1: model and normal matrix.
    pub instance: BindGroupLayout,
    /// Group 2 for 2D textures.
    pub texture_2d: BindGroupLayout,
    /// Group 2 for the skybox cubemap.
    pub cube: BindGroupLayout,
}

impl BindGroupLayouts {
    pub fn new(device: &Device) -> Self {
        let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global_bind_group_layout"),
            entries: &[uniform_layout_entry()],
        });
        let instance = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("instance_bind_group_layout"),
            entries: &[uniform_layout_entry()],
        });
        let texture_2d = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &texture_layout_entries(wgpu::TextureViewDimension::D2),
        });
        let cube = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cubemap_bind_group_layout"),
            entries: &texture_layout_entries(wgpu::TextureViewDimension::Cube),
        });

        Self {
            globals,
            instance,
            texture_2d,
            cube,
        }
    }

    fn texture(&self, binding: TextureBinding) -> Option<&BindGroupLayout> {
        match binding {
            TextureBinding::None => None,
            TextureBinding::Texture2d => Some(&self.texture_2d),
            TextureBinding::Cube => Some(&self.cube),
        }
    }
}

/// Lazily built pipelines, keyed by shader and state.
pub struct PipelineCache {
    format: TextureFormat,
    modules: HashMap<ShaderKind, ShaderModule>,
    pipelines: HashMap<PipelineKey, RenderPipeline>,
}

impl PipelineCache {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            modules: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&RenderPipeline> {
        self.pipelines.get(key)
    }

    /// Build the pipeline for `key` if it does not exist yet.
    pub fn prepare(&mut self, device: &Device, layouts: &BindGroupLayouts, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let module = self.modules.entry(key.shader).or_insert_with(|| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{:?}_shader", key.shader)),
                source: wgpu::ShaderSource::Wgsl(shader_source(key.shader).into()),
            })
        });

        let pipeline = create_pipeline(device, layouts, module, self.format, key);
        tracing::debug!(
            "Created pipeline for {:?} ({:?}, {:?})",
            key.shader,
            key.state.depth_compare,
            key.state.blend
        );
        self.pipelines.insert(key, pipeline);
    }
}

fn create_pipeline(
    device: &Device,
    layouts: &BindGroupLayouts,
    module: &ShaderModule,
    format: TextureFormat,
    key: PipelineKey,
) -> RenderPipeline {
    let mut bind_group_layouts = vec![&layouts.globals, &layouts.instance];
    if let Some(texture) = layouts.texture(TextureBinding::for_shader(key.shader)) {
        bind_group_layouts.push(texture);
    }

    let label = format!("{:?}_pipeline", key.shader);
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&label),
        bind_group_layouts: &bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout(key.shader)],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: blend_state(key.state.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Quads are seen from both sides and the skybox from inside.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: compare_function(key.state.depth_compare),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SHADERS: [ShaderKind; 5] = [
        ShaderKind::Lit,
        ShaderKind::Transparent,
        ShaderKind::BinQuad,
        ShaderKind::LightMarker,
        ShaderKind::Skybox,
    ];

    #[test]
    fn sources_share_bindings_and_entry_points() {
        for kind in ALL_SHADERS {
            let source = shader_source(kind);
            assert!(source.contains("var<uniform> globals"), "{kind:?}");
            assert!(source.contains("fn vs_main"), "{kind:?}");
            assert!(source.contains("fn fs_main"), "{kind:?}");
        }
    }

    #[test]
    fn texture_group_matches_source() {
        for kind in ALL_SHADERS {
            let source = shader_source(kind);
            let declared = source.contains("@group(2)");
            assert_eq!(
                declared,
                TextureBinding::for_shader(kind) != TextureBinding::None,
                "{kind:?}"
            );
            assert_eq!(
                source.contains("texture_cube"),
                TextureBinding::for_shader(kind) == TextureBinding::Cube,
                "{kind:?}"
            );
        }
    }

    #[test]
    fn quads_use_colored_vertices() {
        assert_eq!(vertex_layout(ShaderKind::BinQuad).array_stride, 32);
        assert_eq!(vertex_layout(ShaderKind::Lit).attributes.len(), 3);
        assert_eq!(
            vertex_layout(ShaderKind::Skybox).array_stride,
            std::mem::size_of::<MeshVertex>() as u64
        );
    }

    #[test]
    fn state_mapping() {
        assert_eq!(blend_state(BlendMode::Opaque), None);
        assert_eq!(
            blend_state(BlendMode::Alpha),
            Some(wgpu::BlendState::ALPHA_BLENDING)
        );
        assert_eq!(compare_function(DepthCompare::Less), wgpu::CompareFunction::Less);
        assert_eq!(
            compare_function(DepthCompare::LessEqual),
            wgpu::CompareFunction::LessEqual
        );
    }
}
