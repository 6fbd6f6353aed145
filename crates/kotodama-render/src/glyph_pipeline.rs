//! Word-glyph render pipeline
//!
//! Alpha-blended lit meshes, one draw per particle. Per-frame camera/light
//! data lives in one uniform buffer per eye (stereo writes both before the
//! pass, so neither eye sees the other's view matrix); per-particle model
//! and tint live in small per-slot buffers owned by the mesh cache.

use crate::glyph::Vertex;
use bytemuck::{Pod, Zeroable};

/// Camera and light uniforms shared by every glyph draw in one eye's pass
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_pos: [f32; 3],
    pub ambient: f32,
}

/// Per-particle uniforms: placement and tint (rgb + opacity)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

/// The glyph rendering pipeline with one frame-uniform slot per eye
pub struct GlyphPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub model_bind_group_layout: wgpu::BindGroupLayout,
    /// Index 0 = mono/left eye, 1 = right eye
    pub frame_buffers: [wgpu::Buffer; 2],
    pub frame_bind_groups: [wgpu::BindGroup; 2],
}

impl GlyphPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Glyph Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("glyph_shader.wgsl").into()),
        });

        // Group 0: FrameUniforms (camera + light)
        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Glyph Frame Bind Group Layout"),
            });

        // Group 1: ModelUniforms (per particle)
        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Glyph Model Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glyph Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout, &model_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Glyph Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_glyph"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_glyph"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Walls and caps are both visible while glyphs tumble
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                // Transparent, unsorted: test but never write
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let make_frame_buffer = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<FrameUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let frame_buffers = [
            make_frame_buffer("Glyph Frame Uniforms (left)"),
            make_frame_buffer("Glyph Frame Uniforms (right)"),
        ];
        let frame_bind_groups = [
            make_frame_bind_group(device, &frame_bind_group_layout, &frame_buffers[0], "left"),
            make_frame_bind_group(device, &frame_bind_group_layout, &frame_buffers[1], "right"),
        ];

        Self {
            pipeline,
            frame_bind_group_layout,
            model_bind_group_layout,
            frame_buffers,
            frame_bind_groups,
        }
    }

    /// Upload one eye's camera/light uniforms
    pub fn write_frame_uniforms(&self, queue: &wgpu::Queue, eye: usize, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.frame_buffers[eye], 0, bytemuck::bytes_of(uniforms));
    }
}

fn make_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some(&format!("Glyph Frame Bind Group ({label})")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layouts_are_aligned() {
        // Uniform buffers want 16-byte alignment
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniforms>() % 16, 0);
    }
}
