//! Animated gradient background
//!
//! A fullscreen triangle whose fragment shader blends four palette colors
//! through layered simplex noise — slow organic drift behind the word
//! field. Colors are fixed at construction; a new palette means a new
//! `BackgroundField`.

use bytemuck::{Pod, Zeroable};
use kotodama_core::Color;

/// Uniforms for the gradient shader. Colors are padded to vec4 boundaries.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BackgroundUniforms {
    pub color1: [f32; 4],
    pub color2: [f32; 4],
    pub color3: [f32; 4],
    pub color4: [f32; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub _pad: f32,
}

impl BackgroundUniforms {
    pub fn new(colors: [Color; 4], resolution: [f32; 2], time: f32) -> Self {
        let pad = |c: Color| [c.r, c.g, c.b, 1.0];
        Self {
            color1: pad(colors[0]),
            color2: pad(colors[1]),
            color3: pad(colors[2]),
            color4: pad(colors[3]),
            resolution,
            time,
            _pad: 0.0,
        }
    }
}

/// The background rendering pipeline and its uniform state
pub struct BackgroundField {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    colors: [Color; 4],
}

impl BackgroundField {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, colors: [Color; 4]) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("background_shader.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Background Bind Group Layout"),
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_background"),
                buffers: &[], // Fullscreen triangle generated from vertex_index
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_background"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                // Drawn first, behind everything
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Background Uniforms"),
            size: std::mem::size_of::<BackgroundUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Background Bind Group"),
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            colors,
        }
    }

    /// Upload this frame's time and resolution
    pub fn update(&self, queue: &wgpu::Queue, time: f32, resolution: [f32; 2]) {
        let uniforms = BackgroundUniforms::new(self.colors, resolution, time);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Draw into the current pass (respects the pass's viewport)
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    /// Teardown: release the uniform buffer. Pipelines are dropped with
    /// the struct.
    pub fn dispose(&self) {
        self.uniform_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_tightly_packed() {
        // 4 colors (vec4) + resolution + time + pad = 80 bytes
        assert_eq!(std::mem::size_of::<BackgroundUniforms>(), 80);
    }

    #[test]
    fn uniforms_carry_palette_in_order() {
        let colors = [
            Color::from_hex("#E6E6FA").unwrap(),
            Color::from_hex("#B0E0E6").unwrap(),
            Color::from_hex("#F0E68C").unwrap(),
            Color::from_hex("#FFB6C1").unwrap(),
        ];
        let u = BackgroundUniforms::new(colors, [800.0, 600.0], 1.5);
        assert_eq!(u.color1[0], colors[0].r);
        assert_eq!(u.color4[2], colors[3].b);
        assert_eq!(u.resolution, [800.0, 600.0]);
        assert_eq!(u.time, 1.5);
        assert_eq!(u.color2[3], 1.0);
    }
}
