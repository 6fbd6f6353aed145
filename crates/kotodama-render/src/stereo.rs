//! Mono / stereo frame composition
//!
//! One render pass per frame: the background triangle then every glyph
//! mesh, drawn once at full viewport size in mono or twice into two
//! half-width viewports in stereo. The split is a pure function of the
//! surface size and the stereo flag, so resizing just recomputes it.
//!
//! Rendering mutates nothing in the scene: a static field produces
//! identical frames on every call.

use crate::background::BackgroundField;
use crate::camera::Camera;
use crate::context::{RenderContext, RenderError};
use crate::glyph_pipeline::{FrameUniforms, GlyphPipeline, ModelUniforms};
use crate::mesh_cache::GlyphMeshCache;
use kotodama_core::Vec3;
use kotodama_field::{Orientation, Particle, ParticleField};
use kotodama_runtime::RenderSettings;

/// Horizontal camera offset between stereo eyes, world units
pub const EYE_SEPARATION: f32 = 0.064;

/// Point light position (shared with the original scene layout)
const LIGHT_POS: [f32; 3] = [0.0, 0.0, 10.0];
const AMBIENT: f32 = 0.3;

/// One eye's share of the surface, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Mono: the whole surface. Stereo: two equal horizontal halves.
pub fn split_viewport(width: u32, height: u32, stereo: bool) -> Vec<EyeViewport> {
    let (w, h) = (width as f32, height as f32);
    if stereo {
        let half = w / 2.0;
        vec![
            EyeViewport {
                x: 0.0,
                y: 0.0,
                width: half,
                height: h,
            },
            EyeViewport {
                x: half,
                y: 0.0,
                width: half,
                height: h,
            },
        ]
    } else {
        vec![EyeViewport {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
        }]
    }
}

/// Model matrix for one particle. Billboards rotate to face the camera;
/// FixedVertical particles carry translation only.
pub fn model_matrix(particle: &Particle, camera_pos: Vec3) -> [[f32; 4]; 4] {
    let p = particle.position;
    match particle.orientation {
        Orientation::FixedVertical => [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [p.x, p.y, p.z, 1.0],
        ],
        Orientation::Billboard => {
            let forward = (camera_pos - p).normalized();
            let mut right = Vec3::UP.cross(&forward);
            if right.length() < 1e-5 {
                // Camera straight above or below: any horizontal right works
                right = Vec3::new(1.0, 0.0, 0.0);
            }
            let right = right.normalized();
            let up = forward.cross(&right);
            [
                [right.x, right.y, right.z, 0.0],
                [up.x, up.y, up.z, 0.0],
                [forward.x, forward.y, forward.z, 0.0],
                [p.x, p.y, p.z, 1.0],
            ]
        }
    }
}

/// Composes the scene into the surface, mono or stereo
pub struct StereoCompositor {
    pub glyph_pipeline: GlyphPipeline,
}

impl StereoCompositor {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            glyph_pipeline: GlyphPipeline::new(device, format),
        }
    }

    /// Render one frame. `time` feeds the background shader; everything
    /// else is read-only scene state.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        context: &RenderContext,
        camera: &Camera,
        field: &ParticleField,
        cache: &GlyphMeshCache,
        background: &BackgroundField,
        settings: &RenderSettings,
        time: f32,
    ) -> Result<(), RenderError> {
        let (width, height) = (context.config.width, context.config.height);
        let viewports = split_viewport(width, height, settings.stereo);

        // Per-eye cameras: parallel eyes around the scene camera, aspect
        // matched to their viewport share
        let eyes: Vec<Camera> = if settings.stereo {
            let mut left = camera.offset_eye(-EYE_SEPARATION / 2.0);
            let mut right = camera.offset_eye(EYE_SEPARATION / 2.0);
            left.aspect = viewports[0].width / viewports[0].height;
            right.aspect = left.aspect;
            vec![left, right]
        } else {
            vec![camera.clone()]
        };

        // Upload all uniforms before the pass so neither eye sees the
        // other's writes
        background.update(&context.queue, time, [width as f32, height as f32]);
        for (eye, eye_camera) in eyes.iter().enumerate() {
            self.glyph_pipeline.write_frame_uniforms(
                &context.queue,
                eye,
                &FrameUniforms {
                    view_proj: eye_camera.view_projection_matrix(),
                    light_pos: LIGHT_POS,
                    ambient: AMBIENT,
                },
            );
        }
        // Billboards face the central camera, so both eyes share one model
        // matrix per particle
        for (slot, particle) in field.active() {
            cache.write_model(
                &context.queue,
                slot,
                &ModelUniforms {
                    model: model_matrix(particle, camera.position),
                    tint: [1.0, 1.0, 1.0, particle.opacity],
                },
            );
        }

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // The next resize reconfigures; skip this frame
                return Ok(());
            }
            Err(e) => return Err(RenderError::SurfaceError(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &context.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for (eye, viewport) in viewports.iter().enumerate() {
                pass.set_viewport(
                    viewport.x,
                    viewport.y,
                    viewport.width,
                    viewport.height,
                    0.0,
                    1.0,
                );

                background.draw(&mut pass);

                pass.set_pipeline(&self.glyph_pipeline.pipeline);
                pass.set_bind_group(0, &self.glyph_pipeline.frame_bind_groups[eye], &[]);
                for (slot, _) in field.active() {
                    let Some(mesh) = cache.get(slot) else {
                        continue;
                    };
                    if mesh.index_count == 0 {
                        continue;
                    }
                    pass.set_bind_group(1, &mesh.model_bind_group, &[]);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::mat4_mul;

    fn particle_at(position: Vec3, orientation: Orientation) -> Particle {
        Particle {
            word: "test".to_string(),
            position,
            velocity: Vec3::ZERO,
            age: 2.0,
            lifespan: 10.0,
            opacity: 1.0,
            orientation,
            alive: true,
        }
    }

    #[test]
    fn mono_split_is_the_full_surface() {
        let viewports = split_viewport(1280, 720, false);
        assert_eq!(viewports.len(), 1);
        assert_eq!(
            viewports[0],
            EyeViewport {
                x: 0.0,
                y: 0.0,
                width: 1280.0,
                height: 720.0
            }
        );
    }

    #[test]
    fn stereo_split_is_two_equal_halves() {
        let viewports = split_viewport(1280, 720, true);
        assert_eq!(viewports.len(), 2);
        assert_eq!(viewports[0].width, 640.0);
        assert_eq!(viewports[1].x, 640.0);
        assert_eq!(viewports[0].height, viewports[1].height);
        assert_eq!(viewports[0].width, viewports[1].width);
    }

    #[test]
    fn split_is_idempotent() {
        // Rendering the same static scene twice must set up identical
        // viewports — no per-call side effects
        assert_eq!(split_viewport(800, 600, true), split_viewport(800, 600, true));
        assert_eq!(split_viewport(800, 600, false), split_viewport(800, 600, false));
    }

    #[test]
    fn resize_recomputes_the_split() {
        let before = split_viewport(1280, 720, true);
        let after = split_viewport(1920, 1080, true);
        assert_ne!(before[1].x, after[1].x);
        assert_eq!(after[1].x, 960.0);
    }

    #[test]
    fn fixed_vertical_never_rotates() {
        let p = particle_at(Vec3::new(3.0, -2.0, 1.0), Orientation::FixedVertical);
        let m = model_matrix(&p, Vec3::new(0.0, 0.0, 15.0));
        assert_eq!(m[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(m[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(m[2], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(m[3], [3.0, -2.0, 1.0, 1.0]);
    }

    #[test]
    fn billboard_faces_the_camera() {
        let p = particle_at(Vec3::ZERO, Orientation::Billboard);
        let m = model_matrix(&p, Vec3::new(0.0, 0.0, 15.0));
        // Forward column points at the camera
        assert!((m[2][2] - 1.0).abs() < 1e-6);
        // Basis stays right-handed and orthonormal
        assert!((m[0][0] - 1.0).abs() < 1e-6);
        assert!((m[1][1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn billboard_survives_degenerate_vertical_alignment() {
        let p = particle_at(Vec3::ZERO, Orientation::Billboard);
        let m = model_matrix(&p, Vec3::new(0.0, 20.0, 0.0));
        // No NaNs, basis columns stay unit length
        for col in &m[0..3] {
            let len = (col[0] * col[0] + col[1] * col[1] + col[2] * col[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn matrix_helper_keeps_mul_identity() {
        let m = model_matrix(
            &particle_at(Vec3::new(1.0, 2.0, 3.0), Orientation::FixedVertical),
            Vec3::ZERO,
        );
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        assert_eq!(mat4_mul(&m, &identity), m);
    }
}
