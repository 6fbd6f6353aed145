//! Kotodama Render - wgpu renderer for the word field
//!
//! Renders extruded word-glyph meshes over an animated 4-color noise
//! gradient, either as a single view or as two half-viewport stereo eyes.
//! The simulation never touches the GPU; everything here keys off the
//! field's stable slot ids.

mod background;
mod camera;
mod context;
mod glyph;
mod glyph_pipeline;
mod mesh_cache;
mod stereo;

pub use background::{BackgroundField, BackgroundUniforms};
pub use camera::Camera;
pub use context::{probe_adapter, RenderContext, RenderError};
pub use glyph::{GlyphMesh, GlyphMeshFactory, GlyphSource, Vertex, GLYPH_DEPTH, GLYPH_SIZE};
pub use glyph_pipeline::{FrameUniforms, GlyphPipeline, ModelUniforms};
pub use mesh_cache::{GlyphMeshCache, GpuGlyphMesh};
pub use stereo::{split_viewport, EyeViewport, StereoCompositor, EYE_SEPARATION};

#[cfg(test)]
mod tests {
    #[test]
    fn glyph_shader_wgsl_parses() {
        let source = include_str!("glyph_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("glyph_shader.wgsl failed to parse");
    }

    #[test]
    fn background_shader_wgsl_parses() {
        let source = include_str!("background_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("background_shader.wgsl failed to parse");
    }
}
