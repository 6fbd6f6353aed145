//! Slot-keyed GPU glyph mesh cache
//!
//! One GPU mesh per pool slot. Slots are recycled by the field, so the
//! cache never holds more meshes than the pool's peak active count: a
//! reused slot with the same word and layout reuses its buffers untouched,
//! and a reused slot with a different word rebuilds geometry in place.
//! Buffers are destroyed exactly once, in `drain` at field teardown.

use crate::glyph::{GlyphMesh, GlyphMeshFactory, GlyphSource};
use crate::glyph_pipeline::{GlyphPipeline, ModelUniforms};
use kotodama_core::Result;
use kotodama_field::SlotId;
use std::collections::HashMap;
use wgpu::util::DeviceExt;

/// GPU-resident mesh for one slot, plus its per-draw uniform slot
pub struct GpuGlyphMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub model_buffer: wgpu::Buffer,
    pub model_bind_group: wgpu::BindGroup,
    word: String,
    vertical: bool,
}

#[derive(Default)]
pub struct GlyphMeshCache {
    meshes: HashMap<SlotId, GpuGlyphMesh>,
    built_total: usize,
}

impl GlyphMeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `slot` has a mesh for (word, vertical), building or
    /// rebuilding geometry only when they changed.
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        pipeline: &GlyphPipeline,
        slot: SlotId,
        word: &str,
        vertical: bool,
        source: &GlyphSource,
    ) -> Result<()> {
        if let Some(existing) = self.meshes.get(&slot) {
            if existing.word == word && existing.vertical == vertical {
                return Ok(());
            }
        }

        let mesh = GlyphMeshFactory::build(word, vertical, source)?;
        let (vertex_buffer, index_buffer, index_count) = upload_geometry(device, &mesh);
        self.built_total += 1;

        match self.meshes.get_mut(&slot) {
            Some(existing) => {
                // Same particle slot, new word: swap geometry, keep the
                // model uniform buffer and bind group
                existing.vertex_buffer.destroy();
                existing.index_buffer.destroy();
                existing.vertex_buffer = vertex_buffer;
                existing.index_buffer = index_buffer;
                existing.index_count = index_count;
                existing.word = word.to_string();
                existing.vertical = vertical;
            }
            None => {
                let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Glyph Model Uniforms"),
                    size: std::mem::size_of::<ModelUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &pipeline.model_bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: model_buffer.as_entire_binding(),
                    }],
                    label: Some("Glyph Model Bind Group"),
                });
                self.meshes.insert(
                    slot,
                    GpuGlyphMesh {
                        vertex_buffer,
                        index_buffer,
                        index_count,
                        model_buffer,
                        model_bind_group,
                        word: word.to_string(),
                        vertical,
                    },
                );
            }
        }
        Ok(())
    }

    pub fn get(&self, slot: SlotId) -> Option<&GpuGlyphMesh> {
        self.meshes.get(&slot)
    }

    /// Upload one slot's model matrix and tint for this frame
    pub fn write_model(&self, queue: &wgpu::Queue, slot: SlotId, uniforms: &ModelUniforms) {
        if let Some(mesh) = self.meshes.get(&slot) {
            queue.write_buffer(&mesh.model_buffer, 0, bytemuck::bytes_of(uniforms));
        }
    }

    /// Destroy every buffer and forget all slots. Teardown only.
    pub fn drain(&mut self) {
        for mesh in self.meshes.values() {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
            mesh.model_buffer.destroy();
        }
        self.meshes.clear();
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total geometry builds, for leak accounting: with a fixed word/layout
    /// population this stays at the peak active count
    pub fn built_total(&self) -> usize {
        self.built_total
    }
}

fn upload_geometry(device: &wgpu::Device, mesh: &GlyphMesh) -> (wgpu::Buffer, wgpu::Buffer, u32) {
    // Whitespace-only words have no geometry; a zeroed quad keeps buffer
    // creation valid and index_count 0 skips the draw
    if mesh.is_empty() {
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glyph Vertex Buffer (empty)"),
            size: std::mem::size_of::<crate::glyph::Vertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glyph Index Buffer (empty)"),
            size: std::mem::size_of::<u32>() as u64,
            usage: wgpu::BufferUsages::INDEX,
            mapped_at_creation: false,
        });
        return (vertex_buffer, index_buffer, 0);
    }

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Glyph Vertex Buffer"),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Glyph Index Buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vertex_buffer, index_buffer, mesh.index_count())
}
