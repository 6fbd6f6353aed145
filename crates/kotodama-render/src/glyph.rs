//! Extruded word-glyph mesh building
//!
//! Turns a word string into a 3D mesh: glyph outlines are pulled from the
//! loaded font, curves flattened to polylines, contours extruded in z with
//! side walls, and front/back caps triangulated by ear clipping. Vertical
//! mode stacks one glyph per line top-to-bottom instead of advancing
//! left-to-right.
//!
//! Opacity is not baked in here — meshes are drawn with a per-particle
//! tint, and a freshly spawned particle starts fully transparent.

use bytemuck::{Pod, Zeroable};
use kotodama_core::{KotodamaError, Result};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Glyph height in world units
pub const GLYPH_SIZE: f32 = 0.5;
/// Extrusion depth in world units
pub const GLYPH_DEPTH: f32 = 0.1;

/// Bezier flattening steps per curve segment
const CURVE_STEPS: u32 = 8;
/// Line spacing multiple of GLYPH_SIZE for vertical stacks
const LINE_SPACING: f32 = 1.15;
/// Pen advance for characters without an outline (spaces, missing glyphs)
const FALLBACK_ADVANCE: f32 = 0.6 * GLYPH_SIZE;

/// A glyph-mesh vertex: position and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// CPU-side mesh for one word, centered on the origin
pub struct GlyphMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl GlyphMesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// True for words with no drawable outlines (all whitespace)
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// The loaded font, delivered asynchronously by the app. Owns the raw TTF
/// bytes; faces are re-parsed per build, which is cheap (the parse is a
/// header walk, not a decode).
pub struct GlyphSource {
    data: Vec<u8>,
}

impl GlyphSource {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        // Validate up front so later face() calls cannot surprise callers
        Face::parse(&data, 0).map_err(|e| KotodamaError::Asset(e.to_string()))?;
        Ok(Self { data })
    }

    fn face(&self) -> Result<Face<'_>> {
        Face::parse(&self.data, 0).map_err(|e| KotodamaError::Asset(e.to_string()))
    }
}

/// Builds word meshes from a glyph source. Stateless; callers gate on the
/// source being loaded before invoking.
pub struct GlyphMeshFactory;

impl GlyphMeshFactory {
    pub fn build(word: &str, vertical: bool, source: &GlyphSource) -> Result<GlyphMesh> {
        let face = source.face()?;
        let scale = GLYPH_SIZE / face.units_per_em() as f32;

        // Flatten each character's outline and record its advance
        let mut outlines: Vec<Vec<Vec<[f32; 2]>>> = Vec::new();
        let mut advances: Vec<f32> = Vec::new();
        for ch in word.chars() {
            let glyph = face.glyph_index(ch);
            let advance = glyph
                .and_then(|id| face.glyph_hor_advance(id))
                .map(|a| a as f32 * scale)
                .unwrap_or(FALLBACK_ADVANCE);
            let contours = match glyph {
                Some(id) => flatten_glyph(&face, id, scale),
                None => Vec::new(),
            };
            outlines.push(contours);
            advances.push(advance);
        }

        // Place glyphs, then extrude everything into one mesh
        let offsets = layout_offsets(&advances, vertical);
        let mut placed: Vec<Vec<[f32; 2]>> = Vec::new();
        for (contours, offset) in outlines.into_iter().zip(&offsets) {
            for mut contour in contours {
                for p in &mut contour {
                    p[0] += offset[0];
                    p[1] += offset[1];
                }
                placed.push(contour);
            }
        }

        let mut mesh = GlyphMesh {
            vertices: Vec::new(),
            indices: Vec::new(),
        };
        extrude_contours(&placed, GLYPH_DEPTH, &mut mesh);
        Ok(mesh)
    }
}

/// Per-glyph pen offsets, centered on the origin. Horizontal advances
/// left-to-right; vertical stacks one glyph per line, each centered on the
/// column axis.
fn layout_offsets(advances: &[f32], vertical: bool) -> Vec<[f32; 2]> {
    if vertical {
        let line_height = GLYPH_SIZE * LINE_SPACING;
        let half_span = (advances.len().saturating_sub(1)) as f32 * line_height / 2.0;
        advances
            .iter()
            .enumerate()
            .map(|(i, adv)| [-adv / 2.0, half_span - i as f32 * line_height])
            .collect()
    } else {
        let total: f32 = advances.iter().sum();
        let mut pen = -total / 2.0;
        advances
            .iter()
            .map(|adv| {
                let offset = [pen, 0.0];
                pen += adv;
                offset
            })
            .collect()
    }
}

/// Flatten one glyph's outline into closed contours
fn flatten_glyph(face: &Face<'_>, id: GlyphId, scale: f32) -> Vec<Vec<[f32; 2]>> {
    let mut sink = OutlineSink {
        contours: Vec::new(),
        current: Vec::new(),
        scale,
    };
    if face.outline_glyph(id, &mut sink).is_none() {
        return Vec::new();
    }
    sink.finish()
}

struct OutlineSink {
    contours: Vec<Vec<[f32; 2]>>,
    current: Vec<[f32; 2]>,
    scale: f32,
}

impl OutlineSink {
    fn flush(&mut self) {
        if self.current.len() >= 3 {
            self.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }

    fn finish(mut self) -> Vec<Vec<[f32; 2]>> {
        self.flush();
        self.contours
    }

    fn last(&self) -> [f32; 2] {
        *self.current.last().unwrap_or(&[0.0, 0.0])
    }
}

impl OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.current.push([x * self.scale, y * self.scale]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.current.push([x * self.scale, y * self.scale]);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c = [x1 * self.scale, y1 * self.scale];
        let p1 = [x * self.scale, y * self.scale];
        for step in 1..=CURVE_STEPS {
            let t = step as f32 / CURVE_STEPS as f32;
            let u = 1.0 - t;
            self.current.push([
                u * u * p0[0] + 2.0 * u * t * c[0] + t * t * p1[0],
                u * u * p0[1] + 2.0 * u * t * c[1] + t * t * p1[1],
            ]);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c0 = [x1 * self.scale, y1 * self.scale];
        let c1 = [x2 * self.scale, y2 * self.scale];
        let p1 = [x * self.scale, y * self.scale];
        for step in 1..=CURVE_STEPS {
            let t = step as f32 / CURVE_STEPS as f32;
            let u = 1.0 - t;
            self.current.push([
                u * u * u * p0[0]
                    + 3.0 * u * u * t * c0[0]
                    + 3.0 * u * t * t * c1[0]
                    + t * t * t * p1[0],
                u * u * u * p0[1]
                    + 3.0 * u * u * t * c0[1]
                    + 3.0 * u * t * t * c1[1]
                    + t * t * t * p1[1],
            ]);
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

/// Extrude closed contours ±depth/2 in z: side walls for every contour,
/// ear-clipped front/back caps for outer contours.
///
/// TODO: bridge hole contours into the cap triangulation — counter-wound
/// loops currently contribute walls only, so enclosed counters are capped
/// over.
fn extrude_contours(contours: &[Vec<[f32; 2]>], depth: f32, mesh: &mut GlyphMesh) {
    let half = depth / 2.0;

    // Side walls
    for contour in contours {
        for i in 0..contour.len() {
            let p = contour[i];
            let q = contour[(i + 1) % contour.len()];
            let dx = q[0] - p[0];
            let dy = q[1] - p[1];
            let len = (dx * dx + dy * dy).sqrt();
            if len < 1e-6 {
                continue;
            }
            let normal = [dy / len, -dx / len, 0.0];
            let base = mesh.vertices.len() as u32;
            mesh.vertices.extend_from_slice(&[
                Vertex {
                    position: [p[0], p[1], half],
                    normal,
                },
                Vertex {
                    position: [p[0], p[1], -half],
                    normal,
                },
                Vertex {
                    position: [q[0], q[1], half],
                    normal,
                },
                Vertex {
                    position: [q[0], q[1], -half],
                    normal,
                },
            ]);
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
        }
    }

    // Caps. Outer contours share the dominant winding sign; holes wind the
    // other way and are skipped here.
    let dominant = contours
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    for contour in contours {
        let area = signed_area(contour);
        if area == 0.0 || area.signum() != dominant.signum() {
            continue;
        }
        // Ear clipping assumes counter-clockwise input
        let mut points = contour.clone();
        if area < 0.0 {
            points.reverse();
        }
        let triangles = ear_clip(&points);

        let front_base = mesh.vertices.len() as u32;
        for p in &points {
            mesh.vertices.push(Vertex {
                position: [p[0], p[1], half],
                normal: [0.0, 0.0, 1.0],
            });
        }
        for [a, b, c] in &triangles {
            mesh.indices.extend_from_slice(&[
                front_base + *a as u32,
                front_base + *b as u32,
                front_base + *c as u32,
            ]);
        }

        let back_base = mesh.vertices.len() as u32;
        for p in &points {
            mesh.vertices.push(Vertex {
                position: [p[0], p[1], -half],
                normal: [0.0, 0.0, -1.0],
            });
        }
        for [a, b, c] in &triangles {
            // Reverse winding so the back cap faces -z
            mesh.indices.extend_from_slice(&[
                back_base + *a as u32,
                back_base + *c as u32,
                back_base + *b as u32,
            ]);
        }
    }
}

/// Shoelace area: positive for counter-clockwise contours
fn signed_area(contour: &[[f32; 2]]) -> f32 {
    let mut sum = 0.0;
    for i in 0..contour.len() {
        let p = contour[i];
        let q = contour[(i + 1) % contour.len()];
        sum += p[0] * q[1] - q[0] * p[1];
    }
    sum / 2.0
}

/// Ear-clip triangulation of a simple counter-clockwise polygon
fn ear_clip(points: &[[f32; 2]]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::new();

    'clip: while remaining.len() > 3 {
        for i in 0..remaining.len() {
            let prev = remaining[(i + remaining.len() - 1) % remaining.len()];
            let cur = remaining[i];
            let next = remaining[(i + 1) % remaining.len()];

            if !is_convex(points[prev], points[cur], points[next]) {
                continue;
            }
            let blocked = remaining.iter().any(|&other| {
                other != prev
                    && other != cur
                    && other != next
                    && point_in_triangle(points[other], points[prev], points[cur], points[next])
            });
            if blocked {
                continue;
            }

            triangles.push([prev, cur, next]);
            remaining.remove(i);
            continue 'clip;
        }
        // No ear found: degenerate input (collinear runs, self-touching
        // outline). Stop rather than spin.
        break;
    }
    if remaining.len() == 3 {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }
    triangles
}

fn is_convex(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> bool {
    (b[0] - a[0]) * (c[1] - b[1]) - (b[1] - a[1]) * (c[0] - b[0]) > 0.0
}

fn point_in_triangle(p: [f32; 2], a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> bool {
    let sign = |p1: [f32; 2], p2: [f32; 2], p3: [f32; 2]| {
        (p1[0] - p3[0]) * (p2[1] - p3[1]) - (p2[0] - p3[0]) * (p1[1] - p3[1])
    };
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    #[test]
    fn square_clips_to_two_triangles() {
        let triangles = ear_clip(&SQUARE);
        assert_eq!(triangles.len(), 2);
        let area: f32 = triangles
            .iter()
            .map(|&[a, b, c]| signed_area(&[SQUARE[a], SQUARE[b], SQUARE[c]]))
            .sum();
        assert!((area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn concave_polygon_clips_fully() {
        // An L-shape: 6 vertices, so 4 triangles, total area 3
        let l_shape = [
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 2.0],
        ];
        let triangles = ear_clip(&l_shape);
        assert_eq!(triangles.len(), 4);
        let area: f32 = triangles
            .iter()
            .map(|&[a, b, c]| signed_area(&[l_shape[a], l_shape[b], l_shape[c]]))
            .sum();
        assert!((area - 3.0).abs() < 1e-6);
    }

    #[test]
    fn signed_area_flips_with_winding() {
        assert!(signed_area(&SQUARE) > 0.0);
        let mut reversed = SQUARE.to_vec();
        reversed.reverse();
        assert!(signed_area(&reversed) < 0.0);
    }

    #[test]
    fn extrusion_of_square_has_walls_and_caps() {
        let mut mesh = GlyphMesh {
            vertices: Vec::new(),
            indices: Vec::new(),
        };
        extrude_contours(&[SQUARE.to_vec()], 0.1, &mut mesh);
        // 4 wall quads (4 verts each) + 2 caps (4 verts each)
        assert_eq!(mesh.vertices.len(), 4 * 4 + 2 * 4);
        // 4 wall quads (6 indices) + 2 caps (2 triangles each)
        assert_eq!(mesh.indices.len(), 4 * 6 + 2 * 6);
        // Everything sits on the two extrusion planes
        assert!(mesh
            .vertices
            .iter()
            .all(|v| (v.position[2].abs() - 0.05).abs() < 1e-6));
    }

    #[test]
    fn hole_contours_get_walls_but_no_caps() {
        let outer = SQUARE.to_vec();
        let mut hole: Vec<[f32; 2]> = [[0.25, 0.25], [0.75, 0.25], [0.75, 0.75], [0.25, 0.75]]
            .to_vec();
        hole.reverse(); // wind opposite to the outer contour
        let mut mesh = GlyphMesh {
            vertices: Vec::new(),
            indices: Vec::new(),
        };
        extrude_contours(&[outer, hole], 0.1, &mut mesh);
        // 8 wall quads but only the outer contour's two caps
        assert_eq!(mesh.vertices.len(), 8 * 4 + 2 * 4);
    }

    #[test]
    fn horizontal_layout_centers_the_run() {
        let offsets = layout_offsets(&[1.0, 1.0, 1.0], false);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[0][0] - (-1.5)).abs() < 1e-6);
        assert!((offsets[1][0] - (-0.5)).abs() < 1e-6);
        assert!((offsets[2][0] - 0.5).abs() < 1e-6);
        assert!(offsets.iter().all(|o| o[1] == 0.0));
    }

    #[test]
    fn vertical_layout_stacks_top_to_bottom() {
        let offsets = layout_offsets(&[1.0, 1.0], true);
        assert_eq!(offsets.len(), 2);
        // First glyph above the origin, second below, symmetric
        assert!(offsets[0][1] > 0.0);
        assert!((offsets[0][1] + offsets[1][1]).abs() < 1e-6);
        // Each glyph centered on the column
        assert!((offsets[0][0] - (-0.5)).abs() < 1e-6);
    }

    #[test]
    fn degenerate_ear_clip_terminates() {
        // Collinear points cannot produce ears; must not loop forever
        let line = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]];
        let triangles = ear_clip(&line);
        assert!(triangles.len() <= 2);
    }
}
