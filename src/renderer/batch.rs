//! CPU-side rectangle batching
//!
//! Rectangles arrive in board pixels (origin top-left, y down) and are kept
//! that way until upload, where `ndc_vertices` maps them to clip space.

use glam::IVec2;

use super::DrawSurface;
use super::vertex::{Color, Vertex, colors};

/// Map a board pixel position to normalized device coordinates
#[inline]
pub fn board_to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    (x / width * 2.0 - 1.0, 1.0 - y / height * 2.0)
}

/// Rectangles collected for one frame
#[derive(Debug, Clone)]
pub struct QuadBatch {
    width: i32,
    height: i32,
    pub clear_color: Color,
    vertices: Vec<Vertex>,
}

impl Default for QuadBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadBatch {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            clear_color: colors::BACKGROUND,
            vertices: Vec::with_capacity(6 * 64),
        }
    }

    /// Board size given to the last `clear`
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Vertices in board pixels, six per rectangle
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn rect_count(&self) -> usize {
        self.vertices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices converted to clip space for upload
    pub fn ndc_vertices(&self) -> Vec<Vertex> {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        self.vertices
            .iter()
            .map(|v| {
                let (x, y) = board_to_ndc(v.position[0], v.position[1], w, h);
                Vertex::new(x, y, v.color)
            })
            .collect()
    }
}

impl DrawSurface for QuadBatch {
    fn clear(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.vertices.clear();
    }

    fn fill_rect(&mut self, pos: IVec2, size: IVec2, color: Color) {
        let (x0, y0) = (pos.x as f32, pos.y as f32);
        let (x1, y1) = ((pos.x + size.x) as f32, (pos.y + size.y) as f32);
        self.vertices.extend_from_slice(&[
            Vertex::new(x0, y0, color),
            Vertex::new(x1, y0, color),
            Vertex::new(x1, y1, color),
            Vertex::new(x0, y0, color),
            Vertex::new(x1, y1, color),
            Vertex::new(x0, y1, color),
        ]);
    }
}
