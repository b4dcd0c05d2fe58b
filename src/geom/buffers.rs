//! Growable vertex/index storage shared by the ribbon and tube sweeps.
//!
//! A sweep computes fresh [`VertexData`] on every update and copies it into
//! its [`SweepBuffers`]. Buffer capacity doubles when needed and is never
//! released, so a host can keep one GPU buffer per attribute and only re-bind
//! it after a grow.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Point3, Vec3};

/// Largest vertex count addressable with 16-bit indices.
pub const MAX_U16_VERTICES: usize = 65_536;

pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const UV: &str = "uv";
pub const UV2: &str = "uv2";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SweepError {
    #[error("unknown ribbon side `{0}` (expected both, left or right)")]
    UnknownSide(String),
    #[error("{name} must be finite and > 0, got {value}")]
    InvalidExtent { name: &'static str, value: f64 },
    #[error("{name} must be finite, got {value}")]
    NonFiniteOption { name: &'static str, value: f64 },
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw range / per-call vertex data
// ─────────────────────────────────────────────────────────────────────────────

/// Valid prefix of the index buffer for the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawRange {
    pub start: usize,
    /// Number of valid indices (3 per triangle).
    pub count: usize,
}

impl DrawRange {
    pub const EMPTY: Self = Self { start: 0, count: 0 };

    #[must_use]
    pub const fn new(count: usize) -> Self {
        Self { start: 0, count }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub const fn triangle_count(self) -> usize {
        self.count / 3
    }
}

/// Flat attribute arrays produced by one sweep call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    /// Empty unless the sweep generates a second UV channel.
    pub uvs2: Vec<f32>,
    pub indices: Vec<u32>,
}

impl VertexData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends one vertex and returns its index. `uv2` is dropped when `None`.
    pub fn push_vertex(&mut self, pos: Point3, normal: Vec3, uv: [f64; 2], uv2: Option<[f64; 2]>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&pos.to_f32_array());
        self.normals.extend_from_slice(&normal.to_f32_array());
        self.uvs.extend_from_slice(&[uv[0] as f32, uv[1] as f32]);
        if let Some(uv2) = uv2 {
            self.uvs2.extend_from_slice(&[uv2[0] as f32, uv2[1] as f32]);
        }
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Option<[f32; 3]> {
        let base = index.checked_mul(3)?;
        let slice = self.positions.get(base..base + 3)?;
        Some([slice[0], slice[1], slice[2]])
    }

    #[must_use]
    pub fn uv(&self, index: usize) -> Option<[f32; 2]> {
        let base = index.checked_mul(2)?;
        let slice = self.uvs.get(base..base + 2)?;
        Some([slice[0], slice[1]])
    }

    pub fn validate(&self) -> Result<(), String> {
        let n = self.vertex_count();
        if self.positions.len() % 3 != 0 {
            return Err("position buffer length is not a multiple of 3".to_string());
        }
        if self.indices.len() % 3 != 0 {
            return Err("indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.normals.len() != n * 3 || self.uvs.len() != n * 2 {
            return Err("attribute buffers do not match vertex count".to_string());
        }
        if !self.uvs2.is_empty() && self.uvs2.len() != n * 2 {
            return Err("uv2 buffer does not match vertex count".to_string());
        }
        if self.positions.iter().any(|v| !v.is_finite()) {
            return Err("vertex data has invalid coordinates (NaN/Inf)".to_string());
        }
        if self.indices.iter().any(|&i| i as usize >= n) {
            return Err("vertex data has out-of-bounds indices".to_string());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Index buffer
// ─────────────────────────────────────────────────────────────────────────────

/// Index storage that starts 16-bit and is promoted to 32-bit once a mesh
/// addresses more than [`MAX_U16_VERTICES`] vertices.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

/// Borrowed view of the valid prefix of an [`IndexBuffer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexSlice<'a> {
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl Default for IndexBuffer {
    fn default() -> Self {
        Self::U16(Vec::new())
    }
}

impl IndexBuffer {
    #[must_use]
    pub fn with_capacity(len: usize) -> Self {
        Self::U16(vec![0; len])
    }

    /// Allocated length, including stale entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            Self::U16(data) => data.len(),
            Self::U32(data) => data.len(),
        }
    }

    #[must_use]
    pub fn is_u32(&self) -> bool {
        matches!(self, Self::U32(_))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        match self {
            Self::U16(data) => data.get(index).map(|&i| u32::from(i)),
            Self::U32(data) => data.get(index).copied(),
        }
    }

    #[must_use]
    pub fn slice(&self, len: usize) -> IndexSlice<'_> {
        match self {
            Self::U16(data) => IndexSlice::U16(&data[..len.min(data.len())]),
            Self::U32(data) => IndexSlice::U32(&data[..len.min(data.len())]),
        }
    }

    fn promote(&mut self) {
        if let Self::U16(data) = self {
            let wide = data.iter().map(|&i| u32::from(i)).collect();
            *self = Self::U32(wide);
        }
    }

    fn grow_to(&mut self, len: usize) {
        let capacity = grown_capacity(self.capacity(), len);
        match self {
            Self::U16(data) => data.resize(capacity, 0),
            Self::U32(data) => data.resize(capacity, 0),
        }
    }

    fn write(&mut self, indices: &[u32]) {
        match self {
            Self::U16(data) => {
                for (dst, &src) in data.iter_mut().zip(indices) {
                    // Callers promote before any index exceeds u16.
                    *dst = src as u16;
                }
            }
            Self::U32(data) => data[..indices.len()].copy_from_slice(indices),
        }
    }
}

impl IndexSlice<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U16(data) => data.len(),
            Self::U32(data) => data.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn to_u32_vec(&self) -> Vec<u32> {
        match self {
            Self::U16(data) => data.iter().map(|&i| u32::from(i)).collect(),
            Self::U32(data) => data.to_vec(),
        }
    }
}

/// Doubles `current` until it holds `required`.
fn grown_capacity(current: usize, required: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < required {
        capacity *= 2;
    }
    capacity.max(current)
}

// ─────────────────────────────────────────────────────────────────────────────
// Host sink
// ─────────────────────────────────────────────────────────────────────────────

/// Receiver for finished buffers, implemented by the rendering host.
pub trait MeshBufferSink {
    fn set_attribute(&mut self, name: &str, data: &[f32], item_size: usize);

    fn set_index(&mut self, indices: IndexSlice<'_>);

    fn set_draw_range(&mut self, range: DrawRange);
}

/// Attribute payload captured by [`MeshSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotAttribute {
    pub item_size: usize,
    pub data: Vec<f32>,
}

/// In-memory [`MeshBufferSink`] used by the wasm facade, the CLI and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSnapshot {
    pub attributes: BTreeMap<String, SnapshotAttribute>,
    pub indices: Vec<u32>,
    pub wide_indices: bool,
    pub draw_range: DrawRange,
}

impl MeshSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&[f32]> {
        self.attributes.get(name).map(|attr| attr.data.as_slice())
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.attribute(POSITION).map_or(0, |data| data.len() / 3)
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.draw_range.triangle_count()
    }
}

impl MeshBufferSink for MeshSnapshot {
    fn set_attribute(&mut self, name: &str, data: &[f32], item_size: usize) {
        self.attributes.insert(
            name.to_string(),
            SnapshotAttribute {
                item_size,
                data: data.to_vec(),
            },
        );
    }

    fn set_index(&mut self, indices: IndexSlice<'_>) {
        self.wide_indices = matches!(indices, IndexSlice::U32(_));
        self.indices = indices.to_u32_vec();
    }

    fn set_draw_range(&mut self, range: DrawRange) {
        self.draw_range = range;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sweep buffers
// ─────────────────────────────────────────────────────────────────────────────

/// Over-allocated attribute and index storage owned by one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepBuffers {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    uvs2: Option<Vec<f32>>,
    index: IndexBuffer,
    vertex_count: usize,
    draw_range: DrawRange,
}

impl SweepBuffers {
    /// Allocates room for `max_vertex` vertices and `max_vertex * 3` indices.
    #[must_use]
    pub fn with_capacity(max_vertex: usize, generate_uv2: bool) -> Self {
        let max_vertex = max_vertex.max(1);
        Self {
            positions: vec![0.0; max_vertex * 3],
            normals: vec![0.0; max_vertex * 3],
            uvs: vec![0.0; max_vertex * 2],
            uvs2: generate_uv2.then(|| vec![0.0; max_vertex * 2]),
            index: IndexBuffer::with_capacity(max_vertex * 3),
            vertex_count: 0,
            draw_range: DrawRange::EMPTY,
        }
    }

    /// Buffers sized exactly for `data`, with `data` already written.
    #[must_use]
    pub fn from_vertex_data(data: &VertexData, generate_uv2: bool) -> Self {
        let mut buffers = Self::with_capacity(data.vertex_count(), generate_uv2);
        buffers.index.grow_to(data.index_count());
        buffers.write(data);
        buffers
    }

    /// Copies `data` into the buffers, growing them first if needed.
    pub fn write(&mut self, data: &VertexData) -> DrawRange {
        grow_attribute(&mut self.positions, data.positions.len());
        grow_attribute(&mut self.normals, data.normals.len());
        grow_attribute(&mut self.uvs, data.uvs.len());

        self.positions[..data.positions.len()].copy_from_slice(&data.positions);
        self.normals[..data.normals.len()].copy_from_slice(&data.normals);
        self.uvs[..data.uvs.len()].copy_from_slice(&data.uvs);

        if let Some(uvs2) = self.uvs2.as_mut() {
            grow_attribute(uvs2, data.uvs2.len());
            uvs2[..data.uvs2.len()].copy_from_slice(&data.uvs2);
        }

        let vertex_count = data.vertex_count();
        if vertex_count > MAX_U16_VERTICES && !self.index.is_u32() {
            log::debug!("SweepBuffers: promoting index buffer to 32-bit ({vertex_count} vertices)");
            self.index.promote();
        }
        if self.index.capacity() < data.index_count() {
            self.index.grow_to(data.index_count());
        }
        self.index.write(&data.indices);

        self.vertex_count = vertex_count;
        self.draw_range = DrawRange::new(data.index_count());
        self.draw_range
    }

    /// Marks the buffers empty without touching capacity.
    pub fn clear(&mut self) -> DrawRange {
        self.vertex_count = 0;
        self.draw_range = DrawRange::EMPTY;
        self.draw_range
    }

    #[must_use]
    pub fn draw_range(&self) -> DrawRange {
        self.draw_range
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.draw_range.count
    }

    /// Allocated vertex slots.
    #[must_use]
    pub fn vertex_capacity(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn index_capacity(&self) -> usize {
        self.index.capacity()
    }

    #[must_use]
    pub fn has_uv2(&self) -> bool {
        self.uvs2.is_some()
    }

    #[must_use]
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.vertex_count * 3]
    }

    #[must_use]
    pub fn normals(&self) -> &[f32] {
        &self.normals[..self.vertex_count * 3]
    }

    #[must_use]
    pub fn uvs(&self) -> &[f32] {
        &self.uvs[..self.vertex_count * 2]
    }

    #[must_use]
    pub fn uvs2(&self) -> Option<&[f32]> {
        self.uvs2.as_deref().map(|uvs2| &uvs2[..self.vertex_count * 2])
    }

    #[must_use]
    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.index
    }

    #[must_use]
    pub fn indices(&self) -> IndexSlice<'_> {
        self.index.slice(self.draw_range.count)
    }

    /// Offsets the valid uv range, for scrolling a texture along the path.
    pub fn scroll_uv(&mut self, dx: f32, dy: f32) {
        let valid = self.vertex_count * 2;
        for uv in self.uvs[..valid].chunks_exact_mut(2) {
            uv[0] += dx;
            uv[1] += dy;
        }
    }

    /// Hands the valid attribute prefixes, indices and draw range to `sink`.
    pub fn upload(&self, sink: &mut impl MeshBufferSink) {
        sink.set_attribute(POSITION, self.positions(), 3);
        sink.set_attribute(NORMAL, self.normals(), 3);
        sink.set_attribute(UV, self.uvs(), 2);
        if let Some(uvs2) = self.uvs2() {
            sink.set_attribute(UV2, uvs2, 2);
        }
        sink.set_index(self.indices());
        sink.set_draw_range(self.draw_range);
    }

    /// Convenience wrapper around [`upload`](Self::upload).
    #[must_use]
    pub fn snapshot(&self) -> MeshSnapshot {
        let mut snapshot = MeshSnapshot::new();
        self.upload(&mut snapshot);
        snapshot
    }
}

fn grow_attribute(data: &mut Vec<f32>, required: usize) {
    if data.len() < required {
        let capacity = grown_capacity(data.len(), required);
        data.resize(capacity, 0.0);
    }
}
