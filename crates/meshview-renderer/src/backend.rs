//! Render backend seam
//!
//! The scene talks to the GPU only through [`RenderBackend`]: point buffers
//! are uploaded once and addressed by handle, uniforms are set, and ranges of
//! a buffer are drawn as lines, triangles or points.

use std::collections::HashMap;
use std::ops::Range;

use glam::{Mat4, Vec3, Vec4};

/// Opaque handle to a point buffer owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// How a range of points is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Every two points form a segment
    Lines,
    /// Every three points form a filled triangle
    Triangles,
    Points,
}

pub trait RenderBackend {
    /// Copies `points` into a new buffer.
    fn upload(&mut self, points: &[Vec3]) -> BufferHandle;

    /// Replaces the contents of an existing buffer.
    fn reupload(&mut self, handle: BufferHandle, points: &[Vec3]);

    fn release(&mut self, handle: BufferHandle);

    /// World-to-camera matrix used by subsequent draws.
    fn set_view(&mut self, view: Mat4);

    /// Local-to-world matrix used by subsequent draws.
    fn set_model(&mut self, model: Mat4);

    fn set_color(&mut self, color: Vec4);

    /// Draws `range` (in points) of the buffer with the current uniforms.
    fn draw(&mut self, handle: BufferHandle, primitive: Primitive, range: Range<u32>);
}

/// A call captured by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Upload { handle: BufferHandle, len: usize },
    Reupload { handle: BufferHandle, len: usize },
    Release(BufferHandle),
    View(Mat4),
    Model(Mat4),
    Color(Vec4),
    Draw {
        handle: BufferHandle,
        primitive: Primitive,
        range: Range<u32>,
    },
}

/// Backend that keeps buffers in memory and records every call.
/// Used for headless rendering checks.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Recorded>,
    buffers: HashMap<BufferHandle, Vec<Vec3>>,
    next_id: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&[Vec3]> {
        self.buffers.get(&handle).map(Vec::as_slice)
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Draw calls only, in order
    pub fn draws(&self) -> impl Iterator<Item = (BufferHandle, Primitive, Range<u32>)> + '_ {
        self.calls.iter().filter_map(|call| match call {
            Recorded::Draw {
                handle,
                primitive,
                range,
            } => Some((*handle, *primitive, range.clone())),
            _ => None,
        })
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn upload(&mut self, points: &[Vec3]) -> BufferHandle {
        let handle = BufferHandle(self.next_id);
        self.next_id += 1;
        self.buffers.insert(handle, points.to_vec());
        self.calls.push(Recorded::Upload {
            handle,
            len: points.len(),
        });
        handle
    }

    fn reupload(&mut self, handle: BufferHandle, points: &[Vec3]) {
        self.buffers.insert(handle, points.to_vec());
        self.calls.push(Recorded::Reupload {
            handle,
            len: points.len(),
        });
    }

    fn release(&mut self, handle: BufferHandle) {
        self.buffers.remove(&handle);
        self.calls.push(Recorded::Release(handle));
    }

    fn set_view(&mut self, view: Mat4) {
        self.calls.push(Recorded::View(view));
    }

    fn set_model(&mut self, model: Mat4) {
        self.calls.push(Recorded::Model(model));
    }

    fn set_color(&mut self, color: Vec4) {
        self.calls.push(Recorded::Color(color));
    }

    fn draw(&mut self, handle: BufferHandle, primitive: Primitive, range: Range<u32>) {
        self.calls.push(Recorded::Draw {
            handle,
            primitive,
            range,
        });
    }
}
