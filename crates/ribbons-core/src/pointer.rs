use glam::Vec3;
use std::cell::Cell;
use std::rc::Rc;

/// Last-write-wins pointer position in normalized device space
/// (x, y in roughly [-1, 1], origin at the center, y up).
///
/// Clones share the same cell: input handlers write, the frame loop reads.
#[derive(Clone, Debug, Default)]
pub struct PointerState(Rc<Cell<Vec3>>);

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set(&self, p: Vec3) {
        self.0.set(p);
    }

    #[inline]
    pub fn get(&self) -> Vec3 {
        self.0.get()
    }

    /// Store a position given in host pixels (origin top-left, y down).
    pub fn set_from_client(&self, x: f32, y: f32, width: f32, height: f32) {
        self.set(client_to_ndc(x, y, width, height));
    }
}

/// Map host pixel coordinates to normalized device coordinates.
#[inline]
pub fn client_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec3 {
    let w = width.max(1.0);
    let h = height.max(1.0);
    Vec3::new((x / w) * 2.0 - 1.0, -(y / h) * 2.0 + 1.0, 0.0)
}
