use crate::ribbon::Ribbon;
use glam::Vec3;

/// Advance the ribbon head one tick toward `pointer + pointer_offset`.
///
/// Semi-implicit Euler on a damped spring with no timestep scaling:
/// velocity is updated first, then the head moves by the new velocity.
#[inline]
pub fn step_spring(ribbon: &mut Ribbon, pointer: Vec3) {
    let target = pointer + ribbon.pointer_offset;
    let head = ribbon.points[0];
    let force = (target - head) * ribbon.spring;
    ribbon.velocity = (ribbon.velocity + force) * ribbon.friction;
    ribbon.points[0] = head + ribbon.velocity;
}
