//! Zero-safe vector helpers shared by the movement and combat systems.

use glam::Vec2;

/// Distances below this are treated as coincident when normalising.
pub const MIN_STEERING_DISTANCE: f32 = 1.0e-3;

/// Unit vector pointing from `from` to `to` together with the distance.
///
/// Returns a zero vector when the points coincide.
#[must_use]
pub fn unit_toward(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let distance = delta.length();
    if distance < MIN_STEERING_DISTANCE {
        (Vec2::ZERO, distance)
    } else {
        (delta / distance, distance)
    }
}

/// Circle overlap test; touching circles collide.
#[must_use]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance_squared(b) <= (radius_a + radius_b) * (radius_a + radius_b)
}

/// Point containment test; points on the boundary are inside.
#[must_use]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    circles_overlap(point, 0.0, center, radius)
}

/// Clamps each component of `value` to `±limit`.
#[must_use]
pub fn clamp_axes(value: Vec2, limit: f32) -> Vec2 {
    value.clamp(Vec2::splat(-limit), Vec2::splat(limit))
}

/// Clamps a position into the world square.
#[must_use]
pub fn clamp_to_world(position: Vec2, half_extent: f32) -> Vec2 {
    clamp_axes(position, half_extent)
}

/// Reports whether `position` lies inside the world square.
#[must_use]
pub fn inside_world(position: Vec2, half_extent: f32) -> bool {
    position.x.abs() <= half_extent && position.y.abs() <= half_extent
}

/// Reports whether `point` lies strictly inside the viewport centred on `center`.
#[must_use]
pub fn inside_viewport(center: Vec2, viewport: Vec2, point: Vec2) -> bool {
    let half = viewport * 0.5;
    let offset = (point - center).abs();
    offset.x < half.x && offset.y < half.y
}
