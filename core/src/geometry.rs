//! Vector helpers layered over `glam` for the airport coordinate system.
//!
//! The coordinate system is tied to the airport: the runway runs parallel to
//! the x-axis, z points towards the sky and y is perpendicular to both.

use glam::{Vec2, Vec3};
use thiserror::Error;

/// Errors raised by geometric operations that have no defined result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A zero-length vector cannot be rescaled to a target length.
    #[error("cannot normalize vector of length 0")]
    ZeroLength,
}

/// Rescales `vector` so that its length equals `target_len`.
///
/// Fails when `vector` has zero length because its direction is undefined.
pub fn normalize_to(vector: Vec3, target_len: f32) -> Result<Vec3, GeometryError> {
    let current_len = vector.length();
    if current_len == 0.0 {
        return Err(GeometryError::ZeroLength);
    }
    Ok(vector * (target_len / current_len))
}

/// Shortens `vector` to `max_len` when it is longer, leaving it untouched otherwise.
#[must_use]
pub fn cap_length(vector: Vec3, max_len: f32) -> Vec3 {
    debug_assert!(max_len > 0.0, "cap_length requires a positive bound");
    let current_len = vector.length();
    if current_len > max_len {
        vector * (max_len / current_len)
    } else {
        vector
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(from: Vec3, to: Vec3) -> f32 {
    (to - from).length()
}

/// Projects a world point onto the isometric screen plane.
///
/// `{1,0,0}` maps to `{.5,.5}`, `{0,1,0}` to `{-.5,.5}` and `{0,0,1}` to `{0,1}`.
#[must_use]
pub fn project_2d(point: Vec3) -> Vec2 {
    Vec2::new(
        0.5 * point.x - 0.5 * point.y,
        0.5 * point.x + 0.5 * point.y + point.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rejects_zero_vector() {
        assert_eq!(normalize_to(Vec3::ZERO, 1.0), Err(GeometryError::ZeroLength));
    }

    #[test]
    fn normalize_scales_to_requested_length() {
        let scaled = normalize_to(Vec3::new(3.0, 0.0, 4.0), 10.0).expect("non-zero vector");
        assert!((scaled.length() - 10.0).abs() < 1e-5);
        assert!((scaled.x - 6.0).abs() < 1e-5);
    }

    #[test]
    fn cap_length_only_shortens() {
        let short = Vec3::new(0.1, 0.0, 0.0);
        assert_eq!(cap_length(short, 1.0), short);

        let capped = cap_length(Vec3::new(0.0, 2.0, 0.0), 0.5);
        assert!((capped.length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn projection_matches_isometric_axes() {
        assert_eq!(project_2d(Vec3::X), Vec2::new(0.5, 0.5));
        assert_eq!(project_2d(Vec3::Y), Vec2::new(-0.5, 0.5));
        assert_eq!(project_2d(Vec3::Z), Vec2::new(0.0, 1.0));
    }
}
