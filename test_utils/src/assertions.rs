//! Float-tolerant vector assertions.
use glam::Vec3;
use ordered_float::OrderedFloat;

/// Largest absolute per-component difference between two vectors.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use test_utils::max_component_error;
/// assert_eq!(max_component_error(Vec3::ZERO, Vec3::new(0.5, -2.0, 1.0)), 2.0);
/// ```
#[must_use]
pub fn max_component_error(actual: Vec3, expected: Vec3) -> f32 {
    (actual - expected)
        .abs()
        .to_array()
        .into_iter()
        .map(OrderedFloat)
        .max()
        .map_or(0.0, |error| error.0)
}

/// Assert that `actual` is within `epsilon` of `expected` on every axis.
///
/// # Panics
/// Panics with both vectors if any component differs by more than `epsilon`.
pub fn assert_vec3_near(actual: Vec3, expected: Vec3, epsilon: f32) {
    let error = max_component_error(actual, expected);
    assert!(
        error <= epsilon,
        "expected {expected}, got {actual} (error {error} > {epsilon})"
    );
}
