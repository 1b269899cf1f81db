//! Parametric curves sampled by [`super::Path`].
use std::fmt;

use glam::Vec3;

use crate::error::PathError;
use crate::vector_math::normalize_or_none;

/// A curve parameterised over `t ∈ [0, 1]` in its own local space.
pub trait Curve: fmt::Debug + Send + Sync {
    /// Local position at `t`.
    fn evaluate(&self, t: f32) -> Vec3;

    /// Derivative direction at `t`. Not necessarily unit length.
    fn tangent(&self, t: f32) -> Vec3;

    /// `true` when the curve's end joins its start.
    fn is_closed(&self) -> bool;
}

/// Uniform Catmull-Rom spline through a list of control points.
///
/// Open splines duplicate their end points as phantom neighbours; closed
/// splines wrap around and add a segment from the last point to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRom {
    points: Vec<Vec3>,
    closed: bool,
}

impl CatmullRom {
    /// Builds a spline through `points`.
    ///
    /// # Errors
    /// Returns [`PathError::TooFewPoints`] for fewer than two points.
    pub fn new(points: Vec<Vec3>, closed: bool) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints(points.len()));
        }
        Ok(Self { points, closed })
    }

    /// The control points, in order.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    fn point(&self, index: isize) -> Vec3 {
        let len = self.points.len() as isize;
        let wrapped = if self.closed {
            index.rem_euclid(len)
        } else {
            index.clamp(0, len - 1)
        };
        self.points
            .get(wrapped as usize)
            .copied()
            .unwrap_or(Vec3::ZERO)
    }

    /// Control points and local parameter of the segment containing `t`.
    fn segment(&self, t: f32) -> ([Vec3; 4], f32) {
        let segments = self.segment_count();
        let scaled = t.clamp(0.0, 1.0) * segments as f32;
        let index = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - index as f32;
        let i = index as isize;
        (
            [
                self.point(i - 1),
                self.point(i),
                self.point(i + 1),
                self.point(i + 2),
            ],
            local,
        )
    }
}

impl Curve for CatmullRom {
    fn evaluate(&self, t: f32) -> Vec3 {
        let ([p0, p1, p2, p3], u) = self.segment(t);
        let u2 = u * u;
        let u3 = u2 * u;
        0.5 * (2.0 * p1
            + (p2 - p0) * u
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
    }

    fn tangent(&self, t: f32) -> Vec3 {
        let ([p0, p1, p2, p3], u) = self.segment(t);
        let derivative = 0.5
            * ((p2 - p0)
                + 2.0 * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u
                + 3.0 * (3.0 * p1 - p0 - 3.0 * p2 + p3) * u * u);
        normalize_or_none(derivative)
            .or_else(|| normalize_or_none(p2 - p1))
            .unwrap_or(Vec3::Z)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn straight_spline_is_linear() {
        let spline = CatmullRom::new(vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)], false)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_relative_eq!(spline.evaluate(0.5).x, 5.0, epsilon = 1e-4);
        assert_relative_eq!(spline.evaluate(1.0).x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(spline.tangent(0.3).x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn closed_spline_returns_to_start() {
        let spline = CatmullRom::new(
            vec![
                Vec3::ZERO,
                Vec3::new(4.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 4.0),
                Vec3::new(0.0, 0.0, 4.0),
            ],
            true,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(spline.is_closed());
        assert_relative_eq!(spline.evaluate(1.0).distance(Vec3::ZERO), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn single_point_is_rejected() {
        assert_eq!(
            CatmullRom::new(vec![Vec3::ONE], false),
            Err(PathError::TooFewPoints(1))
        );
    }
}
