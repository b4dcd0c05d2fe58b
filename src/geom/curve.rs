use super::{Point3, Vec3};

/// Parametric curve evaluated over `t ∈ [0, 1]`.
pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    fn derivative_at(&self, t: f64) -> Vec3;

    /// Samples `divisions + 1` points at uniform parameter steps, both ends included.
    fn points(&self, divisions: usize) -> Vec<Point3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.point_at(i as f64 / divisions as f64))
            .collect()
    }
}

/// Quadratic Bezier through a corner: `p0` and `p2` sit on the adjoining
/// segments and `p1` is the corner itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
}

impl QuadraticBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3) -> Self {
        Self { p0, p1, p2 }
    }
}

impl Curve3 for QuadraticBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = u * u;
        let b = 2.0 * u * t;
        let c = t * t;
        Point3::new(
            a * self.p0.x + b * self.p1.x + c * self.p2.x,
            a * self.p0.y + b * self.p1.y + c * self.p2.y,
            a * self.p0.z + b * self.p1.z + c * self.p2.z,
        )
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = self.p1.sub_point(self.p0);
        let b = self.p2.sub_point(self.p1);
        a * (2.0 * u) + b * (2.0 * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_points_hit_both_ends() {
        let curve = QuadraticBezier3::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        );
        let points = curve.points(4);

        assert_eq!(points.len(), 5);
        assert_eq!(points[0], curve.p0);
        assert_eq!(points[4], curve.p2);
        assert_eq!(points[2], Point3::new(0.75, 0.25, 0.0));
    }

    #[test]
    fn quadratic_derivative_follows_control_legs() {
        let curve = QuadraticBezier3::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        );

        assert_eq!(curve.derivative_at(0.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(curve.derivative_at(1.0), Vec3::new(0.0, 2.0, 0.0));
    }
}
