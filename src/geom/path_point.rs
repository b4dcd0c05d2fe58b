use super::{Point3, Vec3};

/// One oriented sample along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub pos: Point3,
    /// Unit tangent.
    pub dir: Vec3,
    pub right: Vec3,
    /// Normal of the ribbon surface.
    pub up: Vec3,
    /// Arc length from the start of the path.
    pub dist: f64,
    /// Miter correction applied to the cross-section at corners.
    pub width_scale: f64,
    /// Hard corner that needs stitched geometry in a ribbon.
    pub sharp: bool,
}

impl Default for PathPoint {
    fn default() -> Self {
        Self {
            pos: Point3::ORIGIN,
            dir: Vec3::ZERO,
            right: Vec3::ZERO,
            up: Vec3::ZERO,
            dist: 0.0,
            width_scale: 1.0,
            sharp: false,
        }
    }
}

impl PathPoint {
    /// Component-wise linear interpolation between two samples.
    ///
    /// The frame vectors are blended, not slerped, so the result is generally
    /// neither unit length nor orthogonal; see [`PathPoint::orthonormalized`].
    /// The result is never marked sharp.
    #[must_use]
    pub fn lerp(a: &Self, b: &Self, alpha: f64) -> Self {
        Self {
            pos: a.pos.lerp(b.pos, alpha),
            dir: a.dir.lerp(b.dir, alpha),
            right: a.right.lerp(b.right, alpha),
            up: a.up.lerp(b.up, alpha),
            dist: (b.dist - a.dist) * alpha + a.dist,
            width_scale: (b.width_scale - a.width_scale) * alpha + a.width_scale,
            sharp: false,
        }
    }

    /// Rebuilds an orthonormal frame from the current `dir` and `up`,
    /// keeping `reference`'s frame where the blend collapsed.
    #[must_use]
    pub fn orthonormalized(mut self, reference: &Self) -> Self {
        let Some(dir) = self.dir.normalized() else {
            self.dir = reference.dir;
            self.right = reference.right;
            self.up = reference.up;
            return self;
        };

        match dir.cross(self.up).normalized() {
            Some(right) => {
                self.dir = dir;
                self.right = right;
                self.up = right.cross(dir).normalized_or(reference.up);
            }
            None => {
                self.dir = reference.dir;
                self.right = reference.right;
                self.up = reference.up;
            }
        }
        self
    }

    /// Copies the orientation and miter of `source`, keeping this sample's
    /// `dist` and `sharp` flag.
    pub fn copy_frame_from(&mut self, source: &Self) {
        self.pos = source.pos;
        self.dir = source.dir;
        self.right = source.right;
        self.up = source.up;
        self.width_scale = source.width_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pos: Point3, dir: Vec3, up: Vec3, dist: f64) -> PathPoint {
        PathPoint {
            pos,
            dir,
            right: dir.cross(up),
            up,
            dist,
            width_scale: 1.0,
            sharp: true,
        }
    }

    #[test]
    fn lerp_blends_linearly_and_clears_sharp() {
        let a = sample(Point3::ORIGIN, Vec3::X, Vec3::Y, 0.0);
        let mut b = sample(Point3::new(2.0, 0.0, 0.0), Vec3::X, Vec3::Y, 2.0);
        b.width_scale = 1.4;

        let mid = PathPoint::lerp(&a, &b, 0.5);
        assert_eq!(mid.pos, Point3::new(1.0, 0.0, 0.0));
        assert!((mid.dist - 1.0).abs() < 1e-12);
        assert!((mid.width_scale - 1.2).abs() < 1e-12);
        assert!(!mid.sharp);
    }

    #[test]
    fn orthonormalized_restores_unit_frame() {
        let a = sample(Point3::ORIGIN, Vec3::X, Vec3::Y, 0.0);
        let b = sample(Point3::new(1.0, 1.0, 0.0), Vec3::Y, -Vec3::X, 1.0);

        let mid = PathPoint::lerp(&a, &b, 0.5);
        assert!(mid.dir.length() < 0.9);

        let fixed = mid.orthonormalized(&a);
        assert!((fixed.dir.length() - 1.0).abs() < 1e-12);
        assert!((fixed.right.length() - 1.0).abs() < 1e-12);
        assert!((fixed.up.length() - 1.0).abs() < 1e-12);
        assert!(fixed.dir.dot(fixed.up).abs() < 1e-12);
        assert!(fixed.dir.dot(fixed.right).abs() < 1e-12);
    }

    #[test]
    fn copy_frame_keeps_dist() {
        let mut a = sample(Point3::ORIGIN, Vec3::X, Vec3::Y, 0.0);
        a.sharp = false;
        let b = sample(Point3::new(3.0, 0.0, 0.0), Vec3::Z, Vec3::Y, 7.0);

        a.copy_frame_from(&b);
        assert_eq!(a.pos, b.pos);
        assert_eq!(a.dir, Vec3::Z);
        assert_eq!(a.dist, 0.0);
        assert!(!a.sharp);
    }
}
