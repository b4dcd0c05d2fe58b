//! Frame builder that turns key points into an oriented [`PathPoint`] sequence.
//!
//! Frames are seeded from the least-aligned world axis (or a forced up vector)
//! and carried along the path by parallel transport. Interior key points are
//! either hard miter corners or rounded with a sampled quadratic Bezier.

use serde::Deserialize;

use super::curve::{Curve3, QuadraticBezier3};
use super::path_point::PathPoint;
use super::{Point3, Tolerance, Vec3};

/// Upper bound of the miter correction; caps the spike near 180° reversals.
pub const MAX_WIDTH_SCALE: f64 = 1.415;

/// Hard corners whose `|cos θ - 1|` exceeds this are flagged sharp (turn > ~18°).
const SHARP_COS_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("path requires at least 2 distinct points, got {actual}")]
    TooFewPoints { actual: usize },
    #[error("path point {index} is not finite")]
    NonFinitePoint { index: usize },
}

/// Corner settings for [`PathPointList::set_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathOptions {
    /// Distance from a key point where rounding starts. `0` disables rounding.
    pub corner_radius: f64,
    /// Number of Bezier segments per rounded corner. `0` disables rounding.
    pub corner_split: usize,
    /// Forced up vector; `None` lets the frame follow the path.
    pub up: Option<Vec3>,
    /// Connect the last key point back to the first.
    pub close: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            corner_radius: 0.1,
            corner_split: 10,
            up: None,
            close: false,
        }
    }
}

/// Which direction a corner sample uses as its tangent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CornerDir {
    /// Bisector of incoming and outgoing directions.
    Middle,
    /// Incoming direction (first sample of a rounded corner).
    Last,
    /// Outgoing direction (last sample of a rounded corner).
    Next,
}

/// Reusable list of path samples. Entries past [`count`](Self::count) are stale.
#[derive(Debug, Clone, Default)]
pub struct PathPointList {
    array: Vec<PathPoint>,
    count: usize,
    tol: Tolerance,
}

impl PathPointList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the list from `points`.
    ///
    /// Degenerate input (fewer than two distinct finite points) leaves the
    /// list empty and logs a warning instead of failing.
    pub fn set(
        &mut self,
        points: &[Point3],
        corner_radius: f64,
        corner_split: usize,
        up: Option<Vec3>,
        close: bool,
    ) {
        if let Err(err) = self.try_set(points, corner_radius, corner_split, up, close) {
            log::warn!("PathPointList: {err}");
        }
    }

    pub fn set_with_options(&mut self, points: &[Point3], options: &PathOptions) {
        self.set(
            points,
            options.corner_radius,
            options.corner_split,
            options.up,
            options.close,
        );
    }

    /// Same as [`set`](Self::set) but reports degenerate input to the caller.
    pub fn try_set(
        &mut self,
        points: &[Point3],
        corner_radius: f64,
        corner_split: usize,
        up: Option<Vec3>,
        close: bool,
    ) -> Result<(), PathError> {
        self.count = 0;

        let mut keys = clean_key_points(points, self.tol)?;
        if close && !self.tol.approx_eq_point3(keys[0], keys[keys.len() - 1]) {
            keys.push(keys[0]);
        }

        let up = up.and_then(Vec3::normalized);
        let rounding = (corner_radius.is_finite() && corner_radius > 0.0 && corner_split > 0)
            .then_some((corner_radius, corner_split));

        let last = keys.len() - 1;
        self.start(keys[0], keys[1], up);
        for i in 1..last {
            self.corner(keys[i], keys[i + 1], rounding, up, i == 1);
        }

        if close {
            self.corner(keys[last], keys[1], rounding, up, last == 1);
            let end = self.array[self.count - 1];
            self.array[0].copy_frame_from(&end);
        } else {
            self.end(keys[last]);
        }

        log::debug!(
            "PathPointList: {} key points -> {} samples, length {:.4}",
            keys.len(),
            self.count,
            self.distance()
        );
        Ok(())
    }

    /// Arc length of the whole path, `0` when empty.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.points().last().map_or(0.0, |point| point.dist)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Valid samples.
    #[must_use]
    pub fn points(&self) -> &[PathPoint] {
        &self.array[..self.count]
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PathPoint> {
        self.points().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathPoint> {
        self.points().iter()
    }

    /// Marks the list empty; storage is kept for reuse.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    fn push(&mut self, point: PathPoint) {
        if self.count < self.array.len() {
            self.array[self.count] = point;
        } else {
            self.array.push(point);
        }
        self.count += 1;
    }

    fn last(&self) -> PathPoint {
        self.array[self.count - 1]
    }

    fn start(&mut self, current: Point3, next: Point3, up: Option<Vec3>) {
        let dir = next.sub_point(current).normalized_or(Vec3::X);

        let seed = up
            .filter(|up| !Tolerance::ZERO_LENGTH.is_zero_vec3(dir.cross(*up)))
            .unwrap_or_else(|| least_aligned_axis(dir));
        let right = dir.cross(seed).normalized_or(Vec3::Z);
        let up = right.cross(dir).normalized_or(Vec3::Y);

        self.count = 0;
        self.push(PathPoint {
            pos: current,
            dir,
            right,
            up,
            dist: 0.0,
            width_scale: 1.0,
            sharp: false,
        });
    }

    fn corner(
        &mut self,
        current: Point3,
        next: Point3,
        rounding: Option<(f64, usize)>,
        up: Option<Vec3>,
        first_corner: bool,
    ) {
        let Some((radius, split)) = rounding else {
            self.corner_step(current, next, up, CornerDir::Middle, true);
            return;
        };

        let curve = corner_bezier(self.last().pos, current, next, radius, first_corner);
        let samples = curve.points(split);

        for f in 0..split {
            let dir_type = if f == 0 { CornerDir::Last } else { CornerDir::Middle };
            self.corner_step(samples[f], samples[f + 1], up, dir_type, false);
        }

        if !self.tol.approx_eq_point3(samples[split], next) {
            self.corner_step(samples[split], next, up, CornerDir::Next, false);
        }
    }

    fn corner_step(
        &mut self,
        current: Point3,
        next: Point3,
        up: Option<Vec3>,
        dir_type: CornerDir,
        hard: bool,
    ) {
        let prev = self.last();

        let last_vec = current.sub_point(prev.pos);
        let last_len = last_vec.length();
        if last_len <= self.tol.eps {
            // Coincides with the previous sample; dist must keep increasing.
            return;
        }

        let last_dir = last_vec / last_len;
        let next_dir = next.sub_point(current).normalized_or(last_dir);

        let dir = match dir_type {
            CornerDir::Middle => (last_dir + next_dir).normalized_or(next_dir),
            CornerDir::Last => last_dir,
            CornerDir::Next => next_dir,
        };

        let (right, up) = match up {
            Some(up) => forced_frame(dir, next_dir, up).unwrap_or_else(|| transport_frame(&prev, dir)),
            None => transport_frame(&prev, dir),
        };

        let cos = last_dir.dot(next_dir);

        self.push(PathPoint {
            pos: current,
            dir,
            right,
            up,
            dist: prev.dist + last_len,
            width_scale: miter_width_scale(cos),
            sharp: hard && (cos - 1.0).abs() > SHARP_COS_THRESHOLD,
        });
    }

    // The end frame always follows the path, even when corners used a forced up.
    fn end(&mut self, current: Point3) {
        let prev = self.last();

        let vec = current.sub_point(prev.pos);
        let len = vec.length();
        if len <= self.tol.eps {
            let last = &mut self.array[self.count - 1];
            last.width_scale = 1.0;
            last.sharp = false;
            return;
        }

        let dir = vec / len;
        let (right, up) = transport_frame(&prev, dir);

        self.push(PathPoint {
            pos: current,
            dir,
            right,
            up,
            dist: prev.dist + len,
            width_scale: 1.0,
            sharp: false,
        });
    }
}

fn clean_key_points(points: &[Point3], tol: Tolerance) -> Result<Vec<Point3>, PathError> {
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(PathError::NonFinitePoint { index });
    }

    let mut cleaned: Vec<Point3> = Vec::with_capacity(points.len() + 1);
    for p in points.iter().copied() {
        if cleaned
            .last()
            .copied()
            .is_some_and(|prev| tol.approx_eq_point3(prev, p))
        {
            continue;
        }
        cleaned.push(p);
    }

    if cleaned.len() < 2 {
        return Err(PathError::TooFewPoints {
            actual: cleaned.len(),
        });
    }
    Ok(cleaned)
}

/// World axis with the smallest absolute component along `dir`; ties keep the earlier axis.
fn least_aligned_axis(dir: Vec3) -> Vec3 {
    let mut axis = Vec3::X;
    let mut min = dir.x.abs();
    if dir.y.abs() < min {
        min = dir.y.abs();
        axis = Vec3::Y;
    }
    if dir.z.abs() < min {
        axis = Vec3::Z;
    }
    axis
}

/// Control triangle for a rounded corner at `current`.
///
/// The incoming leg of the path's first corner is limited to half its length
/// so two close corners cannot overlap.
fn corner_bezier(
    last: Point3,
    current: Point3,
    next: Point3,
    radius: f64,
    first_corner: bool,
) -> QuadraticBezier3 {
    let last_vec = current.sub_point(last);
    let next_vec = next.sub_point(current);

    let last_len = last_vec.length();
    let in_limit = if first_corner { last_len * 0.5 } else { last_len };

    let v0 = current - last_vec.with_length(radius.min(in_limit));
    let v2 = current + next_vec.with_length(radius.min(next_vec.length()));

    QuadraticBezier3::new(v0, current, v2)
}

/// Carries `prev.up` onto `dir` by rotating through the tangent change.
fn transport_frame(prev: &PathPoint, dir: Vec3) -> (Vec3, Vec3) {
    let mut up = prev.up;

    let axis = prev.dir.cross(dir);
    let axis_len = axis.length();
    if axis_len > Tolerance::ZERO_LENGTH.eps {
        let theta = prev.dir.dot(dir).clamp(-1.0, 1.0).acos();
        up = up.rotate_about(axis / axis_len, theta);
    }

    let right = dir.cross(up).normalized_or(prev.right);
    // Re-orthogonalize up against the new right.
    let up = right.cross(dir).normalized_or(up);
    (right, up)
}

/// Frame pinned to a forced up vector; `None` when no right vector can be formed.
fn forced_frame(dir: Vec3, next_dir: Vec3, up: Vec3) -> Option<(Vec3, Vec3)> {
    let right = dir
        .cross(up)
        .normalized()
        .or_else(|| next_dir.cross(up).normalized())?;
    let up = right.cross(dir).normalized()?;
    Some((right, up))
}

/// `1 / cos(θ/2)` capped at [`MAX_WIDTH_SCALE`]; `1` when undefined.
fn miter_width_scale(cos: f64) -> f64 {
    let scale = 1.0 / ((1.0 + cos.clamp(-1.0, 1.0)) / 2.0).sqrt();
    if scale.is_nan() {
        1.0
    } else {
        scale.min(MAX_WIDTH_SCALE)
    }
}
