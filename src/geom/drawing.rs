//! Interactive path editing: confirmed key points plus a live preview point
//! that follows a cursor.

use serde::Deserialize;

use super::path_point_list::PathPointList;
use super::{Point3, Vec3};

/// Previews that would fold back onto the previous leg this tightly are rejected.
const FOLD_BACK_COS: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawingOptions {
    /// Minimum spacing between consecutive key points. Keep it above `corner_radius`.
    pub fix_radius: f64,
    /// Lift applied to the cursor along +Y.
    pub height: f64,
    pub corner_radius: f64,
    pub corner_split: usize,
    pub up: Option<Vec3>,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            fix_radius: 0.5,
            height: 0.1,
            corner_radius: 0.2,
            corner_split: 10,
            up: Some(Vec3::Y),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathDrawing {
    options: DrawingOptions,
    drawing: bool,
    confirmed: Vec<Point3>,
    cursor: Point3,
    path: PathPointList,
    dirty: bool,
}

impl PathDrawing {
    #[must_use]
    pub fn new(options: DrawingOptions) -> Self {
        Self {
            options,
            dirty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> &DrawingOptions {
        &self.options
    }

    pub fn set_corner_radius(&mut self, corner_radius: f64) {
        self.options.corner_radius = corner_radius;
        self.dirty = true;
    }

    pub fn set_corner_split(&mut self, corner_split: usize) {
        self.options.corner_split = corner_split;
        self.dirty = true;
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn start(&mut self) {
        self.drawing = true;
        self.dirty = true;
    }

    pub fn stop(&mut self) {
        self.drawing = false;
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.drawing = false;
        self.confirmed.clear();
        self.dirty = true;
    }

    /// Moves the cursor; the stored point is lifted by `height`.
    pub fn update_cursor(&mut self, point: Point3) {
        self.cursor = Point3::new(point.x, point.y + self.options.height, point.z);
    }

    /// Commits the current preview point. Returns `false` if it was rejected.
    pub fn confirm(&mut self) -> bool {
        self.drawing = true;
        self.dirty = true;
        match self.preview_point() {
            Some(point) => {
                self.confirmed.push(point);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn confirmed_points(&self) -> &[Point3] {
        &self.confirmed
    }

    /// Cursor position corrected for minimum spacing, or `None` when it would
    /// fold back onto the last leg.
    #[must_use]
    pub fn preview_point(&self) -> Option<Point3> {
        let Some(&last) = self.confirmed.last() else {
            return Some(self.cursor);
        };

        let mut fixed = self.cursor;
        let offset = fixed.sub_point(last);
        if offset.length() < self.options.fix_radius {
            fixed = last + offset.normalized()?.with_length(self.options.fix_radius);
        }

        if let [.., before, last] = self.confirmed.as_slice() {
            let last_dir = last.sub_point(*before).normalized()?;
            let next_dir = fixed.sub_point(*last).normalized()?;
            if -last_dir.dot(next_dir) > FOLD_BACK_COS {
                return None;
            }
        }

        Some(fixed)
    }

    /// Confirmed points followed by the preview point while drawing.
    #[must_use]
    pub fn points(&self) -> Vec<Point3> {
        let mut points = self.confirmed.clone();
        if self.drawing && !self.confirmed.is_empty() {
            points.extend(self.preview_point());
        }
        points
    }

    /// Frames for [`points`](Self::points), rebuilt while drawing or after an edit.
    pub fn path_point_list(&mut self) -> &PathPointList {
        if self.drawing || self.dirty {
            let points = self.points();
            self.path.set(
                &points,
                self.options.corner_radius,
                self.options.corner_split,
                self.options.up,
                false,
            );
            self.dirty = false;
        }
        &self.path
    }
}
