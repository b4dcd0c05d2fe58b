//! Flat ribbon sweep.
//!
//! Each path sample contributes a left/right edge pair stitched to the
//! previous pair with two triangles. Sharp hard corners get a six-vertex fan
//! instead, so the inner edge does not fold back over itself. An optional
//! arrow cap is appended at the end of the visible part of the path.

use std::str::FromStr;

use serde::Deserialize;

use super::buffers::{DrawRange, SweepBuffers, SweepError, VertexData};
use super::path_point::PathPoint;
use super::path_point_list::PathPointList;
use super::walk::walk_progress;
use super::Point3;

/// Which side of the centerline the ribbon covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Both,
    Left,
    Right,
}

impl FromStr for Side {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(Self::Both),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(SweepError::UnknownSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RibbonOptions {
    /// Full ribbon width before miter scaling.
    pub width: f64,
    pub side: Side,
    /// Visible fraction of the path length, clamped to `[0, 1]`.
    pub progress: f64,
    /// Append a triangular cap at the end of the visible part.
    pub arrow: bool,
}

impl Default for RibbonOptions {
    fn default() -> Self {
        Self {
            width: 0.1,
            side: Side::Both,
            progress: 1.0,
            arrow: true,
        }
    }
}

impl RibbonOptions {
    pub fn validate(&self) -> Result<(), SweepError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(SweepError::InvalidExtent {
                name: "width",
                value: self.width,
            });
        }
        if !self.progress.is_finite() {
            return Err(SweepError::NonFiniteOption {
                name: "progress",
                value: self.progress,
            });
        }
        Ok(())
    }
}

/// Computes ribbon vertex data for `path` without touching any buffers.
///
/// Empty when the path has zero length, or when nothing is visible and the
/// arrow is disabled.
#[must_use]
pub fn ribbon_vertex_data(
    path: &PathPointList,
    options: &RibbonOptions,
    generate_uv2: bool,
) -> VertexData {
    let points = path.points();
    let total = path.distance();
    let Some(last) = points.last() else {
        return VertexData::new();
    };
    if total <= 0.0 {
        return VertexData::new();
    }

    let half_width = options.width / 2.0;
    let mut builder = RibbonBuilder {
        data: VertexData::new(),
        side: options.side,
        width: options.width,
        half_width,
        side_width: match options.side {
            Side::Both => options.width,
            Side::Left | Side::Right => half_width,
        },
        total,
        generate_uv2,
        prev_edges: (Point3::ORIGIN, Point3::ORIGIN),
    };

    let progress_distance = options.progress.clamp(0.0, 1.0) * total;
    let tip = if progress_distance > 0.0 {
        walk_progress(points, progress_distance, |point| builder.add_section(point))
    } else {
        Some(points[0])
    };

    if options.arrow {
        let tip = tip.unwrap_or(*last);
        builder.add_arrow(&tip);
    }

    builder.data
}

struct RibbonBuilder {
    data: VertexData,
    side: Side,
    width: f64,
    half_width: f64,
    side_width: f64,
    total: f64,
    generate_uv2: bool,
    /// Last two emitted vertices, the edge the next section stitches to.
    prev_edges: (Point3, Point3),
}

impl RibbonBuilder {
    fn edges(&self, point: &PathPoint, scale: f64) -> (Point3, Point3) {
        let offset = point.right * (self.half_width * scale);
        let left = if self.side == Side::Right {
            point.pos
        } else {
            point.pos - offset
        };
        let right = if self.side == Side::Left {
            point.pos
        } else {
            point.pos + offset
        };
        (left, right)
    }

    fn push(&mut self, pos: Point3, point: &PathPoint, s: f64, s2: f64, t: f64) -> u32 {
        let uv2 = self.generate_uv2.then_some([s2, t]);
        self.data.push_vertex(pos, point.up, [s, t], uv2)
    }

    fn add_section(&mut self, point: &PathPoint) {
        let first = self.data.is_empty();
        let s = point.dist / self.side_width;
        let s2 = point.dist / self.total;
        let (left, right) = self.edges(point, point.width_scale);

        if point.sharp && !first {
            self.add_sharp_section(point, left, right, s, s2);
            return;
        }

        self.push(left, point, s, s2, 0.0);
        let n = self.push(right, point, s, s2, 1.0) + 1;
        if !first {
            self.data.push_triangle(n - 2, n - 4, n - 3);
            self.data.push_triangle(n - 2, n - 3, n - 1);
        }
        self.prev_edges = (left, right);
    }

    fn add_sharp_section(&mut self, point: &PathPoint, left: Point3, right: Point3, s: f64, s2: f64) {
        let (prev_left, prev_right) = self.prev_edges;
        let left_offset = prev_left - left;
        let right_offset = prev_right - right;

        // Positive when the left edge travelled farther since the last section.
        let side_offset = left_offset.length() - right_offset.length();
        let (longer_offset, long_edge) = if side_offset > 0.0 {
            (left_offset, left)
        } else {
            (right_offset, right)
        };

        let inner = long_edge + longer_offset.with_length(side_offset.abs());
        let back = long_edge - inner;
        let cos = back.normalized().map_or(0.0, |unit| unit.dot(point.dir));
        let outer = inner + point.dir.with_length(cos * back.length() * 2.0);

        let vertices = if side_offset > 0.0 {
            [inner, right, left, right, outer, right]
        } else {
            [left, inner, left, right, left, outer]
        };

        let o = self.half_width / self.side_width;
        let o2 = self.half_width / self.total;
        let columns = [(-o, -o2), (0.0, 0.0), (o, o2)];
        let mut n = 0;
        for (i, pos) in vertices.into_iter().enumerate() {
            let (ds, ds2) = columns[i / 2];
            let t = if i % 2 == 0 { 0.0 } else { 1.0 };
            n = self.push(pos, point, s + ds, s2 + ds2, t) + 1;
        }

        self.data.push_triangle(n - 6, n - 8, n - 7);
        self.data.push_triangle(n - 6, n - 7, n - 5);
        if side_offset > 0.0 {
            self.data.push_triangle(n - 4, n - 6, n - 5);
            self.data.push_triangle(n - 2, n - 4, n - 1);
        } else {
            self.data.push_triangle(n - 6, n - 5, n - 3);
            self.data.push_triangle(n - 2, n - 3, n - 1);
        }

        self.prev_edges = (vertices[4], vertices[5]);
    }

    fn add_arrow(&mut self, point: &PathPoint) {
        let s = point.dist / self.side_width;
        let s2 = point.dist / self.total;
        let (left, right) = self.edges(point, 2.0);
        let tip = point.pos + point.dir.with_length(self.half_width * 3.0);

        let (left_t, right_t, tip_t) = match self.side {
            Side::Both => (-0.5, 1.5, 0.5),
            Side::Left => (-2.0, 0.0, 0.0),
            Side::Right => (0.0, 2.0, 0.0),
        };

        self.push(left, point, s, s2, left_t);
        self.push(right, point, s, s2, right_t);
        let n = self.push(tip, point, s + 1.5, s2 + 1.5 * self.width / self.total, tip_t) + 1;
        self.data.push_triangle(n - 1, n - 3, n - 2);
    }
}

/// Ribbon mesh with persistent, growable buffers.
#[derive(Debug, Clone)]
pub struct RibbonSweep {
    buffers: SweepBuffers,
}

impl Default for RibbonSweep {
    fn default() -> Self {
        Self::new(false)
    }
}

impl RibbonSweep {
    pub const DEFAULT_MAX_VERTEX: usize = 3000;

    #[must_use]
    pub fn new(generate_uv2: bool) -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_VERTEX, generate_uv2)
    }

    #[must_use]
    pub fn with_capacity(max_vertex: usize, generate_uv2: bool) -> Self {
        Self {
            buffers: SweepBuffers::with_capacity(max_vertex, generate_uv2),
        }
    }

    /// Sweep with buffers sized exactly for one ribbon over `path`.
    pub fn from_path(
        path: &PathPointList,
        options: &RibbonOptions,
        generate_uv2: bool,
    ) -> Result<Self, SweepError> {
        options.validate()?;
        let data = ribbon_vertex_data(path, options, generate_uv2);
        Ok(Self {
            buffers: SweepBuffers::from_vertex_data(&data, generate_uv2),
        })
    }

    /// Rebuilds the mesh. Invalid options log a warning and yield an empty range.
    pub fn update(&mut self, path: &PathPointList, options: &RibbonOptions) -> DrawRange {
        match self.try_update(path, options) {
            Ok(range) => range,
            Err(err) => {
                log::warn!("RibbonSweep: {err}");
                self.buffers.clear()
            }
        }
    }

    pub fn try_update(
        &mut self,
        path: &PathPointList,
        options: &RibbonOptions,
    ) -> Result<DrawRange, SweepError> {
        options.validate()?;
        let data = ribbon_vertex_data(path, options, self.buffers.has_uv2());
        Ok(self.buffers.write(&data))
    }

    #[must_use]
    pub fn buffers(&self) -> &SweepBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut SweepBuffers {
        &mut self.buffers
    }

    #[must_use]
    pub fn draw_range(&self) -> DrawRange {
        self.buffers.draw_range()
    }
}
