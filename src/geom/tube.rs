//! Cylindrical tube sweep.

use std::f64::consts::TAU;

use serde::Deserialize;

use super::buffers::{DrawRange, SweepBuffers, SweepError, VertexData};
use super::path_point::PathPoint;
use super::path_point_list::PathPointList;
use super::walk::walk_progress;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TubeOptions {
    pub radius: f64,
    /// Facets around the ring; values below 2 are raised to 2.
    pub radial_segments: usize,
    /// Rotation of the first ring vertex about the tangent, in radians.
    pub start_rad: f64,
    pub progress: f64,
}

impl Default for TubeOptions {
    fn default() -> Self {
        Self {
            radius: 0.1,
            radial_segments: 8,
            start_rad: 0.0,
            progress: 1.0,
        }
    }
}

impl TubeOptions {
    pub fn validate(&self) -> Result<(), SweepError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SweepError::InvalidExtent {
                name: "radius",
                value: self.radius,
            });
        }
        if !self.start_rad.is_finite() {
            return Err(SweepError::NonFiniteOption {
                name: "startRad",
                value: self.start_rad,
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

    #[must_use]
    pub fn segments(&self) -> usize {
        self.radial_segments.max(2)
    }
}

/// Computes tube vertex data: one ring of `segments + 1` vertices per visible
/// sample, the last vertex repeating the first for a seamless uv wrap.
#[must_use]
pub fn tube_vertex_data(
    path: &PathPointList,
    options: &TubeOptions,
    generate_uv2: bool,
) -> VertexData {
    let mut data = VertexData::new();

    let total = path.distance();
    let progress_distance = options.progress.clamp(0.0, 1.0) * total;
    if progress_distance <= 0.0 {
        return data;
    }

    let segments = options.segments();
    let circumference = options.radius * TAU;

    walk_progress(path.points(), progress_distance, |point| {
        add_ring(
            &mut data,
            point,
            options,
            segments,
            (circumference, total),
            generate_uv2,
        );
    });

    data
}

fn add_ring(
    data: &mut VertexData,
    point: &PathPoint,
    options: &TubeOptions,
    segments: usize,
    (circumference, total): (f64, f64),
    generate_uv2: bool,
) {
    let first = data.is_empty();
    let s = point.dist / circumference;
    let s2 = point.dist / total;
    let ring_radius = options.radius * point.width_scale;

    for r in 0..=segments {
        let facet = if r == segments { 0 } else { r };
        let angle = options.start_rad + TAU * facet as f64 / segments as f64;
        let normal = point.up.rotate_about(point.dir, angle).normalized_or(point.up);

        let t = r as f64 / segments as f64;
        data.push_vertex(
            point.pos + normal * ring_radius,
            normal,
            [s, t],
            generate_uv2.then_some([s2, t]),
        );
    }

    if first {
        return;
    }

    let ring = (segments + 1) as u32;
    let n = data.vertex_count() as u32;
    let begin1 = n - ring * 2;
    let begin2 = n - ring;
    for i in 0..segments as u32 {
        data.push_triangle(begin2 + i, begin1 + i, begin1 + i + 1);
        data.push_triangle(begin2 + i, begin1 + i + 1, begin2 + i + 1);
    }
}

/// Tube mesh with persistent, growable buffers.
#[derive(Debug, Clone)]
pub struct TubeSweep {
    buffers: SweepBuffers,
}

impl Default for TubeSweep {
    fn default() -> Self {
        Self::new(false)
    }
}

impl TubeSweep {
    pub const DEFAULT_MAX_VERTEX: usize = 1000;

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

    pub fn from_path(
        path: &PathPointList,
        options: &TubeOptions,
        generate_uv2: bool,
    ) -> Result<Self, SweepError> {
        options.validate()?;
        let data = tube_vertex_data(path, options, generate_uv2);
        Ok(Self {
            buffers: SweepBuffers::from_vertex_data(&data, generate_uv2),
        })
    }

    pub fn update(&mut self, path: &PathPointList, options: &TubeOptions) -> DrawRange {
        match self.try_update(path, options) {
            Ok(range) => range,
            Err(err) => {
                log::warn!("TubeSweep: {err}");
                self.buffers.clear()
            }
        }
    }

    pub fn try_update(
        &mut self,
        path: &PathPointList,
        options: &TubeOptions,
    ) -> Result<DrawRange, SweepError> {
        options.validate()?;
        let data = tube_vertex_data(path, options, self.buffers.has_uv2());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_have_a_floor() {
        let options = TubeOptions {
            radial_segments: 0,
            ..TubeOptions::default()
        };
        assert_eq!(options.segments(), 2);
        assert_eq!(TubeOptions::default().segments(), 8);
    }

    #[test]
    fn validate_rejects_bad_radius() {
        let options = TubeOptions {
            radius: -1.0,
            ..TubeOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(SweepError::InvalidExtent { name: "radius", .. })
        ));
    }
}
