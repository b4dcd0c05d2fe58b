mod buffers;
mod core;
mod curve;
mod drawing;
mod metrics;
mod path_point;
mod path_point_list;
mod ribbon;
mod tube;
mod walk;

pub use buffers::{
    DrawRange, IndexBuffer, IndexSlice, MAX_U16_VERTICES, MeshBufferSink, MeshSnapshot,
    SnapshotAttribute, SweepBuffers, SweepError, VertexData,
};
pub use core::{Point3, Tolerance, Vec3};
pub use curve::{Curve3, QuadraticBezier3};
pub use drawing::{DrawingOptions, PathDrawing};
pub use metrics::{PathMetrics, PathTimingReport, TimingBucket};
pub use path_point::PathPoint;
pub use path_point_list::{MAX_WIDTH_SCALE, PathError, PathOptions, PathPointList};
pub use ribbon::{RibbonOptions, RibbonSweep, Side, ribbon_vertex_data};
pub use tube::{TubeOptions, TubeSweep, tube_vertex_data};

/// Attribute names used by [`SweepBuffers::upload`].
pub mod attributes {
    pub use super::buffers::{NORMAL, POSITION, UV, UV2};
}

#[cfg(test)]
mod tests;
