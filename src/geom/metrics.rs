//! Opt-in timing hooks for path building and sweeping.
//!
//! Timing is collected only with the `path_metrics` feature on non-wasm
//! targets (`std::time::Instant` is unavailable on `wasm32`). Otherwise every
//! call is a pass-through and [`PathMetrics::end`] returns `None`.
//!
//! ```ignore
//! use path_mesh::geom::{PathMetrics, TimingBucket};
//!
//! let mut metrics = PathMetrics::default();
//! metrics.begin();
//! metrics.time(TimingBucket::PathBuild, || list.set_with_options(&points, &options));
//! let range = metrics.time(TimingBucket::Ribbon, || ribbon.update(&list, &ribbon_options));
//! if let Some(report) = metrics.end() {
//!     println!("total: {:.3} ms", report.total_ms());
//! }
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// `PathPointList::set` and friends.
    PathBuild,
    Ribbon,
    Tube,
    /// Copying buffers into a `MeshBufferSink`.
    Upload,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathTimingReport {
    pub path_build_ns: u64,
    pub ribbon_ns: u64,
    pub tube_ns: u64,
    pub upload_ns: u64,
}

impl PathTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.path_build_ns
            .saturating_add(self.ribbon_ns)
            .saturating_add(self.tube_ns)
            .saturating_add(self.upload_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

#[derive(Debug, Default)]
pub struct PathMetrics {
    #[cfg(all(feature = "path_metrics", not(target_arch = "wasm32")))]
    report: PathTimingReport,
}

impl PathMetrics {
    /// Resets all counters.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "path_metrics", not(target_arch = "wasm32")))]
        {
            self.report = PathTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<PathTimingReport> {
        #[cfg(all(feature = "path_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "path_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f`, adding its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "path_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = match bucket {
                TimingBucket::PathBuild => &mut self.report.path_build_ns,
                TimingBucket::Ribbon => &mut self.report.ribbon_ns,
                TimingBucket::Tube => &mut self.report.tube_ns,
                TimingBucket::Upload => &mut self.report.upload_ns,
            };
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "path_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
