#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;

use std::fmt;

use geom::{
    PathError, PathMetrics, PathOptions, PathPointList, Point3, RibbonOptions, RibbonSweep,
    TimingBucket, TubeOptions, TubeSweep,
};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Path builder plus one ribbon and one tube sweep, exposed to JavaScript.
///
/// Options are plain JS objects with camelCase keys; omitted keys take their
/// defaults. Meshes come back as a `MeshSnapshot` object.
#[wasm_bindgen]
pub struct PathMesher {
    path: PathPointList,
    ribbon: RibbonSweep,
    tube: TubeSweep,
    metrics: PathMetrics,
}

#[wasm_bindgen]
impl PathMesher {
    #[wasm_bindgen(constructor)]
    pub fn new(generate_uv2: Option<bool>) -> PathMesher {
        let generate_uv2 = generate_uv2.unwrap_or(false);
        PathMesher {
            path: PathPointList::new(),
            ribbon: RibbonSweep::new(generate_uv2),
            tube: TubeSweep::new(generate_uv2),
            metrics: PathMetrics::default(),
        }
    }

    /// Rebuild the path from a flat `[x0, y0, z0, x1, ...]` array.
    #[wasm_bindgen]
    pub fn set_points(&mut self, points: &[f64], options: JsValue) -> Result<(), JsValue> {
        let options: PathOptions = parse_options(options)?;
        let points = points_from_flat(points).map_err(|err| js_error(&err))?;
        self.rebuild(&points, &options).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn update_ribbon(&mut self, options: JsValue) -> Result<JsValue, JsValue> {
        let options: RibbonOptions = parse_options(options)?;
        let range = self
            .metrics
            .time(TimingBucket::Ribbon, || self.ribbon.try_update(&self.path, &options))
            .map_err(to_js_error)?;
        debug_log!("ribbon: {} indices", range.count);

        let snapshot = self
            .metrics
            .time(TimingBucket::Upload, || self.ribbon.buffers().snapshot());
        serde_wasm_bindgen::to_value(&snapshot).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn update_tube(&mut self, options: JsValue) -> Result<JsValue, JsValue> {
        let options: TubeOptions = parse_options(options)?;
        let range = self
            .metrics
            .time(TimingBucket::Tube, || self.tube.try_update(&self.path, &options))
            .map_err(to_js_error)?;
        debug_log!("tube: {} indices", range.count);

        let snapshot = self
            .metrics
            .time(TimingBucket::Upload, || self.tube.buffers().snapshot());
        serde_wasm_bindgen::to_value(&snapshot).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Scroll the ribbon texture without rebuilding the mesh.
    #[wasm_bindgen]
    pub fn scroll_ribbon_uv(&mut self, dx: f32, dy: f32) {
        self.ribbon.buffers_mut().scroll_uv(dx, dy);
    }

    #[wasm_bindgen]
    pub fn distance(&self) -> f64 {
        self.path.distance()
    }

    #[wasm_bindgen]
    pub fn count(&self) -> usize {
        self.path.count()
    }

    /// Timing totals since the last reset; `null` unless built with `path_metrics`.
    #[wasm_bindgen]
    pub fn timing_report(&mut self) -> Result<JsValue, JsValue> {
        let report = self.metrics.end();
        self.metrics.begin();
        serde_wasm_bindgen::to_value(&report).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl PathMesher {
    /// Too few points leave an empty path with a warning; anything else is an error.
    fn rebuild(&mut self, points: &[Point3], options: &PathOptions) -> Result<(), PathError> {
        let result = self.metrics.time(TimingBucket::PathBuild, || {
            self.path.try_set(
                points,
                options.corner_radius,
                options.corner_split,
                options.up,
                options.close,
            )
        });

        match result {
            Err(err @ PathError::TooFewPoints { .. }) => {
                log::warn!("PathMesher: {err}");
                Ok(())
            }
            other => other,
        }
    }
}

fn parse_options<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

fn points_from_flat(flat: &[f64]) -> Result<Vec<Point3>, String> {
    if flat.len() % 3 != 0 {
        return Err(format!(
            "point array length {} is not a multiple of 3",
            flat.len()
        ));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
        .collect())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{PathMesher, points_from_flat};
    use crate::geom::{PathOptions, Point3};

    #[test]
    fn flat_points_are_chunked_by_three() {
        let points = points_from_flat(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]).expect("valid array");
        assert_eq!(points, vec![Point3::ORIGIN, Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn flat_points_reject_ragged_input() {
        assert!(points_from_flat(&[0.0, 1.0]).is_err());
    }

    #[test]
    fn rebuild_tolerates_single_point() {
        let mut mesher = PathMesher::new(None);
        mesher
            .rebuild(&[Point3::ORIGIN], &PathOptions::default())
            .expect("too few points is not fatal");
        assert_eq!(mesher.count(), 0);
        assert_eq!(mesher.distance(), 0.0);
    }

    #[test]
    fn rebuild_rejects_non_finite_points() {
        let mut mesher = PathMesher::new(None);
        let points = [Point3::ORIGIN, Point3::new(f64::NAN, 0.0, 0.0)];
        assert!(mesher.rebuild(&points, &PathOptions::default()).is_err());
    }
}
