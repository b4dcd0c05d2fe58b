use super::path_point::PathPoint;

/// Visits samples in order until `progress_distance` is passed.
///
/// The first sample beyond the limit is replaced by a point interpolated at
/// exactly `progress_distance`, which is visited last and returned. Returns
/// `None` when the whole path fits within the limit.
pub(crate) fn walk_progress(
    points: &[PathPoint],
    progress_distance: f64,
    mut visit: impl FnMut(&PathPoint),
) -> Option<PathPoint> {
    for (i, point) in points.iter().enumerate() {
        if point.dist > progress_distance && i > 0 {
            let prev = &points[i - 1];
            let cut = cut_point(prev, point, progress_distance);
            visit(&cut);
            return Some(cut);
        }
        visit(point);
    }
    None
}

/// Sample at `distance` between two neighbours, with its frame re-orthonormalized.
pub(crate) fn cut_point(prev: &PathPoint, next: &PathPoint, distance: f64) -> PathPoint {
    let span = next.dist - prev.dist;
    let alpha = if span > 0.0 {
        ((distance - prev.dist) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    PathPoint::lerp(prev, next, alpha).orthonormalized(prev)
}
