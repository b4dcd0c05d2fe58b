use path_mesh::geom::{
    DrawingOptions, MeshSnapshot, PathDrawing, PathMetrics, PathOptions, PathPointList, Point3,
    RibbonOptions, RibbonSweep, Side, TimingBucket, TubeOptions, TubeSweep, attributes,
};
use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};

fn loop_points() -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(3.0, 0.0, 2.0),
        Point3::new(1.0, 1.0, 3.0),
        Point3::new(0.0, 0.0, 2.0),
    ]
}

#[test]
fn path_to_ribbon_and_tube_snapshots() {
    let mut path = PathPointList::new();
    let options = PathOptions {
        corner_radius: 0.3,
        corner_split: 8,
        up: None,
        close: true,
    };
    path.set_with_options(&loop_points(), &options);
    assert!(path.count() > loop_points().len());

    let mut metrics = PathMetrics::default();
    metrics.begin();

    let mut ribbon = RibbonSweep::new(true);
    let ribbon_range = metrics.time(TimingBucket::Ribbon, || {
        ribbon.update(
            &path,
            &RibbonOptions {
                width: 0.3,
                arrow: false,
                ..RibbonOptions::default()
            },
        )
    });
    assert_eq!(ribbon_range.count, (path.count() - 1) * 6);

    let mut tube = TubeSweep::new(false);
    let tube_range = metrics.time(TimingBucket::Tube, || {
        tube.update(&path, &TubeOptions::default())
    });
    assert_eq!(tube_range.count, (path.count() - 1) * 8 * 6);

    let mut snapshot = MeshSnapshot::new();
    metrics.time(TimingBucket::Upload, || tube.buffers().upload(&mut snapshot));
    assert_eq!(snapshot.vertex_count(), path.count() * 9);
    assert!(snapshot.attribute(attributes::UV2).is_none());
    assert!(
        snapshot
            .attribute(attributes::POSITION)
            .is_some_and(|data| data.iter().all(|v| v.is_finite()))
    );

    if let Some(report) = metrics.end() {
        assert!(report.total_ns() >= report.ribbon_ns);
    }
}

#[test]
fn closed_loop_ribbon_has_matching_seam() {
    let mut path = PathPointList::new();
    path.set(&loop_points(), 0.2, 6, None, true);

    let ribbon = RibbonSweep::from_path(
        &path,
        &RibbonOptions {
            arrow: false,
            ..RibbonOptions::default()
        },
        false,
    )
    .expect("valid options");

    let positions = ribbon.buffers().positions();
    let vertex_count = ribbon.buffers().vertex_count();
    let first = &positions[..6];
    let last = &positions[(vertex_count - 2) * 3..vertex_count * 3];
    for (a, b) in first.iter().zip(last) {
        assert!((a - b).abs() < 1e-5, "seam mismatch: {first:?} vs {last:?}");
    }
}

#[test]
fn progress_animation_reuses_buffers() {
    let mut path = PathPointList::new();
    path.set(&loop_points(), 0.25, 10, Some(path_mesh::geom::Vec3::Y), false);

    let mut ribbon = RibbonSweep::new(false);
    let mut capacity = 0;
    let mut last_count = 0;
    for frame in 0..=30 {
        let options = RibbonOptions {
            progress: f64::from(frame) / 30.0,
            ..RibbonOptions::default()
        };
        let range = ribbon.update(&path, &options);
        assert!(range.count >= last_count);
        last_count = range.count;

        let now = ribbon.buffers().vertex_capacity();
        assert!(now >= capacity);
        capacity = now;
    }
    assert_eq!(capacity, RibbonSweep::DEFAULT_MAX_VERTEX);
}

#[test]
fn side_deserializes_from_lowercase_names() {
    let de: StrDeserializer<'_, ValueError> = "right".into_deserializer();
    assert_eq!(Side::deserialize(de), Ok(Side::Right));

    let de: StrDeserializer<'_, ValueError> = "middle".into_deserializer();
    assert!(Side::deserialize(de).is_err());

    assert_eq!("Left".parse::<Side>().ok(), Some(Side::Left));
}

#[test]
fn drawing_session_feeds_a_ribbon() {
    let mut drawing = PathDrawing::new(DrawingOptions::default());
    for point in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 2.0),
    ] {
        drawing.update_cursor(point);
        assert!(drawing.confirm());
    }
    drawing.update_cursor(Point3::new(4.0, 0.0, 2.0));

    let mut ribbon = RibbonSweep::default();
    let preview_count = {
        let path = drawing.path_point_list();
        assert!(path.points().iter().all(|p| (p.pos.y - 0.1).abs() < 1e-9));
        ribbon.update(path, &RibbonOptions::default()).count
    };

    drawing.stop();
    let committed_count = ribbon
        .update(drawing.path_point_list(), &RibbonOptions::default())
        .count;
    assert!(committed_count < preview_count);
}
