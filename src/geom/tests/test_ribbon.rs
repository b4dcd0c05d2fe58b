use crate::geom::{
    PathPointList, Point3, RibbonOptions, RibbonSweep, Side, Vec3, ribbon_vertex_data,
};

fn straight(length: f64) -> PathPointList {
    let mut list = PathPointList::new();
    list.set(
        &[Point3::new(0.0, 0.0, 0.0), Point3::new(length, 0.0, 0.0)],
        0.0,
        0,
        None,
        false,
    );
    list
}

fn rounded_zigzag() -> PathPointList {
    let mut list = PathPointList::new();
    list.set(
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(4.0, 0.0, 2.0),
            Point3::new(4.0, 0.0, 5.0),
        ],
        0.3,
        6,
        Some(Vec3::Y),
        false,
    );
    list
}

fn no_arrow(width: f64) -> RibbonOptions {
    RibbonOptions {
        width,
        arrow: false,
        ..RibbonOptions::default()
    }
}

fn approx(a: f32, b: f64) -> bool {
    (f64::from(a) - b).abs() < 1e-4
}

#[test]
fn straight_ribbon_is_one_quad() {
    let path = straight(5.0);
    let mut ribbon = RibbonSweep::default();
    let range = ribbon.update(&path, &no_arrow(0.2));

    assert_eq!(range.start, 0);
    assert_eq!(range.count, 6);
    assert_eq!(range.triangle_count(), 2);

    let buffers = ribbon.buffers();
    assert_eq!(buffers.vertex_count(), 4);

    let s: Vec<f32> = buffers.uvs().chunks_exact(2).map(|uv| uv[0]).collect();
    assert!(approx(s[0], 0.0) && approx(s[1], 0.0));
    assert!(approx(s[2], 25.0) && approx(s[3], 25.0));
    let t: Vec<f32> = buffers.uvs().chunks_exact(2).map(|uv| uv[1]).collect();
    assert_eq!(t, vec![0.0, 1.0, 0.0, 1.0]);

    // right = +Z for a path along +X with the default seed axis
    let positions = buffers.positions();
    assert!(approx(positions[2], -0.1));
    assert!(approx(positions[5], 0.1));

    let normals = buffers.normals();
    for n in normals.chunks_exact(3) {
        assert!(approx(n[0], 0.0) && approx(n[1], 1.0) && approx(n[2], 0.0));
    }
}

#[test]
fn zero_progress_without_arrow_is_empty() {
    let path = rounded_zigzag();
    let mut ribbon = RibbonSweep::default();

    let options = RibbonOptions {
        progress: 0.0,
        ..no_arrow(0.2)
    };
    assert_eq!(ribbon.update(&path, &options).count, 0);
    assert_eq!(ribbon.buffers().vertex_count(), 0);
}

#[test]
fn zero_progress_with_arrow_draws_cap_at_start() {
    let path = straight(5.0);
    let mut ribbon = RibbonSweep::default();
    let options = RibbonOptions {
        width: 0.2,
        progress: 0.0,
        ..RibbonOptions::default()
    };

    assert_eq!(ribbon.update(&path, &options).count, 3);
    let positions = ribbon.buffers().positions();
    // tip sits 1.5 widths ahead of the start point
    assert!(approx(positions[6], 0.3));
}

#[test]
fn full_progress_matches_whole_path_and_grows_monotonically() {
    let path = rounded_zigzag();
    let mut ribbon = RibbonSweep::default();

    let full = ribbon.update(&path, &no_arrow(0.2)).count;
    let samples = path.count();
    assert_eq!(full, (samples - 1) * 6);

    let mut last = 0;
    for step in 0..=20 {
        let options = RibbonOptions {
            progress: f64::from(step) / 20.0,
            ..no_arrow(0.2)
        };
        let count = ribbon.update(&path, &options).count;
        assert!(count >= last, "draw count shrank at step {step}");
        last = count;
    }
    assert_eq!(last, full);
}

#[test]
fn progress_is_clamped() {
    let path = straight(5.0);
    let mut ribbon = RibbonSweep::default();

    let over = RibbonOptions {
        progress: 3.0,
        ..no_arrow(0.2)
    };
    assert_eq!(ribbon.update(&path, &over).count, 6);

    let under = RibbonOptions {
        progress: -1.0,
        ..no_arrow(0.2)
    };
    assert_eq!(ribbon.update(&path, &under).count, 0);
}

#[test]
fn progress_cut_interpolates_end_pair() {
    let path = straight(5.0);
    let mut ribbon = RibbonSweep::default();
    let options = RibbonOptions {
        progress: 0.3,
        ..no_arrow(0.2)
    };

    assert_eq!(ribbon.update(&path, &options).count, 6);
    let positions = ribbon.buffers().positions();
    assert!(approx(positions[6], 1.5));
    assert!(approx(positions[9], 1.5));
    assert!(approx(ribbon.buffers().uvs()[4], 7.5));
}

#[test]
fn sharp_corner_is_stitched() {
    let mut path = PathPointList::new();
    path.set(
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
        ],
        0.0,
        0,
        None,
        false,
    );
    assert!(path.get(1).is_some_and(|p| p.sharp));

    let data = ribbon_vertex_data(&path, &no_arrow(0.2), false);
    data.validate().expect("valid vertex data");
    assert_eq!(data.vertex_count(), 2 + 6 + 2);
    assert_eq!(data.index_count(), 12 + 6);

    // corner uv columns straddle the corner distance
    let o = 0.1 / 0.2;
    let corner_s = 1.0 / 0.2;
    let uv = |i: usize| data.uv(i).expect("uv");
    assert!(approx(uv(2)[0], corner_s - o));
    assert!(approx(uv(4)[0], corner_s));
    assert!(approx(uv(6)[0], corner_s + o));
}

#[test]
fn sharp_corner_stitch_handles_both_turn_directions() {
    for end_z in [1.0, -1.0] {
        let mut path = PathPointList::new();
        path.set(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, end_z),
                Point3::new(2.0, 0.0, end_z),
            ],
            0.0,
            0,
            Some(Vec3::Y),
            false,
        );

        let data = ribbon_vertex_data(&path, &no_arrow(0.2), true);
        data.validate().expect("valid vertex data");
        assert_eq!(data.vertex_count(), 2 + 6 + 6 + 2);
        assert_eq!(data.index_count(), 12 + 12 + 6);
        assert_eq!(data.uvs2.len(), data.uvs.len());
    }
}

#[test]
fn one_sided_ribbon_hugs_the_centerline() {
    let path = straight(2.0);

    let left = ribbon_vertex_data(
        &path,
        &RibbonOptions {
            side: Side::Left,
            ..no_arrow(0.2)
        },
        false,
    );
    let centre = left.position(1).expect("right edge");
    assert_eq!(centre, [0.0, 0.0, 0.0]);
    let edge = left.position(0).expect("left edge");
    assert!(approx(edge[2], -0.1));
    // stripe width is half the ribbon width on one side
    assert!(approx(left.uv(2).expect("uv")[0], 20.0));

    let right = ribbon_vertex_data(
        &path,
        &RibbonOptions {
            side: Side::Right,
            ..no_arrow(0.2)
        },
        false,
    );
    assert_eq!(right.position(0).expect("left edge"), [0.0, 0.0, 0.0]);
}

#[test]
fn arrow_cap_extends_past_the_end() {
    let path = straight(5.0);
    let data = ribbon_vertex_data(
        &path,
        &RibbonOptions {
            width: 0.2,
            ..RibbonOptions::default()
        },
        true,
    );

    assert_eq!(data.vertex_count(), 4 + 3);
    assert_eq!(data.index_count(), 6 + 3);
    assert_eq!(&data.indices[6..], &[6, 4, 5]);

    let left = data.position(4).expect("arrow left");
    let right = data.position(5).expect("arrow right");
    let tip = data.position(6).expect("arrow tip");
    assert!(approx(left[2], -0.2) && approx(right[2], 0.2));
    assert!(approx(tip[0], 5.3));

    let tip_uv = data.uv(6).expect("tip uv");
    assert!(approx(tip_uv[0], 26.5) && approx(tip_uv[1], 0.5));
    assert!(approx(data.uv(4).expect("uv")[1], -0.5));
    assert!(approx(data.uv(5).expect("uv")[1], 1.5));

    // uv2 tip advances by 1.5 widths over the total length
    let tip_uv2 = data.uvs2[12];
    assert!(approx(tip_uv2, 1.0 + 1.5 * 0.2 / 5.0));
}

#[test]
fn one_sided_arrow_uses_edge_texture_rows() {
    let path = straight(1.0);
    let left = ribbon_vertex_data(
        &path,
        &RibbonOptions {
            side: Side::Left,
            ..RibbonOptions::default()
        },
        false,
    );
    assert_eq!(left.uv(4).expect("uv")[1], -2.0);
    assert_eq!(left.uv(5).expect("uv")[1], 0.0);
    assert_eq!(left.uv(6).expect("uv")[1], 0.0);

    let right = ribbon_vertex_data(
        &path,
        &RibbonOptions {
            side: Side::Right,
            ..RibbonOptions::default()
        },
        false,
    );
    assert_eq!(right.uv(4).expect("uv")[1], 0.0);
    assert_eq!(right.uv(5).expect("uv")[1], 2.0);
}

#[test]
fn empty_or_degenerate_path_yields_nothing() {
    let empty = PathPointList::new();
    let data = ribbon_vertex_data(&empty, &RibbonOptions::default(), false);
    assert!(data.is_empty());

    let mut ribbon = RibbonSweep::default();
    assert_eq!(ribbon.update(&empty, &RibbonOptions::default()).count, 0);
}

#[test]
fn invalid_options_clear_the_mesh() {
    let path = straight(5.0);
    let mut ribbon = RibbonSweep::default();
    assert!(ribbon.update(&path, &no_arrow(0.2)).count > 0);

    let range = ribbon.update(&path, &no_arrow(f64::NAN));
    assert_eq!(range.count, 0);
    assert!(ribbon.try_update(&path, &no_arrow(-1.0)).is_err());
}

#[test]
fn from_path_sizes_buffers_to_fit() {
    let path = rounded_zigzag();
    let options = no_arrow(0.2);
    let ribbon = RibbonSweep::from_path(&path, &options, false).expect("valid options");

    let buffers = ribbon.buffers();
    assert_eq!(buffers.vertex_capacity(), buffers.vertex_count());
    assert_eq!(ribbon.draw_range().count, (path.count() - 1) * 6);
}
