#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("path_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use path_mesh::geom::{
        MeshSnapshot, PathMetrics, PathOptions, PathPointList, Point3, RibbonOptions, RibbonSweep,
        Side, TimingBucket, TubeOptions, TubeSweep, Vec3, attributes,
    };
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;

    const USAGE: &str = r#"path_cli (path-mesh)

USAGE:
  path_cli list
  path_cli run <scenario|all> [options]

SCENARIOS:
  ribbon_straight
  ribbon_square_sharp
  ribbon_rounded_progress
  ribbon_closed_loop
  tube_straight
  tube_rounded

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.obj and/or <scenario>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ (single scenario only)
  --snap <path>      Write snapshot (single scenario only)
  --no-obj           Skip OBJ when using --out-dir
  --no-snap          Skip snapshot when using --out-dir
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                for scenario in Scenario::ALL {
                    println!("{}", scenario.name());
                }
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut write_obj = true;
        let mut write_snap = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "--no-obj" => write_obj = false,
                "--no-snap" => write_snap = false,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() || snap_path.is_some() {
                return Err("use either --out-dir or --obj/--snap (not both)".to_string());
            }
            if !write_obj && !write_snap {
                return Err("nothing to write (both --no-obj and --no-snap set)".to_string());
            }

            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(*scenario, dir, write_obj, write_snap, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_name(&scenario_name)
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(scenario, dir, write_obj, write_snap, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario =
            Scenario::from_name(&scenario_name).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.text, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.text);
        }

        if let Some(path) = obj_path.as_deref() {
            write_obj_file(path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        report(&output);
        Ok(())
    }

    fn run_one_scenario_to_dir(
        scenario: Scenario,
        dir: &Path,
        write_obj: bool,
        write_snap: bool,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_scenario(scenario)?;

        if write_snap {
            let path = dir.join(format!("{}.snap", output.name));
            write_text_file(&path, &output.text, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        if write_obj {
            let path = dir.join(format!("{}.obj", output.name));
            write_obj_file(&path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        report(&output);
        Ok(())
    }

    fn report(output: &ScenarioOutput) {
        eprintln!(
            "{}: samples={} length={:.4} vertices={} triangles={}",
            output.name,
            output.sample_count,
            output.distance,
            output.mesh.vertex_count(),
            output.mesh.triangle_count()
        );
        if let Some(timing) = output.metrics.end() {
            eprintln!(
                "{}: path={}ns sweep={}ns upload={}ns",
                output.name,
                timing.path_build_ns,
                timing.ribbon_ns + timing.tube_ns,
                timing.upload_ns
            );
        }
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, mesh: &MeshSnapshot, name: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let err = |e: std::io::Error| format!("write obj: {e}");

        writeln!(w, "# path-mesh path_cli").map_err(err)?;
        writeln!(w, "o {name}").map_err(err)?;

        for p in mesh.attribute(attributes::POSITION).unwrap_or_default().chunks_exact(3) {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(err)?;
        }
        for uv in mesh.attribute(attributes::UV).unwrap_or_default().chunks_exact(2) {
            writeln!(w, "vt {} {}", uv[0], uv[1]).map_err(err)?;
        }
        for n in mesh.attribute(attributes::NORMAL).unwrap_or_default().chunks_exact(3) {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2]).map_err(err)?;
        }

        let range = mesh.draw_range;
        let end = (range.start + range.count).min(mesh.indices.len());
        for tri in mesh.indices[range.start.min(end)..end].chunks_exact(3) {
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}").map_err(err)?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        if q == 0.0 { 0.0 } else { q }
    }

    fn write_values(out: &mut String, prefix: &str, values: &[f64]) {
        let _ = write!(out, "{prefix}");
        for value in values {
            let _ = write!(out, " {:.SNAPSHOT_DECIMALS$}", quantize_f64(*value));
        }
        let _ = writeln!(out);
    }

    fn write_path(out: &mut String, path: &PathPointList) {
        let _ = writeln!(out, "path.count {}", path.count());
        write_values(out, "path.distance", &[path.distance()]);
        for point in path.iter() {
            write_values(out, "p", &point.pos.to_array());
            write_values(out, "  dir", &point.dir.to_array());
            write_values(out, "  up", &point.up.to_array());
            write_values(out, "  dist", &[point.dist]);
            write_values(out, "  width_scale", &[point.width_scale]);
            let _ = writeln!(out, "  sharp {}", point.sharp);
        }
    }

    fn write_mesh(out: &mut String, mesh: &MeshSnapshot) {
        let _ = writeln!(
            out,
            "mesh.draw_range {} {}",
            mesh.draw_range.start, mesh.draw_range.count
        );
        let _ = writeln!(out, "mesh.wide_indices {}", mesh.wide_indices);

        for (name, attribute) in &mesh.attributes {
            let _ = writeln!(out, "mesh.{name} {}", attribute.data.len() / attribute.item_size.max(1));
            for item in attribute.data.chunks_exact(attribute.item_size.max(1)) {
                let values: Vec<f64> = item.iter().map(|&v| f64::from(v)).collect();
                write_values(out, "  a", &values);
            }
        }

        let _ = writeln!(out, "mesh.indices {}", mesh.indices.len());
        for tri in mesh.indices.chunks(3) {
            let _ = writeln!(out, "  i {}", tri.iter().map(u32::to_string).collect::<Vec<_>>().join(" "));
        }
    }

    fn snapshot(op: &str, sections: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# path-mesh snapshot v1");
        let _ = writeln!(out, "op {op}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        sections(&mut out);
        normalize_snapshot_text(&out)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        RibbonStraight,
        RibbonSquareSharp,
        RibbonRoundedProgress,
        RibbonClosedLoop,
        TubeStraight,
        TubeRounded,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::RibbonStraight,
            Scenario::RibbonSquareSharp,
            Scenario::RibbonRoundedProgress,
            Scenario::RibbonClosedLoop,
            Scenario::TubeStraight,
            Scenario::TubeRounded,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::RibbonStraight => "ribbon_straight",
                Scenario::RibbonSquareSharp => "ribbon_square_sharp",
                Scenario::RibbonRoundedProgress => "ribbon_rounded_progress",
                Scenario::RibbonClosedLoop => "ribbon_closed_loop",
                Scenario::TubeStraight => "tube_straight",
                Scenario::TubeRounded => "tube_rounded",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            Scenario::ALL.iter().copied().find(|scenario| scenario.name() == name)
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        sample_count: usize,
        distance: f64,
        mesh: MeshSnapshot,
        metrics: PathMetrics,
        text: String,
    }

    enum Sweep {
        Ribbon(RibbonOptions),
        Tube(TubeOptions),
    }

    fn run_scenario(scenario: Scenario) -> Result<ScenarioOutput, String> {
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let zigzag = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(2.0, 0.5, 1.0),
        ];
        let straight = [Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)];
        let hard = PathOptions {
            corner_radius: 0.0,
            corner_split: 0,
            ..PathOptions::default()
        };

        match scenario {
            Scenario::RibbonStraight => sweep_scenario(
                scenario,
                &straight,
                &hard,
                &Sweep::Ribbon(RibbonOptions {
                    width: 0.2,
                    arrow: false,
                    ..RibbonOptions::default()
                }),
            ),
            Scenario::RibbonSquareSharp => sweep_scenario(
                scenario,
                &square,
                &PathOptions { up: Some(Vec3::Y), ..hard },
                &Sweep::Ribbon(RibbonOptions {
                    width: 0.3,
                    arrow: false,
                    ..RibbonOptions::default()
                }),
            ),
            Scenario::RibbonRoundedProgress => sweep_scenario(
                scenario,
                &zigzag,
                &PathOptions {
                    corner_radius: 0.2,
                    corner_split: 6,
                    ..PathOptions::default()
                },
                &Sweep::Ribbon(RibbonOptions {
                    width: 0.2,
                    side: Side::Left,
                    progress: 0.6,
                    arrow: true,
                }),
            ),
            Scenario::RibbonClosedLoop => sweep_scenario(
                scenario,
                &square,
                &PathOptions {
                    corner_radius: 0.3,
                    corner_split: 4,
                    up: Some(Vec3::Y),
                    close: true,
                },
                &Sweep::Ribbon(RibbonOptions {
                    width: 0.2,
                    arrow: false,
                    ..RibbonOptions::default()
                }),
            ),
            Scenario::TubeStraight => sweep_scenario(
                scenario,
                &straight,
                &hard,
                &Sweep::Tube(TubeOptions::default()),
            ),
            Scenario::TubeRounded => sweep_scenario(
                scenario,
                &zigzag,
                &PathOptions::default(),
                &Sweep::Tube(TubeOptions {
                    radius: 0.15,
                    radial_segments: 12,
                    start_rad: std::f64::consts::FRAC_PI_4,
                    progress: 1.0,
                }),
            ),
        }
    }

    fn sweep_scenario(
        scenario: Scenario,
        points: &[Point3],
        path_options: &PathOptions,
        sweep: &Sweep,
    ) -> Result<ScenarioOutput, String> {
        let mut metrics = PathMetrics::default();
        metrics.begin();

        let mut path = PathPointList::new();
        metrics
            .time(TimingBucket::PathBuild, || {
                path.try_set(
                    points,
                    path_options.corner_radius,
                    path_options.corner_split,
                    path_options.up,
                    path_options.close,
                )
            })
            .map_err(|e| e.to_string())?;

        let mesh = match sweep {
            Sweep::Ribbon(options) => {
                let mut ribbon = RibbonSweep::new(true);
                metrics
                    .time(TimingBucket::Ribbon, || ribbon.try_update(&path, options))
                    .map_err(|e| e.to_string())?;
                metrics.time(TimingBucket::Upload, || ribbon.buffers().snapshot())
            }
            Sweep::Tube(options) => {
                let mut tube = TubeSweep::new(true);
                metrics
                    .time(TimingBucket::Tube, || tube.try_update(&path, options))
                    .map_err(|e| e.to_string())?;
                metrics.time(TimingBucket::Upload, || tube.buffers().snapshot())
            }
        };

        let text = snapshot(scenario.name(), |out| {
            write_path(out, &path);
            write_mesh(out, &mesh);
        });

        Ok(ScenarioOutput {
            name: scenario.name(),
            sample_count: path.count(),
            distance: path.distance(),
            mesh,
            metrics,
            text,
        })
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
