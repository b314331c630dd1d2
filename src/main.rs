use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use lasband::{
    Error, Result, Vector,
    boundary::{self, CLIP_MARGIN, CLIP_MARGIN_UP, Orientation},
    centers::{self, Center},
    filter::FilterConfig,
    marker::DEFAULT_TARGET_HALF_SIZE,
    pipeline::{Boundary, DEFAULT_CLIP_HALF_WIDTH, DEFAULT_LINE_WIDTH, Mode, Pipeline, Report},
    polygon::{Polygon, sima},
    sink::Spill,
    source::{PointSource, SourceOptions},
    stream::{Context, Host},
};
use log::{LevelFilter, error, info};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

#[derive(Parser, Debug)]
#[command(
    name = "lasband",
    about = "Streams las/laz point clouds through filters, boundary views and polygon bands",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log debug messages.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Size of one input window when a file is too big to read whole, in MiB.
    #[arg(long, global = true, value_name = "MIB")]
    chunk_mib: Option<usize>,

    /// Files up to this size are read whole, in MiB.
    #[arg(long, global = true, value_name = "MIB")]
    buffered_mib: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Keep the points near a set of centers.
    Filter {
        #[command(flatten)]
        io: InOut,

        /// Centers as label,x,y[,z] rows.
        #[arg(short, long)]
        centers: PathBuf,

        #[arg(short, long, default_value_t = 0.5)]
        radius: f64,

        #[arg(long, value_enum, default_value_t = Shape::Cylinder)]
        shape: Shape,

        /// Write the centers, with elevations estimated from the nearest matched points.
        #[arg(long, value_name = "CSV")]
        backfill: Option<PathBuf>,
    },

    /// Move every point into the frame of the boundary from A to B.
    Elevation {
        #[command(flatten)]
        io: InOut,

        #[command(flatten)]
        boundary: BoundaryArgs,
    },

    /// Keep a thin slice of points along the boundary from A to B.
    Section {
        #[command(flatten)]
        io: InOut,

        #[command(flatten)]
        boundary: BoundaryArgs,

        /// How far from the boundary a point may lie, in meters.
        #[arg(long, default_value_t = DEFAULT_CLIP_HALF_WIDTH)]
        half_width: f64,
    },

    /// Classify points as inside a survey polygon, on a band along its edges, or outside.
    Polygon {
        #[command(flatten)]
        io: InOut,

        /// The polygon, as SIMA text.
        #[arg(short, long)]
        polygon: PathBuf,

        #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
        line_width: f64,
    },

    /// Add a checkerboard target at each corner of the point cloud extent.
    Corners {
        #[command(flatten)]
        io: InOut,

        #[arg(long, default_value_t = DEFAULT_TARGET_HALF_SIZE)]
        half_size: f64,

        /// Put the targets at the top of the extent.
        #[arg(long)]
        top: bool,
    },

    /// Print one range-crop rectangle per edge of a survey polygon, as CSV.
    ClipPolygons {
        /// The polygon, as SIMA text.
        polygon: PathBuf,
    },
}

#[derive(Args, Debug)]
struct InOut {
    /// The las or laz file to read.
    input: PathBuf,

    /// The las file to write.
    output: PathBuf,
}

#[derive(Args, Debug)]
struct BoundaryArgs {
    /// The first reference point, as x,y,z.
    #[arg(short, long, value_parser = parse_xyz, allow_hyphen_values = true)]
    a: Vector<f64>,

    /// The second reference point, as x,y,z.
    #[arg(short, long, value_parser = parse_xyz, allow_hyphen_values = true)]
    b: Vector<f64>,

    /// Run the along-boundary axis from B to A.
    #[arg(long)]
    reverse: bool,

    /// Mark A and B with upright checkerboards of this half size instead of spheres.
    #[arg(long, value_name = "HALF_SIZE")]
    targets: Option<f64>,

    #[arg(long, default_value_t = 1.)]
    vertical_scale: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Shape {
    Sphere,
    Cylinder,
    Both,
}

impl BoundaryArgs {
    fn boundary(&self) -> Boundary {
        let orientation = if self.reverse {
            Orientation::BToA
        } else {
            Orientation::AToB
        };
        let boundary = Boundary::new(self.a, self.b)
            .with_orientation(orientation)
            .with_vertical_scale(self.vertical_scale);
        match self.targets {
            Some(half_size) => boundary.with_targets(half_size),
            None => boundary,
        }
    }
}

/// Reports progress through the log, with throughput.
struct Progress {
    started: Instant,
}

impl Host for Progress {
    fn progress(&mut self, done: u64, total: u64) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let percent = if total > 0 {
            100. * done as f64 / total as f64
        } else {
            100.
        };
        info!(
            "{}/{} points ({:.1}%), {:.0} points/s",
            done,
            total,
            percent,
            done as f64 / elapsed.max(1e-9)
        );
    }
}

fn parse_xyz(s: &str) -> std::result::Result<Vector<f64>, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|err| format!("{v:?}: {err}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match values[..] {
        [x, y] => Ok(Vector::new(x, y, 0.)),
        [x, y, z] => Ok(Vector::new(x, y, z)),
        _ => Err(format!("expected x,y or x,y,z, got {s:?}")),
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(OsString::from(".part"));
    PathBuf::from(name)
}

fn read_polygon(path: &Path) -> Result<Polygon> {
    let text = fs::read_to_string(path)?;
    Ok(sima::parse(&text)?.swap_axes())
}

/// Runs one pass into `output`, through a `.part` file that is renamed only on success.
fn stream_to(
    pipeline: &Pipeline,
    source: &mut PointSource,
    mode: &Mode,
    output: &Path,
    context: &mut Context<'_>,
) -> Result<Report> {
    let part = part_path(output);
    let result = File::create(&part)
        .map_err(Error::from)
        .and_then(|file| Spill::new(BufWriter::new(file)))
        .and_then(|spill| pipeline.run(source, mode, spill, context));
    match result {
        Ok(run) => {
            drop(run.output);
            fs::rename(&part, output)?;
            Ok(run.report)
        }
        Err(err) => {
            let _ = fs::remove_file(&part);
            Err(err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut options = SourceOptions::default();
    if let Some(chunk_mib) = cli.chunk_mib {
        options = options.with_chunk_bytes(chunk_mib.max(1) * 1024 * 1024);
    }
    if let Some(buffered_mib) = cli.buffered_mib {
        options = options.with_buffered_threshold(buffered_mib * 1024 * 1024);
    }
    let pipeline = Pipeline::default();
    let mut host = Progress {
        started: Instant::now(),
    };
    let mut context = Context::new(&mut host);

    let (io, mode, backfill) = match cli.command {
        Command::ClipPolygons { polygon } => return clip_polygons(&polygon),
        Command::Filter {
            io,
            centers,
            radius,
            shape,
            backfill,
        } => {
            let centers = centers::read_path(&centers)?;
            let (use_sphere, use_cylinder) = match shape {
                Shape::Sphere => (true, false),
                Shape::Cylinder => (false, true),
                Shape::Both => (true, true),
            };
            let filter = FilterConfig::new(
                centers.iter().map(Center::position).collect(),
                radius,
                use_sphere,
                use_cylinder,
            )?;
            let mode = Mode::Filter {
                filter,
                backfill: backfill.is_some(),
            };
            (io, mode, backfill.map(|path| (path, centers)))
        }
        Command::Elevation { io, boundary } => (io, Mode::Elevation(boundary.boundary()), None),
        Command::Section {
            io,
            boundary,
            half_width,
        } => {
            let mode = Mode::Section {
                boundary: boundary.boundary(),
                half_width,
            };
            (io, mode, None)
        }
        Command::Polygon {
            io,
            polygon,
            line_width,
        } => {
            let mode = Mode::PolygonBand {
                polygon: read_polygon(&polygon)?,
                line_width,
            };
            (io, mode, None)
        }
        Command::Corners {
            io,
            half_size,
            top,
        } => {
            let mode = Mode::Corners {
                half_size,
                at_max_z: top,
            };
            (io, mode, None)
        }
    };

    let mut source = PointSource::from_path(&io.input, &options)?;
    let report = stream_to(&pipeline, &mut source, &mode, &io.output, &mut context)?;
    info!(
        "wrote {} points ({} markers) to {}",
        report.output_points,
        report.marker_points,
        io.output.display()
    );
    if let Some(bands) = report.bands {
        info!(
            "inside: {}, band: {}, outside: {}",
            bands.inside, bands.band, bands.outside
        );
    }
    if let Some(corners) = report.corners {
        for (i, corner) in corners.iter().enumerate() {
            info!("target {}: {}, {}, {}", i + 1, corner.x, corner.y, corner.z);
        }
    }
    if let (Some((path, mut centers)), Some(elevations)) = (backfill, report.elevations) {
        for (center, elevation) in centers.iter_mut().zip(elevations) {
            if elevation.is_some() {
                center.z = elevation;
            }
        }
        centers::write(BufWriter::new(File::create(&path)?), &centers)?;
        info!("wrote {} centers to {}", centers.len(), path.display());
    }
    Ok(())
}

fn clip_polygons(path: &Path) -> Result<()> {
    let polygon = read_polygon(path)?;
    let clips = boundary::edge_clip_polygons(&polygon, CLIP_MARGIN, CLIP_MARGIN_UP);
    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());
    writer.write_record(["edge", "corner", "x", "y"])?;
    for clip in &clips {
        let label = clip.label();
        for (j, (x, y)) in clip.polygon.iter().enumerate() {
            writer.write_record([
                label.clone(),
                (j + 1).to_string(),
                x.to_string(),
                y.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
