//! Streams a point source through one processing mode into a record sink.
//!
//! Every mode checks its parameters before the first point is read, so a bad parameter never
//! costs a pass over the data. Output records keep the input order, and synthetic markers always
//! come after the last real point.
//!
//! ```
//! use lasband::{
//!     filter::FilterConfig, pipeline::{Mode, Pipeline}, source::PointSource, stream::Context,
//!     Vector,
//! };
//! # fn bytes() -> Vec<u8> {
//! #     use lasband::{point::Layout, sink::RecordSink, Bounds, Point};
//! #     let mut sink = RecordSink::new(Layout::PLAIN, 1024, Vec::new());
//! #     sink.push(&Point { x: 0.5, ..Default::default() }).unwrap();
//! #     sink.push(&Point { x: 5., ..Default::default() }).unwrap();
//! #     sink.finish(&Bounds::default()).unwrap().to_bytes()
//! # }
//! let mut source = PointSource::from_bytes(bytes()).unwrap();
//! let filter = FilterConfig::new(vec![Vector::default()], 1., false, true).unwrap();
//! let mode = Mode::Filter { filter, backfill: false };
//! let mut host = ();
//! let run = Pipeline::new()
//!     .run(&mut source, &mode, Vec::new(), &mut Context::new(&mut host))
//!     .unwrap();
//! assert_eq!(1, run.report.output_points);
//! ```

mod mode;

pub use self::mode::{Boundary, DEFAULT_CLIP_HALF_WIDTH, DEFAULT_LINE_WIDTH, Mode};

use crate::{
    Bounds, Color, Error, Header, Point, Result, Vector,
    boundary::{self, BoundaryAxes, RANGE_WARNING_DISTANCE},
    filter::{FilterConfig, NearestElevations},
    marker::{self, MarkerStyle},
    point::Layout,
    polygon::{BandClassifier, BandCounts, MiterOffset, Offset, Polygon},
    sink::{ChunkStore, Finished, RecordSink},
    source::PointSource,
    stream::{self, Context},
};

/// Runs modes over point sources.
#[allow(missing_debug_implementations)]
pub struct Pipeline {
    output_chunk_bytes: usize,
    offset: Box<dyn Offset>,
}

/// What a pass produced.
#[derive(Debug)]
pub struct Run<S> {
    /// The encoded output.
    pub output: Finished<S>,
    /// What happened along the way.
    pub report: Report,
}

/// Counts and derived values from a pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    /// Points read from the source.
    pub input_points: u64,
    /// Records written, markers included.
    pub output_points: u64,
    /// Synthetic marker points written.
    pub marker_points: u64,
    /// Inside, band, and outside tallies, for polygon band passes.
    pub bands: Option<BandCounts>,
    /// Per center, the elevation estimated from the nearest matched points, for filter passes
    /// with backfill. `None` for centers no matched point came close to.
    pub elevations: Option<Vec<Option<f64>>>,
    /// The centers of the four corner targets, for corner passes.
    pub corners: Option<[Vector<f64>; 4]>,
}

impl Default for Pipeline {
    fn default() -> Pipeline {
        Pipeline {
            output_chunk_bytes: stream::DEFAULT_OUTPUT_CHUNK_BYTES,
            offset: Box::new(MiterOffset),
        }
    }
}

impl Pipeline {
    /// Creates a pipeline with default output chunks and mitred polygon offsets.
    pub fn new() -> Pipeline {
        Pipeline::default()
    }

    /// Sets the output chunk size, in bytes.
    pub fn with_output_chunk_bytes(mut self, output_chunk_bytes: usize) -> Pipeline {
        self.output_chunk_bytes = output_chunk_bytes;
        self
    }

    /// Sets how polygons are offset for band classification.
    pub fn with_offset<O: Offset + 'static>(mut self, offset: O) -> Pipeline {
        self.offset = Box::new(offset);
        self
    }

    /// Returns the output chunk size, in bytes.
    pub fn output_chunk_bytes(&self) -> usize {
        self.output_chunk_bytes
    }

    /// Streams `source` through `mode`, sealing output chunks into `store`.
    pub fn run<S: ChunkStore>(
        &self,
        source: &mut PointSource,
        mode: &Mode,
        store: S,
        context: &mut Context<'_>,
    ) -> Result<Run<S>> {
        let header = source.header().clone();
        context.info(&format!(
            "{} pass over {} points",
            mode.name(),
            header.number_of_points()
        ));
        let (sink, mut report) = match mode {
            Mode::Filter { filter, backfill } => {
                self.filter(source, &header, filter, *backfill, store, context)?
            }
            Mode::Elevation(boundary) => {
                self.boundary(source, &header, boundary, None, store, context)?
            }
            Mode::Section {
                boundary,
                half_width,
            } => self.boundary(
                source,
                &header,
                boundary,
                Some(*half_width),
                store,
                context,
            )?,
            Mode::PolygonBand {
                polygon,
                line_width,
            } => self.polygon_band(source, polygon, *line_width, store, context)?,
            Mode::Corners {
                half_size,
                at_max_z,
            } => self.corners(source, &header, *half_size, *at_max_z, store, context)?,
        };
        report.output_points = sink.count();
        if report.output_points == 0 {
            return Err(Error::EmptyResult(mode.name()));
        }
        context.info(&format!(
            "{} pass done: {} points in, {} points out",
            mode.name(),
            report.input_points,
            report.output_points
        ));
        Ok(Run {
            output: sink.finish(&header.bounds())?,
            report,
        })
    }

    fn filter<S: ChunkStore>(
        &self,
        source: &mut PointSource,
        header: &Header,
        filter: &FilterConfig,
        backfill: bool,
        store: S,
        context: &mut Context<'_>,
    ) -> Result<(RecordSink<S>, Report)> {
        let layout = Layout::output(header.layout().has_color());
        let mut sink = RecordSink::new(layout, self.output_chunk_bytes, store);
        let mut nearest = backfill.then(|| NearestElevations::new(filter));
        let input_points = source.for_each(context, |point, _| {
            if filter.matches(point.x, point.y, point.z) {
                if let Some(nearest) = nearest.as_mut() {
                    nearest.observe(&point);
                }
                sink.push(&point)?;
            }
            Ok(())
        })?;
        let elevations = nearest.map(|nearest| nearest.elevations());
        if sink.count() > 0 {
            for (i, _) in elevations
                .iter()
                .flatten()
                .enumerate()
                .filter(|(_, elevation)| elevation.is_none())
            {
                context.warn(&format!(
                    "no matched point lies within the radius of center {}, its elevation is unchanged",
                    i + 1
                ));
            }
        }
        Ok((
            sink,
            Report {
                input_points,
                elevations,
                ..Default::default()
            },
        ))
    }

    fn boundary<S: ChunkStore>(
        &self,
        source: &mut PointSource,
        header: &Header,
        boundary: &Boundary,
        half_width: Option<f64>,
        store: S,
        context: &mut Context<'_>,
    ) -> Result<(RecordSink<S>, Report)> {
        let vertical_scale = boundary.vertical_scale;
        if !(vertical_scale.is_finite() && vertical_scale > 0.) {
            return Err(Error::InvalidVerticalScale(vertical_scale));
        }
        if let Some(half_width) = half_width {
            check_width("clip half width", half_width)?;
        }
        if let MarkerStyle::Target { half_size } = boundary.marker {
            check_width("target half size", half_size)?;
        }
        let axes = BoundaryAxes::new(boundary.a, boundary.b, boundary.orientation)
            .ok_or(Error::DegenerateBoundary)?;
        warn_if_far(context, &header.bounds(), &boundary.a, &boundary.b);

        let origin = boundary.a;
        let place = |point: &mut Point| -> bool {
            let kept = match half_width {
                Some(half_width) => axes.clip_point(point, &origin, half_width),
                None => {
                    axes.transform_point(point, &origin);
                    true
                }
            };
            if kept {
                point.y *= vertical_scale;
                let _ = point.color.get_or_insert(Color::BLACK);
            }
            kept
        };

        let mut sink = RecordSink::new(Layout::COLORED, self.output_chunk_bytes, store);
        let input_points = source.for_each(context, |mut point, _| {
            if place(&mut point) {
                sink.push(&point)?;
            }
            Ok(())
        })?;
        let before = sink.count();
        for mut point in boundary
            .marker
            .points(boundary.a, &axes)
            .into_iter()
            .chain(boundary.marker.points(boundary.b, &axes))
        {
            if place(&mut point) {
                sink.push(&point)?;
            }
        }
        let marker_points = sink.count() - before;
        context.info(&format!("{} marker points added", marker_points));
        Ok((
            sink,
            Report {
                input_points,
                marker_points,
                ..Default::default()
            },
        ))
    }

    fn polygon_band<S: ChunkStore>(
        &self,
        source: &mut PointSource,
        polygon: &Polygon,
        line_width: f64,
        store: S,
        context: &mut Context<'_>,
    ) -> Result<(RecordSink<S>, Report)> {
        let classifier = BandClassifier::new(polygon, line_width, self.offset.as_ref())?;
        for (name, ring) in [("inner", classifier.inner()), ("outer", classifier.outer())] {
            if ring.is_degenerate() {
                context.warn(&format!(
                    "the {} offset ring has fewer than 3 vertices and matches nothing",
                    name
                ));
            }
        }
        let mut sink = RecordSink::new(Layout::COLORED, self.output_chunk_bytes, store);
        let mut bands = BandCounts::default();
        let input_points = source.for_each(context, |mut point, _| {
            bands.add(classifier.classify(&mut point));
            sink.push(&point)
        })?;
        context.info(&format!(
            "inside: {}, band: {}, outside: {}",
            bands.inside, bands.band, bands.outside
        ));
        Ok((
            sink,
            Report {
                input_points,
                bands: Some(bands),
                ..Default::default()
            },
        ))
    }

    fn corners<S: ChunkStore>(
        &self,
        source: &mut PointSource,
        header: &Header,
        half_size: f64,
        at_max_z: bool,
        store: S,
        context: &mut Context<'_>,
    ) -> Result<(RecordSink<S>, Report)> {
        check_width("target half size", half_size)?;
        let corners =
            marker::corner_centers(&header.bounds(), at_max_z).ok_or(Error::MissingBounds)?;
        let mut sink = RecordSink::new(Layout::COLORED, self.output_chunk_bytes, store);
        let input_points = source.for_each(context, |mut point, _| {
            let _ = point.color.get_or_insert(Color::BLACK);
            sink.push(&point)
        })?;
        let before = sink.count();
        for center in corners {
            for point in marker::checkerboard(center, half_size) {
                sink.push(&point)?;
            }
        }
        let marker_points = sink.count() - before;
        context.info(&format!("{} target points added", marker_points));
        Ok((
            sink,
            Report {
                input_points,
                marker_points,
                corners: Some(corners),
                ..Default::default()
            },
        ))
    }
}

fn check_width(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(Error::InvalidWidth { name, value })
    }
}

fn warn_if_far(context: &mut Context<'_>, bounds: &Bounds, a: &Vector<f64>, b: &Vector<f64>) {
    let (Some(da), Some(db)) = (
        boundary::distance_to_extent(a, bounds),
        boundary::distance_to_extent(b, bounds),
    ) else {
        return;
    };
    context.info(&format!(
        "distance to the point cloud extent: A {:.2} m, B {:.2} m",
        da, db
    ));
    if da > RANGE_WARNING_DISTANCE || db > RANGE_WARNING_DISTANCE {
        context.warn(&format!(
            "a reference point lies more than {} m outside the point cloud extent, check for mistyped or swapped coordinates",
            RANGE_WARNING_DISTANCE
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Classification,
        boundary::Orientation,
        source::tests::{las_bytes, las_bytes_with},
        stream::{CancellationToken, tests::Recorder},
    };

    fn run(bytes: Vec<u8>, mode: &Mode) -> Result<Run<Vec<Vec<u8>>>> {
        let mut recorder = Recorder::default();
        run_with(bytes, mode, &mut recorder)
    }

    fn run_with(
        bytes: Vec<u8>,
        mode: &Mode,
        recorder: &mut Recorder,
    ) -> Result<Run<Vec<Vec<u8>>>> {
        let mut source = PointSource::from_bytes(bytes)?;
        Pipeline::new().with_output_chunk_bytes(100).run(
            &mut source,
            mode,
            Vec::new(),
            &mut Context::new(recorder),
        )
    }

    fn decode(run: &Run<Vec<Vec<u8>>>) -> (Header, Vec<Point>) {
        let bytes = run.output.to_bytes();
        let header = Header::parse(&bytes).unwrap();
        let width = usize::from(header.record_width());
        let points = bytes[227..]
            .chunks(width)
            .map(|record| Point::decode(record, &header).unwrap())
            .collect();
        (header, points)
    }

    fn cylinder(centers: Vec<Vector<f64>>, backfill: bool) -> Mode {
        Mode::Filter {
            filter: FilterConfig::new(centers, 1., false, true).unwrap(),
            backfill,
        }
    }

    #[test]
    fn filter_keeps_matches() {
        let bytes = las_bytes(&[(0.5, 0., 3.), (5., 0., 0.)]);
        let run = run(bytes, &cylinder(vec![Vector::default()], false)).unwrap();
        assert_eq!(2, run.report.input_points);
        assert_eq!(1, run.report.output_points);
        let (header, points) = decode(&run);
        assert_eq!(0, header.layout().id);
        assert_eq!(header.bounds().min, header.bounds().max);
        assert!((points[0].x - 0.5).abs() < 1e-9);
        assert!((points[0].z - 3.).abs() < 1e-9);
    }

    #[test]
    fn filter_keeps_color() {
        let point = Point {
            color: Some(Color::new(1, 2, 3)),
            ..Default::default()
        };
        let bytes = las_bytes_with(&Layout::COLORED, &[point]);
        let run = run(bytes, &cylinder(vec![Vector::default()], false)).unwrap();
        let (header, points) = decode(&run);
        assert_eq!(2, header.layout().id);
        assert_eq!(Some(Color::new(1, 2, 3)), points[0].color);
    }

    #[test]
    fn nothing_matched() {
        let bytes = las_bytes(&[(5., 0., 0.)]);
        assert!(matches!(
            run(bytes, &cylinder(vec![Vector::default()], false)),
            Err(Error::EmptyResult("filter"))
        ));
    }

    #[test]
    fn backfill() {
        let bytes = las_bytes(&[
            (0.1, 0., 5.),
            (0.2, 0., 4.),
            (0.3, 0., 6.),
            (0.05, 0., 9.),
            (0.9, 0., -50.),
        ]);
        let mut recorder = Recorder::default();
        let mode = cylinder(vec![Vector::default(), Vector::new(100., 0., 0.)], true);
        let run = run_with(bytes, &mode, &mut recorder).unwrap();
        assert_eq!(Some(vec![Some(4.), None]), run.report.elevations);
        assert!(
            recorder
                .messages
                .iter()
                .any(|message| message.contains("center 2"))
        );
    }

    #[test]
    fn elevation_transforms_and_marks() {
        let bytes = las_bytes(&[(15., 12., 3.)]);
        let boundary = Boundary::new(Vector::new(10., 10., 0.), Vector::new(20., 10., 1.))
            .with_vertical_scale(2.);
        let run = run(bytes, &Mode::Elevation(boundary)).unwrap();
        assert_eq!(1 + 2 * 50, run.report.output_points);
        assert_eq!(100, run.report.marker_points);
        let (header, points) = decode(&run);
        assert_eq!(2, header.layout().id);
        let first = points[0];
        assert!((first.x - 5.).abs() < 1e-9);
        assert!((first.y - 6.).abs() < 1e-9);
        assert!((first.z - 2.).abs() < 1e-9);
        assert_eq!(Some(Color::BLACK), first.color);
        assert!(points[1..].iter().all(|p| p.color == Some(Color::MAGENTA)));
        let b_marker = &points[51..];
        let mean_x = b_marker.iter().map(|p| p.x).sum::<f64>() / 50.;
        assert!((mean_x - 10.).abs() < 0.01);
    }

    #[test]
    fn reversed_orientation() {
        let bytes = las_bytes(&[(15., 12., 3.)]);
        let boundary = Boundary::new(Vector::new(10., 10., 0.), Vector::new(20., 10., 0.))
            .with_orientation(Orientation::BToA);
        let (_, points) = decode(&run(bytes, &Mode::Elevation(boundary)).unwrap());
        assert!((points[0].x + 5.).abs() < 1e-9);
        assert!((points[0].z + 2.).abs() < 1e-9);
    }

    #[test]
    fn section_clips() {
        let bytes = las_bytes(&[(5., 0., 1.), (5., 0.5, 1.)]);
        let mode = Mode::Section {
            boundary: Boundary::new(Vector::new(0., 0., 0.), Vector::new(10., 0., 0.)),
            half_width: 0.01,
        };
        let run = run(bytes, &mode).unwrap();
        assert_eq!(2, run.report.input_points);
        let (_, points) = decode(&run);
        assert!((points[0].x - 5.).abs() < 1e-9);
        assert_eq!(1 + 100, points.len());
    }

    #[test]
    fn section_markers_are_clipped() {
        let bytes = las_bytes(&[(5., 5., 1.)]);
        let mode = Mode::Section {
            boundary: Boundary::new(Vector::new(0., 0., 0.), Vector::new(10., 0., 0.))
                .with_targets(0.1),
            half_width: 0.001,
        };
        let run = run(bytes, &mode).unwrap();
        assert_eq!(0, run.report.output_points - run.report.marker_points);
        assert_eq!(2 * 41 * 41, run.report.marker_points);
    }

    #[test]
    fn empty_input() {
        let mode = Mode::PolygonBand {
            polygon: Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]),
            line_width: 2.,
        };
        assert!(matches!(
            run(las_bytes(&[]), &mode),
            Err(Error::EmptyResult("polygon band"))
        ));
    }

    #[test]
    fn validation_before_streaming() {
        let a = Vector::new(1., 1., 0.);
        let modes = [
            Mode::Elevation(Boundary::new(a, a)),
            Mode::Elevation(Boundary::new(a, Vector::default()).with_vertical_scale(0.)),
            Mode::Section {
                boundary: Boundary::new(a, Vector::default()),
                half_width: -1.,
            },
            Mode::Elevation(Boundary::new(a, Vector::default()).with_targets(f64::NAN)),
            Mode::PolygonBand {
                polygon: Polygon::new([(0., 0.), (1., 1.)]),
                line_width: 1.,
            },
            Mode::Corners {
                half_size: 0.,
                at_max_z: false,
            },
        ];
        for mode in modes {
            let mut source = PointSource::from_bytes(las_bytes(&[(0., 0., 0.)])).unwrap();
            let mut host = ();
            let result = Pipeline::new().run(
                &mut source,
                &mode,
                Vec::new(),
                &mut Context::new(&mut host),
            );
            assert!(result.is_err(), "{:?}", mode);
            assert_eq!(crate::source::State::Unopened, source.state(), "{:?}", mode);
        }
    }

    #[test]
    fn range_warning() {
        let bytes = las_bytes(&[(0., 0., 0.), (10., 10., 0.)]);
        let mut recorder = Recorder::default();
        let boundary = Boundary::new(Vector::new(5., 5., 0.), Vector::new(100., 5., 0.));
        let _ = run_with(bytes, &Mode::Elevation(boundary), &mut recorder).unwrap();
        assert!(
            recorder
                .messages
                .iter()
                .any(|message| message.contains("outside the point cloud extent"))
        );
    }

    #[test]
    fn polygon_band() {
        let bytes = las_bytes(&[(5., 5., 0.), (0., 5., 0.), (-5., 5., 0.)]);
        let mode = Mode::PolygonBand {
            polygon: Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]),
            line_width: 2.,
        };
        let run = run(bytes, &mode).unwrap();
        assert_eq!(
            Some(BandCounts {
                inside: 1,
                band: 1,
                outside: 1
            }),
            run.report.bands
        );
        let (header, points) = decode(&run);
        assert_eq!(2, header.layout().id);
        let classes: Vec<Option<Classification>> = points
            .iter()
            .map(|p| Classification::from_code(p.classification))
            .collect();
        assert_eq!(
            vec![
                Some(Classification::Inside),
                Some(Classification::Band),
                Some(Classification::Outside)
            ],
            classes
        );
        assert_eq!(Some(Color::MAGENTA), points[1].color);
    }

    #[test]
    fn corners() {
        let bytes = las_bytes(&[(0., 0., 1.), (10., 20., 5.)]);
        let mode = Mode::Corners {
            half_size: 0.1,
            at_max_z: true,
        };
        let run = run(bytes, &mode).unwrap();
        assert_eq!(4 * 41 * 41, run.report.marker_points);
        assert_eq!(2 + 4 * 41 * 41, run.report.output_points);
        let corners = run.report.corners.unwrap();
        assert_eq!(Vector::new(10., 0., 5.), corners[1]);
        let (_, points) = decode(&run);
        assert!(points[2..].iter().all(|p| (p.z - 5.).abs() < 1e-9));
    }

    #[test]
    fn cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let mut source = PointSource::from_bytes(las_bytes(&[(0., 0., 0.)])).unwrap();
        let mut host = ();
        let mut context = Context::new(&mut host).with_cancellation(token);
        let result = Pipeline::new().run(
            &mut source,
            &cylinder(vec![Vector::default()], false),
            Vec::new(),
            &mut context,
        );
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
