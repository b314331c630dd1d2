//! End-to-end passes over small las files built in memory.

use lasband::{
    Classification, Color, Error, Point, Vector,
    filter::FilterConfig,
    pipeline::{Boundary, Mode, Pipeline},
    point::Layout,
    polygon::{Polygon, sima},
    raw,
    sink::Spill,
    source::{PointSource, SourceOptions},
    stream::Context,
};
use std::io::{Read, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

/// Builds a file with scale 0.01 and zero offsets.
fn las(layout_id: u8, xyz: &[(f64, f64, f64)]) -> Vec<u8> {
    let layout = Layout::new(layout_id).unwrap();
    let fold = |f: fn(&(f64, f64, f64)) -> f64, init: f64, pick: fn(f64, f64) -> f64| {
        xyz.iter().map(f).fold(init, pick)
    };
    let header = raw::Header {
        point_data_format_id: layout.id,
        point_data_record_length: layout.min_width,
        number_of_point_records: xyz.len() as u32,
        x_scale_factor: 0.01,
        y_scale_factor: 0.01,
        z_scale_factor: 0.01,
        min_x: fold(|p| p.0, f64::INFINITY, f64::min),
        max_x: fold(|p| p.0, f64::NEG_INFINITY, f64::max),
        min_y: fold(|p| p.1, f64::INFINITY, f64::min),
        max_y: fold(|p| p.1, f64::NEG_INFINITY, f64::max),
        min_z: fold(|p| p.2, f64::INFINITY, f64::min),
        max_z: fold(|p| p.2, f64::NEG_INFINITY, f64::max),
        ..Default::default()
    };
    let mut bytes = Vec::new();
    header.write_to(&mut bytes).unwrap();
    for &(x, y, z) in xyz {
        let mut record = vec![0; usize::from(layout.min_width)];
        raw::Point {
            x: (x * 100.).round() as i32,
            y: (y * 100.).round() as i32,
            z: (z * 100.).round() as i32,
            ..Default::default()
        }
        .write_to(&mut record, &layout)
        .unwrap();
        bytes.extend(record);
    }
    bytes
}

fn points(mut source: PointSource) -> Vec<Point> {
    let mut host = ();
    let mut points = Vec::new();
    let _ = source
        .for_each(&mut Context::new(&mut host), |point, _| {
            points.push(point);
            Ok(())
        })
        .unwrap();
    points
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn filter_keeps_one_of_two() {
    let bytes = las(0, &[(0.5, 0.5, 1.), (5., 5., 5.)]);
    let mut source = PointSource::from_bytes(bytes).unwrap();
    let filter = FilterConfig::new(vec![Vector::new(0., 0., 0.)], 1., false, true).unwrap();
    let mode = Mode::Filter {
        filter,
        backfill: false,
    };
    let mut host = ();
    let run = Pipeline::default()
        .run(&mut source, &mode, Vec::new(), &mut Context::new(&mut host))
        .unwrap();
    assert_eq!(2, run.report.input_points);
    assert_eq!(1, run.report.output_points);

    let source = PointSource::from_bytes(run.output.to_bytes()).unwrap();
    let header = source.header().clone();
    assert_eq!(1, header.number_of_points());
    assert_eq!(0, header.layout().id);
    let bounds = header.bounds();
    assert_eq!(bounds.min, bounds.max);
    assert_eq!(Vector::new(0.5, 0.5, 1.), bounds.min);
    let points = points(source);
    assert_eq!(1, points.len());
    assert!(close(0.5, points[0].x) && close(0.5, points[0].y) && close(1., points[0].z));
}

#[test]
fn filter_with_nothing_left_is_an_error() {
    let bytes = las(0, &[(5., 5., 5.)]);
    let mut source = PointSource::from_bytes(bytes).unwrap();
    let filter = FilterConfig::new(vec![Vector::new(0., 0., 0.)], 1., true, false).unwrap();
    let mode = Mode::Filter {
        filter,
        backfill: true,
    };
    let mut host = ();
    let result = Pipeline::default().run(&mut source, &mode, Vec::new(), &mut Context::new(&mut host));
    assert!(matches!(result, Err(Error::EmptyResult("filter"))));
}

#[test]
fn polygon_band_regions() {
    let bytes = las(0, &[(5., 5., 0.), (0., 5., 0.), (-5., 5., 0.)]);
    let mut source = PointSource::from_bytes(bytes).unwrap();
    let polygon = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
    let mode = Mode::PolygonBand {
        polygon,
        line_width: 2.,
    };
    let mut host = ();
    let run = Pipeline::default()
        .run(&mut source, &mode, Vec::new(), &mut Context::new(&mut host))
        .unwrap();
    let bands = run.report.bands.unwrap();
    assert_eq!((1, 1, 1), (bands.inside, bands.band, bands.outside));

    let points = points(PointSource::from_bytes(run.output.to_bytes()).unwrap());
    let codes: Vec<u8> = points.iter().map(|p| p.classification).collect();
    assert_eq!(
        vec![
            Classification::Inside.code(),
            Classification::Band.code(),
            Classification::Outside.code()
        ],
        codes
    );
    assert_eq!(Some(Color::BLACK), points[0].color);
    assert_eq!(Some(Color::MAGENTA), points[1].color);
    assert_eq!(Some(Color::BLACK), points[2].color);
}

#[test]
fn sima_polygon_in_point_axes() {
    let text = "A01,1,1,0,0\n\
                A01,2,2,0,20\n\
                A01,3,3,10,20\n\
                A01,4,4,10,0\n\
                B01,1,1\n\
                B01,2,2\n\
                B01,3,3\n\
                B01,4,4\n";
    let polygon = sima::parse(text).unwrap().swap_axes();
    let bytes = las(0, &[(15., 5., 0.)]);
    let mut source = PointSource::from_bytes(bytes).unwrap();
    let mode = Mode::PolygonBand {
        polygon,
        line_width: 0.5,
    };
    let mut host = ();
    let run = Pipeline::default()
        .run(&mut source, &mode, Vec::new(), &mut Context::new(&mut host))
        .unwrap();
    assert_eq!(1, run.report.bands.unwrap().inside);
}

#[test]
fn chunked_file_matches_buffered_file() {
    let xyz: Vec<(f64, f64, f64)> = (0..200)
        .map(|i| (f64::from(i) * 0.25, f64::from(i % 7), f64::from(i % 3)))
        .collect();
    let bytes = las(0, &xyz);
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let buffered = PointSource::from_path(file.path(), &SourceOptions::default()).unwrap();
    let options = SourceOptions::default()
        .with_buffered_threshold(0)
        .with_chunk_bytes(20 * 17);
    let chunked = PointSource::from_path(file.path(), &options).unwrap();
    let buffered = points(buffered);
    assert_eq!(200, buffered.len());
    assert_eq!(buffered, points(chunked));
}

#[test]
fn spill_output_matches_memory_output() {
    let bytes = las(0, &[(1., 0., 0.), (2., 1., 0.), (3., -1., 1.)]);
    let boundary = Boundary::new(Vector::new(0., 0., 0.), Vector::new(10., 0., 0.));
    let mode = Mode::Elevation(boundary);
    let pipeline = Pipeline::new().with_output_chunk_bytes(100);
    let mut host = ();

    let mut source = PointSource::from_bytes(bytes.clone()).unwrap();
    let memory = pipeline
        .run(&mut source, &mode, Vec::new(), &mut Context::new(&mut host))
        .unwrap()
        .output
        .to_bytes();

    let mut file = NamedTempFile::new().unwrap();
    let spill = Spill::new(file.as_file_mut()).unwrap();
    let mut source = PointSource::from_bytes(bytes).unwrap();
    let run = pipeline
        .run(&mut source, &mode, spill, &mut Context::new(&mut host))
        .unwrap();
    assert_eq!(3 + 100, run.report.output_points);
    drop(run);

    let mut written = Vec::new();
    let _ = file.seek(SeekFrom::Start(0)).unwrap();
    let _ = file.read_to_end(&mut written).unwrap();
    assert_eq!(memory.len(), written.len());
    assert_eq!(memory[227..], written[227..]);
    assert_eq!(
        points(PointSource::from_bytes(memory).unwrap()),
        points(PointSource::from_bytes(written).unwrap())
    );
}
