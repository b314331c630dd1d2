//! Streaming passes over las point clouds, each of which reads every point once and writes a new,
//! uncompressed las file.
//!
//! A pass has three parts:
//!
//! - a [PointSource](source::PointSource) that decodes points out of a file, whether it is in
//!   memory, too big for memory, or compressed,
//! - a [Mode](pipeline::Mode) that decides what happens to each point,
//! - a [RecordSink](sink::RecordSink) that encodes the surviving points into fixed-size chunks and
//!   builds the output header once the pass is over.
//!
//! [Pipeline](pipeline::Pipeline) ties them together:
//!
//! ```no_run
//! use lasband::{
//!     pipeline::{Boundary, Mode, Pipeline},
//!     source::{PointSource, SourceOptions},
//!     stream::{Context, LogHost},
//!     Vector,
//! };
//!
//! let mut source = PointSource::from_path("cloud.las", &SourceOptions::default()).unwrap();
//! let boundary = Boundary::new(Vector::new(10., 10., 0.), Vector::new(20., 10., 0.));
//! let mut host = LogHost;
//! let mut context = Context::new(&mut host);
//! let run = Pipeline::default()
//!     .run(&mut source, &Mode::Elevation(boundary), Vec::new(), &mut context)
//!     .unwrap();
//! let mut file = std::fs::File::create("elevation.las").unwrap();
//! run.output.write_to(&mut file).unwrap();
//! ```
//!
//! # Modes
//!
//! - **filter** keeps the points within a vertical cylinder around any of a set of
//!   [centers](centers), optionally estimating each center's elevation from the nearest matches,
//! - **elevation** moves every point into the frame of a boundary line from A to B, so the line
//!   can be viewed face on,
//! - **section** does the same, but only keeps a thin slice along the boundary,
//! - **polygon band** [classifies](polygon::BandClassifier) each point as inside a polygon, on a
//!   band along its edges, or outside,
//! - **corners** passes the cloud through and adds a checkerboard target at each corner of its
//!   extent.
//!
//! Elevation, section and corners passes append synthetic [marker] points after the real ones.
//!
//! # Compression
//!
//! With the `laz` feature, compressed input is decompressed one record at a time. Output is
//! never compressed.
//!
//! # Hosts
//!
//! Long passes report progress, pause, and can be cancelled through a
//! [Context](stream::Context). See the [stream] module.

#![deny(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

pub mod boundary;
pub mod centers;
pub mod filter;
pub mod marker;
pub mod pipeline;
pub mod point;
pub mod polygon;
pub mod raw;
pub mod sink;
pub mod source;
pub mod stream;

mod bounds;
mod color;
mod error;
mod header;
mod transform;
mod vector;
mod version;

pub use crate::{
    bounds::Bounds,
    color::Color,
    error::Error,
    header::Header,
    point::{Classification, Point},
    transform::Transform,
    vector::Vector,
    version::Version,
};

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
