//! Streams points out of las data.
//!
//! A [PointSource] hides one of three strategies behind the same driver:
//!
//! - [Buffered] walks a file that is already in memory,
//! - [Chunked] reads the point data one window of records at a time through a [RangeRead],
//! - [Delegated] asks a [Decompress] for one record at a time.
//!
//! [PointSource::from_path] picks one for you:
//!
//! ```no_run
//! use lasband::{source::{PointSource, SourceOptions}, stream::Context};
//! let mut source = PointSource::from_path("points.las", &SourceOptions::default()).unwrap();
//! let mut host = ();
//! let mut context = Context::new(&mut host);
//! let mut highest = f64::NEG_INFINITY;
//! source.for_each(&mut context, |point, _| {
//!     highest = highest.max(point.z);
//!     Ok(())
//! }).unwrap();
//! ```
//!
//! Sources can't be restarted. Once a pass has run, [PointSource::for_each] returns
//! [Error::SourceConsumed].

mod buffered;
mod chunked;
mod delegated;
#[cfg(feature = "laz")]
mod laz;

pub use self::buffered::Buffered;
pub use self::chunked::{Chunked, RangeRead};
pub use self::delegated::{Decompress, Delegated};
#[cfg(feature = "laz")]
pub use self::laz::LazDecompressor;

use crate::{raw, stream, Error, Header, Point, Result};
use log::{log, Level};
use std::{fs::File, path::Path};

/// One way of pulling decoded points out of las data.
pub trait ReadPoints {
    /// Reads the next point, or `None` at the end of the data.
    fn read_point(&mut self) -> Result<Option<Point>>;

    /// Returns the header of the data being read.
    fn header(&self) -> &Header;

    /// If the data ended in the middle of a record, returns the number of whole records read.
    fn truncated_at(&self) -> Option<u64> {
        None
    }

    /// Returns how many windows of data have been loaded so far.
    fn windows_read(&self) -> u64 {
        0
    }

    /// Should the driver suspend after loading each window?
    fn pause_between_windows(&self) -> bool {
        false
    }
}

/// Where a source is in its one and only pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// No pass has started.
    Unopened,
    /// A pass is running.
    Streaming,
    /// A pass ran to the end.
    Exhausted,
    /// A pass stopped with an error.
    Failed,
}

/// Options that decide how a source reads its data.
#[derive(Clone, Copy, Debug)]
pub struct SourceOptions {
    chunk_bytes: usize,
    buffered_threshold: u64,
}

impl SourceOptions {
    /// Sets the target size of one chunked-read window.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::source::SourceOptions;
    /// let options = SourceOptions::default().with_chunk_bytes(8 * 1024 * 1024);
    /// assert_eq!(8 * 1024 * 1024, options.chunk_bytes());
    /// ```
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    /// Sets the largest file size that is read into memory in one go.
    pub fn with_buffered_threshold(mut self, buffered_threshold: u64) -> Self {
        self.buffered_threshold = buffered_threshold;
        self
    }

    /// Returns the target size of one chunked-read window.
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    /// Returns the largest file size that is read into memory in one go.
    pub fn buffered_threshold(&self) -> u64 {
        self.buffered_threshold
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        SourceOptions {
            chunk_bytes: stream::DEFAULT_INPUT_CHUNK_BYTES,
            buffered_threshold: stream::DEFAULT_BUFFERED_THRESHOLD,
        }
    }
}

/// A lazy, ordered, finite sequence of points that can be walked once.
#[allow(missing_debug_implementations)]
pub struct PointSource {
    reader: Box<dyn ReadPoints>,
    state: State,
}

impl PointSource {
    /// Wraps any strategy.
    pub fn new<R: ReadPoints + 'static>(reader: R) -> PointSource {
        PointSource {
            reader: Box::new(reader),
            state: State::Unopened,
        }
    }

    /// Creates a source over the bytes of a whole file.
    ///
    /// Compressed data is decompressed point by point when the `laz` feature is enabled.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<PointSource> {
        let header = Header::parse(&bytes)?;
        if header.is_compressed() {
            #[cfg(feature = "laz")]
            {
                let decompressor = LazDecompressor::new(std::io::Cursor::new(bytes), &header)?;
                Ok(PointSource::from_decompressor(header, decompressor))
            }
            #[cfg(not(feature = "laz"))]
            {
                Err(Error::LazNotEnabled)
            }
        } else {
            Ok(PointSource::new(Buffered::new(bytes, header)))
        }
    }

    /// Creates a chunked source that reads through `range`.
    ///
    /// Compressed data can't be read in windows, and is refused.
    pub fn from_range_reader<R: RangeRead + 'static>(
        mut range: R,
        options: &SourceOptions,
    ) -> Result<PointSource> {
        let header = read_header(&mut range)?;
        if header.is_compressed() {
            return Err(Error::CompressedChunks);
        }
        Ok(PointSource::new(Chunked::new(
            range,
            header,
            options.chunk_bytes,
        )))
    }

    /// Creates a source that pulls records out of a decompressor.
    pub fn from_decompressor<D: Decompress + 'static>(
        header: Header,
        decompressor: D,
    ) -> PointSource {
        PointSource::new(Delegated::new(header, decompressor))
    }

    /// Opens a file, choosing a strategy from its header and size.
    ///
    /// Compressed files are decompressed point by point. Uncompressed files up to the buffered
    /// threshold are read whole, larger ones in windows.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &SourceOptions) -> Result<PointSource> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();
        let header = read_header(&mut file)?;
        if header.is_compressed() {
            log!(Level::Debug, "{}: compressed, decompressing point by point", path.display());
            #[cfg(feature = "laz")]
            {
                let decompressor = LazDecompressor::new(std::io::BufReader::new(file), &header)?;
                Ok(PointSource::from_decompressor(header, decompressor))
            }
            #[cfg(not(feature = "laz"))]
            {
                Err(Error::LazNotEnabled)
            }
        } else if size <= options.buffered_threshold {
            log!(Level::Debug, "{}: {} bytes, reading whole", path.display(), size);
            let bytes = file.read_range(0, size)?;
            Ok(PointSource::new(Buffered::new(bytes, header)))
        } else {
            log!(
                Level::Debug,
                "{}: {} bytes, reading in windows of {} bytes",
                path.display(),
                size,
                options.chunk_bytes
            );
            Ok(PointSource::new(Chunked::new(
                file,
                header,
                options.chunk_bytes,
            )))
        }
    }

    /// Returns the header of the data.
    pub fn header(&self) -> &Header {
        self.reader.header()
    }

    /// Returns where this source is in its pass.
    pub fn state(&self) -> State {
        self.state
    }

    /// Visits every point in order, with its index.
    ///
    /// Progress goes to the context's host every progress interval, the context suspends every
    /// suspend interval and after each loaded window, and cancellation is checked at all of
    /// those. Data that ends mid-record is a warning, not an error: the pass stops with the
    /// points read so far.
    ///
    /// Returns the number of points visited.
    pub fn for_each<F>(&mut self, context: &mut stream::Context<'_>, visit: F) -> Result<u64>
    where
        F: FnMut(Point, u64) -> Result<()>,
    {
        if self.state != State::Unopened {
            return Err(Error::SourceConsumed);
        }
        self.state = State::Streaming;
        match self.drive(context, visit) {
            Ok(n) => {
                self.state = State::Exhausted;
                Ok(n)
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    fn drive<F>(&mut self, context: &mut stream::Context<'_>, mut visit: F) -> Result<u64>
    where
        F: FnMut(Point, u64) -> Result<()>,
    {
        let total = self.reader.header().number_of_points();
        let progress_interval = context.progress_interval();
        let suspend_interval = context.suspend_interval();
        context.check()?;
        let mut index = 0;
        loop {
            let windows = self.reader.windows_read();
            let point = self.reader.read_point()?;
            if self.reader.windows_read() != windows {
                if self.reader.pause_between_windows() {
                    context.suspend()?;
                } else {
                    context.check()?;
                }
            }
            let Some(point) = point else {
                break;
            };
            visit(point, index)?;
            index += 1;
            if index % progress_interval == 0 {
                context.check()?;
                context.progress(index, total);
            }
            if index % suspend_interval == 0 {
                context.suspend()?;
            }
        }
        if let Some(n) = self.reader.truncated_at() {
            context.warn(&format!(
                "point data ends in the middle of record {} of {}, the rest is ignored",
                n + 1,
                total
            ));
        }
        context.progress(index, total);
        Ok(index)
    }
}

fn read_header<R: RangeRead>(range: &mut R) -> Result<Header> {
    let bytes = range.read_range(0, raw::HEADER_PROBE_SIZE as u64)?;
    let header = Header::parse(&bytes)?;
    let offset = u64::from(header.offset_to_point_data());
    if offset > bytes.len() as u64 {
        let bytes = range.read_range(0, offset)?;
        Header::parse(&bytes)
    } else {
        Ok(header)
    }
}
