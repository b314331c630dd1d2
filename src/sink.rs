//! Encodes points into output records, one chunk at a time.
//!
//! A [RecordSink] fills a chunk buffer with fixed-width records and hands each full chunk to a
//! [ChunkStore]. When the last point is in, [RecordSink::finish] builds the header. The output
//! file is the header followed by the chunks, in order.
//!
//! ```
//! use lasband::{sink::RecordSink, point::Layout, Bounds, Header, Point};
//! let mut sink = RecordSink::new(Layout::PLAIN, 1024, Vec::new());
//! sink.push(&Point { x: 10., y: 20., z: 1., ..Default::default() }).unwrap();
//! let finished = sink.finish(&Bounds::default()).unwrap();
//! let bytes = finished.to_bytes();
//! assert_eq!(227 + 20, bytes.len());
//! assert_eq!(1, Header::parse(&bytes).unwrap().number_of_points());
//! ```

use crate::{Bounds, Header, Point, Result, Transform, Vector, point::Layout, raw};
use std::io::{Seek, SeekFrom, Write};

/// Somewhere to put sealed output chunks.
pub trait ChunkStore {
    /// Takes one full chunk of records.
    fn seal(&mut self, chunk: &[u8]) -> Result<()>;

    /// Takes the header, once every chunk has been sealed.
    fn finish(&mut self, header: &[u8]) -> Result<()> {
        let _ = header;
        Ok(())
    }
}

/// Keeps chunks in memory, in order.
impl ChunkStore for Vec<Vec<u8>> {
    fn seal(&mut self, chunk: &[u8]) -> Result<()> {
        self.push(chunk.to_vec());
        Ok(())
    }
}

/// Writes chunks straight through to the output, then back-patches the header.
///
/// Only the chunk being filled is ever held in memory.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use lasband::{sink::{RecordSink, Spill}, point::Layout, Bounds, Header, Point};
/// let spill = Spill::new(Cursor::new(Vec::new())).unwrap();
/// let mut sink = RecordSink::new(Layout::COLORED, 26, spill);
/// sink.push(&Point::default()).unwrap();
/// sink.push(&Point::default()).unwrap();
/// let bytes = sink.finish(&Bounds::default()).unwrap().into_store().into_inner().into_inner();
/// assert_eq!(227 + 2 * 26, bytes.len());
/// assert_eq!(2, Header::parse(&bytes).unwrap().number_of_points());
/// ```
#[derive(Debug)]
pub struct Spill<W: Write + Seek> {
    write: W,
    start: u64,
}

impl<W: Write + Seek> Spill<W> {
    /// Reserves space for the header at the current position of `write`.
    pub fn new(mut write: W) -> Result<Spill<W>> {
        let start = write.stream_position()?;
        write.write_all(&[0; raw::HEADER_SIZE as usize])?;
        Ok(Spill { write, start })
    }

    /// Returns the inner writer, seeked to the beginning of the las data.
    pub fn into_inner(self) -> W {
        self.write
    }
}

impl<W: Write + Seek> ChunkStore for Spill<W> {
    fn seal(&mut self, chunk: &[u8]) -> Result<()> {
        self.write.write_all(chunk)?;
        Ok(())
    }

    fn finish(&mut self, header: &[u8]) -> Result<()> {
        let _ = self.write.seek(SeekFrom::Start(self.start))?;
        self.write.write_all(header)?;
        let _ = self.write.seek(SeekFrom::Start(self.start))?;
        self.write.flush()?;
        Ok(())
    }
}

/// Encodes points into records and seals them in chunks.
///
/// The first point pushed becomes the origin: every axis is written at millimetre scale, offset
/// by that point.
#[derive(Debug)]
pub struct RecordSink<S: ChunkStore> {
    layout: Layout,
    width: usize,
    capacity: usize,
    chunk: Vec<u8>,
    origin: Option<Vector<f64>>,
    transforms: Vector<Transform>,
    bounds: Bounds,
    count: u64,
    store: S,
}

impl<S: ChunkStore> RecordSink<S> {
    /// Creates a sink that writes records in `layout`.
    ///
    /// The chunk size is rounded down to a whole number of records, and is at least one record.
    pub fn new(layout: Layout, chunk_bytes: usize, store: S) -> RecordSink<S> {
        let width = usize::from(layout.min_width);
        let capacity = (chunk_bytes / width).max(1) * width;
        RecordSink {
            layout,
            width,
            capacity,
            chunk: Vec::new(),
            origin: None,
            transforms: Vector::default(),
            bounds: Bounds::default(),
            count: 0,
            store,
        }
    }

    /// Returns the chunk size, in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of points pushed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the layout being written.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Encodes one point.
    pub fn push(&mut self, point: &Point) -> Result<()> {
        let transforms = match self.origin {
            Some(_) => self.transforms,
            None => {
                let origin = point.position();
                self.origin = Some(origin);
                self.transforms = Vector::new(
                    Transform::with_origin(origin.x),
                    Transform::with_origin(origin.y),
                    Transform::with_origin(origin.z),
                );
                self.transforms
            }
        };
        if self.chunk.capacity() == 0 {
            self.chunk.reserve_exact(self.capacity);
        }
        let start = self.chunk.len();
        self.chunk.resize(start + self.width, 0);
        if let Err(err) = point.encode_into(&mut self.chunk[start..], &self.layout, &transforms) {
            self.chunk.truncate(start);
            return Err(err);
        }
        self.bounds.grow(point);
        self.count += 1;
        if self.chunk.len() >= self.capacity {
            self.store.seal(&self.chunk)?;
            self.chunk.clear();
        }
        Ok(())
    }

    /// Seals the last partial chunk and builds the header.
    ///
    /// When no point was pushed the header carries `fallback_bounds`.
    pub fn finish(mut self, fallback_bounds: &Bounds) -> Result<Finished<S>> {
        if !self.chunk.is_empty() {
            self.store.seal(&self.chunk)?;
        }
        let bounds = if self.count > 0 {
            self.bounds
        } else {
            *fallback_bounds
        };
        let width = u16::try_from(self.width)?;
        let header = Header::build(
            self.count,
            &self.layout,
            width,
            self.origin.unwrap_or_default(),
            &bounds,
        )?;
        self.store.finish(&header)?;
        Ok(Finished {
            header,
            count: self.count,
            bounds,
            store: self.store,
        })
    }
}

/// A completed output: the header bytes and the store holding the records.
#[derive(Clone, Debug)]
pub struct Finished<S> {
    header: Vec<u8>,
    count: u64,
    bounds: Bounds,
    store: S,
}

impl<S> Finished<S> {
    /// Returns the header bytes.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Returns the number of records.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the bounds written to the header.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes this output and returns the store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl Finished<Vec<Vec<u8>>> {
    /// Writes the header and every chunk.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&self.header)?;
        for chunk in &self.store {
            write.write_all(chunk)?;
        }
        Ok(())
    }

    /// Concatenates the header and every chunk.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self.header.len() + self.store.iter().map(Vec::len).sum::<usize>();
        let mut bytes = Vec::with_capacity(len);
        bytes.extend_from_slice(&self.header);
        for chunk in &self.store {
            bytes.extend_from_slice(chunk);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Error, source::PointSource, stream::Context};
    use std::io::Cursor;

    fn point(x: f64, y: f64, z: f64) -> Point {
        Point {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    #[test]
    fn chunks_are_whole_records() {
        let mut sink = RecordSink::new(Layout::PLAIN, 50, Vec::new());
        assert_eq!(40, sink.capacity());
        for i in 0..5 {
            sink.push(&point(f64::from(i), 0., 0.)).unwrap();
        }
        let finished = sink.finish(&Bounds::default()).unwrap();
        let lengths: Vec<usize> = finished.store().iter().map(Vec::len).collect();
        assert_eq!(vec![40, 40, 20], lengths);
        assert_eq!(5, finished.count());
    }

    #[test]
    fn tiny_chunks_hold_one_record() {
        let sink = RecordSink::new(Layout::COLORED, 3, Vec::new());
        assert_eq!(26, sink.capacity());
    }

    #[test]
    fn first_point_is_the_origin() {
        let mut sink = RecordSink::new(Layout::PLAIN, 1024, Vec::new());
        sink.push(&point(1000.5, 2000.25, 30.)).unwrap();
        sink.push(&point(1001.5, 1999.25, 31.)).unwrap();
        let bytes = sink.finish(&Bounds::default()).unwrap().to_bytes();
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(1000.5, header.transforms().x.offset);
        assert_eq!(0.001, header.transforms().z.scale);
        let bounds = header.bounds();
        assert_eq!(Vector::new(1000.5, 1999.25, 30.), bounds.min);
        assert_eq!(Vector::new(1001.5, 2000.25, 31.), bounds.max);
        let second = Point::decode(&bytes[227 + 20..], &header).unwrap();
        assert!((second.x - 1001.5).abs() < 1e-9);
        assert!((second.y - 1999.25).abs() < 1e-9);
    }

    #[test]
    fn empty_output_uses_fallback_bounds() {
        let sink = RecordSink::new(Layout::COLORED, 1024, Vec::new());
        let fallback = Bounds {
            min: Vector::new(1., 2., 3.),
            max: Vector::new(4., 5., 6.),
        };
        let finished = sink.finish(&fallback).unwrap();
        assert_eq!(fallback, finished.bounds());
        assert!(finished.store().is_empty());
        let header = Header::parse(finished.header()).unwrap();
        assert_eq!(0, header.number_of_points());
        assert_eq!(2, header.layout().id);
    }

    #[test]
    fn unencodable_point_is_not_counted() {
        let mut sink = RecordSink::new(Layout::PLAIN, 1024, Vec::new());
        sink.push(&point(0., 0., 0.)).unwrap();
        assert!(matches!(
            sink.push(&point(1e12, 0., 0.)),
            Err(Error::InverseTransform { .. })
        ));
        assert_eq!(1, sink.count());
        assert_eq!(20 + 227, sink.finish(&Bounds::default()).unwrap().to_bytes().len());
    }

    #[test]
    fn spill_matches_memory() {
        let points = [
            Point {
                color: Some(Color::MAGENTA),
                classification: 2,
                ..point(5., 6., 7.)
            },
            point(5.5, 6.5, 7.5),
            point(4., 3., 2.),
        ];
        let mut memory = RecordSink::new(Layout::COLORED, 52, Vec::new());
        let mut spill = RecordSink::new(
            Layout::COLORED,
            52,
            Spill::new(Cursor::new(Vec::new())).unwrap(),
        );
        for point in &points {
            memory.push(point).unwrap();
            spill.push(point).unwrap();
        }
        let memory = memory.finish(&Bounds::default()).unwrap().to_bytes();
        let spill = spill
            .finish(&Bounds::default())
            .unwrap()
            .into_store()
            .into_inner()
            .into_inner();
        assert_eq!(memory, spill);

        let mut source = PointSource::from_bytes(spill).unwrap();
        let mut host = ();
        let mut decoded = Vec::new();
        let _ = source
            .for_each(&mut Context::new(&mut host), |point, _| {
                decoded.push(point);
                Ok(())
            })
            .unwrap();
        assert_eq!(3, decoded.len());
        assert_eq!(Some(Color::MAGENTA), decoded[0].color);
        assert_eq!(2, decoded[0].classification);
        assert_eq!(Some(Color::BLACK), decoded[1].color);
    }
}
