use super::ReadPoints;
use crate::{Header, Point, Result};

/// Produces decompressed point records, one at a time.
///
/// Opening happens when the decompressor is constructed and closing when it is dropped.
pub trait Decompress {
    /// Decompresses the next record into `record`, which is exactly one record wide.
    fn decompress_next(&mut self, record: &mut [u8]) -> Result<()>;
}

impl<D: Decompress + ?Sized> Decompress for Box<D> {
    fn decompress_next(&mut self, record: &mut [u8]) -> Result<()> {
        (**self).decompress_next(record)
    }
}

/// Decodes points from a decompressor.
///
/// Asks for exactly as many records as the header counts, and never holds more than one.
#[derive(Debug)]
pub struct Delegated<D: Decompress> {
    decompressor: D,
    header: Header,
    record: Vec<u8>,
    index: u64,
}

impl<D: Decompress> Delegated<D> {
    /// Wraps a decompressor positioned at the first record.
    pub fn new(header: Header, decompressor: D) -> Delegated<D> {
        Delegated {
            decompressor,
            record: vec![0; usize::from(header.record_width())],
            header,
            index: 0,
        }
    }
}

impl<D: Decompress> ReadPoints for Delegated<D> {
    fn read_point(&mut self) -> Result<Option<Point>> {
        if self.index >= self.header.number_of_points() {
            return Ok(None);
        }
        self.decompressor.decompress_next(&mut self.record)?;
        self.index += 1;
        Point::decode(&self.record, &self.header).map(Some)
    }

    fn header(&self) -> &Header {
        &self.header
    }
}
