use super::ReadPoints;
use crate::{Header, Point, Result};

/// Walks a file that is entirely in memory, one record width at a time.
#[derive(Debug)]
pub struct Buffered {
    bytes: Vec<u8>,
    header: Header,
    index: u64,
    truncated_at: Option<u64>,
}

impl Buffered {
    /// Wraps the bytes of a whole file, header included.
    pub fn new(bytes: Vec<u8>, header: Header) -> Buffered {
        Buffered {
            bytes,
            header,
            index: 0,
            truncated_at: None,
        }
    }

    fn record_range(&self) -> Option<std::ops::Range<usize>> {
        let width = u64::from(self.header.record_width());
        let start = u64::from(self.header.offset_to_point_data()).checked_add(self.index * width)?;
        let end = start.checked_add(width)?;
        if end > self.bytes.len() as u64 {
            return None;
        }
        Some(usize::try_from(start).ok()?..usize::try_from(end).ok()?)
    }
}

impl ReadPoints for Buffered {
    fn read_point(&mut self) -> Result<Option<Point>> {
        if self.index >= self.header.number_of_points() || self.truncated_at.is_some() {
            return Ok(None);
        }
        match self.record_range() {
            Some(range) => {
                let point = Point::decode(&self.bytes[range], &self.header)?;
                self.index += 1;
                Ok(Some(point))
            }
            None => {
                self.truncated_at = Some(self.index);
                Ok(None)
            }
        }
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn truncated_at(&self) -> Option<u64> {
        self.truncated_at
    }
}
