use super::ReadPoints;
use crate::{stream, Header, Point, Result};
use std::io::{Read, Seek, SeekFrom};

/// Reads byte ranges out of some backing store.
///
/// Anything that can `Read` and `Seek` is a range reader, files and in-memory cursors included.
pub trait RangeRead {
    /// Reads the bytes in `start..end`.
    ///
    /// Fewer bytes come back when the store ends before `end`.
    fn read_range(&mut self, start: u64, end: u64) -> Result<Vec<u8>>;
}

impl<T: Read + Seek> RangeRead for T {
    fn read_range(&mut self, start: u64, end: u64) -> Result<Vec<u8>> {
        let _ = self.seek(SeekFrom::Start(start))?;
        let len = end.saturating_sub(start);
        let mut bytes = Vec::with_capacity(usize::try_from(len)?);
        let _ = self.by_ref().take(len).read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Reads point data one window of records at a time.
///
/// Only the current window is ever resident, so memory stays flat however large the file is.
#[derive(Debug)]
pub struct Chunked<R: RangeRead> {
    range: R,
    header: Header,
    records_per_window: u64,
    pause_between_windows: bool,
    window: Vec<u8>,
    window_first: u64,
    window_end: u64,
    index: u64,
    windows: u64,
    truncated_at: Option<u64>,
}

impl<R: RangeRead> Chunked<R> {
    /// Creates a chunked reader with windows of about `chunk_bytes` bytes.
    ///
    /// A window always holds at least one record.
    pub fn new(range: R, header: Header, chunk_bytes: usize) -> Chunked<R> {
        let width = u64::from(header.record_width()).max(1);
        let records_per_window = (chunk_bytes as u64 / width).max(1);
        Chunked {
            range,
            header,
            records_per_window,
            pause_between_windows: chunk_bytes <= stream::PAUSE_LIMIT_BYTES,
            window: Vec::new(),
            window_first: 0,
            window_end: 0,
            index: 0,
            windows: 0,
            truncated_at: None,
        }
    }

    /// Returns the number of records in a full window.
    pub fn records_per_window(&self) -> u64 {
        self.records_per_window
    }

    fn load_window(&mut self) -> Result<()> {
        let width = u64::from(self.header.record_width());
        let n = self
            .records_per_window
            .min(self.header.number_of_points() - self.index);
        let start = u64::from(self.header.offset_to_point_data()) + self.index * width;
        self.window = self.range.read_range(start, start + n * width)?;
        self.window_first = self.index;
        self.window_end = self.index + n;
        self.windows += 1;
        Ok(())
    }
}

impl<R: RangeRead> ReadPoints for Chunked<R> {
    fn read_point(&mut self) -> Result<Option<Point>> {
        if self.index >= self.header.number_of_points() || self.truncated_at.is_some() {
            return Ok(None);
        }
        if self.index >= self.window_end {
            self.load_window()?;
        }
        let width = usize::from(self.header.record_width());
        let start = usize::try_from(self.index - self.window_first)? * width;
        if start + width > self.window.len() {
            self.truncated_at = Some(self.index);
            return Ok(None);
        }
        let point = Point::decode(&self.window[start..start + width], &self.header)?;
        self.index += 1;
        Ok(Some(point))
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn truncated_at(&self) -> Option<u64> {
        self.truncated_at
    }

    fn windows_read(&self) -> u64 {
        self.windows
    }

    fn pause_between_windows(&self) -> bool {
        self.pause_between_windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::las_bytes;
    use std::io::Cursor;

    /// Remembers every range it was asked for.
    struct Ranges {
        bytes: Vec<u8>,
        requests: Vec<(u64, u64)>,
    }

    impl RangeRead for Ranges {
        fn read_range(&mut self, start: u64, end: u64) -> Result<Vec<u8>> {
            self.requests.push((start, end));
            let end = end.min(self.bytes.len() as u64) as usize;
            Ok(self.bytes[start as usize..end].to_vec())
        }
    }

    #[test]
    fn cursor_range() {
        let mut cursor = Cursor::new(vec![0, 1, 2, 3, 4]);
        assert_eq!(vec![1, 2], cursor.read_range(1, 3).unwrap());
        assert_eq!(vec![4], cursor.read_range(4, 10).unwrap());
    }

    #[test]
    fn windows_are_record_aligned() {
        let bytes = las_bytes(&[(0., 0., 0.), (1., 1., 1.), (2., 2., 2.)]);
        let header = Header::parse(&bytes).unwrap();
        let ranges = Ranges {
            bytes,
            requests: Vec::new(),
        };
        // 45 bytes hold two 20-byte records
        let mut chunked = Chunked::new(ranges, header, 45);
        assert_eq!(2, chunked.records_per_window());
        let mut xs = Vec::new();
        while let Some(point) = chunked.read_point().unwrap() {
            xs.push(point.x);
        }
        assert_eq!(vec![0., 1., 2.], xs);
        assert_eq!(2, chunked.windows_read());
        assert_eq!(vec![(227, 267), (267, 287)], chunked.range.requests);
    }

    #[test]
    fn tiny_chunks_hold_one_record() {
        let bytes = las_bytes(&[(0., 0., 0.)]);
        let header = Header::parse(&bytes).unwrap();
        let chunked = Chunked::new(Cursor::new(bytes), header, 1);
        assert_eq!(1, chunked.records_per_window());
        assert!(chunked.pause_between_windows());
    }

    #[test]
    fn huge_chunks_do_not_pause() {
        let bytes = las_bytes(&[(0., 0., 0.)]);
        let header = Header::parse(&bytes).unwrap();
        let chunked = Chunked::new(Cursor::new(bytes), header, stream::PAUSE_LIMIT_BYTES + 1);
        assert!(!chunked.pause_between_windows());
    }

    #[test]
    fn short_window() {
        let mut bytes = las_bytes(&[(0., 0., 0.), (1., 1., 1.)]);
        bytes.truncate(bytes.len() - 3);
        let header = Header::parse(&bytes).unwrap();
        let mut chunked = Chunked::new(Cursor::new(bytes), header, 1024);
        assert!(chunked.read_point().unwrap().is_some());
        assert!(chunked.read_point().unwrap().is_none());
        assert_eq!(Some(1), chunked.truncated_at());
    }
}
