//! Raw point records.

use crate::{point::Layout, Color, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};

/// A raw point, holding just the fields this crate carries through a pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// The X, Y, and Z values are stored as long integers.
    ///
    /// They are used in conjunction with the scale values and the offset values to determine
    /// the coordinate for each point.
    pub x: i32,
    #[allow(missing_docs)]
    pub y: i32,
    #[allow(missing_docs)]
    pub z: i32,

    /// The integer representation of the pulse return magnitude.
    pub intensity: u16,

    /// The classification, with any flag bits already stripped.
    pub classification: u8,

    /// The red, green, and blue image channels, when the layout has them.
    pub color: Option<Color>,
}

impl Point {
    /// Reads a raw point out of one record.
    ///
    /// The record must be at least as wide as the layout's minimum width, which header parsing
    /// guarantees.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{point::Layout, raw::Point};
    /// let record = [0; 26];
    /// let point = Point::read_from(&record, &Layout::new(2).unwrap()).unwrap();
    /// assert!(point.color.is_some());
    /// ```
    pub fn read_from(record: &[u8], layout: &Layout) -> Result<Point> {
        let mut read = Cursor::new(record);
        let x = read.read_i32::<LittleEndian>()?;
        let y = read.read_i32::<LittleEndian>()?;
        let z = read.read_i32::<LittleEndian>()?;
        let intensity = read.read_u16::<LittleEndian>()?;
        let _ = read.seek(SeekFrom::Start(u64::from(layout.classification_offset)))?;
        let classification = layout.classification_from_byte(read.read_u8()?);
        let color = if let Some(offset) = layout.color_offset {
            let _ = read.seek(SeekFrom::Start(u64::from(offset)))?;
            let red = read.read_u16::<LittleEndian>()?;
            let green = read.read_u16::<LittleEndian>()?;
            let blue = read.read_u16::<LittleEndian>()?;
            Some(Color::new(red, green, blue))
        } else {
            None
        };
        Ok(Point {
            x,
            y,
            z,
            intensity,
            classification,
            color,
        })
    }

    /// Writes this raw point into one record.
    ///
    /// Every byte of the record is overwritten; bytes for fields this point doesn't carry are
    /// zeroed. A layout with color and a point without one gets black.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{point::Layout, raw::Point};
    /// let mut record = [0xff; 20];
    /// Point { x: 1, ..Default::default() }.write_to(&mut record, &Layout::PLAIN).unwrap();
    /// assert_eq!([1, 0, 0, 0], record[0..4]);
    /// assert_eq!([0; 16], record[4..20]);
    /// ```
    pub fn write_to(&self, record: &mut [u8], layout: &Layout) -> Result<()> {
        record.fill(0);
        let mut write = Cursor::new(record);
        write.write_i32::<LittleEndian>(self.x)?;
        write.write_i32::<LittleEndian>(self.y)?;
        write.write_i32::<LittleEndian>(self.z)?;
        write.write_u16::<LittleEndian>(self.intensity)?;
        let _ = write.seek(SeekFrom::Start(u64::from(layout.classification_offset)))?;
        write.write_u8(layout.classification_to_byte(self.classification))?;
        if let Some(offset) = layout.color_offset {
            let color = self.color.unwrap_or_default();
            let _ = write.seek(SeekFrom::Start(u64::from(offset)))?;
            write.write_u16::<LittleEndian>(color.red)?;
            write.write_u16::<LittleEndian>(color.green)?;
            write.write_u16::<LittleEndian>(color.blue)?;
        }
        write.flush()?;
        Ok(())
    }
}
