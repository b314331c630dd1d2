//! The public header block, validated and converted into world terms.
//!
//! Parse a header from the leading bytes of a file:
//!
//! ```
//! use lasband::{Bounds, Header, Vector, point::Layout};
//! let bytes = Header::build(0, &Layout::PLAIN, 20, Vector::default(), &Bounds::default()).unwrap();
//! let header = Header::parse(&bytes).unwrap();
//! assert_eq!(0, header.number_of_points());
//! ```

use crate::{point::Layout, raw, Bounds, Error, Result, Transform, Vector, Version};
use chrono::{Datelike, NaiveDate, Utc};
use std::io::Cursor;

const GENERATING_SOFTWARE: &str = concat!("lasband ", env!("CARGO_PKG_VERSION"));

/// Metadata describing the layout and interpretation of the points.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    version: Version,
    layout: Layout,
    record_width: u16,
    number_of_points: u64,
    transforms: Vector<Transform>,
    bounds: Bounds,
    offset_to_point_data: u32,
    header_size: u16,
    is_compressed: bool,
    date: Option<NaiveDate>,
    number_of_vlrs: u32,
}

impl Header {
    /// Parses a header out of the leading bytes of a file.
    ///
    /// Only the first 227 bytes are required. When a las 1.4 file has a zero legacy point count,
    /// the 64-bit count at byte 247 is used, if `bytes` reaches that far.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::Header;
    /// assert!(Header::parse(b"not a las file").is_err());
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Header> {
        let needed = usize::from(raw::HEADER_SIZE);
        if bytes.len() >= 4 && bytes[0..4] != raw::LASF {
            let mut signature = [0; 4];
            signature.copy_from_slice(&bytes[0..4]);
            return Err(Error::InvalidFileSignature(signature));
        }
        if bytes.len() < needed {
            return Err(Error::HeaderTooShort {
                needed,
                available: bytes.len(),
            });
        }
        let raw_header = raw::Header::read_from(Cursor::new(bytes))?;
        Header::from_raw(raw_header)
    }

    /// Creates a header from a raw header, validating the layout against the record width.
    pub fn from_raw(raw_header: raw::Header) -> Result<Header> {
        if raw_header.file_signature != raw::LASF {
            return Err(Error::InvalidFileSignature(raw_header.file_signature));
        }
        if raw_header.version.major != 1 {
            return Err(Error::UnsupportedVersion(raw_header.version));
        }
        let layout = Layout::new(raw_header.layout_id())?;
        layout.check_width(raw_header.point_data_record_length)?;
        let number_of_points = match raw_header.large_file_point_records {
            Some(n) if raw_header.number_of_point_records == 0 => n,
            _ => u64::from(raw_header.number_of_point_records),
        };
        let date = if raw_header.file_creation_year == 0 {
            None
        } else {
            NaiveDate::from_yo_opt(
                i32::from(raw_header.file_creation_year),
                u32::from(raw_header.file_creation_day_of_year),
            )
        };
        Ok(Header {
            version: raw_header.version,
            layout,
            record_width: raw_header.point_data_record_length,
            number_of_points,
            transforms: Vector {
                x: Transform {
                    scale: raw_header.x_scale_factor,
                    offset: raw_header.x_offset,
                },
                y: Transform {
                    scale: raw_header.y_scale_factor,
                    offset: raw_header.y_offset,
                },
                z: Transform {
                    scale: raw_header.z_scale_factor,
                    offset: raw_header.z_offset,
                },
            },
            bounds: Bounds {
                min: Vector::new(raw_header.min_x, raw_header.min_y, raw_header.min_z),
                max: Vector::new(raw_header.max_x, raw_header.max_y, raw_header.max_z),
            },
            offset_to_point_data: raw_header.offset_to_point_data,
            header_size: raw_header.header_size,
            is_compressed: raw_header.is_compressed(),
            date,
            number_of_vlrs: raw_header.number_of_variable_length_records,
        })
    }

    /// Builds the bytes of an output header.
    ///
    /// Output headers are always las 1.2 and 227 bytes long, with no VLRs. Every axis is scaled by
    /// 0.001 and offset by `origin`, which should be the first point written. The creation date is
    /// today, in UTC.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{Bounds, Header, Vector, point::Layout};
    /// let origin = Vector::new(1., 2., 3.);
    /// let bytes = Header::build(1, &Layout::COLORED, 26, origin, &Bounds::default()).unwrap();
    /// assert_eq!(227, bytes.len());
    /// let header = Header::parse(&bytes).unwrap();
    /// assert_eq!(2., header.transforms().y.offset);
    /// ```
    pub fn build(
        count: u64,
        layout: &Layout,
        record_width: u16,
        origin: Vector<f64>,
        bounds: &Bounds,
    ) -> Result<Vec<u8>> {
        let number_of_point_records =
            u32::try_from(count).map_err(|_| Error::TooManyPoints(count))?;
        let mut generating_software = [0; 32];
        let name = GENERATING_SOFTWARE.as_bytes();
        let n = name.len().min(generating_software.len());
        generating_software[..n].copy_from_slice(&name[..n]);
        let x = Transform::with_origin(origin.x);
        let y = Transform::with_origin(origin.y);
        let z = Transform::with_origin(origin.z);
        let today = Utc::now().date_naive();
        let raw_header = raw::Header {
            version: Version::new(1, 2),
            generating_software,
            file_creation_day_of_year: u16::try_from(today.ordinal())?,
            file_creation_year: u16::try_from(today.year())?,
            point_data_format_id: layout.id,
            point_data_record_length: record_width,
            number_of_point_records,
            x_scale_factor: x.scale,
            y_scale_factor: y.scale,
            z_scale_factor: z.scale,
            x_offset: x.offset,
            y_offset: y.offset,
            z_offset: z.offset,
            max_x: bounds.max.x,
            min_x: bounds.min.x,
            max_y: bounds.max.y,
            min_y: bounds.min.y,
            max_z: bounds.max.z,
            min_z: bounds.min.z,
            ..Default::default()
        };
        let mut bytes = Vec::with_capacity(usize::from(raw::HEADER_SIZE));
        raw_header.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Returns this header's version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the record layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the width of one point record, in bytes.
    ///
    /// This can be wider than the layout's minimum, when the file carries extra bytes.
    pub fn record_width(&self) -> u16 {
        self.record_width
    }

    /// Returns the number of points, from the 64-bit count if that is the one in use.
    pub fn number_of_points(&self) -> u64 {
        self.number_of_points
    }

    /// Returns the scale and offset of each axis.
    pub fn transforms(&self) -> &Vector<Transform> {
        &self.transforms
    }

    /// Returns the bounding box recorded in the header.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the byte offset of the first point record.
    pub fn offset_to_point_data(&self) -> u32 {
        self.offset_to_point_data
    }

    /// Returns the size of the public header block.
    pub fn header_size(&self) -> u16 {
        self.header_size
    }

    /// Is the point data laszip-compressed?
    pub fn is_compressed(&self) -> bool {
        self.is_compressed
    }

    /// Returns the file creation date, if one was recorded.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns the number of VLRs between the header and the point data.
    pub fn number_of_vlrs(&self) -> u32 {
        self.number_of_vlrs
    }

    /// Returns the number of bytes of point data the header promises.
    pub fn point_data_len(&self) -> u64 {
        self.number_of_points * u64::from(self.record_width)
    }
}
