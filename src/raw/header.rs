//! Raw file metadata.

use crate::{Result, Version};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

const IS_COMPRESSED_MASK: u8 = 0x80;
const LAYOUT_ID_MASK: u8 = 0x3F;

/// A las header, field for field, as far as this crate reads it.
///
/// Fields that are never used downstream (file source id, global encoding, GUID, returns
/// histogram) are skipped on read and written as zeros.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// The file signature must contain the four characters “LASF”.
    pub file_signature: [u8; 4],

    /// The format version, as (major, minor).
    pub version: Version,

    /// Identifies the hardware or the operation that generated the file.
    pub system_identifier: [u8; 32],

    /// Identifies the software that generated the file.
    pub generating_software: [u8; 32],

    /// Day of the year, starting at 1, on which the file was created.
    pub file_creation_day_of_year: u16,

    /// The year, expressed as a four digit number, in which the file was created.
    pub file_creation_year: u16,

    /// The size, in bytes, of the public header block.
    pub header_size: u16,

    /// The actual number of bytes from the beginning of the file to the first point record.
    pub offset_to_point_data: u32,

    /// The number of VLRs that follow the header.
    pub number_of_variable_length_records: u32,

    /// The raw layout byte, compression bits included.
    pub point_data_format_id: u8,

    /// The size, in bytes, of one point record.
    pub point_data_record_length: u16,

    /// The legacy 32-bit point count.
    pub number_of_point_records: u32,

    #[allow(missing_docs)]
    pub x_scale_factor: f64,
    #[allow(missing_docs)]
    pub y_scale_factor: f64,
    #[allow(missing_docs)]
    pub z_scale_factor: f64,
    #[allow(missing_docs)]
    pub x_offset: f64,
    #[allow(missing_docs)]
    pub y_offset: f64,
    #[allow(missing_docs)]
    pub z_offset: f64,
    #[allow(missing_docs)]
    pub max_x: f64,
    #[allow(missing_docs)]
    pub min_x: f64,
    #[allow(missing_docs)]
    pub max_y: f64,
    #[allow(missing_docs)]
    pub min_y: f64,
    #[allow(missing_docs)]
    pub max_z: f64,
    #[allow(missing_docs)]
    pub min_z: f64,

    /// The 64-bit point count, present in las 1.4 headers that were long enough to hold it.
    pub large_file_point_records: Option<u64>,
}

impl Header {
    /// Reads a raw header.
    ///
    /// The large-file point count is only read for las 1.4 and later, and only when the reader has
    /// the bytes for it; a short read there leaves it as `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasband::raw::Header;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Header::default().write_to(&mut cursor).unwrap();
    /// cursor.set_position(0);
    /// let header = Header::read_from(cursor).unwrap();
    /// assert_eq!(*b"LASF", header.file_signature);
    /// ```
    pub fn read_from<R: Read>(mut read: R) -> Result<Header> {
        let mut file_signature = [0; 4];
        read.read_exact(&mut file_signature)?;
        let _file_source_id = read.read_u16::<LittleEndian>()?;
        let _global_encoding = read.read_u16::<LittleEndian>()?;
        let mut guid = [0; 16];
        read.read_exact(&mut guid)?;
        let version_major = read.read_u8()?;
        let version_minor = read.read_u8()?;
        let mut system_identifier = [0; 32];
        read.read_exact(&mut system_identifier)?;
        let mut generating_software = [0; 32];
        read.read_exact(&mut generating_software)?;
        let file_creation_day_of_year = read.read_u16::<LittleEndian>()?;
        let file_creation_year = read.read_u16::<LittleEndian>()?;
        let header_size = read.read_u16::<LittleEndian>()?;
        let offset_to_point_data = read.read_u32::<LittleEndian>()?;
        let number_of_variable_length_records = read.read_u32::<LittleEndian>()?;
        let point_data_format_id = read.read_u8()?;
        let point_data_record_length = read.read_u16::<LittleEndian>()?;
        let number_of_point_records = read.read_u32::<LittleEndian>()?;
        for _ in 0..5 {
            let _ = read.read_u32::<LittleEndian>()?;
        }
        let x_scale_factor = read.read_f64::<LittleEndian>()?;
        let y_scale_factor = read.read_f64::<LittleEndian>()?;
        let z_scale_factor = read.read_f64::<LittleEndian>()?;
        let x_offset = read.read_f64::<LittleEndian>()?;
        let y_offset = read.read_f64::<LittleEndian>()?;
        let z_offset = read.read_f64::<LittleEndian>()?;
        let max_x = read.read_f64::<LittleEndian>()?;
        let min_x = read.read_f64::<LittleEndian>()?;
        let max_y = read.read_f64::<LittleEndian>()?;
        let min_y = read.read_f64::<LittleEndian>()?;
        let max_z = read.read_f64::<LittleEndian>()?;
        let min_z = read.read_f64::<LittleEndian>()?;
        let version = Version::new(version_major, version_minor);
        let large_file_point_records = if version.supports_large_files() {
            read_large_file_count(&mut read)
        } else {
            None
        };
        Ok(Header {
            file_signature,
            version,
            system_identifier,
            generating_software,
            file_creation_day_of_year,
            file_creation_year,
            header_size,
            offset_to_point_data,
            number_of_variable_length_records,
            point_data_format_id,
            point_data_record_length,
            number_of_point_records,
            x_scale_factor,
            y_scale_factor,
            z_scale_factor,
            x_offset,
            y_offset,
            z_offset,
            max_x,
            min_x,
            max_y,
            min_y,
            max_z,
            min_z,
            large_file_point_records,
        })
    }

    /// Returns true if this raw header is for compressed point data.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::raw::Header;
    /// let mut header = Header::default();
    /// assert!(!header.is_compressed());
    /// header.point_data_format_id = 131;
    /// assert!(header.is_compressed());
    /// ```
    pub fn is_compressed(&self) -> bool {
        (self.point_data_format_id & IS_COMPRESSED_MASK) == IS_COMPRESSED_MASK
    }

    /// Returns the layout id with the compression bits masked off.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::raw::Header;
    /// let header = Header { point_data_format_id: 0x83, ..Default::default() };
    /// assert_eq!(3, header.layout_id());
    /// ```
    pub fn layout_id(&self) -> u8 {
        self.point_data_format_id & LAYOUT_ID_MASK
    }

    /// Writes the first 227 bytes of a raw header.
    ///
    /// Only the las 1.2 region is written, whatever the version says. That is all the output of
    /// this crate ever needs.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasband::raw::Header;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Header::default().write_to(&mut cursor).unwrap();
    /// assert_eq!(227, cursor.into_inner().len());
    /// ```
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&self.file_signature)?;
        write.write_u16::<LittleEndian>(0)?;
        write.write_u16::<LittleEndian>(0)?;
        write.write_all(&[0; 16])?;
        write.write_u8(self.version.major)?;
        write.write_u8(self.version.minor)?;
        write.write_all(&self.system_identifier)?;
        write.write_all(&self.generating_software)?;
        write.write_u16::<LittleEndian>(self.file_creation_day_of_year)?;
        write.write_u16::<LittleEndian>(self.file_creation_year)?;
        write.write_u16::<LittleEndian>(self.header_size)?;
        write.write_u32::<LittleEndian>(self.offset_to_point_data)?;
        write.write_u32::<LittleEndian>(self.number_of_variable_length_records)?;
        write.write_u8(self.point_data_format_id)?;
        write.write_u16::<LittleEndian>(self.point_data_record_length)?;
        write.write_u32::<LittleEndian>(self.number_of_point_records)?;
        for _ in 0..5 {
            write.write_u32::<LittleEndian>(0)?;
        }
        write.write_f64::<LittleEndian>(self.x_scale_factor)?;
        write.write_f64::<LittleEndian>(self.y_scale_factor)?;
        write.write_f64::<LittleEndian>(self.z_scale_factor)?;
        write.write_f64::<LittleEndian>(self.x_offset)?;
        write.write_f64::<LittleEndian>(self.y_offset)?;
        write.write_f64::<LittleEndian>(self.z_offset)?;
        write.write_f64::<LittleEndian>(self.max_x)?;
        write.write_f64::<LittleEndian>(self.min_x)?;
        write.write_f64::<LittleEndian>(self.max_y)?;
        write.write_f64::<LittleEndian>(self.min_y)?;
        write.write_f64::<LittleEndian>(self.max_z)?;
        write.write_f64::<LittleEndian>(self.min_z)?;
        Ok(())
    }
}

/// Skips the waveform and EVLR fields, then reads the 64-bit point count.
fn read_large_file_count<R: Read>(read: &mut R) -> Option<u64> {
    let mut skipped = [0; 20];
    read.read_exact(&mut skipped).ok()?;
    read.read_u64::<LittleEndian>().ok()
}

impl Default for Header {
    fn default() -> Header {
        Header {
            file_signature: super::LASF,
            version: Version::new(1, 2),
            system_identifier: [0; 32],
            generating_software: [0; 32],
            file_creation_day_of_year: 0,
            file_creation_year: 0,
            header_size: super::HEADER_SIZE,
            offset_to_point_data: u32::from(super::HEADER_SIZE),
            number_of_variable_length_records: 0,
            point_data_format_id: 0,
            point_data_record_length: 0,
            number_of_point_records: 0,
            x_scale_factor: 0.,
            y_scale_factor: 0.,
            z_scale_factor: 0.,
            x_offset: 0.,
            y_offset: 0.,
            z_offset: 0.,
            max_x: 0.,
            min_x: 0.,
            max_y: 0.,
            min_y: 0.,
            max_z: 0.,
            min_z: 0.,
            large_file_point_records: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn is_compressed() {
        let mut header = Header {
            point_data_format_id: 0,
            ..Default::default()
        };
        assert!(!header.is_compressed());
        header.point_data_format_id = 131;
        assert!(header.is_compressed());
        assert_eq!(3, header.layout_id());
    }

    #[test]
    fn roundtrip() {
        let header = Header {
            point_data_format_id: 2,
            point_data_record_length: 26,
            number_of_point_records: 42,
            x_scale_factor: 0.01,
            y_scale_factor: 0.01,
            z_scale_factor: 0.01,
            x_offset: 100.,
            max_x: 3.,
            min_x: -3.,
            ..Default::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        header.write_to(&mut cursor).unwrap();
        cursor.set_position(0);
        assert_eq!(header, Header::read_from(cursor).unwrap());
    }

    #[test]
    fn field_offsets() {
        let header = Header {
            point_data_format_id: 7,
            point_data_record_length: 36,
            number_of_point_records: 0x01020304,
            x_scale_factor: 0.5,
            min_z: -1.,
            ..Default::default()
        };
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        assert_eq!(b"LASF", &bytes[0..4]);
        assert_eq!([1, 2], bytes[24..26]);
        assert_eq!(227u16.to_le_bytes(), bytes[94..96]);
        assert_eq!(227u32.to_le_bytes(), bytes[96..100]);
        assert_eq!(7, bytes[104]);
        assert_eq!(36u16.to_le_bytes(), bytes[105..107]);
        assert_eq!(0x01020304u32.to_le_bytes(), bytes[107..111]);
        assert_eq!(0.5f64.to_le_bytes(), bytes[131..139]);
        assert_eq!((-1f64).to_le_bytes(), bytes[219..227]);
    }

    #[test]
    fn large_file_count() {
        let header = Header {
            version: Version::new(1, 4),
            header_size: 375,
            ..Default::default()
        };
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        bytes.resize(375, 0);
        bytes[247..255].copy_from_slice(&5_000_000_000u64.to_le_bytes());
        let header = Header::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(Some(5_000_000_000), header.large_file_point_records);
    }

    #[test]
    fn large_file_count_missing() {
        let header = Header {
            version: Version::new(1, 4),
            ..Default::default()
        };
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        let header = Header::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(None, header.large_file_point_records);
    }
}
