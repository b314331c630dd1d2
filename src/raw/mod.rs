//! Raw structures that map directly onto structures as defined in the las format specifications.
//!
//! In general, these structures are "dumb", meaning that they do the least amount of validity
//! checking. For example:
//!
//! ```
//! let raw_header = lasband::raw::Header::default();
//! assert_eq!(0, raw_header.point_data_record_length);
//! ```
//!
//! In general, users should prefer to use the non-raw versions, e.g. `lasband::Header` over
//! `lasband::raw::Header`, in order to get layout validation and world coordinates.

mod header;
mod point;
mod vlr;

pub use self::header::Header;
pub use self::point::Point;
pub use self::vlr::Vlr;

/// The file magic number used for all las files.
pub const LASF: [u8; 4] = *b"LASF";

/// The size of a las 1.2 header, which is also the size of every header this crate writes.
pub const HEADER_SIZE: u16 = 227;

/// The number of bytes read up front to find out what kind of file we are dealing with.
///
/// Large enough for a las 1.4 header. Files with VLRs are re-read up to their point data.
pub const HEADER_PROBE_SIZE: usize = 375;
