use crate::{Transform, Version};
use thiserror::Error;

/// Crate-specific error enum.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The file signature was not "LASF".
    #[error("file signature must be LASF, found {0:?}")]
    InvalidFileSignature([u8; 4]),

    /// Fewer bytes than a header needs.
    #[error("a las header needs at least {needed} bytes, only {available} available")]
    HeaderTooShort {
        /// The number of bytes required.
        needed: usize,
        /// The number of bytes we got.
        available: usize,
    },

    /// The point data record layout id is outside of the supported table.
    #[error("point data record layout {0} is not supported")]
    UnsupportedLayout(u8),

    /// The record width is shorter than the layout demands.
    #[error("layout {layout} needs records of at least {minimum} bytes, header says {width}")]
    InvalidRecordWidth {
        /// The layout id.
        layout: u8,
        /// The layout's minimum record width.
        minimum: u16,
        /// The record width from the header.
        width: u16,
    },

    /// The header claims a version we can't make sense of.
    #[error("las version {0} is not supported")]
    UnsupportedVersion(Version),

    /// The data is compressed, but the `laz` feature is not enabled.
    #[error("the data is laz compressed, but laszip support is not enabled")]
    LazNotEnabled,

    /// Compressed point data was handed to a strategy that reads raw records.
    #[error("laz compressed point data can only be read point by point through a decompressor")]
    CompressedChunks,

    /// The data is compressed, but no laszip vlr could be found.
    #[error("the data is laz compressed, but there is no laszip vlr")]
    MissingLazVlr,

    /// The two boundary reference points are (nearly) identical.
    #[error("boundary points A and B coincide, choose two distinct points")]
    DegenerateBoundary,

    /// A polygon resolved to fewer than three vertices.
    #[error("polygon has {0} vertices, at least 3 are required")]
    DegeneratePolygon(usize),

    /// Neither the sphere nor the cylinder test was enabled.
    #[error("at least one filter mode (sphere or cylinder) must be enabled")]
    NoFilterMode,

    /// No filter centers were given.
    #[error("no filter centers")]
    NoCenters,

    /// The filter radius is not a positive finite number.
    #[error("radius must be a positive finite number, got {0}")]
    InvalidRadius(f64),

    /// A width (clip width, line width, target size) is not a positive finite number.
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidWidth {
        /// Which width.
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// The vertical exaggeration is not a positive finite number.
    #[error("vertical scale must be a positive finite number, got {0}")]
    InvalidVerticalScale(f64),

    /// The header bounding box is not usable.
    #[error("the header does not carry a finite bounding box")]
    MissingBounds,

    /// No points survived the pipeline.
    #[error("no points survived the {0} pass")]
    EmptyResult(&'static str),

    /// The streaming pass was cancelled.
    #[error("the streaming pass was cancelled")]
    Cancelled,

    /// The point source has already been consumed.
    #[error("the point source has already been consumed and cannot be restarted")]
    SourceConsumed,

    /// Too many points for a legacy header.
    #[error("{0} points do not fit in a las 1.2 header")]
    TooManyPoints(u64),

    /// This value can't be represented as an i32 with the given transform.
    #[error("the transform {transform} cannot convert {n} into an i32")]
    InverseTransform {
        /// The float that could not be transformed.
        n: f64,
        /// The transform that was used.
        transform: Transform,
    },

    /// Wrapper around `std::io::Error`.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper around `csv::Error`.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper around `std::num::ParseFloatError`.
    #[error(transparent)]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Wrapper around `std::num::TryFromIntError`.
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// Wrapper around `laz::LasZipError`.
    #[cfg(feature = "laz")]
    #[error(transparent)]
    Laz(#[from] laz::LasZipError),
}
