//! Three-dimensional points with the attributes a pipeline carries.

mod classification;
mod layout;

pub use self::classification::Classification;
pub use self::layout::Layout;

use crate::{raw, Color, Header, Result, Transform, Vector};

/// A point, in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// The x coordinate, as a float.
    pub x: f64,
    /// The y coordinate, as a float.
    pub y: f64,
    /// The z coordinate, as a float.
    pub z: f64,
    /// The integer representation of the pulse return magnitude.
    ///
    /// Zero could be a valid intensity, so this isn't an `Option`.
    pub intensity: u16,
    /// This point's color, if the source layout had one.
    pub color: Option<Color>,
    /// The classification code.
    ///
    /// Band classification rewrites this with one of the [Classification] codes.
    pub classification: u8,
}

impl Point {
    /// Creates a point from a raw point.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{raw, Point, Transform, Vector};
    /// let raw_point = raw::Point { x: 1, ..Default::default() };
    /// let transform = Transform { scale: 2., offset: 1. };
    /// let transforms = Vector::new(transform, transform, transform);
    /// let point = Point::new(raw_point, &transforms);
    /// assert_eq!(3., point.x);
    /// ```
    pub fn new(raw_point: raw::Point, transforms: &Vector<Transform>) -> Point {
        Point {
            x: transforms.x.direct(raw_point.x),
            y: transforms.y.direct(raw_point.y),
            z: transforms.z.direct(raw_point.z),
            intensity: raw_point.intensity,
            color: raw_point.color,
            classification: raw_point.classification,
        }
    }

    /// Decodes one record using the header's layout and transforms.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{Bounds, Header, Point, Vector, point::Layout};
    /// let bytes = Header::build(1, &Layout::PLAIN, 20, Vector::new(10., 0., 0.), &Bounds::default()).unwrap();
    /// let header = Header::parse(&bytes).unwrap();
    /// let mut record = [0; 20];
    /// record[0..4].copy_from_slice(&1500i32.to_le_bytes());
    /// let point = Point::decode(&record, &header).unwrap();
    /// assert_eq!(11.5, point.x);
    /// ```
    pub fn decode(record: &[u8], header: &Header) -> Result<Point> {
        let raw_point = raw::Point::read_from(record, header.layout())?;
        Ok(Point::new(raw_point, header.transforms()))
    }

    /// Creates a raw point from this point.
    ///
    /// Returns an error if any coordinate falls outside the i32 range once transformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{Point, Transform, Vector};
    /// let point = Point { x: 3., ..Default::default() };
    /// let transform = Transform { scale: 2., offset: 1. };
    /// let transforms = Vector::new(transform, transform, transform);
    /// let raw_point = point.into_raw(&transforms).unwrap();
    /// assert_eq!(1, raw_point.x);
    /// ```
    pub fn into_raw(self, transforms: &Vector<Transform>) -> Result<raw::Point> {
        Ok(raw::Point {
            x: transforms.x.inverse(self.x)?,
            y: transforms.y.inverse(self.y)?,
            z: transforms.z.inverse(self.z)?,
            intensity: self.intensity,
            classification: self.classification,
            color: self.color,
        })
    }

    /// Encodes this point into one output record.
    ///
    /// `record` must be exactly as wide as the record width being written.
    pub fn encode_into(
        &self,
        record: &mut [u8],
        layout: &Layout,
        transforms: &Vector<Transform>,
    ) -> Result<()> {
        self.into_raw(transforms)?.write_to(record, layout)
    }

    /// Returns this point's position.
    pub fn position(&self) -> Vector<f64> {
        Vector::new(self.x, self.y, self.z)
    }
}
