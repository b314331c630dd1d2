use crate::{Error, Result};
use std::fmt;

/// The scale used for every emitted file.
///
/// Millimetre precision, with the first emitted point as offset, keeps raw coordinates small.
pub const OUTPUT_SCALE: f64 = 0.001;

/// A scale and an offset that transforms xyz coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The scale.
    pub scale: f64,
    /// The offset.
    pub offset: f64,
}

impl Transform {
    /// Creates a transform with the output scale and the given offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::Transform;
    /// let transform = Transform::with_origin(10.);
    /// assert_eq!(0.001, transform.scale);
    /// assert_eq!(10., transform.offset);
    /// ```
    pub fn with_origin(offset: f64) -> Transform {
        Transform {
            scale: OUTPUT_SCALE,
            offset,
        }
    }

    /// Applies this transform to an i32, returning a float.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3., transform.direct(1));
    /// ```
    pub fn direct(&self, n: i32) -> f64 {
        self.scale * f64::from(n) + self.offset
    }

    /// Applies the inverse transform, and rounds the result.
    ///
    /// Returns an error if the resultant value can't be represented as an i32.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(1, transform.inverse(2.9).unwrap());
    /// ```
    pub fn inverse(&self, n: f64) -> Result<i32> {
        let n = ((n - self.offset) / self.scale).round();
        if n.is_finite() && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) {
            Ok(n as i32)
        } else {
            Err(Error::InverseTransform {
                n,
                transform: *self,
            })
        }
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            scale: OUTPUT_SCALE,
            offset: 0.,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{} * x + {}`", self.scale, self.offset)
    }
}
