use crate::{Point, Vector};

/// Minimum and maximum bounds in three dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// The minimum values.
    pub min: Vector<f64>,

    /// The maximum values.
    pub max: Vector<f64>,
}

impl Bounds {
    /// Grows the bounds to encompass this point in xyz space.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasband::{Bounds, Point};
    /// let point = Point { x: 1., y: 2., z: 3., ..Default::default() };
    /// let mut bounds = Bounds { ..Default::default() };
    /// bounds.grow(&point);
    /// assert_eq!(1., bounds.min.x);
    /// ```
    pub fn grow(&mut self, point: &Point) {
        if point.x < self.min.x {
            self.min.x = point.x;
        }
        if point.y < self.min.y {
            self.min.y = point.y;
        }
        if point.z < self.min.z {
            self.min.z = point.z;
        }
        if point.x > self.max.x {
            self.max.x = point.x;
        }
        if point.y > self.max.y {
            self.max.y = point.y;
        }
        if point.z > self.max.z {
            self.max.z = point.z;
        }
    }

    /// Returns true if every component is finite and min <= max.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasband::Bounds;
    /// assert!(!Bounds::default().is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
        .iter()
        .all(|n| n.is_finite())
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    /// Planar distance from (x, y) to the xy footprint of these bounds, zero inside.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasband::{Bounds, Vector};
    /// let bounds = Bounds { min: Vector::new(0., 0., 0.), max: Vector::new(10., 10., 1.) };
    /// assert_eq!(0., bounds.planar_distance(5., 5.));
    /// assert_eq!(5., bounds.planar_distance(13., 14.));
    /// ```
    pub fn planar_distance(&self, x: f64, y: f64) -> f64 {
        let nx = x.clamp(self.min.x, self.max.x);
        let ny = y.clamp(self.min.y, self.max.y);
        (x - nx).hypot(y - ny)
    }
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds {
            min: Vector {
                x: f64::INFINITY,
                y: f64::INFINITY,
                z: f64::INFINITY,
            },
            max: Vector {
                x: f64::NEG_INFINITY,
                y: f64::NEG_INFINITY,
                z: f64::NEG_INFINITY,
            },
        }
    }
}
