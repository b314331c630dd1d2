/// An xyz collection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector<T> {
    /// X
    pub x: T,
    /// Y
    pub y: T,
    /// Z
    pub z: T,
}

impl<T> Vector<T> {
    /// Creates a new vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::Vector;
    /// let vector = Vector::new(1., 2., 3.);
    /// assert_eq!(2., vector.y);
    /// ```
    pub fn new(x: T, y: T, z: T) -> Vector<T> {
        Vector { x, y, z }
    }
}

impl Vector<f64> {
    /// Returns the planar (xy) distance to another vector.
    pub fn planar_distance(&self, other: &Vector<f64>) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
