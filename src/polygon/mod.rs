//! Plan-view polygons, their offset rings, and band classification against them.

mod classify;
mod offset;
pub mod sima;

pub use self::classify::{BandClassifier, BandCounts};
pub use self::offset::{MiterOffset, Offset};

/// A polygon vertex, in plan.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
}

impl Vertex {
    /// Creates a new vertex.
    pub const fn new(x: f64, y: f64) -> Vertex {
        Vertex { x, y }
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Vertex {
        Vertex { x, y }
    }
}

/// An axis-aligned rectangle in plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    /// The lower-left corner.
    pub min: Vertex,
    /// The upper-right corner.
    pub max: Vertex,
}

impl Extent {
    /// Is (x, y) inside this rectangle, edges included?
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }
}

/// A closed ring of vertices. The closing edge from the last vertex back to the first is implied.
///
/// A ring with fewer than three vertices is degenerate and contains nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
}

impl Polygon {
    /// Creates a polygon from its vertices.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::polygon::Polygon;
    /// let square = Polygon::new([(0., 0.), (1., 0.), (1., 1.), (0., 1.)]);
    /// assert_eq!(4, square.len());
    /// ```
    pub fn new<I, V>(vertices: I) -> Polygon
    where
        I: IntoIterator<Item = V>,
        V: Into<Vertex>,
    {
        Polygon {
            vertices: vertices.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if there are no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns true if this ring has fewer than three vertices.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Ray-casting point-in-polygon test.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::polygon::Polygon;
    /// let square = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
    /// assert!(square.contains(5., 5.));
    /// assert!(!square.contains(15., 5.));
    /// assert!(!Polygon::new([(0., 0.), (10., 0.)]).contains(5., 0.));
    /// ```
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let mut inside = false;
        let mut j = self.vertices.len() - 1;
        for (i, vi) in self.vertices.iter().enumerate() {
            let vj = self.vertices[j];
            if (vi.y > y) != (vj.y > y) && x < (vj.x - vi.x) * (y - vi.y) / (vj.y - vi.y) + vi.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Returns the bounding rectangle, or `None` for a degenerate ring.
    pub fn extent(&self) -> Option<Extent> {
        if self.is_degenerate() {
            return None;
        }
        let mut min = Vertex::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vertex::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }
        Some(Extent { min, max })
    }

    /// Returns the same ring with x and y exchanged.
    ///
    /// Survey coordinates put the northing first. Swapping gives the (easting, northing) order
    /// point clouds use.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::polygon::{Polygon, Vertex};
    /// let polygon = Polygon::new([(1., 2.), (3., 4.), (5., 6.)]).swap_axes();
    /// assert_eq!(Vertex::new(2., 1.), polygon.vertices()[0]);
    /// ```
    pub fn swap_axes(&self) -> Polygon {
        Polygon {
            vertices: self
                .vertices
                .iter()
                .map(|v| Vertex::new(v.y, v.x))
                .collect(),
        }
    }

    /// Returns the average of the vertices, or the origin for an empty ring.
    pub fn centroid(&self) -> Vertex {
        if self.vertices.is_empty() {
            return Vertex::default();
        }
        let n = self.vertices.len() as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0., 0.), |(sx, sy), v| (sx + v.x, sy + v.y));
        Vertex::new(sx / n, sy / n)
    }

    /// Returns the signed area: positive for counterclockwise rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.;
        }
        let twice = (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>();
        twice / 2.
    }
}
