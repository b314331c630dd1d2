//! Proximity filtering around a set of centers.
//!
//! A point matches a center when it lies inside the sphere of the given radius around it, or
//! inside the vertical cylinder of that radius through it, depending on which tests are enabled.
//! A point matches the filter when it matches any center.
//!
//! ```
//! use lasband::{filter::FilterConfig, Vector};
//! let config = FilterConfig::new(vec![Vector::new(0., 0., 0.)], 1., false, true).unwrap();
//! assert!(config.matches(0., 0., 1.5));
//! assert!(!config.matches(2., 0., 0.));
//! ```

use crate::{Error, Point, Result, Vector};

/// How many matched points are used to estimate a center's elevation.
pub const NEAREST_COUNT: usize = 3;

/// An immutable filter, set up once before a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterConfig {
    centers: Vec<Vector<f64>>,
    radius: f64,
    radius2: f64,
    use_sphere: bool,
    use_cylinder: bool,
}

impl FilterConfig {
    /// Creates a filter.
    ///
    /// At least one of the sphere and cylinder tests must be enabled, the radius must be positive
    /// and finite, and there must be at least one center.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{filter::FilterConfig, Vector};
    /// assert!(FilterConfig::new(vec![Vector::default()], 1., false, false).is_err());
    /// assert!(FilterConfig::new(vec![Vector::default()], -1., true, false).is_err());
    /// assert!(FilterConfig::new(Vec::new(), 1., true, false).is_err());
    /// ```
    pub fn new(
        centers: Vec<Vector<f64>>,
        radius: f64,
        use_sphere: bool,
        use_cylinder: bool,
    ) -> Result<FilterConfig> {
        if !use_sphere && !use_cylinder {
            return Err(Error::NoFilterMode);
        }
        if !(radius.is_finite() && radius > 0.) {
            return Err(Error::InvalidRadius(radius));
        }
        if centers.is_empty() {
            return Err(Error::NoCenters);
        }
        Ok(FilterConfig {
            centers,
            radius,
            radius2: radius * radius,
            use_sphere,
            use_cylinder,
        })
    }

    /// Returns the index of the first center this position matches.
    pub fn matching_center(&self, x: f64, y: f64, z: f64) -> Option<usize> {
        self.centers.iter().position(|center| {
            let dx = x - center.x;
            let dy = y - center.y;
            let dz = z - center.z;
            let dxy2 = dx * dx + dy * dy;
            (self.use_sphere && dxy2 + dz * dz <= self.radius2)
                || (self.use_cylinder && dxy2 <= self.radius2)
        })
    }

    /// Does this position match any center?
    pub fn matches(&self, x: f64, y: f64, z: f64) -> bool {
        self.matching_center(x, y, z).is_some()
    }

    /// Returns the centers.
    pub fn centers(&self) -> &[Vector<f64>] {
        &self.centers
    }

    /// Returns the radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the squared radius.
    pub fn radius2(&self) -> f64 {
        self.radius2
    }

    /// Is the sphere test enabled?
    pub fn use_sphere(&self) -> bool {
        self.use_sphere
    }

    /// Is the cylinder test enabled?
    pub fn use_cylinder(&self) -> bool {
        self.use_cylinder
    }
}

/// Tracks, for every center, the three matched points closest to it in plan.
///
/// Feed it matched points as they stream by. Only points within the radius of a center, measured
/// in plan, are candidates for that center. Equally distant points keep their stream order.
#[derive(Clone, Debug)]
pub struct NearestElevations {
    centers: Vec<Vector<f64>>,
    radius2: f64,
    nearest: Vec<Vec<(f64, f64)>>,
}

impl NearestElevations {
    /// Starts tracking the centers of a filter.
    pub fn new(config: &FilterConfig) -> NearestElevations {
        NearestElevations {
            centers: config.centers.clone(),
            radius2: config.radius2,
            nearest: vec![Vec::with_capacity(NEAREST_COUNT + 1); config.centers.len()],
        }
    }

    /// Considers one matched point.
    pub fn observe(&mut self, point: &Point) {
        for (center, nearest) in self.centers.iter().zip(&mut self.nearest) {
            let dx = point.x - center.x;
            let dy = point.y - center.y;
            let d2 = dx * dx + dy * dy;
            if d2 > self.radius2 {
                continue;
            }
            let at = nearest.partition_point(|&(other, _)| other <= d2);
            if at < NEAREST_COUNT {
                nearest.insert(at, (d2, point.z));
                nearest.truncate(NEAREST_COUNT);
            }
        }
    }

    /// Returns, per center, the lowest elevation among its nearest points.
    ///
    /// `None` for centers that no matched point came close enough to.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{filter::{FilterConfig, NearestElevations}, Point, Vector};
    /// let config = FilterConfig::new(vec![Vector::default()], 1., false, true).unwrap();
    /// let mut nearest = NearestElevations::new(&config);
    /// nearest.observe(&Point { x: 0.1, z: 5., ..Default::default() });
    /// nearest.observe(&Point { x: 0.2, z: 4., ..Default::default() });
    /// assert_eq!(vec![Some(4.)], nearest.elevations());
    /// ```
    pub fn elevations(&self) -> Vec<Option<f64>> {
        self.nearest
            .iter()
            .map(|nearest| nearest.iter().map(|&(_, z)| z).reduce(f64::min))
            .collect()
    }
}
