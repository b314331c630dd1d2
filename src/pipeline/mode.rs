use crate::{
    Vector,
    boundary::Orientation,
    filter::FilterConfig,
    marker::MarkerStyle,
    polygon::Polygon,
};

/// The default section half width, in meters.
pub const DEFAULT_CLIP_HALF_WIDTH: f64 = 0.01;

/// The default band line width, in meters.
pub const DEFAULT_LINE_WIDTH: f64 = 0.01;

/// What a pipeline pass does with each point.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    /// Keeps only points near one of a set of centers.
    Filter {
        /// The filter.
        filter: FilterConfig,
        /// Estimate each center's elevation from the matched points nearest to it.
        backfill: bool,
    },

    /// Moves every point into the boundary frame, and marks A and B.
    Elevation(Boundary),

    /// Keeps the points in a narrow band along the boundary, in the boundary frame.
    Section {
        /// The boundary.
        boundary: Boundary,
        /// How far from the boundary line a point may lie, in plan.
        half_width: f64,
    },

    /// Classifies every point against a band along a polygon's edges.
    PolygonBand {
        /// The polygon, in point cloud axes.
        polygon: Polygon,
        /// The width of the band.
        line_width: f64,
    },

    /// Keeps every point and adds a checkerboard target at each corner of the header extent.
    Corners {
        /// Half the side of each target.
        half_size: f64,
        /// Put the targets at the top of the extent instead of the bottom.
        at_max_z: bool,
    },
}

impl Mode {
    /// Returns a short name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Filter { .. } => "filter",
            Mode::Elevation(_) => "elevation",
            Mode::Section { .. } => "section",
            Mode::PolygonBand { .. } => "polygon band",
            Mode::Corners { .. } => "corners",
        }
    }
}

/// A boundary line between two reference points, and how to draw it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    /// The first reference point, which becomes the origin of the boundary frame.
    pub a: Vector<f64>,
    /// The second reference point.
    pub b: Vector<f64>,
    /// Which way the along-boundary axis runs.
    pub orientation: Orientation,
    /// How A and B are marked.
    pub marker: MarkerStyle,
    /// Multiplies the output elevation.
    pub vertical_scale: f64,
}

impl Boundary {
    /// Creates a boundary from A to B with sphere markers and no exaggeration.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{pipeline::Boundary, Vector};
    /// let boundary = Boundary::new(Vector::new(0., 0., 0.), Vector::new(1., 0., 0.));
    /// assert_eq!(1., boundary.vertical_scale);
    /// ```
    pub fn new(a: Vector<f64>, b: Vector<f64>) -> Boundary {
        Boundary {
            a,
            b,
            orientation: Orientation::default(),
            marker: MarkerStyle::default(),
            vertical_scale: 1.,
        }
    }

    /// Sets the orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Boundary {
        self.orientation = orientation;
        self
    }

    /// Marks A and B with upright checkerboards instead of spheres.
    pub fn with_targets(mut self, half_size: f64) -> Boundary {
        self.marker = MarkerStyle::Target { half_size };
        self
    }

    /// Sets the vertical exaggeration.
    pub fn with_vertical_scale(mut self, vertical_scale: f64) -> Boundary {
        self.vertical_scale = vertical_scale;
        self
    }
}
