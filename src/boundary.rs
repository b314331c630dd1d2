//! A rigid change of basis into a frame that runs along a boundary line.
//!
//! Two reference points, A and B, define the boundary. In the boundary frame the along-boundary
//! distance from A becomes x, the elevation becomes y, and the signed perpendicular distance from
//! the line becomes z. Looking at the xy plane of the output is looking at an elevation view of
//! the boundary.
//!
//! ```
//! use lasband::{boundary::{BoundaryAxes, Orientation}, Vector};
//! let a = Vector::new(10., 10., 0.);
//! let b = Vector::new(20., 10., 0.);
//! let axes = BoundaryAxes::new(a, b, Orientation::AToB).unwrap();
//! let (along, z, perpendicular) = axes.to_boundary_frame(&Vector::new(15., 12., 3.), &a);
//! assert_eq!((5., 3., 2.), (along, z, perpendicular));
//! ```

use crate::{
    Bounds, Point, Vector,
    polygon::{Polygon, Vertex},
};

/// Two reference points closer than this don't define a direction.
pub const MIN_BOUNDARY_LENGTH: f64 = 1e-10;

/// How far a clip polygon reaches past the boundary's ends and below it.
pub const CLIP_MARGIN: f64 = 1.;

/// How far a clip polygon reaches in the viewing direction.
pub const CLIP_MARGIN_UP: f64 = 100.;

/// Reference points further than this from the header box draw a warning.
pub const RANGE_WARNING_DISTANCE: f64 = 50.;

/// Which way the along-boundary axis points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// A is on the left, B on the right.
    #[default]
    AToB,
    /// B is on the left, A on the right.
    BToA,
}

/// Unit vectors along and across a boundary, in plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryAxes {
    /// Along the boundary, x component.
    pub ux: f64,
    /// Along the boundary, y component.
    pub uy: f64,
    /// Across the boundary (u turned a quarter anticlockwise), x component.
    pub vx: f64,
    /// Across the boundary, y component.
    pub vy: f64,
}

impl BoundaryAxes {
    /// Computes the axes of the boundary from A to B.
    ///
    /// Returns `None` when A and B coincide in plan.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{boundary::{BoundaryAxes, Orientation}, Vector};
    /// let a = Vector::new(0., 0., 0.);
    /// let axes = BoundaryAxes::new(a, Vector::new(0., 2., 0.), Orientation::BToA).unwrap();
    /// assert_eq!((0., -1.), (axes.ux, axes.uy));
    /// assert_eq!((1., 0.), (axes.vx, axes.vy));
    /// assert!(BoundaryAxes::new(a, a, Orientation::AToB).is_none());
    /// ```
    pub fn new(a: Vector<f64>, b: Vector<f64>, orientation: Orientation) -> Option<BoundaryAxes> {
        let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
        if orientation == Orientation::BToA {
            dx = -dx;
            dy = -dy;
        }
        let length = dx.hypot(dy);
        if length.is_nan() || length < MIN_BOUNDARY_LENGTH {
            return None;
        }
        let (ux, uy) = (dx / length, dy / length);
        Some(BoundaryAxes {
            ux,
            uy,
            vx: -uy,
            vy: ux,
        })
    }

    /// Returns the signed distance of a position from the infinite line through `origin`.
    ///
    /// Positive on the side `v` points to.
    pub fn signed_distance(&self, x: f64, y: f64, origin: &Vector<f64>) -> f64 {
        (x - origin.x) * self.vx + (y - origin.y) * self.vy
    }

    /// Moves a position into the boundary frame anchored at `origin`.
    ///
    /// Returns (along, elevation, perpendicular).
    pub fn to_boundary_frame(&self, position: &Vector<f64>, origin: &Vector<f64>) -> (f64, f64, f64) {
        let rx = position.x - origin.x;
        let ry = position.y - origin.y;
        (
            rx * self.ux + ry * self.uy,
            position.z,
            rx * self.vx + ry * self.vy,
        )
    }

    /// Like [BoundaryAxes::to_boundary_frame], but only for positions within `half_width` of
    /// the line.
    ///
    /// The width test is done in world coordinates, so it doesn't care about any scaling applied
    /// to the result.
    pub fn clip_to_profile(
        &self,
        position: &Vector<f64>,
        origin: &Vector<f64>,
        half_width: f64,
    ) -> Option<(f64, f64, f64)> {
        let perpendicular = self.signed_distance(position.x, position.y, origin);
        if perpendicular.abs() > half_width {
            None
        } else {
            Some(self.to_boundary_frame(position, origin))
        }
    }

    /// Moves a point into the boundary frame, in place.
    pub fn transform_point(&self, point: &mut Point, origin: &Vector<f64>) {
        let (x, y, z) = self.to_boundary_frame(&point.position(), origin);
        point.x = x;
        point.y = y;
        point.z = z;
    }

    /// Moves a point into the boundary frame, in place, if it is within `half_width` of the line.
    ///
    /// Returns false, leaving the point untouched, when it isn't.
    pub fn clip_point(&self, point: &mut Point, origin: &Vector<f64>, half_width: f64) -> bool {
        match self.clip_to_profile(&point.position(), origin, half_width) {
            Some((x, y, z)) => {
                point.x = x;
                point.y = y;
                point.z = z;
                true
            }
            None => false,
        }
    }

    /// Returns a four-corner range-crop rectangle around the segment from `a` to `b`.
    ///
    /// The rectangle reaches `margin` past both ends and behind the line, and `margin_up` in the
    /// direction of `v`. Corners come in the order: behind A, behind B, ahead of B, ahead of A.
    pub fn clip_polygon(
        &self,
        a: &Vector<f64>,
        b: &Vector<f64>,
        margin: f64,
        margin_up: f64,
    ) -> [(f64, f64); 4] {
        let (ux, uy, vx, vy) = (self.ux, self.uy, self.vx, self.vy);
        [
            (a.x - margin * ux - margin * vx, a.y - margin * uy - margin * vy),
            (b.x + margin * ux - margin * vx, b.y + margin * uy - margin * vy),
            (b.x + margin * ux + margin_up * vx, b.y + margin * uy + margin_up * vy),
            (a.x - margin * ux + margin_up * vx, a.y - margin * uy + margin_up * vy),
        ]
    }
}

/// A range-crop rectangle for one edge of a polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeClip {
    /// The index of the edge, which runs from vertex `edge` to the next one.
    pub edge: usize,
    /// The edge's first vertex.
    pub a: Vertex,
    /// The edge's second vertex.
    pub b: Vertex,
    /// The rectangle's corners.
    pub polygon: [(f64, f64); 4],
}

impl EdgeClip {
    /// Returns the label of this edge: A to Z, then E1, E2, and so on.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{boundary::EdgeClip, polygon::Vertex};
    /// let (a, b) = (Vertex::new(0., 0.), Vertex::new(1., 0.));
    /// let clip = EdgeClip { edge: 27, a, b, polygon: [(0., 0.); 4] };
    /// assert_eq!("E2", clip.label());
    /// ```
    pub fn label(&self) -> String {
        match u8::try_from(self.edge) {
            Ok(n) if n < 26 => char::from(b'A' + n).to_string(),
            _ => format!("E{}", self.edge - 25),
        }
    }
}

/// Builds one range-crop rectangle per polygon edge, each reaching away from the polygon.
///
/// Edges that collapse to a point are skipped.
pub fn edge_clip_polygons(polygon: &Polygon, margin: f64, margin_up: f64) -> Vec<EdgeClip> {
    let vertices = polygon.vertices();
    let n = vertices.len();
    let centroid = polygon.centroid();
    let mut clips = Vec::with_capacity(n);
    for edge in 0..n {
        let a = vertices[edge];
        let b = vertices[(edge + 1) % n];
        let mut start = Vector::new(a.x, a.y, 0.);
        let mut end = Vector::new(b.x, b.y, 0.);
        let Some(mut axes) = BoundaryAxes::new(start, end, Orientation::AToB) else {
            continue;
        };
        let mid = ((a.x + b.x) / 2., (a.y + b.y) / 2.);
        if (centroid.x - mid.0) * axes.vx + (centroid.y - mid.1) * axes.vy > 0. {
            std::mem::swap(&mut start, &mut end);
            let Some(flipped) = BoundaryAxes::new(start, end, Orientation::AToB) else {
                continue;
            };
            axes = flipped;
        }
        clips.push(EdgeClip {
            edge,
            a,
            b,
            polygon: axes.clip_polygon(&start, &end, margin, margin_up),
        });
    }
    clips
}

/// Returns the plan distance from a reference point to the header's bounding box.
///
/// Zero inside the box, and `None` when the box isn't finite.
pub fn distance_to_extent(point: &Vector<f64>, bounds: &Bounds) -> Option<f64> {
    if bounds.is_valid() {
        Some(bounds.planar_distance(point.x, point.y))
    } else {
        None
    }
}
