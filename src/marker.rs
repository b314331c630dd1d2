//! Synthetic point clouds that mark reference locations.
//!
//! Markers are small: a sphere is fifty points, and a default checkerboard target is a 41 × 41
//! grid.

use crate::{Bounds, Color, Point, Vector, boundary::BoundaryAxes};
use std::f64::consts::PI;

/// The default sphere marker radius, in meters.
pub const SPHERE_RADIUS: f64 = 0.01;

/// The default number of points on a sphere marker.
pub const SPHERE_POINTS: usize = 50;

/// The spacing between checkerboard target points, in meters.
pub const TARGET_PITCH: f64 = 0.005;

/// The default half side of a checkerboard target, in meters.
pub const DEFAULT_TARGET_HALF_SIZE: f64 = 0.1;

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// The shape used to mark a reference point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MarkerStyle {
    /// A magenta sphere.
    #[default]
    Sphere,
    /// A checkerboard standing upright, facing along the boundary normal.
    Target {
        /// Half the side of the target.
        half_size: f64,
    },
}

impl MarkerStyle {
    /// Generates the marker points around `center`.
    pub fn points(&self, center: Vector<f64>, axes: &BoundaryAxes) -> Vec<Point> {
        match *self {
            MarkerStyle::Sphere => {
                sphere(center, SPHERE_RADIUS, SPHERE_POINTS, Some(Color::MAGENTA))
            }
            MarkerStyle::Target { half_size } => facing_target(center, half_size, axes),
        }
    }
}

/// Places `count` points evenly over a sphere surface using a Fibonacci spiral.
///
/// # Examples
///
/// ```
/// use lasband::{marker, Vector};
/// let points = marker::sphere(Vector::new(1., 2., 3.), 0.5, 50, None);
/// assert_eq!(50, points.len());
/// for point in points {
///     let d = ((point.x - 1.).powi(2) + (point.y - 2.).powi(2) + (point.z - 3.).powi(2)).sqrt();
///     assert!((d - 0.5).abs() < 1e-9);
/// }
/// ```
pub fn sphere(center: Vector<f64>, radius: f64, count: usize, color: Option<Color>) -> Vec<Point> {
    let n = count as f64;
    (0..count)
        .map(|i| {
            let i = i as f64;
            let theta = 2. * PI * i / GOLDEN_RATIO;
            let phi = (1. - 2. * (i + 0.5) / n).max(-1.).acos();
            Point {
                x: center.x + radius * theta.cos() * phi.sin(),
                y: center.y + radius * theta.sin() * phi.sin(),
                z: center.z + radius * phi.cos(),
                color,
                ..Default::default()
            }
        })
        .collect()
}

/// Lays a flat, horizontal, two-by-two checkerboard centered on `center`.
///
/// The upper left and lower right quarters are black, the others white.
pub fn checkerboard(center: Vector<f64>, half_size: f64) -> Vec<Point> {
    grid(half_size)
        .map(|(u, v)| {
            let x = center.x + u;
            let y = center.y + v;
            let black = (x < center.x && y >= center.y) || (x >= center.x && y < center.y);
            target_point(x, y, center.z, black)
        })
        .collect()
}

/// Stands a checkerboard upright in the vertical plane through `center` along the boundary.
///
/// Once transformed into the boundary frame, the target lies flat in the view plane.
pub fn facing_target(center: Vector<f64>, half_size: f64, axes: &BoundaryAxes) -> Vec<Point> {
    grid(half_size)
        .map(|(u, v)| {
            let black = (u < 0. && v >= 0.) || (u >= 0. && v < 0.);
            target_point(
                center.x + u * axes.ux,
                center.y + u * axes.uy,
                center.z + v,
                black,
            )
        })
        .collect()
}

/// Returns the centers of the four corner targets of a bounding box, in the order (min x, min
/// y), (max x, min y), (min x, max y), (max x, max y).
///
/// The targets sit at the lowest elevation, or the highest one with `at_max_z`. `None` when the
/// box is not finite.
///
/// # Examples
///
/// ```
/// use lasband::{marker, Bounds, Vector};
/// let bounds = Bounds { min: Vector::new(0., 0., 1.), max: Vector::new(10., 20., 5.) };
/// let corners = marker::corner_centers(&bounds, false).unwrap();
/// assert_eq!(Vector::new(10., 0., 1.), corners[1]);
/// assert!(marker::corner_centers(&Bounds::default(), false).is_none());
/// ```
pub fn corner_centers(bounds: &Bounds, at_max_z: bool) -> Option<[Vector<f64>; 4]> {
    let (min, max) = (bounds.min, bounds.max);
    let z = if at_max_z { max.z } else { min.z };
    if ![min.x, max.x, min.y, max.y, z].iter().all(|v| v.is_finite()) {
        return None;
    }
    Some([
        Vector::new(min.x, min.y, z),
        Vector::new(max.x, min.y, z),
        Vector::new(min.x, max.y, z),
        Vector::new(max.x, max.y, z),
    ])
}

/// Yields the (u, v) offsets of a square grid at [TARGET_PITCH] spacing.
fn grid(half_size: f64) -> impl Iterator<Item = (f64, f64)> {
    let side = 2. * half_size;
    let n = ((side / TARGET_PITCH).round() as usize + 1).max(2);
    let step = side / (n - 1) as f64;
    (0..n).flat_map(move |i| {
        (0..n).map(move |j| (-half_size + i as f64 * step, -half_size + j as f64 * step))
    })
}

fn target_point(x: f64, y: f64, z: f64, black: bool) -> Point {
    Point {
        x,
        y,
        z,
        color: Some(if black { Color::BLACK } else { Color::WHITE }),
        ..Default::default()
    }
}
