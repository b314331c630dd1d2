//! Reads lot polygons from SIMA survey text.
//!
//! SIMA files are comma separated. `A01` rows define coordinate points by id, and `B01` rows list
//! the ids that make up a lot boundary, in order:
//!
//! ```text
//! A01,1,P1,100.0,200.0
//! A01,2,P2,100.0,210.0
//! B01,1,P1
//! B01,2,P2
//! ```
//!
//! Coordinates are in survey axes, northing first. Use [Polygon::swap_axes] to get the
//! (easting, northing) order of a point cloud.

use super::{Polygon, Vertex};
use crate::{Error, Result};
use log::warn;
use std::collections::HashMap;

const POINT_RECORD: &str = "A01";
const BOUNDARY_RECORD: &str = "B01";

/// Parses the boundary of a SIMA file, in survey axes.
///
/// Boundary ids without a matching point row are dropped, as are point rows whose coordinates do
/// not parse. Fewer than three resolved vertices is an error.
///
/// # Examples
///
/// ```
/// use lasband::polygon::sima;
/// let text = "A01,1,a,0,0\nA01,2,b,0,10\nA01,3,c,10,10\nB01,1,a\nB01,2,b\nB01,3,c\n";
/// let polygon = sima::parse(text).unwrap();
/// assert_eq!(3, polygon.len());
/// assert!(sima::parse("A01,1,a,0,0\nB01,1,a\n").is_err());
/// ```
pub fn parse(text: &str) -> Result<Polygon> {
    let mut points = HashMap::new();
    let mut order = Vec::new();
    for line in text.lines() {
        let columns: Vec<&str> = line.split(',').map(str::trim).collect();
        match columns.as_slice() {
            [POINT_RECORD, _, id, x, y, ..] => match (x.parse::<f64>(), y.parse::<f64>()) {
                (Ok(x), Ok(y)) => {
                    let _ = points.insert(*id, Vertex::new(x, y));
                }
                _ => warn!("skipping SIMA point {} with unreadable coordinates", id),
            },
            [BOUNDARY_RECORD, _, id, ..] => order.push(*id),
            _ => {}
        }
    }
    let vertices: Vec<Vertex> = order
        .iter()
        .filter_map(|id| points.get(id).copied())
        .collect();
    if vertices.len() < 3 {
        return Err(Error::DegeneratePolygon(vertices.len()));
    }
    Ok(Polygon::new(vertices))
}
