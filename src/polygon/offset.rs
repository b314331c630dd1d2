use super::{Polygon, Vertex};

/// Cross products smaller than this, relative to the edge lengths, mean two edges are parallel.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// Crossing parameters this close to zero or one are at a segment's end.
const END_TOLERANCE: f64 = 1e-9;

/// Corners whose miter reaches further than this many offset distances are bevelled.
const MITER_LIMIT: f64 = 2.;

/// Buffers a closed ring by a distance.
pub trait Offset {
    /// Returns the ring offset by `distance`: outward when positive, inward when negative.
    ///
    /// Returns an empty ring when the offset degenerates.
    fn offset(&self, ring: &[Vertex], distance: f64) -> Vec<Vertex>;
}

/// Offsets every edge along its normal and joins neighbouring edges with a mitre.
///
/// Corners sharper than 60 degrees get a bevel instead of a spike. Edges that the offset runs
/// backwards, e.g. a short chamfer on an inward offset, are dropped and their neighbours mitred
/// together. Loops where the offset ring crosses itself are cut off. An inward offset with nothing
/// left, or that grows the ring, has collapsed, and gives an empty ring.
#[derive(Clone, Copy, Debug, Default)]
pub struct MiterOffset;

impl Offset for MiterOffset {
    fn offset(&self, ring: &[Vertex], distance: f64) -> Vec<Vertex> {
        let ring = Polygon {
            vertices: dedup(ring),
        };
        if ring.is_degenerate() || !distance.is_finite() {
            return Vec::new();
        }
        let area = ring.signed_area();
        if area.abs() < PARALLEL_TOLERANCE {
            return Vec::new();
        }
        let mut vertices = ring.vertices;
        if area < 0. {
            vertices.reverse();
        }
        let area = area.abs();
        if distance == 0. {
            return vertices;
        }

        let n = vertices.len();
        let edges: Vec<Edge> = (0..n)
            .map(|i| Edge::offset(vertices[i], vertices[(i + 1) % n], distance))
            .collect();
        let Some(joins) = mitre(&edges, distance) else {
            return Vec::new();
        };
        let mut raw = Vec::with_capacity(joins.len() + 4);
        for join in &joins {
            match *join {
                Join::Point(vertex) => raw.push(vertex),
                Join::Bevel(end, start) => {
                    raw.push(end);
                    raw.push(start);
                }
            }
        }
        let offset = Polygon {
            vertices: trim_loops(&raw),
        };

        let offset_area = offset.signed_area();
        let collapsed = offset.is_degenerate()
            || if distance < 0. {
                offset_area <= 0. || offset_area >= area
            } else {
                offset_area <= area
            };
        if collapsed {
            Vec::new()
        } else {
            offset.vertices
        }
    }
}

struct Edge {
    start: Vertex,
    end: Vertex,
    /// Unit direction.
    dx: f64,
    dy: f64,
}

impl Edge {
    /// Offsets the edge from `a` to `b` to its right, which is outward for a counterclockwise
    /// ring.
    fn offset(a: Vertex, b: Vertex, distance: f64) -> Edge {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let length = dx.hypot(dy);
        let (dx, dy) = (dx / length, dy / length);
        let (nx, ny) = (dy * distance, -dx * distance);
        Edge {
            start: Vertex::new(a.x + nx, a.y + ny),
            end: Vertex::new(b.x + nx, b.y + ny),
            dx,
            dy,
        }
    }

    fn cross(&self, other: &Edge) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }

    fn dot(&self, other: &Edge) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// How far a segment from `from` to `to` runs along this edge. Negative when it runs backwards.
    fn advance(&self, from: Vertex, to: Vertex) -> f64 {
        (to.x - from.x) * self.dx + (to.y - from.y) * self.dy
    }

    /// Intersects the infinite lines through two edges.
    fn intersect(&self, other: &Edge) -> Option<Vertex> {
        let cross = self.cross(other);
        if cross.abs() <= PARALLEL_TOLERANCE {
            return None;
        }
        let (qx, qy) = (other.start.x - self.start.x, other.start.y - self.start.y);
        let t = (qx * other.dy - qy * other.dx) / cross;
        Some(Vertex::new(self.start.x + t * self.dx, self.start.y + t * self.dy))
    }
}

/// Where two neighbouring offset edges meet.
#[derive(Clone, Copy, Debug)]
enum Join {
    Point(Vertex),
    /// The end of the previous edge, then the start of the next.
    Bevel(Vertex, Vertex),
}

impl Join {
    fn between(previous: &Edge, next: &Edge, distance: f64) -> Join {
        // The offset opens a gap at this corner, so the miter sticks out.
        let opening = previous.cross(next) * distance > 0.;
        if opening && 1. + previous.dot(next) < 2. / (MITER_LIMIT * MITER_LIMIT) {
            return Join::Bevel(previous.end, next.start);
        }
        Join::Point(previous.intersect(next).unwrap_or(next.start))
    }

    /// The vertex that the previous edge ends at.
    fn arriving(&self) -> Vertex {
        match *self {
            Join::Point(vertex) | Join::Bevel(vertex, _) => vertex,
        }
    }

    /// The vertex that the next edge starts from.
    fn leaving(&self) -> Vertex {
        match *self {
            Join::Point(vertex) | Join::Bevel(_, vertex) => vertex,
        }
    }
}

/// Joins the offset edges, dropping the edge that runs furthest backwards until none do.
///
/// Returns `None` when fewer than three edges survive.
fn mitre(edges: &[Edge], distance: f64) -> Option<Vec<Join>> {
    let mut live: Vec<usize> = (0..edges.len()).collect();
    loop {
        let n = live.len();
        if n < 3 {
            return None;
        }
        let joins: Vec<Join> = (0..n)
            .map(|k| Join::between(&edges[live[(k + n - 1) % n]], &edges[live[k]], distance))
            .collect();
        let reversed = (0..n)
            .map(|k| {
                let edge = &edges[live[k]];
                (k, edge.advance(joins[k].leaving(), joins[(k + 1) % n].arriving()))
            })
            .filter(|&(_, advance)| advance <= 0.)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match reversed {
            Some((k, _)) => {
                let _ = live.remove(k);
            }
            None => return Some(joins),
        }
    }
}

fn distance_between(a: Vertex, b: Vertex) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn same(a: Vertex, b: Vertex) -> bool {
    distance_between(a, b) <= PARALLEL_TOLERANCE * (1. + a.x.abs().max(a.y.abs()))
}

/// Drops repeated vertices, the closing repeat included.
fn dedup(vertices: &[Vertex]) -> Vec<Vertex> {
    let mut unique: Vec<Vertex> = Vec::with_capacity(vertices.len());
    for &v in vertices {
        if unique.last() != Some(&v) {
            unique.push(v);
        }
    }
    while unique.len() > 1 && unique.first() == unique.last() {
        let _ = unique.pop();
    }
    unique
}

/// Drops near-repeated vertices and vertices that lie on the line between their neighbours.
fn clean(vertices: &[Vertex]) -> Vec<Vertex> {
    let mut unique: Vec<Vertex> = Vec::with_capacity(vertices.len());
    for &v in vertices {
        if !unique.last().is_some_and(|&last| same(last, v)) {
            unique.push(v);
        }
    }
    while unique.len() > 1 && same(unique[0], unique[unique.len() - 1]) {
        let _ = unique.pop();
    }
    let n = unique.len();
    if n < 3 {
        return unique;
    }
    let cleaned: Vec<Vertex> = (0..n)
        .filter(|&i| {
            let (a, b, c) = (unique[(i + n - 1) % n], unique[i], unique[(i + 1) % n]);
            let (ux, uy) = (b.x - a.x, b.y - a.y);
            let (vx, vy) = (c.x - b.x, c.y - b.y);
            (ux * vy - uy * vx).abs() > PARALLEL_TOLERANCE * ux.hypot(uy) * vx.hypot(vy)
        })
        .map(|i| unique[i])
        .collect();
    if cleaned.len() < 3 { unique } else { cleaned }
}

/// Cuts a ring where it crosses itself, recursively, and keeps the counterclockwise part.
///
/// Each cut leaves two smaller rings. A loop turned inside out by the offset runs clockwise and
/// is thrown away. If both or neither run counterclockwise, the bigger one is kept.
fn trim_loops(vertices: &[Vertex]) -> Vec<Vertex> {
    let vertices = clean(vertices);
    if vertices.len() < 4 {
        return vertices;
    }
    let Some((i, j, at)) = first_crossing(&vertices) else {
        return vertices;
    };
    let (a, b) = split(&vertices, i, j, at);
    let a = Polygon {
        vertices: trim_loops(&a),
    };
    let b = Polygon {
        vertices: trim_loops(&b),
    };
    let (area_a, area_b) = (a.signed_area(), b.signed_area());
    match (area_a > 0., area_b > 0.) {
        (true, false) => a.vertices,
        (false, true) => b.vertices,
        _ if area_a.abs() >= area_b.abs() => a.vertices,
        _ => b.vertices,
    }
}

/// Finds the first pair of non-neighbouring segments that cross, as `(i, j, crossing)` with
/// `i < j`. Segments that only touch end to end don't count.
fn first_crossing(vertices: &[Vertex]) -> Option<(usize, usize, Vertex)> {
    let n = vertices.len();
    let at_end = |t: f64| t < END_TOLERANCE || t > 1. - END_TOLERANCE;
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let crossing = cross_segments(
                vertices[i],
                vertices[(i + 1) % n],
                vertices[j],
                vertices[(j + 1) % n],
            );
            match crossing {
                Some((_, t, u)) if at_end(t) && at_end(u) => continue,
                Some((at, _, _)) => return Some((i, j, at)),
                None => continue,
            }
        }
    }
    None
}

/// Splits a ring at the crossing of segments `i` and `j` into the loop between them and the
/// rest.
fn split(vertices: &[Vertex], i: usize, j: usize, at: Vertex) -> (Vec<Vertex>, Vec<Vertex>) {
    let n = vertices.len();
    let mut inner = Vec::with_capacity(j - i + 1);
    inner.push(at);
    inner.extend_from_slice(&vertices[(i + 1)..=j]);
    let mut outer = Vec::with_capacity(n - (j - i) + 1);
    outer.push(at);
    outer.extend(vertices[(j + 1)..].iter().chain(&vertices[..=i]));
    (inner, outer)
}

/// Intersects the segments `a0`-`a1` and `b0`-`b1`, giving the crossing and its parameter along
/// each.
fn cross_segments(a0: Vertex, a1: Vertex, b0: Vertex, b1: Vertex) -> Option<(Vertex, f64, f64)> {
    let (ax, ay) = (a1.x - a0.x, a1.y - a0.y);
    let (bx, by) = (b1.x - b0.x, b1.y - b0.y);
    let cross = ax * by - ay * bx;
    if cross.abs() <= PARALLEL_TOLERANCE * ax.hypot(ay) * bx.hypot(by) {
        return None;
    }
    let (qx, qy) = (b0.x - a0.x, b0.y - a0.y);
    let t = (qx * by - qy * bx) / cross;
    let u = (qx * ay - qy * ax) / cross;
    let within = |s: f64| (-END_TOLERANCE..=1. + END_TOLERANCE).contains(&s);
    if within(t) && within(u) {
        let t = t.clamp(0., 1.);
        Some((Vertex::new(a0.x + t * ax, a0.y + t * ay), t, u.clamp(0., 1.)))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)])
    }

    fn ell() -> Polygon {
        Polygon::new([(0., 0.), (10., 0.), (10., 4.), (4., 4.), (4., 10.), (0., 10.)])
    }

    fn offset(ring: &Polygon, distance: f64) -> Polygon {
        Polygon::new(MiterOffset.offset(ring.vertices(), distance))
    }

    fn assert_ring(expected: &[(f64, f64)], actual: &Polygon) {
        assert_eq!(expected.len(), actual.len(), "{:?}", actual);
        for (e, a) in expected.iter().zip(actual.vertices()) {
            assert!((e.0 - a.x).abs() < 1e-9 && (e.1 - a.y).abs() < 1e-9, "{:?}", actual);
        }
    }

    #[test]
    fn outward_square() {
        let outer = offset(&square(), 1.);
        assert_ring(&[(-1., -1.), (11., -1.), (11., 11.), (-1., 11.)], &outer);
    }

    #[test]
    fn inward_square() {
        let inner = offset(&square(), -1.);
        assert_ring(&[(1., 1.), (9., 1.), (9., 9.), (1., 9.)], &inner);
    }

    #[test]
    fn clockwise_input_is_normalised() {
        let clockwise = Polygon::new(square().vertices().iter().rev().copied());
        let inner = offset(&clockwise, -1.);
        assert_eq!(4, inner.len());
        assert!(inner.contains(5., 5.));
        assert!(!inner.contains(0.5, 5.));
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let closed = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.), (0., 0.)]);
        assert_eq!(4, offset(&closed, 1.).len());
    }

    #[test]
    fn collapse_is_empty() {
        assert!(offset(&square(), -6.).is_empty());
        assert!(offset(&square(), -5.).is_empty());
    }

    #[test]
    fn degenerate_input_is_empty() {
        assert!(offset(&Polygon::new([(0., 0.), (1., 1.)]), 1.).is_empty());
        let collinear = Polygon::new([(0., 0.), (1., 0.), (2., 0.)]);
        assert!(offset(&collinear, 1.).is_empty());
    }

    #[test]
    fn concave_corner_inward() {
        let inner = offset(&ell(), -1.);
        assert_ring(
            &[(1., 1.), (9., 1.), (9., 3.), (3., 3.), (3., 9.), (1., 9.)],
            &inner,
        );
    }

    #[test]
    fn concave_corner_outward() {
        let outer = offset(&ell(), 1.);
        assert_ring(
            &[(-1., -1.), (11., -1.), (11., 5.), (5., 5.), (5., 11.), (-1., 11.)],
            &outer,
        );
    }

    #[test]
    fn clockwise_concave_ring() {
        let clockwise = Polygon::new(ell().vertices().iter().rev().copied());
        let inner = offset(&clockwise, -1.);
        assert_eq!(6, inner.len());
        assert!(inner.contains(2., 2.));
        assert!(inner.contains(2., 8.));
        assert!(inner.contains(8., 2.));
        assert!(!inner.contains(3.5, 3.5));
        assert!(!inner.contains(5., 5.));
        assert!(!inner.contains(0.5, 5.));
    }

    #[test]
    fn short_edge_is_dropped_inward() {
        let chamfered = Polygon::new([(0., 0.), (10., 0.), (10., 9.998), (9.998, 10.), (0., 10.)]);
        let inner = offset(&chamfered, -0.005);
        assert_ring(
            &[(0.005, 0.005), (9.995, 0.005), (9.995, 9.995), (0.005, 9.995)],
            &inner,
        );
    }

    #[test]
    fn narrow_slot_is_filled_outward() {
        let slotted = Polygon::new([
            (0., 0.),
            (10., 0.),
            (10., 10.),
            (5.001, 10.),
            (5.001, 5.),
            (4.999, 5.),
            (4.999, 10.),
            (0., 10.),
        ]);
        let outer = offset(&slotted, 0.005);
        assert_eq!(4, outer.len(), "{:?}", outer);
        assert!(outer.contains(5., 8.));
        assert!(outer.contains(0., 2.));
        assert!(!outer.contains(-0.01, 2.));

        let inner = offset(&slotted, -0.005);
        assert_eq!(8, inner.len());
        assert!(!inner.contains(5., 8.));
        assert!(inner.contains(2., 2.));
    }

    #[test]
    fn sharp_corner_is_bevelled() {
        let spike = Polygon::new([(0., 0.), (100., 1.), (0., 2.)]);
        let outer = offset(&spike, 0.5);
        assert_eq!(4, outer.len());
        assert!(outer.contains(100.002, 1.));
        assert!(!outer.contains(100.2, 1.));
    }

    #[test]
    fn only_acute_corners_are_bevelled() {
        let outer = offset(&Polygon::new([(0., 0.), (10., 0.), (0., 10.)]), 1.);
        assert_eq!(5, outer.len());
        assert!(outer.contains(-0.99, -0.99));
        assert!(!outer.contains(10.5, -0.5));
    }
}
