use super::{Extent, Offset, Polygon};
use crate::{Classification, Color, Error, Point, Result};

/// Sorts points into the inside of a polygon, a band along its edges, and the outside.
///
/// The band is the area between the polygon offset inward and outward by half the line width.
#[derive(Clone, Debug)]
pub struct BandClassifier {
    inner: Polygon,
    outer: Polygon,
    extent: Option<Extent>,
    fast_reject: bool,
}

impl BandClassifier {
    /// Builds the inner and outer rings of a polygon.
    ///
    /// Either ring may come out degenerate, e.g. when the line is wider than the polygon. A
    /// degenerate ring contains nothing, so check [BandClassifier::inner] and
    /// [BandClassifier::outer] if that matters.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{polygon::{BandClassifier, MiterOffset, Polygon}, Classification, Point};
    /// let square = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
    /// let classifier = BandClassifier::new(&square, 2., &MiterOffset).unwrap();
    /// let mut point = Point { x: 0., y: 5., ..Default::default() };
    /// assert_eq!(Classification::Band, classifier.classify(&mut point));
    /// ```
    pub fn new(polygon: &Polygon, line_width: f64, offset: &dyn Offset) -> Result<BandClassifier> {
        if polygon.is_degenerate() {
            return Err(Error::DegeneratePolygon(polygon.len()));
        }
        if !(line_width.is_finite() && line_width > 0.) {
            return Err(Error::InvalidWidth {
                name: "line width",
                value: line_width,
            });
        }
        let half = line_width / 2.;
        let inner = Polygon::new(offset.offset(polygon.vertices(), -half));
        let outer = Polygon::new(offset.offset(polygon.vertices(), half));
        let extent = outer.extent();
        Ok(BandClassifier {
            inner,
            outer,
            extent,
            fast_reject: true,
        })
    }

    /// Sets whether points outside the outer ring's extent are rejected before the ring tests.
    ///
    /// On by default. Turning it off gives the same classifications, only slower.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::{polygon::{BandClassifier, MiterOffset, Polygon}, Classification, Point};
    /// let square = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
    /// let classifier = BandClassifier::new(&square, 2., &MiterOffset)
    ///     .unwrap()
    ///     .with_fast_reject(false);
    /// let mut point = Point { x: 20., y: 5., ..Default::default() };
    /// assert_eq!(Classification::Outside, classifier.classify(&mut point));
    /// ```
    pub fn with_fast_reject(mut self, fast_reject: bool) -> BandClassifier {
        self.fast_reject = fast_reject;
        self
    }

    /// Returns the inward ring.
    pub fn inner(&self) -> &Polygon {
        &self.inner
    }

    /// Returns the outward ring.
    pub fn outer(&self) -> &Polygon {
        &self.outer
    }

    /// Classifies a point and records the result on it.
    ///
    /// Band points are painted magenta. Every point leaves with a color, black if it had none.
    pub fn classify(&self, point: &mut Point) -> Classification {
        let color = point.color.get_or_insert(Color::BLACK);
        let classification = if self.fast_reject
            && !self
                .extent
                .is_some_and(|extent| extent.contains(point.x, point.y))
        {
            Classification::Outside
        } else if self.inner.contains(point.x, point.y) {
            Classification::Inside
        } else if self.outer.contains(point.x, point.y) {
            *color = Color::MAGENTA;
            Classification::Band
        } else {
            Classification::Outside
        };
        point.classification = classification.code();
        classification
    }
}

/// Tallies of classified points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BandCounts {
    /// Points inside the inner ring.
    pub inside: u64,
    /// Points between the rings.
    pub band: u64,
    /// Everything else.
    pub outside: u64,
}

impl BandCounts {
    /// Counts one classified point.
    pub fn add(&mut self, classification: Classification) {
        match classification {
            Classification::Inside => self.inside += 1,
            Classification::Band => self.band += 1,
            Classification::Outside => self.outside += 1,
        }
    }

    /// Returns the number of points counted.
    pub fn total(&self) -> u64 {
        self.inside + self.band + self.outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::MiterOffset;

    fn classifier() -> BandClassifier {
        let square = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
        BandClassifier::new(&square, 2., &MiterOffset).unwrap()
    }

    fn classify(x: f64, y: f64) -> (Classification, Point) {
        let mut point = Point {
            x,
            y,
            ..Default::default()
        };
        let classification = classifier().classify(&mut point);
        (classification, point)
    }

    #[test]
    fn three_regions() {
        let (inside, point) = classify(5., 5.);
        assert_eq!(Classification::Inside, inside);
        assert_eq!(1, point.classification);
        assert_eq!(Some(Color::BLACK), point.color);

        let (band, point) = classify(0., 5.);
        assert_eq!(Classification::Band, band);
        assert_eq!(2, point.classification);
        assert_eq!(Some(Color::MAGENTA), point.color);

        let (outside, point) = classify(-5., 5.);
        assert_eq!(Classification::Outside, outside);
        assert_eq!(3, point.classification);
        assert_eq!(Some(Color::BLACK), point.color);
    }

    #[test]
    fn colors_survive_outside_the_band() {
        let mut point = Point {
            x: 5.,
            y: 5.,
            color: Some(Color::WHITE),
            ..Default::default()
        };
        let _ = classifier().classify(&mut point);
        assert_eq!(Some(Color::WHITE), point.color);
    }

    #[test]
    fn validation() {
        let square = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
        assert!(matches!(
            BandClassifier::new(&Polygon::new([(0., 0.), (1., 1.)]), 1., &MiterOffset),
            Err(Error::DegeneratePolygon(2))
        ));
        assert!(matches!(
            BandClassifier::new(&square, 0., &MiterOffset),
            Err(Error::InvalidWidth { .. })
        ));
        assert!(matches!(
            BandClassifier::new(&square, f64::NAN, &MiterOffset),
            Err(Error::InvalidWidth { .. })
        ));
    }

    #[test]
    fn wide_line_has_no_inside() {
        let square = Polygon::new([(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
        let classifier = BandClassifier::new(&square, 30., &MiterOffset).unwrap();
        assert!(classifier.inner().is_degenerate());
        let mut point = Point {
            x: 5.,
            y: 5.,
            ..Default::default()
        };
        assert_eq!(Classification::Band, classifier.classify(&mut point));
    }

    #[test]
    fn fast_reject_does_not_change_classifications() {
        let fast = classifier();
        let slow = classifier().with_fast_reject(false);
        for i in -15..=25 {
            for j in -15..=25 {
                let (x, y) = (f64::from(i) * 0.5, f64::from(j) * 0.5);
                let mut a = Point {
                    x,
                    y,
                    ..Default::default()
                };
                let mut b = a;
                assert_eq!(fast.classify(&mut a), slow.classify(&mut b), "({x}, {y})");
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn chamfered_corner_keeps_its_inside() {
        let chamfered = Polygon::new([(0., 0.), (10., 0.), (10., 9.998), (9.998, 10.), (0., 10.)]);
        let classifier = BandClassifier::new(&chamfered, 0.01, &MiterOffset).unwrap();
        let mut point = Point {
            x: 5.,
            y: 5.,
            ..Default::default()
        };
        assert_eq!(Classification::Inside, classifier.classify(&mut point));
        assert_eq!(Some(Color::BLACK), point.color);
        let mut point = Point {
            x: 10.,
            y: 5.,
            ..Default::default()
        };
        assert_eq!(Classification::Band, classifier.classify(&mut point));
    }

    #[test]
    fn narrow_slot_keeps_its_band() {
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
        let classifier = BandClassifier::new(&slotted, 0.01, &MiterOffset).unwrap();
        for (x, y, expected) in [
            (0., 2., Classification::Band),
            (5., 8., Classification::Band),
            (2., 2., Classification::Inside),
            (-1., 2., Classification::Outside),
        ] {
            let mut point = Point {
                x,
                y,
                ..Default::default()
            };
            assert_eq!(expected, classifier.classify(&mut point), "({x}, {y})");
        }
    }

    #[test]
    fn counts() {
        let mut counts = BandCounts::default();
        counts.add(Classification::Inside);
        counts.add(Classification::Band);
        counts.add(Classification::Band);
        assert_eq!(
            BandCounts {
                inside: 1,
                band: 2,
                outside: 0
            },
            counts
        );
        assert_eq!(3, counts.total());
    }
}
