use std::fmt;

/// Where a point falls relative to a band around a polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Inside the inner ring.
    Inside,
    /// Between the inner and outer rings.
    Band,
    /// Outside the outer ring.
    Outside,
}

impl Classification {
    /// Returns the classification code written to the point record.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::point::Classification;
    /// assert_eq!(1, Classification::Inside.code());
    /// assert_eq!(2, Classification::Band.code());
    /// assert_eq!(3, Classification::Outside.code());
    /// ```
    pub fn code(self) -> u8 {
        match self {
            Classification::Inside => 1,
            Classification::Band => 2,
            Classification::Outside => 3,
        }
    }

    /// Reads a classification back from its code.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::point::Classification;
    /// assert_eq!(Some(Classification::Band), Classification::from_code(2));
    /// assert_eq!(None, Classification::from_code(0));
    /// ```
    pub fn from_code(code: u8) -> Option<Classification> {
        match code {
            1 => Some(Classification::Inside),
            2 => Some(Classification::Band),
            3 => Some(Classification::Outside),
            _ => None,
        }
    }
}

impl From<Classification> for u8 {
    fn from(classification: Classification) -> u8 {
        classification.code()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Inside => write!(f, "inside"),
            Classification::Band => write!(f, "band"),
            Classification::Outside => write!(f, "outside"),
        }
    }
}
