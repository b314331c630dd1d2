use std::fmt;

/// LAS version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// The major version.
    ///
    /// For now, always 1.
    pub major: u8,
    /// The minor version.
    pub minor: u8,
}

impl Version {
    /// Creates a new version.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasband::Version;
    /// let version = Version::new(1, 2);
    /// ```
    pub const fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Does this version carry a 64-bit point count?
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasband::Version;
    /// assert!(!Version::new(1, 3).supports_large_files());
    /// assert!(Version::new(1, 4).supports_large_files());
    /// ```
    pub fn supports_large_files(&self) -> bool {
        *self >= Version::new(1, 4)
    }
}

impl Default for Version {
    fn default() -> Version {
        Version::new(1, 2)
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
