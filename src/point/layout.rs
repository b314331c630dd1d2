use crate::{Error, Result};

/// The byte layout of one point record, resolved once from the header's layout id.
///
/// Every record starts with three i32 coordinates and a u16 intensity. What comes after depends
/// on the layout: the classification byte moves when the extended (6 to 10) layouts widen the
/// flags, and GPS time or waveform packets push the color channels forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// The layout id, 0 to 10.
    pub id: u8,

    /// The smallest record width, in bytes, that can hold this layout.
    pub min_width: u16,

    /// Does this layout carry a GPS time?
    pub has_gps_time: bool,

    /// Byte offset of the red channel, when the layout carries color.
    pub color_offset: Option<u16>,

    /// Byte offset of the classification byte.
    pub classification_offset: u16,
}

const fn layout(
    id: u8,
    min_width: u16,
    has_gps_time: bool,
    color_offset: Option<u16>,
    classification_offset: u16,
) -> Layout {
    Layout {
        id,
        min_width,
        has_gps_time,
        color_offset,
        classification_offset,
    }
}

static LAYOUTS: [Layout; 11] = [
    layout(0, 20, false, None, 15),
    layout(1, 28, true, None, 15),
    layout(2, 26, false, Some(20), 15),
    layout(3, 34, true, Some(28), 15),
    layout(4, 57, true, None, 15),
    layout(5, 63, true, Some(28), 15),
    layout(6, 30, true, None, 16),
    layout(7, 36, true, Some(30), 16),
    layout(8, 38, true, Some(30), 16),
    layout(9, 59, true, None, 16),
    layout(10, 67, true, Some(30), 16),
];

const LEGACY_CLASSIFICATION_MASK: u8 = 0b0001_1111;

impl Layout {
    /// The layout written for outputs without color.
    pub const PLAIN: Layout = layout(0, 20, false, None, 15);

    /// The layout written for outputs with color.
    pub const COLORED: Layout = layout(2, 26, false, Some(20), 15);

    /// Looks up a layout by id.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::point::Layout;
    /// let layout = Layout::new(3).unwrap();
    /// assert_eq!(34, layout.min_width);
    /// assert_eq!(Some(28), layout.color_offset);
    /// assert!(Layout::new(11).is_err());
    /// ```
    pub fn new(id: u8) -> Result<Layout> {
        LAYOUTS
            .get(usize::from(id))
            .copied()
            .ok_or(Error::UnsupportedLayout(id))
    }

    /// Returns the output layout for points with or without color.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::point::Layout;
    /// assert_eq!(2, Layout::output(true).id);
    /// assert_eq!(0, Layout::output(false).id);
    /// ```
    pub fn output(has_color: bool) -> Layout {
        if has_color {
            Layout::COLORED
        } else {
            Layout::PLAIN
        }
    }

    /// Does this layout carry color?
    pub fn has_color(&self) -> bool {
        self.color_offset.is_some()
    }

    /// Is this one of the extended layouts, with a full classification byte?
    pub fn is_extended(&self) -> bool {
        self.id >= 6
    }

    /// Checks that a record width can hold this layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::point::Layout;
    /// let layout = Layout::new(2).unwrap();
    /// assert!(layout.check_width(26).is_ok());
    /// assert!(layout.check_width(30).is_ok());
    /// assert!(layout.check_width(20).is_err());
    /// ```
    pub fn check_width(&self, width: u16) -> Result<()> {
        if width < self.min_width {
            Err(Error::InvalidRecordWidth {
                layout: self.id,
                minimum: self.min_width,
                width,
            })
        } else {
            Ok(())
        }
    }

    /// Pulls the classification out of its raw byte.
    ///
    /// Legacy layouts share the byte with the synthetic, key-point and withheld flags.
    pub fn classification_from_byte(&self, byte: u8) -> u8 {
        if self.is_extended() {
            byte
        } else {
            byte & LEGACY_CLASSIFICATION_MASK
        }
    }

    /// Converts a classification into the raw byte this layout stores.
    pub fn classification_to_byte(&self, classification: u8) -> u8 {
        self.classification_from_byte(classification)
    }
}
