/// A RGB color value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub red: u16,

    /// Green channel.
    pub green: u16,

    /// Blue channel.
    pub blue: u16,
}

impl Color {
    /// Full-intensity magenta, used for band points and sphere markers.
    ///
    /// Viewers that only look at the high byte of each channel still see it.
    pub const MAGENTA: Color = Color::new(u16::MAX, 0, u16::MAX);

    /// Checkerboard white.
    pub const WHITE: Color = Color::new(u16::MAX, u16::MAX, u16::MAX);

    /// Checkerboard black.
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// Creates a new color.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasband::Color;
    /// let color = Color::new(1, 2, 3);
    /// assert_eq!(1, color.red);
    /// assert_eq!(2, color.green);
    /// assert_eq!(3, color.blue);
    /// ```
    pub const fn new(red: u16, green: u16, blue: u16) -> Color {
        Color { red, green, blue }
    }
}
