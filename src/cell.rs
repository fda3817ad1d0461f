use crate::color::{glyph, Color};

/// What a single grid position shows.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Cell {
    /// One of the two endpoints of `color`.
    Terminus {
        /// Whose endpoint.
        color: Color,
    },
    /// An interior cell of the routed path for `color`. Only appears in rendered output.
    Path {
        /// Whose path.
        color: Color,
    },
    /// Nothing.
    #[default]
    Empty,
}

impl Cell {
    /// The color shown here, if any.
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Terminus { color } | Self::Path { color } => Some(*color),
            Self::Empty => None,
        }
    }

    /// The printed character: `.` when empty, otherwise the color's glyph.
    pub fn glyph(&self) -> char {
        self.color().map_or('.', glyph)
    }
}
