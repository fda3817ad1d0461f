//! Pair colors and their printed glyphs.

use std::num::NonZero;

/// Identifies one pair of endpoints. Color 0 is reserved for "nothing here" and never names a pair.
pub type Color = NonZero<usize>;

/// The single character used for `color` when printing a board.
///
/// `1`-`9`, then `A`-`Z`; anything past that prints as `#`.
pub fn glyph(color: Color) -> char {
    match color.get() {
        n @ 1..=9 => char::from(b'0' + n as u8),
        n @ 10..=35 => char::from(b'A' + (n - 10) as u8),
        _ => '#',
    }
}
