//! Built-in 5x7 bitmap font for canvas text.
//!
//! Covers uppercase ASCII letters (lowercase and accented Latin fold onto
//! them), digits, common punctuation, and a handful of symbols used by the
//! overlays (music notes, glyph-like alien runes). Characters outside the
//! table keep their advance but draw nothing.

use kurbo::{BezPath, Rect, Shape};

const GLYPH_COLUMNS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Glyph cell pitch, in columns, including one column of spacing.
const ADVANCE_COLUMNS: f64 = 6.0;
/// Font size to cell size ratio: a 16px font has 2px cells.
const CELLS_PER_EM: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

type Glyph = [u8; GLYPH_ROWS];

fn glyph(ch: char) -> Option<Glyph> {
    let g: Glyph = match fold(ch) {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '/' => [0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '°' => [0b01100, 0b10010, 0b10010, 0b01100, 0b00000, 0b00000, 0b00000],
        '▲' => [0b00000, 0b00100, 0b01110, 0b01110, 0b11111, 0b11111, 0b00000],
        '◆' => [0b00100, 0b01110, 0b11111, 0b11111, 0b11111, 0b01110, 0b00100],
        '●' => [0b00000, 0b01110, 0b11111, 0b11111, 0b11111, 0b01110, 0b00000],
        '◄' => [0b00001, 0b00011, 0b00111, 0b01111, 0b00111, 0b00011, 0b00001],
        '☰' => [0b11111, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '☱' => [0b11011, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '☲' => [0b11111, 0b00000, 0b11011, 0b00000, 0b11111, 0b00000, 0b00000],
        '☳' => [0b11011, 0b00000, 0b11011, 0b00000, 0b11111, 0b00000, 0b00000],
        '⟐' => [0b00100, 0b01010, 0b10001, 0b10101, 0b10001, 0b01010, 0b00100],
        '⟑' => [0b10001, 0b10001, 0b01010, 0b01010, 0b00100, 0b00100, 0b00000],
        '⟒' => [0b00100, 0b00100, 0b01010, 0b01010, 0b10001, 0b10001, 0b00000],
        '⟓' => [0b10000, 0b11000, 0b10100, 0b10010, 0b10100, 0b11000, 0b10000],
        '♪' => [0b00100, 0b00110, 0b00101, 0b00100, 0b01100, 0b11100, 0b01100],
        '♫' => [0b01111, 0b01001, 0b01001, 0b01001, 0b11011, 0b11011, 0b00000],
        '♬' => [0b11111, 0b10001, 0b11111, 0b10001, 0b10011, 0b00011, 0b00000],
        '★' => [0b00100, 0b00100, 0b11111, 0b01110, 0b01010, 0b10001, 0b00000],
        _ => return None,
    };
    Some(g)
}

fn fold(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ä' | 'À' | 'Á' | 'Â' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'ç' | 'Ç' => 'C',
        _ => ch.to_ascii_uppercase(),
    }
}

fn cell_size(size: f64) -> f64 {
    size / CELLS_PER_EM
}

/// Width of `text` when set at `size` pixels.
pub fn measure(text: &str, size: f64) -> f64 {
    let count = text.chars().count();
    if count == 0 {
        return 0.0;
    }
    let cell = cell_size(size);
    (count as f64 * ADVANCE_COLUMNS - 1.0) * cell
}

/// Outline of `text` in user space, baseline at `y`.
pub(crate) fn text_path(text: &str, x: f64, y: f64, size: f64, align: TextAlign) -> BezPath {
    let mut path = BezPath::new();
    if !(size > 0.0) {
        return path;
    }
    let cell = cell_size(size);
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - measure(text, size) / 2.0,
    };
    let top = y - GLYPH_ROWS as f64 * cell;

    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let origin_x = left + i as f64 * ADVANCE_COLUMNS * cell;
        for (row, bits) in rows.iter().enumerate() {
            // Merge horizontal runs so adjacent cells do not leave seams.
            let mut col = 0;
            while col < GLYPH_COLUMNS {
                if bits & (1 << (GLYPH_COLUMNS - 1 - col)) == 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < GLYPH_COLUMNS && bits & (1 << (GLYPH_COLUMNS - 1 - col)) != 0 {
                    col += 1;
                }
                let run = Rect::new(
                    origin_x + start as f64 * cell,
                    top + row as f64 * cell,
                    origin_x + col as f64 * cell,
                    top + (row + 1) as f64 * cell,
                );
                path.extend(run.path_elements(0.1));
            }
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_lowercase_and_accents() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('É'), glyph('E'));
        assert!(glyph('🐰').is_none());
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure("", 16.0), 0.0);
        // One glyph is five 2px cells wide at 16px.
        assert_eq!(measure("A", 16.0), 10.0);
        assert_eq!(measure("AB", 16.0), 22.0);
    }

    #[test]
    fn test_center_alignment_straddles_anchor() {
        let path = text_path("HH", 100.0, 50.0, 16.0, TextAlign::Center);
        let bounds = path.bounding_box();
        assert!((bounds.x0 - 89.0).abs() < 1e-9);
        assert!((bounds.x1 - 111.0).abs() < 1e-9);
        assert!((bounds.y1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_glyphs_keep_advance() {
        let path = text_path("?X", 0.0, 10.0, 8.0, TextAlign::Left);
        let skipped = text_path("🐰X", 0.0, 10.0, 8.0, TextAlign::Left);
        assert!(skipped.bounding_box().x0 >= 6.0);
        assert!(path.bounding_box().x0 < 1.0);
    }

    #[test]
    fn test_zero_size_is_empty() {
        assert!(text_path("ROCK!", 0.0, 0.0, 0.0, TextAlign::Left).elements().is_empty());
    }
}
