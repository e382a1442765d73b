//! Panel geometry from screen size and fractional layout options.

use crate::config::Dimensions;

/// Absolute panel geometry in character cells.
///
/// Fields are signed: fractions outside (0, 1] can produce negative or
/// off-screen values and are passed through unclamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    /// Width in columns.
    pub width: i32,
    /// Height in lines.
    pub height: i32,
    /// Left edge column.
    pub col: i32,
    /// Top edge row.
    pub row: i32,
}

/// Compute the panel geometry for a screen of `cols` x `lines`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compute(cols: u16, lines: u16, opts: &Dimensions) -> Dimension {
    let cols = f64::from(cols);
    let lines = f64::from(lines);

    let width = (cols * opts.width).ceil();
    let height = (lines * opts.height - 4.0).ceil();
    let col = ((cols - width) * opts.x).ceil();
    let row = ((lines - height) * opts.y - 1.0).ceil();

    Dimension {
        width: width as i32,
        height: height as i32,
        col: col as i32,
        row: row as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_known_layout() {
        let opts = Dimensions {
            height: 0.4,
            width: 0.8,
            x: 0.5,
            y: 0.9,
        };
        let dim = compute(80, 24, &opts);
        assert_eq!(
            dim,
            Dimension {
                width: 64,
                height: 6,
                col: 8,
                row: 16,
            }
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let opts = Dimensions::default();
        let first = compute(120, 40, &opts);
        for _ in 0..10 {
            assert_eq!(compute(120, 40, &opts), first);
        }
    }

    #[test]
    fn test_compute_does_not_clamp() {
        let opts = Dimensions {
            height: 0.1,
            width: 1.0,
            x: 0.0,
            y: 0.0,
        };
        let dim = compute(80, 24, &opts);
        // 24 * 0.1 - 4 is negative
        assert_eq!(dim.height, -1);
        assert_eq!(dim.row, -1);
        assert_eq!(dim.col, 0);
    }
}
