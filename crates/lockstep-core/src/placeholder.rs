//! Striped filler rows that pad a pane so both sides stay row-aligned

use crate::color::Rgba;

/// Visual height of a placeholder, in rows
pub const PLACEHOLDER_ROWS: u16 = 1;

/// Width of one stripe band, in cells
pub const STRIPE_WIDTH: usize = 4;

/// Glyph drawn in every placeholder cell; its foreground acts as the bottom border
pub const PLACEHOLDER_GLYPH: char = '▁';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderPalette {
    pub stripe1: Rgba,
    pub stripe2: Rgba,
    pub border: Rgba,
}

/// A non-editable block row. Two widgets are equal iff their colors match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderWidget {
    palette: PlaceholderPalette,
}

/// One rendered cell of a placeholder row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripeCell {
    pub symbol: char,
    pub fg: Rgba,
    pub bg: Rgba,
}

impl PlaceholderWidget {
    pub fn new(palette: PlaceholderPalette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &PlaceholderPalette {
        &self.palette
    }

    pub fn height(&self) -> u16 {
        PLACEHOLDER_ROWS
    }

    /// Stripe color at a cell. `row` is the visual row index, so stacked
    /// placeholders continue the diagonal.
    pub fn stripe_at(&self, column: usize, row: usize) -> Rgba {
        if ((column + row) / STRIPE_WIDTH) % 2 == 0 {
            self.palette.stripe1
        } else {
            self.palette.stripe2
        }
    }

    pub fn render(&self, width: usize, row: usize) -> Vec<StripeCell> {
        (0..width)
            .map(|column| StripeCell {
                symbol: PLACEHOLDER_GLYPH,
                fg: self.palette.border,
                bg: self.stripe_at(column, row),
            })
            .collect()
    }
}

/// Memoizes rendered placeholder rows.
///
/// Rows are only re-rendered when the widget colors or the width change;
/// the stripe pattern repeats every `2 * STRIPE_WIDTH` rows.
#[derive(Debug, Default)]
pub struct StripeCache {
    key: Option<(PlaceholderWidget, usize)>,
    rows: Vec<Option<Vec<StripeCell>>>,
    renders: usize,
}

impl StripeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&mut self, widget: &PlaceholderWidget, width: usize, row: usize) -> &[StripeCell] {
        let key = (*widget, width);
        if self.key.as_ref() != Some(&key) {
            self.key = Some(key);
            self.rows = vec![None; 2 * STRIPE_WIDTH];
        }
        let phase = row % (2 * STRIPE_WIDTH);
        if self.rows[phase].is_none() {
            self.renders += 1;
            self.rows[phase] = Some(widget.render(width, phase));
        }
        self.rows[phase].as_deref().unwrap_or_default()
    }

    /// Number of rows actually rendered so far
    pub fn renders(&self) -> usize {
        self.renders
    }
}
