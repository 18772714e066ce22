// SPDX-License-Identifier: MIT
//
// Grid: the fixed-size 2D cell array every effect paints to.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing. A row's cells are contiguous,
//     so the diff renderer can compare whole rows as slices and skip them.
//
//   - Character-indexed: one `char` is one column. There is no wide-char or
//     grapheme handling at this layer; effects only paint ASCII and a few
//     single-width symbols.
//
//   - Out-of-bounds writes are programming errors (a pipeline's geometry
//     doesn't match the grid). `set` panics with the offending coordinates
//     instead of clipping, so mismatches show up in tests. Callers that want
//     a recoverable check use `try_set`.
//
// The grid never resizes. The animation runs at the size it was built with.

use crate::cell::{Attr, Cell};
use crate::color::CellColor;

// ─── OutOfBounds ────────────────────────────────────────────────────────────────

/// A write targeted a coordinate outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
pub struct OutOfBounds {
    /// Column of the rejected write.
    pub x: u16,
    /// Row of the rejected write.
    pub y: u16,
    /// Grid width at the time of the write.
    pub width: u16,
    /// Grid height at the time of the write.
    pub height: u16,
}

// ─── Grid ───────────────────────────────────────────────────────────────────────

/// A 2D grid of cells, origin top-left, 0-indexed.
///
/// # Examples
///
/// ```
/// use cascade_term::buffer::Grid;
/// use cascade_term::cell::Cell;
///
/// let mut grid = Grid::new(80, 24);
/// grid.set(5, 3, Cell::new('X'));
/// assert_eq!(grid.get(5, 3).map(|c| c.ch), Some('X'));
/// assert!(grid.get(80, 0).is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a grid filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        let mut cells = Vec::with_capacity(size);
        cells.resize(size, Cell::EMPTY);
        Self {
            width,
            height,
            cells,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Grid width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of cells (`width × height`).
    #[inline]
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Whether `(x, y)` is within the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell reference, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw cell slice, row-major.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// Iterate cells with their `(x, y)` coordinates in row-major order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> {
        let w = usize::from(self.width).max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            // x < width and y < height, both u16.
            ((i % w) as u16, (i / w) as u16, cell)
        })
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Write a cell, or report the coordinate as [`OutOfBounds`].
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if `(x, y)` is outside the grid. The grid is
    /// left untouched.
    #[inline]
    pub fn try_set(&mut self, x: u16, y: u16, cell: Cell) -> Result<(), OutOfBounds> {
        if !self.in_bounds(x, y) {
            return Err(OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        Ok(())
    }

    /// Write a cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid. Geometry is validated when
    /// the animation is built, so reaching this is a bug.
    #[inline]
    #[track_caller]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Err(e) = self.try_set(x, y, cell) {
            panic!("{e}");
        }
    }

    /// Write consecutive cells left to right starting at `(x, y)`.
    ///
    /// Returns the number of columns written.
    ///
    /// # Panics
    ///
    /// Panics if any cell lands outside the grid.
    #[track_caller]
    pub fn put_cells(&mut self, x: u16, y: u16, cells: impl IntoIterator<Item = Cell>) -> u16 {
        let mut col = x;
        for cell in cells {
            self.set(col, y, cell);
            col += 1;
        }
        col - x
    }

    /// Write a string left to right starting at `(x, y)`, one column per
    /// `char`.
    ///
    /// Returns the number of columns written.
    ///
    /// # Panics
    ///
    /// Panics if the text runs past the right edge or `y` is out of bounds.
    #[track_caller]
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, fg: CellColor, attrs: Attr) -> u16 {
        self.put_cells(
            x,
            y,
            text.chars().map(|ch| Cell::colored(ch, fg).with_attrs(attrs)),
        )
    }

    /// Fill `len` cells starting at `(x, y)` with copies of `cell`.
    ///
    /// # Panics
    ///
    /// Panics if the span runs past the right edge or `y` is out of bounds.
    #[track_caller]
    pub fn fill_span(&mut self, x: u16, y: u16, len: u16, cell: Cell) {
        self.put_cells(x, y, std::iter::repeat_n(cell, usize::from(len)));
    }

    // ─── Bulk ────────────────────────────────────────────────────────────

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Copy all cells from another grid of the same size.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[track_caller]
    pub fn copy_from(&mut self, other: &Self) {
        assert!(
            self.width == other.width && self.height == other.height,
            "grid size mismatch: {}x{} vs {}x{}",
            self.width,
            self.height,
            other.width,
            other.height,
        );
        self.cells.copy_from_slice(&other.cells);
    }

    // ─── Text Dump ───────────────────────────────────────────────────────

    /// The characters of row `y` as a string (colors dropped), or `None`
    /// if out of bounds.
    #[must_use]
    pub fn row_text(&self, y: u16) -> Option<String> {
        self.row(y).map(|row| row.iter().map(|c| c.ch).collect())
    }

    /// Every row as text with trailing spaces trimmed. Handy for asserting
    /// on what a frame looks like.
    #[must_use]
    pub fn text_lines(&self) -> Vec<String> {
        (0..self.height)
            .filter_map(|y| self.row_text(y))
            .map(|line| line.trim_end().to_owned())
            .collect()
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid({}x{})", self.width, self.height)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────────
