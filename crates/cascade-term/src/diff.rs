// SPDX-License-Identifier: MIT
//
// Differential renderer: double-buffered grids and the changed-cell list.
//
// Effects paint into the *back* grid. Once every row has painted for the
// tick, `diff()` compares back against *front* (the last committed frame)
// and returns only the cells that differ. The surface paints those, then
// `commit()` copies back into front so the next tick compares against what
// is actually on screen.
//
// The pipeline per tick:
//
//   1. Rows write into `back_mut()`.
//   2. `diff()` walks rows top to bottom. Unchanged rows are detected with a
//      single slice comparison and skipped without touching their cells.
//   3. The caller paints the returned `Change`s.
//   4. `commit()` synchronizes front with back.
//
// Nothing is allocated in steady state except the change list itself.

use crate::buffer::Grid;
use crate::cell::Cell;

// ─── Change ──────────────────────────────────────────────────────────────────

/// One changed cell: where it is and what it now holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// New cell value.
    pub cell: Cell,
}

// ─── DiffStats ───────────────────────────────────────────────────────────────

/// Statistics from the last diff, for profiling and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    /// Cells that differed and were reported.
    pub cells_changed: usize,
    /// Cells that matched the front grid.
    pub cells_skipped: usize,
}

impl DiffStats {
    /// Total cells examined (changed + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_changed + self.cells_skipped
    }
}

// ─── Diff ────────────────────────────────────────────────────────────────────

/// Every cell of `back` that differs from `front`, in row-major order.
///
/// Returns the changes together with the [`DiffStats`] of the pass.
///
/// # Panics
///
/// Panics if the grids differ in size.
#[must_use]
#[track_caller]
pub fn diff_grids(front: &Grid, back: &Grid) -> (Vec<Change>, DiffStats) {
    assert!(
        front.width() == back.width() && front.height() == back.height(),
        "cannot diff a {}x{} grid against a {}x{} grid",
        front.width(),
        front.height(),
        back.width(),
        back.height(),
    );

    let width = back.width();
    let mut changes = Vec::new();
    let mut stats = DiffStats::default();

    for y in 0..back.height() {
        let (Some(prev_row), Some(next_row)) = (front.row(y), back.row(y)) else {
            continue;
        };

        if prev_row == next_row {
            stats.cells_skipped += usize::from(width);
            continue;
        }

        for ((x, prev), next) in (0..width).zip(prev_row).zip(next_row) {
            if prev == next {
                stats.cells_skipped += 1;
            } else {
                changes.push(Change { x, y, cell: *next });
                stats.cells_changed += 1;
            }
        }
    }

    (changes, stats)
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Owns the back and front grids of a double-buffered frame.
///
/// # Usage
///
/// ```
/// use cascade_term::cell::Cell;
/// use cascade_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new(10, 2);
/// renderer.write(3, 1, Cell::new('X'));
///
/// let changes = renderer.diff();
/// assert_eq!(changes.len(), 1);
/// renderer.commit();
///
/// // Nothing changed since the commit.
/// assert!(renderer.diff().is_empty());
/// ```
pub struct DiffRenderer {
    back: Grid,
    front: Grid,
    stats: DiffStats,
}

impl DiffRenderer {
    /// Create a renderer whose front and back grids are both empty.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            back: Grid::new(width, height),
            front: Grid::new(width, height),
            stats: DiffStats::default(),
        }
    }

    /// Grid width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.back.width()
    }

    /// Grid height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.back.height()
    }

    /// Write a cell into the back grid.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    #[inline]
    #[track_caller]
    pub fn write(&mut self, x: u16, y: u16, cell: Cell) {
        self.back.set(x, y, cell);
    }

    /// The grid this tick is painting into.
    #[inline]
    #[must_use]
    pub const fn back(&self) -> &Grid {
        &self.back
    }

    /// Mutable access to the back grid for effects to paint into.
    #[inline]
    pub const fn back_mut(&mut self) -> &mut Grid {
        &mut self.back
    }

    /// The last committed frame.
    #[inline]
    #[must_use]
    pub const fn front(&self) -> &Grid {
        &self.front
    }

    /// Cells that differ between back and front, row-major.
    ///
    /// Calling this twice without intervening writes or commits returns the
    /// same list; after a commit with no new writes it returns nothing.
    pub fn diff(&mut self) -> Vec<Change> {
        let (changes, stats) = diff_grids(&self.front, &self.back);
        self.stats = stats;
        changes
    }

    /// Copy back into front. Call after the changes have been painted.
    pub fn commit(&mut self) {
        self.front.copy_from(&self.back);
    }

    /// Statistics from the most recent [`diff`](Self::diff).
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> DiffStats {
        self.stats
    }
}

impl std::fmt::Debug for DiffRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffRenderer")
            .field("size", &(self.width(), self.height()))
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
