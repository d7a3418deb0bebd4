use std::fmt;

use rand::Rng;

use crate::error::GridError;

/// Glyph printed for a live cell.
pub const ALIVE: char = '@';
/// Glyph printed for a dead cell.
pub const DEAD: char = '.';

/// Row and column offsets of the eight cells around a cell.
const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),

    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
];

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Rect {
    w: usize, // j
    h: usize, // i
}

impl Rect {
    #[inline]
    pub fn new(width: usize, height: usize) -> Self {
        Rect { w: width, h: height }
    }

    #[inline]
    pub fn w(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn h(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn pair(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    /// Whether a `self`-sized area fits inside `outer` on both axes.
    #[inline]
    pub fn fits_in(&self, outer: &Rect) -> bool {
        self.w <= outer.w && self.h <= outer.h
    }
}

/// One generation of the board.
///
/// A `Grid` is rectangular and fully populated: every `(row, col)` with
/// `row < height` and `col < width` holds exactly one cell, `true` for alive.
/// Nothing in this crate mutates a grid after construction; the next
/// generation is always a fresh value (see [`crate::engine::advance`]).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    size: Rect,
    data: Vec<Vec<bool>>,
}

impl Grid {
    /// Builds a grid from rows of cells, rejecting empty or ragged input.
    pub fn new(data: Vec<Vec<bool>>) -> Result<Self, GridError> {
        let width = match data.first() {
            None => return Err(GridError::malformed("pattern has no rows")),
            Some(r) if r.is_empty() => return Err(GridError::malformed("pattern rows are empty")),
            Some(r) => r.len(),
        };

        if let Some((i, r)) = data.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(GridError::malformed(format!(
                "row {i} has {} cells, expected {width}",
                r.len()
            )));
        }

        Ok(Grid {
            size: Rect::new(width, data.len()),
            data,
        })
    }

    /// Builds a grid from a numeric 0/1 matrix. Any nonzero value is alive.
    pub fn from_rows<T: AsRef<[u8]>>(rows: &[T]) -> Result<Self, GridError> {
        Self::new(
            rows.iter()
                .map(|r| r.as_ref().iter().map(|&v| v != 0).collect())
                .collect(),
        )
    }

    /// An all-dead grid. Dimensions are normalized like [`Grid::random`].
    pub fn dead(height: isize, width: isize) -> Self {
        let (h, w) = (normalize(height), normalize(width));
        Grid {
            size: Rect::new(w, h),
            data: vec![vec![false; w]; h],
        }
    }

    /// Fills every cell independently with a fair coin flip from `rng`.
    ///
    /// Negative dimensions are taken by absolute value and zero becomes one,
    /// so this never fails.
    pub fn random<R: Rng + ?Sized>(height: isize, width: isize, rng: &mut R) -> Self {
        let (h, w) = (normalize(height), normalize(width));
        let data = (0..h)
            .map(|_| (0..w).map(|_| rng.gen_bool(0.5)).collect())
            .collect();

        Grid {
            size: Rect::new(w, h),
            data,
        }
    }

    /// Wraps rows already known to match `size`.
    #[inline]
    pub(crate) fn with_size(size: Rect, data: Vec<Vec<bool>>) -> Self {
        debug_assert!(data.len() == size.h() && data.iter().all(|r| r.len() == size.w()));
        Grid { size, data }
    }

    #[inline]
    pub fn size(&self) -> &Rect {
        &self.size
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.size.h()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.size.w()
    }

    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.data.iter().map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, GridError> {
        self.cell(row, col).ok_or(GridError::OutOfBounds {
            row,
            col,
            height: self.height(),
            width: self.width(),
        })
    }

    pub fn live_count(&self) -> usize {
        self.data.iter().flatten().filter(|&&c| c).count()
    }

    /// Number of live cells among the up to eight cells around `(row, col)`.
    ///
    /// Positions past an edge count as dead; there is no wraparound, so a
    /// corner has three neighbors and a non-corner edge cell has five.
    /// Fails with [`GridError::OutOfBounds`] if `(row, col)` itself is outside
    /// the grid.
    pub fn count_live_neighbors(&self, row: usize, col: usize) -> Result<u8, GridError> {
        self.get(row, col)?;
        Ok(self.live_around(row, col))
    }

    /// [`Grid::count_live_neighbors`] for a coordinate already known to be in range.
    pub(crate) fn live_around(&self, row: usize, col: usize) -> u8 {
        debug_assert!(row < self.height() && col < self.width());
        NEIGHBORS
            .iter()
            .filter_map(|&(di, dj)| {
                Some((row.checked_add_signed(di)?, col.checked_add_signed(dj)?))
            })
            .filter(|&(i, j)| self.cell(i, j) == Some(true))
            .count() as u8
    }

    #[inline]
    fn cell(&self, i: usize, j: usize) -> Option<bool> {
        self.data.get(i)?.get(j).copied()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in self.rows() {
            for &c in r {
                write!(f, "{}", if c { ALIVE } else { DEAD })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[inline]
fn normalize(n: isize) -> usize {
    n.unsigned_abs().max(1)
}
