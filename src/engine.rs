use tracing::debug;

use crate::grid::Grid;

/// Conway's B3/S23 rule for a single cell.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Derives the next generation from `current`.
///
/// Every neighbor count is read from `current` while results go into a new
/// buffer, so no cell ever sees a neighbor that was already updated this step.
/// The input is left untouched and the function cannot fail.
pub fn advance(current: &Grid) -> Grid {
    let (w, h) = current.size().pair();
    let mut n: Vec<Vec<bool>> = Vec::with_capacity(h);

    for (i, r) in current.rows().enumerate() {
        let mut row = Vec::with_capacity(w);
        for (j, &alive) in r.iter().enumerate() {
            row.push(next_state(alive, current.live_around(i, j)));
        }
        n.push(row);
    }

    Grid::with_size(*current.size(), n)
}

/// A running simulation: the current board and how many steps produced it.
///
/// Generation 0 is the initial board.
#[derive(Clone, Debug)]
pub struct Session {
    grid: Grid,
    generation: u64,
}

impl Session {
    pub fn new(grid: Grid) -> Self {
        Session {
            grid,
            generation: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the held board with its successor.
    pub fn step(&mut self) -> &Grid {
        self.grid = advance(&self.grid);
        self.generation += 1;
        debug!(
            generation = self.generation,
            alive = self.grid.live_count(),
            "stepped"
        );
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }
}
