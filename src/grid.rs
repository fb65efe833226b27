use crate::types::{AdjacencyMode, GridSpec};

const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// In-bounds neighbors of every seat, keyed by row-major seat index.
#[derive(Debug, Clone)]
pub struct NeighborGraph {
    neighbors: Vec<Vec<usize>>,
}

impl NeighborGraph {
    pub fn new(grid: GridSpec, mode: AdjacencyMode) -> Self {
        let offsets: Vec<(isize, isize)> = match mode {
            AdjacencyMode::Four => ORTHOGONAL.to_vec(),
            AdjacencyMode::Eight => ORTHOGONAL.iter().chain(&DIAGONAL).copied().collect(),
        };

        let mut neighbors = Vec::with_capacity(grid.capacity());
        for row in 0..grid.rows {
            for column in 0..grid.columns {
                let seat_neighbors = offsets
                    .iter()
                    .filter_map(|&(dr, dc)| {
                        let r = row.checked_add_signed(dr)?;
                        let c = column.checked_add_signed(dc)?;
                        (r < grid.rows && c < grid.columns).then(|| grid.index(r, c))
                    })
                    .collect();
                neighbors.push(seat_neighbors);
            }
        }

        Self { neighbors }
    }

    pub fn neighbors(&self, seat: usize) -> &[usize] {
        &self.neighbors[seat]
    }

    pub fn seat_count(&self) -> usize {
        self.neighbors.len()
    }

    /// True if any neighbor of `seat` already holds `value`.
    pub fn touches<T: PartialEq>(&self, seat: usize, value: &T, cells: &[Option<T>]) -> bool {
        self.neighbors[seat]
            .iter()
            .any(|&n| cells[n].as_ref() == Some(value))
    }

    /// Number of unordered neighboring pairs that hold the same value.
    pub fn conflicts<T: PartialEq>(&self, cells: &[Option<T>]) -> usize {
        let mut count = 0;
        for (seat, value) in cells.iter().enumerate() {
            let Some(value) = value else { continue };
            count += self.neighbors[seat]
                .iter()
                .filter(|&&n| n > seat && cells[n].as_ref() == Some(value))
                .count();
        }
        count
    }
}

/// Visitation order shared by both solvers: every (row + column)-even seat in
/// row-major order, then every odd seat in row-major order.
pub fn seat_order(grid: GridSpec) -> Vec<usize> {
    let mut order = Vec::with_capacity(grid.capacity());
    for parity in [0, 1] {
        for row in 0..grid.rows {
            for column in 0..grid.columns {
                if (row + column) % 2 == parity {
                    order.push(grid.index(row, column));
                }
            }
        }
    }
    order
}
