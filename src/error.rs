use thiserror::Error;

/// Errors that stop a single grid from being arranged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeatingError {
    /// More people were handed to the grid than it has seats.
    #[error("more people than seats: {people} people for {capacity} seats")]
    Infeasible { people: usize, capacity: usize },

    /// The grid has a zero dimension.
    #[error("invalid grid {rows}x{columns}: dimensions must be non-zero")]
    InvalidGrid { rows: usize, columns: usize },

    /// The grid has more seats than a single search is allowed to cover.
    #[error("grid {rows}x{columns} is too large: at most {max} seats")]
    TooLarge {
        rows: usize,
        columns: usize,
        max: usize,
    },
}
