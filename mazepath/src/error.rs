use std::fmt::Display;

use crate::{endpoints::EndpointRole, grid::Point};

/// Errors produced while building grids or preparing a search.
///
/// An unreachable goal is not an error, see [`crate::SearchOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The grid has no free cell to serve as the requested endpoint
    NoFreeCell { role: EndpointRole },
    /// A start or goal coordinate lies outside the grid
    OutOfBounds {
        point: Point,
        rows: usize,
        columns: usize,
    },
    /// The search was asked to start from a blocked cell
    BlockedStart(Point),
    /// A row of the input has a different length than the first one
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A character in a text grid is neither `#` nor `.`
    InvalidCharacter { row: usize, col: usize, found: char },
    /// Downsampling needs blocks of at least one cell
    InvalidCellSize,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NoFreeCell { role } => write!(f, "no free cell available for the {role}"),
            Error::OutOfBounds {
                point,
                rows,
                columns,
            } => write!(f, "{point} is outside of the {rows}x{columns} grid"),
            Error::BlockedStart(point) => write!(f, "start {point} is not a free cell"),
            Error::RaggedGrid {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} columns, expected {expected} like the first row"
            ),
            Error::InvalidCharacter { row, col, found } => {
                write!(f, "invalid character {found:?} at ({row}, {col})")
            }
            Error::InvalidCellSize => write!(f, "cell size must be at least 1"),
        }
    }
}

impl std::error::Error for Error {}
