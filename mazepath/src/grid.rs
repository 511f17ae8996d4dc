use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Blocked,
    Free,
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Cell::Blocked => "#",
                Cell::Free => ".",
            }
        )
    }
}

/// A grid coordinate, origin at the top-left corner.
///
/// Points order by row first and column second, which is the order the
/// priority queue falls back to when two entries have the same estimate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan (L1) distance between two points
    pub fn manhattan(&self, other: Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Read-only view of a rectangular occupancy grid, as needed by the searches
pub trait MapTrait {
    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    /// Whether the cell at `node` can be walked on. `node` must be inside the map.
    fn is_free(&self, node: Point) -> bool;

    fn contains(&self, node: Point) -> bool {
        node.row < self.rows() && node.col < self.columns()
    }

    /// Return the free orthogonal neighbors of the provided node, always in the order
    /// up, down, left, right
    fn neighbors_of(&self, node: Point) -> impl Iterator<Item = Point> {
        let mut points = Vec::with_capacity(4);

        if node.row > 0 {
            points.push(Point {
                row: node.row - 1,
                col: node.col,
            });
        }
        points.push(Point {
            row: node.row + 1,
            col: node.col,
        });
        if node.col > 0 {
            points.push(Point {
                row: node.row,
                col: node.col - 1,
            });
        }
        points.push(Point {
            row: node.row,
            col: node.col + 1,
        });

        // filter to only keep valid cells
        points.retain(|p| self.contains(*p) && self.is_free(*p));

        points.into_iter()
    }

    /// Create a storage with one `value` per cell of the map
    fn create_storage<T: Clone>(&self, value: T) -> CellStorage<T> {
        CellStorage::new(self.rows(), self.columns(), value)
    }
}

/// Per-cell values laid out row-major in a single vector.
///
/// Indexing with a point outside the dimensions it was created with panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStorage<T> {
    columns: usize,
    values: Vec<T>,
}

impl<T: Clone> CellStorage<T> {
    pub fn new(rows: usize, columns: usize, value: T) -> Self {
        Self {
            columns,
            values: vec![value; rows * columns],
        }
    }
}

impl<T> CellStorage<T> {
    pub fn get(&self, node: Point) -> T
    where
        T: Copy,
    {
        self.values[node.row * self.columns + node.col]
    }

    pub fn get_mut(&mut self, node: Point) -> &mut T {
        &mut self.values[node.row * self.columns + node.col]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks() rejects a size of zero
        self.values.chunks(self.columns.max(1))
    }
}

impl<T: Display> Display for CellStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// A two-tone occupancy grid, usually the thresholded pixels of a maze image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl GridMap {
    pub fn new(rows: usize, columns: usize, cell: Cell) -> Self {
        Self {
            rows,
            columns,
            cells: vec![cell; rows * columns],
        }
    }

    /// Build a grid from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, Error> {
        let columns = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows.len() * columns);

        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns {
                return Err(Error::RaggedGrid {
                    row,
                    expected: columns,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }

        Ok(Self {
            rows: rows.len(),
            columns,
            cells,
        })
    }

    pub fn get(&self, node: Point) -> Cell {
        self.cells[node.row * self.columns + node.col]
    }

    pub fn set(&mut self, node: Point, cell: Cell) {
        self.cells[node.row * self.columns + node.col] = cell;
    }

    /// All free cells in row-major order
    pub fn free_cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Free)
            .map(|(i, _)| Point {
                row: i / self.columns,
                col: i % self.columns,
            })
    }

    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Free).count()
    }
}

impl MapTrait for GridMap {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn is_free(&self, node: Point) -> bool {
        self.get(node) == Cell::Free
    }
}

impl Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl FromStr for GridMap {
    type Err = Error;

    /// Parse the text form written by `Display`: `#` is blocked, `.` is free.
    /// Surrounding whitespace and blank lines are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, c)| match c {
                        '#' => Ok(Cell::Blocked),
                        '.' => Ok(Cell::Free),
                        found => Err(Error::InvalidCharacter { row, col, found }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        GridMap::from_rows(rows)
    }
}
