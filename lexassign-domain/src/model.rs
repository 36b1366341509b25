use std::{fmt, ops::Index};

use lexassign_solver::CostGrid;

pub use lexassign_solver::{Axis, PriorityMode};

/// Largest accepted cell value; keeps every cost sum inside `i64`.
pub const MAX_CELL_VALUE: u64 = 1 << 40;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("Matrix has no cells")]
    Empty,
    #[error("Row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Cell ({row}, {col}) holds {value}, above the supported maximum {max}")]
    ValueTooLarge {
        row: usize,
        col: usize,
        value: u64,
        max: u64,
    },
}

/// Dense row-major rectangular grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T = u64> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Matrix<T> {
    pub fn try_from_rows(rows: Vec<Vec<T>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || cols == 0 {
            return Err(MatrixError::Empty);
        }
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MatrixError::Ragged {
                row,
                expected: cols,
                found: cells.len(),
            });
        }
        let row_count = rows.len();
        Ok(Self {
            rows: row_count,
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn from_fn(rows: usize, cols: usize, mut cell: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(cell(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(&mut f).collect(),
        }
    }
}

impl<T: Clone> Matrix<T> {
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.cells.chunks(self.cols.max(1)).map(<[T]>::to_vec).collect()
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.cells[row * self.cols + col]
    }
}

impl Matrix<u64> {
    /// Builds a value matrix, rejecting ragged, empty, or oversized input.
    pub fn from_values(rows: Vec<Vec<u64>>) -> Result<Self, MatrixError> {
        for (row, cells) in rows.iter().enumerate() {
            if let Some((col, &value)) = cells
                .iter()
                .enumerate()
                .find(|&(_, &value)| value > MAX_CELL_VALUE)
            {
                return Err(MatrixError::ValueTooLarge {
                    row,
                    col,
                    value,
                    max: MAX_CELL_VALUE,
                });
            }
        }
        Self::try_from_rows(rows)
    }

    pub fn max_value(&self) -> u64 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn row_sums(&self) -> Vec<u64> {
        (0..self.rows).map(|row| self.row(row).iter().sum()).collect()
    }

    pub fn col_sums(&self) -> Vec<u64> {
        (0..self.cols)
            .map(|col| (0..self.rows).map(|row| self[(row, col)]).sum())
            .collect()
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for (col, value) in self.row(row).iter().enumerate() {
                if col > 0 {
                    f.write_str("\t")?;
                }
                write!(f, "{value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Whether the matrix holds costs to minimize or profits to maximize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatrixKind {
    #[default]
    Cost,
    Profit,
}

impl MatrixKind {
    /// `0` is cost semantics, `1` profit semantics.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Cost),
            1 => Some(Self::Profit),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Cost => 0,
            Self::Profit => 1,
        }
    }

    /// Cost grid whose minimum matchings are this matrix's optimal ones.
    /// Profits become `max - value`.
    pub fn cost_grid(self, matrix: &Matrix<u64>) -> CostGrid {
        debug_assert!(matrix.is_square());
        let ceiling = matrix.max_value();
        CostGrid::from_fn(matrix.row_count(), |row, col| {
            let value = matrix[(row, col)];
            match self {
                Self::Cost => value as i64,
                Self::Profit => (ceiling - value) as i64,
            }
        })
    }
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cost => f.write_str("cost"),
            Self::Profit => f.write_str("profit"),
        }
    }
}

/// One expanded row or column: replica `replica` of original index `original`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpandedIndex {
    pub original: usize,
    pub replica: usize,
}

/// Matched cell in the expanded square index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Assignment {
    pub row: usize,
    pub col: usize,
}

impl Assignment {
    pub fn from_row_map(assignment: &[usize]) -> Vec<Self> {
        assignment
            .iter()
            .enumerate()
            .map(|(row, &col)| Self { row, col })
            .collect()
    }
}

/// An expanded assignment attributed to its original row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldedAssignment {
    pub row: ExpandedIndex,
    pub col: ExpandedIndex,
    pub value: u64,
}
