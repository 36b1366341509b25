use crate::SolveError;
use fixedbitset::FixedBitSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => f.write_str("row"),
            Self::Column => f.write_str("column"),
        }
    }
}

/// Square grid of integer costs stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostGrid {
    size: usize,
    cells: Vec<i64>,
}

impl CostGrid {
    pub fn from_fn(size: usize, mut cost: impl FnMut(usize, usize) -> i64) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                cells.push(cost(row, col));
            }
        }
        Self { size, cells }
    }

    pub fn try_from_rows(rows: &[Vec<i64>]) -> Result<Self, SolveError> {
        let size = rows.len();
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != size)
        {
            return Err(SolveError::NotSquare {
                row,
                expected: size,
                found: cells.len(),
            });
        }
        Ok(Self {
            size,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.cells[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[i64] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Sum of the costs picked by `assignment` (row -> column).
    pub fn total(&self, assignment: &[usize]) -> i64 {
        assignment
            .iter()
            .enumerate()
            .map(|(row, &col)| self.get(row, col))
            .sum()
    }
}

/// A set of cells of an `n x n` grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMask {
    size: usize,
    bits: FixedBitSet,
}

impl CellMask {
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            bits: FixedBitSet::with_capacity(size * size),
        }
    }

    pub fn full(size: usize) -> Self {
        let mut mask = Self::empty(size);
        mask.bits.insert_range(..);
        mask
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.bits.contains(row * self.size + col)
    }

    pub fn insert(&mut self, row: usize, col: usize) {
        self.bits.insert(row * self.size + col);
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.bits.ones().map(move |idx| (idx / size, idx % size))
    }

    pub fn contains_assignment(&self, assignment: &[usize]) -> bool {
        assignment
            .iter()
            .enumerate()
            .all(|(row, &col)| self.contains(row, col))
    }
}
