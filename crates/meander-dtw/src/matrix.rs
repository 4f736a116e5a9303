//! Reusable dense cost matrix owned by an alignment engine.

use std::ops::{Index, IndexMut};

/// Row-major accumulated-cost buffer with a fixed capacity.
///
/// The buffer is allocated once for the largest pair an engine will see.
/// Each alignment call resets only its active `rows x cols` region to `+inf`;
/// cells outside that region hold stale values and are never read.
#[derive(Debug, Clone)]
pub(crate) struct CostMatrix {
    max_rows: usize,
    max_cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Allocate a buffer for pairs up to `max_rows x max_cols`.
    pub(crate) fn with_capacity(max_rows: usize, max_cols: usize) -> Self {
        Self {
            max_rows,
            max_cols,
            data: vec![f64::INFINITY; max_rows * max_cols],
        }
    }

    /// Return the maximum number of rows.
    pub(crate) fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Return the maximum number of columns.
    pub(crate) fn max_cols(&self) -> usize {
        self.max_cols
    }

    /// Fill the active `rows x cols` region with `+inf`.
    pub(crate) fn reset(&mut self, rows: usize, cols: usize) {
        debug_assert!(rows <= self.max_rows && cols <= self.max_cols);
        for row in self.data.chunks_mut(self.max_cols).take(rows) {
            row[..cols].fill(f64::INFINITY);
        }
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i * self.max_cols + j]
    }
}

impl IndexMut<(usize, usize)> for CostMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[i * self.max_cols + j]
    }
}
