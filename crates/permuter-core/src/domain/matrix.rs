//! The rectangular response returned by a `Permute` call.

use crate::domain::solver::Composition;
use crate::protocol::messages::PermuteResponseMessage;
use tracing::warn;

/// Component names of every composition found, one row per composition.
///
/// Invariants, upheld by [`ResponseMatrix::from_solutions`]:
/// - every row has exactly `part_count` entries;
/// - there are at most `order_count` rows when `order_count` is positive;
/// - rows and names keep the order the solver emitted them in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseMatrix {
    rows: Vec<Vec<String>>,
}

impl ResponseMatrix {
    /// Reshapes a solver's solution collection into a response matrix.
    ///
    /// An absent collection is treated exactly like an empty one.  Each
    /// composition is reduced to its component names; compositions whose
    /// length is not `part_count` are dropped, since they cannot form a row
    /// of the promised width.  A non-positive `part_count` yields zero rows.
    /// A non-positive `order_count` places no cap on the row count.
    pub fn from_solutions(
        solutions: Option<Vec<Composition>>,
        part_count: i32,
        order_count: i32,
    ) -> Self {
        let solutions = solutions.unwrap_or_default();
        let Ok(width) = usize::try_from(part_count) else {
            return Self::default();
        };
        if width == 0 {
            return Self::default();
        }
        let limit = usize::try_from(order_count)
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(usize::MAX);

        let mut rows = Vec::with_capacity(solutions.len().min(limit));
        for (index, composition) in solutions.into_iter().enumerate() {
            if rows.len() == limit {
                break;
            }
            if composition.len() != width {
                warn!(
                    index,
                    len = composition.len(),
                    part_count,
                    "dropping composition of unexpected length"
                );
                continue;
            }
            rows.push(composition.into_iter().map(|c| c.name).collect());
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows (compositions).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width shared by every row, or `None` for a zero-row matrix.
    pub fn width(&self) -> Option<usize> {
        self.rows.first().map(Vec::len)
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

impl From<ResponseMatrix> for PermuteResponseMessage {
    fn from(matrix: ResponseMatrix) -> Self {
        PermuteResponseMessage { rows: matrix.rows }
    }
}
