//! Abstraction over the external combinatorial-design solver.
//!
//! The bridge never searches for part orders itself.  It hands the rules to a
//! [`Solver`], then reads back whatever compositions the solver reached.  The
//! two steps are separate because a solver that fails half-way through may
//! still hold partial results, and the endpoint returns those instead of
//! nothing.
//!
//! Each call gets its own instance from a [`SolverFactory`], so concurrent
//! calls never share search state.

use thiserror::Error;

/// One named part in a composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Display name; the only attribute that crosses the wire.
    pub name: String,
    /// Part type reported by the solver (e.g. `promoter`), if any.
    pub kind: Option<String>,
}

impl Component {
    /// Creates a component with a name and no type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
        }
    }
}

/// One candidate ordering of parts, in the order the solver emitted them.
pub type Composition = Vec<Component>;

/// Failures a solver can raise during [`Solver::solve`].
///
/// None of these reach the bridge's caller; the endpoint logs them and
/// answers with whatever partial solutions exist.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The solver could not be started at all.
    #[error("solver unavailable: {0}")]
    Unavailable(String),

    /// The solver ran but reported failure.
    #[error("solver exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The solver produced output that could not be interpreted.
    #[error("malformed solver output: {0}")]
    MalformedOutput(String),

    #[error("solver I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single-use solver instance.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Solver: Send {
    /// Searches for up to `order_count` orders of `part_count` parts that
    /// satisfy `rules`.  Blocks until the search finishes or fails.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the search failed.  Solutions found before
    /// the failure remain available through [`take_solutions`](Self::take_solutions).
    fn solve(&mut self, rules: &[String], part_count: i32, order_count: i32)
        -> Result<(), SolverError>;

    /// Moves the solution collection out of the solver.
    ///
    /// `None` means the solver never produced a collection; callers treat it
    /// the same as an empty one.
    fn take_solutions(&mut self) -> Option<Vec<Composition>>;
}

/// Creates a fresh [`Solver`] for every call.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait SolverFactory: Send + Sync {
    fn create(&self) -> Box<dyn Solver>;
}
