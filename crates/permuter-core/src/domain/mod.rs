//! Domain types for the permuter bridge.
//!
//! Everything here is per-call and transient: a rule set comes in, a solver
//! instance is created for it, its compositions are reshaped into a
//! response matrix, and all of it is dropped when the call returns.
//!
//! None of these modules touch sockets, processes, or an async runtime, so
//! they can be unit-tested without any external setup.

/// Solver output reshaped into the rectangular wire response.
pub mod matrix;

/// Ordered rule sets and the caller-side preparation helpers.
pub mod rules;

/// The seam to the external combinatorial solver.
pub mod solver;
