//! # permuter-core
//!
//! Shared library for the permuter bridge: the binary call-gateway protocol,
//! the per-call domain types, and the abstraction over the external
//! combinatorial-design solver.
//!
//! This crate is used by both the bridge server and the callers that talk to
//! it.  It has no dependency on sockets, async runtimes, or processes.
//!
//! # Architecture overview
//!
//! A controller process wants part orders ("compositions") that satisfy a set
//! of placement rules such as `CONTAINS L1` or `P1 BEFORE L3`.  The actual
//! search is done by an external solver.  The bridge sits between them:
//!
//! ```text
//! controller ──PermuteRequest──▶ bridge ──solve()──▶ solver
//! controller ◀─PermuteResponse── bridge ◀─compositions──
//! ```
//!
//! - **`protocol`** – How calls travel over the loopback socket.  Messages are
//!   encoded into a compact binary frame (16-byte header + payload) and decoded
//!   back into typed Rust values on the other end.
//!
//! - **`domain`** – Pure per-call types: the ordered [`RuleSet`], solver output
//!   ([`Component`], [`Composition`]), the rectangular [`ResponseMatrix`], the
//!   [`Solver`] / [`SolverFactory`] traits, and the caller-side rule helpers.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `permuter_core::ResponseMatrix` instead of the full module path.
pub use domain::matrix::ResponseMatrix;
pub use domain::rules::{prepare_rules, sample_orders, PreparedRules, RuleSet};
pub use domain::solver::{Component, Composition, Solver, SolverError, SolverFactory};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::BridgeMessage;
