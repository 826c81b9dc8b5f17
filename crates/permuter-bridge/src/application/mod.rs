//! Application layer for permuter-bridge.
//!
//! Knows *what* a call does (create a solver, run it, reshape its output)
//! and leaves *how* bytes reach it to the infrastructure layer.
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or spawning processes (that is infrastructure)
//! - Tokio task spawning or `spawn_blocking` (the server decides where
//!   blocking work runs)

pub mod permute_endpoint;

pub use permute_endpoint::PermuteEndpoint;
