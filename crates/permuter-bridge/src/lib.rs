//! permuter-bridge library crate.
//!
//! A long-lived loopback server that lets a controller in another process ask
//! an external combinatorial-design solver for valid part orders, one
//! synchronous `Permute` call at a time.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Controller (BridgeClient, binary frames over loopback TCP)
//!         ↕
//! [permuter-bridge]
//!   ├── domain/             BridgeConfig, SolverCommand
//!   ├── application/        PermuteEndpoint: fresh solver per call, reshape output
//!   └── infrastructure/
//!         ├── server        accept loop, per-connection tasks
//!         ├── client        caller side of the socket
//!         ├── solver_process  one solver process per call
//!         └── config_file   optional TOML settings
//!         ↕
//! External solver (JSON over stdin/stdout)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `permuter-core` only, and blocks
//!   for as long as the solver runs.
//! - `infrastructure` depends on all other layers plus `tokio`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: the `Permute` operation.
pub mod application;

/// Infrastructure layer: sockets, solver processes, config file.
pub mod infrastructure;
