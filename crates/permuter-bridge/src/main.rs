//! Permuter bridge: entry point.
//!
//! Starts once, binds a loopback socket, and answers `Permute` calls from a
//! controller by running the external solver once per call.  Runs until the
//! process is stopped (Ctrl+C or a signal).
//!
//! # Usage
//!
//! ```text
//! permuter-bridge [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>          Address to listen on [default: 127.0.0.1:25333]
//!   --solver <PROGRAM>     Solver executable [default: permuter-solver]
//!   --solver-arg <ARG>     Argument for the solver (repeatable)
//!   --config <FILE>        TOML file with the same settings
//! ```
//!
//! # Precedence
//!
//! CLI flags (and their environment variables) win over the config file,
//! which wins over the built-in defaults.
//!
//! | Variable          | Flag        |
//! |-------------------|-------------|
//! | `PERMUTER_BIND`   | `--bind`    |
//! | `PERMUTER_SOLVER` | `--solver`  |
//! | `PERMUTER_CONFIG` | `--config`  |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use permuter_bridge::application::PermuteEndpoint;
use permuter_bridge::domain::BridgeConfig;
use permuter_bridge::infrastructure::{load_file, BridgeServer, ProcessSolverFactory};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Loopback call gateway between a controller and an external part-order solver.
#[derive(Debug, Parser)]
#[command(name = "permuter-bridge", version)]
struct Cli {
    /// Address to listen on.
    ///
    /// The channel is unauthenticated; anything but a loopback address is
    /// accepted with a warning.
    #[arg(long, env = "PERMUTER_BIND")]
    bind: Option<SocketAddr>,

    /// Solver executable, run once per call.
    #[arg(long, env = "PERMUTER_SOLVER")]
    solver: Option<String>,

    /// Argument passed to the solver; repeat for several.
    #[arg(long = "solver-arg", allow_hyphen_values = true)]
    solver_args: Vec<String>,

    /// TOML config file.
    #[arg(long, env = "PERMUTER_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layers defaults, the config file, and the CLI into a [`BridgeConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--config` names a file that cannot be read or
    /// parsed.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        let mut config = BridgeConfig::default();

        if let Some(path) = &self.config {
            load_file(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?
                .apply_to(&mut config);
        }

        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(program) = self.solver {
            config.solver.program = program;
        }
        if !self.solver_args.is_empty() {
            config.solver.args = self.solver_args;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_bridge_config()?;
    info!(
        bind = %config.bind_addr,
        solver = %config.solver.program,
        "permuter bridge starting"
    );

    let factory = Arc::new(ProcessSolverFactory::new(config.solver.clone()));
    let endpoint = PermuteEndpoint::new(factory);
    let server = BridgeServer::bind(&config, endpoint)
        .await
        .context("bridge could not start")?;

    let stop = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = server.serve() => {}
        () = stop => info!("received Ctrl+C; stopping"),
    }

    info!("permuter bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
