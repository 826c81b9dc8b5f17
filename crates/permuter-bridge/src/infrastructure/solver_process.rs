//! Solver back-end that runs an external program once per call.
//!
//! A fresh process is the fresh solver instance: nothing survives between
//! calls except the command line used to start it.
//!
//! # Process protocol
//!
//! The request is written to the child's stdin as one JSON object, then stdin
//! is closed.  Writing runs alongside reading stdout, so the child may answer
//! before it has consumed the whole request:
//!
//! ```json
//! {"rules": ["CONTAINS L1", "STARTSWITH L1"], "part_count": 1, "order_count": 5}
//! ```
//!
//! Each line the child prints on stdout is one composition, a JSON array whose
//! elements are either a component name or an object with a `"name"` field
//! and an optional `"type"`:
//!
//! ```text
//! ["L1","P1_PhlF"]
//! [{"name":"L1","type":"spacer"},{"name":"P1_PhlF","type":"promoter"}]
//! ```
//!
//! Blank lines are ignored.  Compositions read before a failure are kept, so
//! the endpoint can still answer with partial results.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;

use permuter_core::{Component, Composition, Solver, SolverError, SolverFactory};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::SolverCommand;

/// Request body written to the solver's stdin.
#[derive(Debug, Serialize)]
struct SolveRequest<'a> {
    rules: &'a [String],
    part_count: i32,
    order_count: i32,
}

/// One element of a composition line.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireComponent {
    Name(String),
    Detailed {
        name: String,
        #[serde(rename = "type", default)]
        kind: Option<String>,
    },
}

impl From<WireComponent> for Component {
    fn from(wire: WireComponent) -> Self {
        match wire {
            WireComponent::Name(name) => Component { name, kind: None },
            WireComponent::Detailed { name, kind } => Component { name, kind },
        }
    }
}

/// Parses one stdout line into a composition.
fn parse_composition(line: &str) -> Result<Composition, serde_json::Error> {
    let parts: Vec<WireComponent> = serde_json::from_str(line)?;
    Ok(parts.into_iter().map(Component::from).collect())
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Hands out a [`ProcessSolver`] per call, all launching the same command.
#[derive(Debug, Clone)]
pub struct ProcessSolverFactory {
    command: SolverCommand,
}

impl ProcessSolverFactory {
    pub fn new(command: SolverCommand) -> Self {
        Self { command }
    }
}

impl SolverFactory for ProcessSolverFactory {
    fn create(&self) -> Box<dyn Solver> {
        Box::new(ProcessSolver::new(self.command.clone()))
    }
}

// ── Solver ────────────────────────────────────────────────────────────────────

/// A single-use solver backed by one child process.
#[derive(Debug)]
pub struct ProcessSolver {
    command: SolverCommand,
    solutions: Option<Vec<Composition>>,
}

impl ProcessSolver {
    pub fn new(command: SolverCommand) -> Self {
        Self {
            command,
            solutions: None,
        }
    }

    fn spawn(&self) -> Result<Child, SolverError> {
        Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolverError::Unavailable(format!("{}: {e}", self.command.program)))
    }
}

impl Solver for ProcessSolver {
    fn solve(
        &mut self,
        rules: &[String],
        part_count: i32,
        order_count: i32,
    ) -> Result<(), SolverError> {
        let mut child = self.spawn()?;
        debug!(program = %self.command.program, pid = child.id(), "solver started");

        // Drain stderr on its own thread so a chatty solver cannot fill the
        // pipe and stall while we are still reading stdout.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text);
                text
            })
        });

        let mut request = match serde_json::to_vec(&SolveRequest {
            rules,
            part_count,
            order_count,
        }) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SolverError::Io(e.into()));
            }
        };
        request.push(b'\n');

        // Feed stdin from its own thread too: a solver may start printing
        // before it has read all of a large request.  The pipe closes when
        // the thread ends.
        let stdin_writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&request)));

        let solutions = self.solutions.get_or_insert_with(Vec::new);
        let mut malformed = None;
        if let Some(stdout) = child.stdout.take() {
            for (line_no, line) in BufReader::new(stdout).lines().enumerate() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SolverError::Io(e));
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_composition(&line) {
                    Ok(composition) => solutions.push(composition),
                    Err(e) => {
                        malformed = Some(format!("line {}: {e}", line_no + 1));
                        break;
                    }
                }
            }
        }

        if malformed.is_some() {
            // Stop a solver that is still writing; its exit status is
            // irrelevant once its output cannot be trusted.
            let _ = child.kill();
        }
        let written = stdin_writer
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")))
            })
            .unwrap_or(Ok(()));
        match written {
            Ok(()) => {}
            // The solver may exit without reading its input; its exit
            // status tells us whether that was a failure.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("solver closed stdin before reading the request");
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SolverError::Io(e));
            }
        }
        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        debug!(
            compositions = solutions.len(),
            %status,
            "solver finished"
        );

        if let Some(detail) = malformed {
            return Err(SolverError::MalformedOutput(detail));
        }
        if !status.success() {
            if !stderr.is_empty() {
                warn!(stderr = %stderr.trim_end(), "solver reported failure");
            }
            return Err(SolverError::Failed {
                status: status.to_string(),
                stderr: stderr.trim_end().to_string(),
            });
        }
        Ok(())
    }

    fn take_solutions(&mut self) -> Option<Vec<Composition>> {
        self.solutions.take()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
