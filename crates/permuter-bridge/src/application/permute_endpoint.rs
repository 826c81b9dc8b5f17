//! The one operation the bridge exposes: `Permute`.
//!
//! ```text
//! PermuteRequest ──▶ factory.create() ──▶ solver.solve(rules, parts, orders)
//!                                               │ (failure logged, not returned)
//! PermuteResponse ◀── ResponseMatrix ◀── solver.take_solutions()
//! ```
//!
//! Every call gets a fresh solver, so nothing leaks between calls and the
//! endpoint itself holds no mutable state.  A solver failure never reaches
//! the caller: the endpoint logs it and answers with whatever solutions the
//! solver had reached, which may be none.
//!
//! All methods here block for as long as the solver runs.  Async callers
//! must run them on a blocking thread.

use std::sync::Arc;

use permuter_core::protocol::messages::{
    BridgeMessage, ErrorCode, ErrorMessage, PermuteRequestMessage,
};
use permuter_core::{ResponseMatrix, RuleSet, SolverFactory};
use tracing::{debug, info, warn};

/// Answers `Permute` calls using a fresh solver from `factory` each time.
///
/// Cheap to clone; clones share the factory.
#[derive(Clone)]
pub struct PermuteEndpoint {
    factory: Arc<dyn SolverFactory>,
}

impl PermuteEndpoint {
    pub fn new(factory: Arc<dyn SolverFactory>) -> Self {
        Self { factory }
    }

    /// Runs one `Permute` call.
    ///
    /// Counts are forwarded to the solver unchanged, including non-positive
    /// ones.  The returned matrix has rows of exactly `part_count` names and
    /// at most `order_count` rows when `order_count` is positive.
    pub fn permute(&self, rules: &RuleSet, part_count: i32, order_count: i32) -> ResponseMatrix {
        debug!(
            rules = rules.len(),
            part_count, order_count, "permute call received"
        );

        let mut solver = self.factory.create();
        if let Err(e) = solver.solve(rules.as_slice(), part_count, order_count) {
            warn!(error = %e, "solver failed; answering with the solutions it reached");
        }
        let matrix = ResponseMatrix::from_solutions(solver.take_solutions(), part_count, order_count);

        info!(orders = matrix.len(), part_count, "returning part orders");
        matrix
    }

    /// Produces the reply for one decoded request frame.
    ///
    /// `Ping` is echoed as `Pong` without creating a solver.  Anything the
    /// bridge only ever sends, rather than receives, is answered with an
    /// `UnexpectedMessage` error.
    pub fn handle(&self, request: BridgeMessage) -> BridgeMessage {
        match request {
            BridgeMessage::Ping(token) => BridgeMessage::Pong(token),
            BridgeMessage::PermuteRequest(PermuteRequestMessage {
                rules,
                part_count,
                order_count,
            }) => {
                let matrix = self.permute(&RuleSet::new(rules), part_count, order_count);
                BridgeMessage::PermuteResponse(matrix.into())
            }
            other => {
                warn!(message_type = ?other.message_type(), "unexpected message from caller");
                BridgeMessage::Error(ErrorMessage {
                    code: ErrorCode::UnexpectedMessage,
                    description: format!("{:?} is not a request", other.message_type()),
                })
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use permuter_core::domain::solver::{MockSolver, MockSolverFactory};
    use permuter_core::protocol::messages::PermuteResponseMessage;
    use permuter_core::{Component, Composition, Solver, SolverError};

    fn composition(names: &[&str]) -> Composition {
        names.iter().map(|n| Component::named(*n)).collect()
    }

    fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    /// Builds an endpoint whose factory hands out exactly one solver that
    /// returns `outcome` from `solve` and `solutions` from `take_solutions`.
    fn endpoint_with(
        outcome: fn() -> Result<(), SolverError>,
        solutions: Option<Vec<Composition>>,
    ) -> PermuteEndpoint {
        let mut solver = MockSolver::new();
        solver.expect_solve().times(1).returning(move |_, _, _| outcome());
        solver
            .expect_take_solutions()
            .times(1)
            .return_once(move || solutions);

        let mut factory = MockSolverFactory::new();
        factory
            .expect_create()
            .times(1)
            .return_once(move || Box::new(solver) as Box<dyn Solver>);
        PermuteEndpoint::new(Arc::new(factory))
    }

    #[test]
    fn test_permute_returns_fewer_rows_than_requested() {
        // Arrange
        let endpoint = endpoint_with(
            || Ok(()),
            Some(vec![composition(&["A", "B"]), composition(&["A", "C"])]),
        );
        let rules: RuleSet = ["R1: A before B"].into_iter().collect();

        // Act
        let matrix = endpoint.permute(&rules, 2, 3);

        // Assert
        assert_eq!(matrix.into_rows(), rows(&[&["A", "B"], &["A", "C"]]));
    }

    #[test]
    fn test_permute_with_no_solutions_returns_zero_rows() {
        let endpoint = endpoint_with(|| Ok(()), Some(Vec::new()));

        let matrix = endpoint.permute(&RuleSet::default(), 1, 1);

        assert!(matrix.is_empty());
    }

    #[test]
    fn test_solver_failure_before_any_solution_returns_zero_rows() {
        // Arrange – the solver never produced a collection at all
        let endpoint = endpoint_with(
            || Err(SolverError::Unavailable("not installed".to_string())),
            None,
        );

        // Act
        let matrix = endpoint.permute(&RuleSet::default(), 2, 5);

        // Assert
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_solver_failure_mid_search_keeps_partial_solutions() {
        // Arrange
        let endpoint = endpoint_with(
            || {
                Err(SolverError::Failed {
                    status: "exit status: 1".to_string(),
                    stderr: "search aborted".to_string(),
                })
            },
            Some(vec![composition(&["L1", "P1"])]),
        );

        // Act
        let matrix = endpoint.permute(&RuleSet::default(), 2, 10);

        // Assert
        assert_eq!(matrix.into_rows(), rows(&[&["L1", "P1"]]));
    }

    #[test]
    fn test_rules_and_counts_reach_solver_unchanged() {
        // Arrange
        let rules = vec!["STARTSWITH L1".to_string(), "CONTAINS L1".to_string()];
        let mut solver = MockSolver::new();
        solver
            .expect_solve()
            .withf(|rules, part_count, order_count| {
                rules.len() == 2
                    && rules[0] == "STARTSWITH L1"
                    && rules[1] == "CONTAINS L1"
                    && *part_count == 0
                    && *order_count == -1
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        solver.expect_take_solutions().returning(|| None);
        let mut factory = MockSolverFactory::new();
        factory.expect_create().return_once(move || Box::new(solver) as Box<dyn Solver>);
        let endpoint = PermuteEndpoint::new(Arc::new(factory));

        // Act
        let reply = endpoint.handle(BridgeMessage::PermuteRequest(PermuteRequestMessage {
            rules,
            part_count: 0,
            order_count: -1,
        }));

        // Assert – non-positive counts are passed through, then yield zero rows
        assert_eq!(
            reply,
            BridgeMessage::PermuteResponse(PermuteResponseMessage::default())
        );
    }

    #[test]
    fn test_each_call_creates_a_fresh_solver() {
        // Arrange
        let mut factory = MockSolverFactory::new();
        factory.expect_create().times(3).returning(|| {
            let mut solver = MockSolver::new();
            solver.expect_solve().times(1).returning(|_, _, _| Ok(()));
            solver
                .expect_take_solutions()
                .times(1)
                .returning(|| Some(vec![vec![Component::named("A")]]));
            Box::new(solver) as Box<dyn Solver>
        });
        let endpoint = PermuteEndpoint::new(Arc::new(factory));

        // Act
        for _ in 0..3 {
            let matrix = endpoint.permute(&RuleSet::default(), 1, 1);
            assert_eq!(matrix.len(), 1);
        }

        // Assert – `times(3)` on create and `times(1)` per solver are checked on drop
    }

    #[test]
    fn test_ping_is_answered_without_a_solver() {
        // Arrange
        let mut factory = MockSolverFactory::new();
        factory.expect_create().never();
        let endpoint = PermuteEndpoint::new(Arc::new(factory));

        // Act
        let reply = endpoint.handle(BridgeMessage::Ping(77));

        // Assert
        assert_eq!(reply, BridgeMessage::Pong(77));
    }

    #[test]
    fn test_response_frames_are_rejected_as_requests() {
        let mut factory = MockSolverFactory::new();
        factory.expect_create().never();
        let endpoint = PermuteEndpoint::new(Arc::new(factory));

        let reply = endpoint.handle(BridgeMessage::Pong(1));

        match reply {
            BridgeMessage::Error(e) => assert_eq!(e.code, ErrorCode::UnexpectedMessage),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_permute_request_orders_rows_like_solver() {
        // Arrange
        let endpoint = endpoint_with(
            || Ok(()),
            Some(vec![composition(&["B", "A"]), composition(&["A", "B"])]),
        );

        // Act
        let reply = endpoint.handle(BridgeMessage::PermuteRequest(PermuteRequestMessage {
            rules: vec!["CONTAINS A".to_string(), "CONTAINS B".to_string()],
            part_count: 2,
            order_count: 2,
        }));

        // Assert
        assert_eq!(
            reply,
            BridgeMessage::PermuteResponse(PermuteResponseMessage {
                rows: rows(&[&["B", "A"], &["A", "B"]])
            })
        );
    }
}
