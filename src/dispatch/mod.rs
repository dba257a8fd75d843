//! Energy distribution: allocators and the dispatch facade.

/// Optimization-based allocator and its solver seam.
pub mod optimizer;
/// Deterministic greedy allocator.
pub mod rule_based;
pub mod types;

pub use optimizer::{FlowSolver, FlowSplit, LinearFlowSolver};
pub use types::{Allocation, DispatchError, DispatchInput};

/// Allocation policy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// Greedy surplus/deficit rules; never draws from the grid on deficit.
    RuleBased,
    /// Linear program minimizing grid draw; meets demand from the grid when
    /// solar and battery cannot, falling back to the rules on solver failure.
    MinimizeGrid,
}

impl DispatchStrategy {
    /// Names accepted in scenario configuration.
    pub const NAMES: &[&str] = &["rule", "optimal"];

    /// Parses a strategy from its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rule" => Some(Self::RuleBased),
            "optimal" => Some(Self::MinimizeGrid),
            _ => None,
        }
    }
}

/// Dispatch facade: validates inputs, then routes to the selected allocator.
///
/// Stateless apart from its configuration; one instance can serve any number
/// of dispatch calls. Generic over the solver so tests can force the
/// optimizer's success and fallback paths.
#[derive(Debug, Clone)]
pub struct Dispatcher<S: FlowSolver = LinearFlowSolver> {
    strategy: DispatchStrategy,
    solver: S,
}

impl Dispatcher {
    /// Creates a dispatcher using the production LP solver.
    pub fn new(strategy: DispatchStrategy) -> Self {
        Self::with_solver(strategy, LinearFlowSolver)
    }
}

impl<S: FlowSolver> Dispatcher<S> {
    /// Creates a dispatcher with an injected solver.
    pub fn with_solver(strategy: DispatchStrategy, solver: S) -> Self {
        Self { strategy, solver }
    }

    /// Returns the configured strategy.
    pub fn strategy(&self) -> DispatchStrategy {
        self.strategy
    }

    /// Distributes one timestep's supply among consumer, battery, and grid.
    ///
    /// # Errors
    ///
    /// Returns a `DispatchError` when the input fails range validation.
    /// Solver infeasibility is not an error: the optimizing strategy falls
    /// back to the rule-based result transparently.
    pub fn dispatch(&self, input: &DispatchInput) -> Result<Allocation, DispatchError> {
        input.validate()?;
        Ok(match self.strategy {
            DispatchStrategy::RuleBased => rule_based::allocate(input),
            DispatchStrategy::MinimizeGrid => optimizer::allocate_with(&self.solver, input),
        })
    }
}
