use crate::types::AgentId;
use thiserror::Error;

/// Error types for the price-of-information computation
#[derive(Debug, Error)]
pub enum PriceError {
    /// Graph with zero agents
    #[error("There must be at least one agent in the graph.")]
    EmptyGraph,

    /// Edge endpoint outside the agent range
    #[error("Edge ({from}, {to}) references an agent outside 1..={n}.")]
    InvalidEdge { from: AgentId, to: AgentId, n: AgentId },

    /// Input graph is not acyclic; enumeration never starts
    #[error("The sharing graph contains a cycle; knowledge enumeration requires a DAG.")]
    Cycle,

    /// Externally supplied knowledge map disagrees with the graph's agents
    #[error("Knowledge map covers agents {supplied:?} but the graph has agents {expected:?}.")]
    ShapeMismatch {
        expected: Vec<AgentId>,
        supplied: Vec<AgentId>,
    },

    /// Exhaustive subset enumeration asked for more elements than a u64
    /// bitmask can address
    #[error(
        "Exhaustive enumeration over {elements} elements would overflow a 64-bit subset mask; the limit is 63."
    )]
    EnumerationOverflow { elements: usize },

    /// Constraint referenced a subset missing from the admissible universe
    #[error(
        "Subset {subset:?} is not in the admissible universe; constraint generation is inconsistent."
    )]
    MissingSubset { subset: Vec<String> },

    /// Constraint system unsatisfiable; indicates a generation defect
    #[error("The constraint system is infeasible; well-formed inputs always admit a solution.")]
    InfeasibleLp,

    /// Objective unbounded below
    #[error("The linear program is unbounded below.")]
    UnboundedLp,

    /// Solve exceeded the configured time limit
    #[error("LP solve exceeded the configured time limit.")]
    SolverTimeout,

    /// Any other solver failure
    #[error("LP solver failure: {0}")]
    LpSolver(String),

    /// Failure while exporting batch summaries
    #[error("Summary export error: {0}")]
    Export(String),
}

/// Result type alias for price-of-information operations
pub type Result<T> = std::result::Result<T, PriceError>;
