//! Price-of-information bound computation library
//!
//! For a directed acyclic information-sharing topology among decision-making
//! agents, this library computes a worst-case bound relating a greedy
//! distributed decision process to the true global optimum. It exhaustively
//! enumerates every knowledge configuration an agent can reach under any
//! information-forwarding policy, encodes the configurations as a linear
//! program over a normalized monotone submodular set function, and minimizes
//! the bound `z`.

pub mod batch;
pub mod constraints;
pub mod error;
pub mod graph;
pub mod ground_set;
pub mod knowledge;
pub mod price;
pub mod report;
pub mod solver;
pub mod types;

// Re-export main types and functions
pub use batch::{BatchMode, CaseReport, forward_dags, solve_cases, solve_cases_with};
pub use constraints::{ConstraintCounts, LpProgram};
pub use error::{PriceError, Result};
pub use graph::Graph;
pub use ground_set::{GroundSet, Mode, SubsetUniverse};
pub use knowledge::{Token, enumerate_knowledge_sets};
pub use price::{BoundReport, PriceOfInformation, PriceOfInformationBuilder};
pub use report::{NullSink, Sink, WriteSink};
pub use solver::{LpSolution, LpStatus};
pub use types::{AgentId, KnowledgeMap, KnowledgeSet, SubsetKey, VarName};
