use crate::constraints::{self, ConstraintCounts};
use crate::error::Result;
use crate::graph::Graph;
use crate::ground_set::{GroundSet, Mode, SubsetUniverse};
use crate::knowledge::enumerate_knowledge_sets;
use crate::report::Sink;
use crate::solver::{self, LpStatus};
use crate::types::{KnowledgeMap, SubsetKey};
use std::collections::BTreeMap;
use std::time::Duration;

/// Computed bound for one graph instance.
#[derive(Debug, Clone)]
pub struct BoundReport {
    /// The price-of-information bound z.
    pub bound: f64,
    pub status: LpStatus,
    pub counts: ConstraintCounts,
    /// The knowledge map the LP was built from, reusable across modes.
    pub knowledge: KnowledgeMap,
    /// Complete admissible-subset valuation, if requested.
    pub valuation: Option<BTreeMap<SubsetKey, f64>>,
}

/// Price-of-information computation for a single graph instance.
///
/// Per-instance work is strictly sequential: enumeration, ground-set
/// construction, constraint generation, then one solve.
pub struct PriceOfInformation {
    graph: Graph,
    mode: Mode,
    knowledge: Option<KnowledgeMap>,
    time_limit: Option<Duration>,
    keep_valuation: bool,
}

pub struct PriceOfInformationBuilder {
    graph: Graph,
    mode: Mode,
    knowledge: Option<KnowledgeMap>,
    time_limit: Option<Duration>,
    keep_valuation: bool,
}

impl PriceOfInformationBuilder {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            mode: Mode::Full,
            knowledge: None,
            time_limit: None,
            keep_valuation: false,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Reuse a precomputed knowledge map instead of enumerating again. Its
    /// agent set must match the graph's.
    pub fn knowledge(mut self, knowledge: KnowledgeMap) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Wall-clock bound on the LP solve.
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Also return the full f-valuation for diagnostics.
    pub fn keep_valuation(mut self, keep: bool) -> Self {
        self.keep_valuation = keep;
        self
    }

    pub fn build(self) -> PriceOfInformation {
        PriceOfInformation {
            graph: self.graph,
            mode: self.mode,
            knowledge: self.knowledge,
            time_limit: self.time_limit,
            keep_valuation: self.keep_valuation,
        }
    }
}

impl PriceOfInformation {
    pub fn builder(graph: Graph) -> PriceOfInformationBuilder {
        PriceOfInformationBuilder::new(graph)
    }

    /// Enumerate knowledge sets, build the LP, solve it, and report.
    pub fn compute(&self, sink: &mut dyn Sink) -> Result<BoundReport> {
        sink.line(&format!(
            "Building {} LP for graph with {} agents and {} edges.",
            self.mode,
            self.graph.agent_count(),
            self.graph.edge_count()
        ));
        sink.line(&format!(
            "Edge list: {:?}",
            self.graph.edges().collect::<Vec<_>>()
        ));

        let knowledge = match &self.knowledge {
            Some(map) => {
                // A supplied map does not skip the acyclicity check.
                self.graph.topological_order()?;
                map.clone()
            }
            None => enumerate_knowledge_sets(&self.graph)?,
        };

        sink.line("Knowledge sets receivable by agents:");
        for (agent, sets) in &knowledge {
            let rendered = sets
                .iter()
                .map(|set| format!("{{{}}}", set.join(", ")))
                .collect::<Vec<_>>()
                .join(", ");
            sink.line(&format!("  agent {agent}: {rendered}"));
        }

        let ground_set = GroundSet::build(&self.graph, &knowledge)?;
        let universe = SubsetUniverse::build(&ground_set, self.mode)?;
        sink.line(&format!(
            "Ground set ({} elements): {:?}",
            ground_set.len(),
            ground_set.variables()
        ));
        sink.line(&format!("Admissible subsets: {}", universe.len()));

        let program = constraints::generate(&ground_set, &universe)?;
        sink.line(&format!("LP variables: {}", program.n_columns()));
        sink.line(&format!("LP constraints: {}", program.counts.total()));
        for (family, count) in program.counts.families() {
            sink.line(&format!("  {family}: {count}"));
        }

        let solution = solver::solve(&program, self.time_limit)?;
        sink.line(&format!("Status: {:?}", solution.status));
        sink.line(&format!("z = {:.6}", solution.bound));

        let valuation = self.keep_valuation.then(|| {
            universe
                .subsets()
                .iter()
                .cloned()
                .zip(solution.f_values.iter().copied())
                .collect()
        });

        Ok(BoundReport {
            bound: solution.bound,
            status: solution.status,
            counts: program.counts,
            knowledge,
            valuation,
        })
    }
}
