use crate::error::{PriceError, Result};
use crate::types::AgentId;
use std::collections::{BTreeMap, BTreeSet};

/// Directed information-sharing topology over agents `1..=n`.
///
/// Construction validates agent count and edge endpoints only; acyclicity
/// is checked when a topological order is requested, so a cyclic edge list
/// is representable but rejected before any enumeration starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    n: AgentId,
    edges: BTreeSet<(AgentId, AgentId)>,
    successors: BTreeMap<AgentId, BTreeSet<AgentId>>,
}

impl Graph {
    /// Create a graph over agents `1..=n` with the given directed edges.
    /// Duplicate edges collapse to one.
    pub fn new(n: AgentId, edges: impl IntoIterator<Item = (AgentId, AgentId)>) -> Result<Self> {
        if n == 0 {
            return Err(PriceError::EmptyGraph);
        }

        let mut edge_set = BTreeSet::new();
        let mut successors: BTreeMap<AgentId, BTreeSet<AgentId>> =
            (1..=n).map(|i| (i, BTreeSet::new())).collect();

        for (from, to) in edges {
            if from == 0 || from > n || to == 0 || to > n {
                return Err(PriceError::InvalidEdge { from, to, n });
            }
            if edge_set.insert((from, to)) {
                successors
                    .entry(from)
                    .or_default()
                    .insert(to);
            }
        }

        Ok(Self {
            n,
            edges: edge_set,
            successors,
        })
    }

    /// Number of agents.
    pub fn agent_count(&self) -> AgentId {
        self.n
    }

    /// Agent ids in ascending order.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        1..=self.n
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Directed edges in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (AgentId, AgentId)> + '_ {
        self.edges.iter().copied()
    }

    /// Direct successors of `agent` in ascending order.
    pub fn successors(&self, agent: AgentId) -> impl Iterator<Item = AgentId> + '_ {
        self.successors
            .get(&agent)
            .into_iter()
            .flat_map(|s| s.iter().copied())
    }

    /// Topological order via Kahn's algorithm. The frontier is kept ordered
    /// so ties always resolve to the smallest agent id, making the order
    /// stable across runs. Fails with a cycle error if the graph is not a
    /// DAG (self-loops included).
    pub fn topological_order(&self) -> Result<Vec<AgentId>> {
        let mut indegree: BTreeMap<AgentId, usize> = (1..=self.n).map(|i| (i, 0)).collect();
        for &(_, to) in &self.edges {
            if let Some(d) = indegree.get_mut(&to) {
                *d += 1;
            }
        }

        let mut frontier: BTreeSet<AgentId> = indegree
            .iter()
            .filter(|&(_, &d)| d == 0)
            .map(|(&i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.n as usize);
        while let Some(&agent) = frontier.iter().next() {
            frontier.remove(&agent);
            order.push(agent);
            for succ in self.successors(agent) {
                if let Some(d) = indegree.get_mut(&succ) {
                    *d -= 1;
                    if *d == 0 {
                        frontier.insert(succ);
                    }
                }
            }
        }

        if order.len() < self.n as usize {
            return Err(PriceError::Cycle);
        }
        Ok(order)
    }
}
