use crate::error::{PriceError, Result};
use crate::graph::Graph;
use crate::types::{AgentId, KnowledgeMap, KnowledgeSet, SubsetKey, VarName, greedy_var, optimal_var};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which admissible-subset universe the LP is indexed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every subset of the ground set. Exact but combinatorially explosive;
    /// meant for small verification cases.
    Full,
    /// Only subsets that can arise from some profile. Constraints touching
    /// any other subset are omitted, so the pruned optimum is a relaxation
    /// bounded above by the full optimum.
    Pruned,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Full => write!(f, "FULL"),
            Mode::Pruned => write!(f, "PRUNED"),
        }
    }
}

/// Ground set of symbolic decision variables: one greedy variable per
/// canonical knowledge set and one optimal variable per agent.
#[derive(Debug, Clone)]
pub struct GroundSet {
    greedy: BTreeMap<AgentId, Vec<(KnowledgeSet, VarName)>>,
    optimal: BTreeMap<AgentId, VarName>,
    variables: Vec<VarName>,
}

impl GroundSet {
    /// Build the ground set from a knowledge map. The map's agent set must
    /// exactly match the graph's agents.
    pub fn build(graph: &Graph, knowledge: &KnowledgeMap) -> Result<Self> {
        let expected: Vec<AgentId> = graph.agents().collect();
        let supplied: Vec<AgentId> = knowledge.keys().copied().collect();
        if expected != supplied {
            return Err(PriceError::ShapeMismatch { expected, supplied });
        }

        let mut greedy = BTreeMap::new();
        let mut optimal = BTreeMap::new();
        let mut variables = BTreeSet::new();
        for (&agent, sets) in knowledge {
            let pairs: Vec<(KnowledgeSet, VarName)> = sets
                .iter()
                .enumerate()
                .map(|(idx, ks)| (ks.clone(), greedy_var(agent, idx + 1)))
                .collect();
            for (_, var) in &pairs {
                variables.insert(var.clone());
            }
            let opt = optimal_var(agent);
            variables.insert(opt.clone());
            greedy.insert(agent, pairs);
            optimal.insert(agent, opt);
        }

        Ok(Self {
            greedy,
            optimal,
            variables: variables.into_iter().collect(),
        })
    }

    /// Agents covered by the ground set, ascending.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.greedy.keys().copied()
    }

    /// The agent's greedy choices as (knowledge prefix, variable) pairs, in
    /// canonical order.
    pub fn greedy_choices(&self, agent: AgentId) -> &[(KnowledgeSet, VarName)] {
        self.greedy
            .get(&agent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The agent's optimal variable name.
    pub fn optimal_variable(&self, agent: AgentId) -> &VarName {
        &self.optimal[&agent]
    }

    /// All ground-set variables, sorted.
    pub fn variables(&self) -> &[VarName] {
        &self.variables
    }

    /// The all-optimal profile P*, as a sorted subset key.
    pub fn optimal_profile(&self) -> SubsetKey {
        let mut key: SubsetKey = self.optimal.values().cloned().collect();
        key.sort();
        key
    }

    /// Number of ground-set elements.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// True when no agent contributed any variable.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Admissible-subset universe: the subsets the LP indexes `f` over, ordered
/// by (size, lexicographic) and addressable by sorted-vector key.
#[derive(Debug, Clone)]
pub struct SubsetUniverse {
    subsets: Vec<SubsetKey>,
    index: BTreeMap<SubsetKey, usize>,
}

// Subset enumeration walks u64 bitmasks, so any set it exhausts must fit
// one.
const MAX_ENUMERABLE: usize = 63;

impl SubsetUniverse {
    pub fn build(ground_set: &GroundSet, mode: Mode) -> Result<Self> {
        let keys: BTreeSet<SubsetKey> = match mode {
            Mode::Full => {
                if ground_set.len() > MAX_ENUMERABLE {
                    return Err(PriceError::EnumerationOverflow {
                        elements: ground_set.len(),
                    });
                }
                power_set(ground_set.variables())
            }
            Mode::Pruned => {
                let choices: Vec<Vec<VarName>> = ground_set
                    .agents()
                    .map(|agent| {
                        let mut vars: Vec<VarName> = ground_set
                            .greedy_choices(agent)
                            .iter()
                            .map(|(_, var)| var.clone())
                            .collect();
                        vars.push(ground_set.optimal_variable(agent).clone());
                        vars
                    })
                    .collect();
                // Each profile holds one variable per agent.
                if choices.len() > MAX_ENUMERABLE {
                    return Err(PriceError::EnumerationOverflow {
                        elements: choices.len(),
                    });
                }

                let mut keys = BTreeSet::new();
                for profile in cartesian_product(&choices) {
                    for mut subset in power_set(&profile) {
                        subset.sort();
                        keys.insert(subset);
                    }
                }
                keys
            }
        };

        let mut subsets: Vec<SubsetKey> = keys.into_iter().collect();
        subsets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        let index = subsets
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), idx))
            .collect();

        Ok(Self { subsets, index })
    }

    /// Number of admissible subsets.
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    /// Admissible subsets in canonical order; a subset's position here is
    /// its LP column.
    pub fn subsets(&self) -> &[SubsetKey] {
        &self.subsets
    }

    /// LP column of a sorted subset key, if admissible.
    pub fn position(&self, key: &[VarName]) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &[VarName]) -> bool {
        self.index.contains_key(key)
    }
}

/// All subsets of `vars`, each in `vars`' element order. Exhaustive; only
/// usable for small ground sets.
fn power_set(vars: &[VarName]) -> BTreeSet<SubsetKey> {
    let mut out = BTreeSet::new();
    for mask in 0u64..(1u64 << vars.len()) {
        out.insert(
            vars.iter()
                .enumerate()
                .filter(|(i, _)| mask >> i & 1 == 1)
                .map(|(_, var)| var.clone())
                .collect(),
        );
    }
    out
}

/// Cartesian product of per-agent choice lists: every full profile.
pub(crate) fn cartesian_product(choices: &[Vec<VarName>]) -> Vec<Vec<VarName>> {
    let mut profiles: Vec<Vec<VarName>> = vec![Vec::new()];
    for options in choices {
        let mut next = Vec::with_capacity(profiles.len() * options.len());
        for profile in &profiles {
            for option in options {
                let mut extended = profile.clone();
                extended.push(option.clone());
                next.push(extended);
            }
        }
        profiles = next;
    }
    profiles
}
