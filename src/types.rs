use std::collections::BTreeMap;

/// Agent identifiers are contiguous integers starting at 1.
pub type AgentId = u32;

/// Canonical ground-set variable name, e.g. `x2g1` or `x2o`.
pub type VarName = String;

/// Canonical knowledge set: sorted, deduplicated variable names.
pub type KnowledgeSet = Vec<VarName>;

/// Sorted-vector key identifying a subset of the ground set. Structural
/// equality on the sorted contents makes these usable as map keys.
pub type SubsetKey = Vec<VarName>;

/// Per-agent canonical knowledge sets, each list ordered by
/// (length, lexicographic).
pub type KnowledgeMap = BTreeMap<AgentId, Vec<KnowledgeSet>>;

/// Name of the greedy variable for `agent`'s `index`-th canonical
/// knowledge set (1-based).
pub fn greedy_var(agent: AgentId, index: usize) -> VarName {
    format!("x{agent}g{index}")
}

/// Name of the single optimal variable for `agent`.
pub fn optimal_var(agent: AgentId) -> VarName {
    format!("x{agent}o")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_names() {
        assert_eq!(greedy_var(3, 2), "x3g2");
        assert_eq!(optimal_var(3), "x3o");
        assert_eq!(greedy_var(12, 10), "x12g10");
    }
}
