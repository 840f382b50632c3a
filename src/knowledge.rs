use crate::error::Result;
use crate::graph::Graph;
use crate::types::{AgentId, KnowledgeMap, VarName, greedy_var};
use std::collections::{BTreeMap, BTreeSet};

/// A decision token as it exists during enumeration, before canonical
/// variable names are assigned.
///
/// `OwnDecision` carries the exact knowledge prefix the deciding agent held,
/// so own-decision tokens arising from different contexts stay distinct.
/// The derived `Ord` gives every container holding tokens a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Token {
    Known(VarName),
    OwnDecision { agent: AgentId, prefix: Vec<Token> },
}

#[derive(Debug, Clone)]
struct AgentState {
    knowledge: BTreeSet<Token>,
    decided: Option<Token>,
}

/// Exhaustively compute every canonical knowledge set each agent can hold
/// at decision time, under all forwarding policies consistent with the
/// graph.
///
/// The search branches, per undecided agent in topological order, over each
/// token the agent currently holds plus a fresh own-decision token tagged
/// with the exact current prefix, propagating the chosen token to direct
/// successors. Branching is exponential in the knowledge-set size, so this
/// is intended for small agent counts only.
///
/// The returned map is deterministic: all intermediate containers are
/// B-tree ordered and the canonical numbering depends only on set content.
pub fn enumerate_knowledge_sets(graph: &Graph) -> Result<KnowledgeMap> {
    let order = graph.topological_order()?;

    let initial: BTreeMap<AgentId, AgentState> = order
        .iter()
        .map(|&agent| {
            (
                agent,
                AgentState {
                    knowledge: BTreeSet::new(),
                    decided: None,
                },
            )
        })
        .collect();

    let mut observed: BTreeMap<AgentId, BTreeSet<Vec<Token>>> =
        order.iter().map(|&agent| (agent, BTreeSet::new())).collect();

    let mut stack = vec![initial];
    while let Some(state) = stack.pop() {
        let next = order
            .iter()
            .copied()
            .find(|agent| state[agent].decided.is_none());

        let Some(agent) = next else {
            // Every agent decided: record final knowledge sets. Since agents
            // decide in topological order, each agent's knowledge was already
            // final at its own decision time.
            for (id, agent_state) in &state {
                if let Some(sets) = observed.get_mut(id) {
                    sets.insert(agent_state.knowledge.iter().cloned().collect());
                }
            }
            continue;
        };

        let knowledge = state[&agent].knowledge.clone();
        let own = Token::OwnDecision {
            agent,
            prefix: knowledge.iter().cloned().collect(),
        };
        let mut choices: Vec<Token> = knowledge.iter().cloned().collect();
        choices.push(own);

        for choice in choices {
            let mut branch = state.clone();
            if let Some(agent_state) = branch.get_mut(&agent) {
                agent_state.decided = Some(choice.clone());
            }
            for succ in graph.successors(agent) {
                if let Some(succ_state) = branch.get_mut(&succ) {
                    succ_state.knowledge.insert(choice.clone());
                }
            }
            stack.push(branch);
        }
    }

    Ok(canonicalize(&observed))
}

/// Assign greedy-variable names to raw knowledge sets and rewrite every
/// token to its canonical variable name.
fn canonicalize(observed: &BTreeMap<AgentId, BTreeSet<Vec<Token>>>) -> KnowledgeMap {
    // Number each agent's distinct raw sets by (size, lexicographic order).
    let mut names: BTreeMap<AgentId, BTreeMap<Vec<Token>, VarName>> = BTreeMap::new();
    for (&agent, sets) in observed {
        let mut ordered: Vec<&Vec<Token>> = sets.iter().collect();
        ordered.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        names.insert(
            agent,
            ordered
                .into_iter()
                .enumerate()
                .map(|(idx, ks)| (ks.clone(), greedy_var(agent, idx + 1)))
                .collect(),
        );
    }

    let mut map = KnowledgeMap::new();
    for (&agent, sets) in observed {
        let mut rewritten: BTreeSet<Vec<VarName>> = BTreeSet::new();
        for ks in sets {
            let mut set: Vec<VarName> = ks.iter().map(|token| rewrite(token, &names)).collect();
            set.sort();
            set.dedup();
            rewritten.insert(set);
        }
        let mut list: Vec<Vec<VarName>> = rewritten.into_iter().collect();
        list.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        map.insert(agent, list);
    }
    map
}

fn rewrite(token: &Token, names: &BTreeMap<AgentId, BTreeMap<Vec<Token>, VarName>>) -> VarName {
    match token {
        Token::Known(name) => name.clone(),
        Token::OwnDecision { agent, prefix } => names
            .get(agent)
            .and_then(|sets| sets.get(prefix))
            .cloned()
            .expect("own-decision prefix is one of the deciding agent's recorded sets"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_edges_yield_only_empty_sets() {
        let graph = Graph::new(3, []).unwrap();
        let knowledge = enumerate_knowledge_sets(&graph).unwrap();
        for agent in 1..=3 {
            assert_eq!(knowledge[&agent], vec![Vec::<String>::new()]);
        }
    }

    #[test]
    fn test_source_agents_have_empty_knowledge() {
        let graph = Graph::new(4, [(1, 3), (2, 3), (3, 4)]).unwrap();
        let knowledge = enumerate_knowledge_sets(&graph).unwrap();
        assert_eq!(knowledge[&1], vec![Vec::<String>::new()]);
        assert_eq!(knowledge[&2], vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_chain_enumeration() {
        let graph = Graph::new(3, [(1, 2), (2, 3)]).unwrap();
        let knowledge = enumerate_knowledge_sets(&graph).unwrap();

        assert_eq!(knowledge[&1], vec![Vec::<String>::new()]);
        assert_eq!(knowledge[&2], vec![vec!["x1g1".to_string()]]);
        // Agent 3 receives either agent 1's forwarded token or agent 2's
        // own decision.
        assert_eq!(
            knowledge[&3],
            vec![vec!["x1g1".to_string()], vec!["x2g1".to_string()]]
        );
    }

    #[test]
    fn test_triangle_enumeration() {
        // 1 -> 2, 1 -> 3, 2 -> 3: agent 3 always holds agent 1's token and
        // additionally whatever agent 2 forwarded.
        let graph = Graph::new(3, [(1, 2), (1, 3), (2, 3)]).unwrap();
        let knowledge = enumerate_knowledge_sets(&graph).unwrap();

        assert_eq!(knowledge[&2], vec![vec!["x1g1".to_string()]]);
        assert_eq!(
            knowledge[&3],
            vec![
                vec!["x1g1".to_string()],
                vec!["x1g1".to_string(), "x2g1".to_string()],
            ]
        );
    }

    #[test]
    fn test_nested_prefixes_resolve_to_canonical_names() {
        let graph = Graph::new(4, [(1, 2), (2, 3), (3, 4)]).unwrap();
        let knowledge = enumerate_knowledge_sets(&graph).unwrap();

        // Agent 4 sees whichever token agent 3 forwarded: agent 1's or
        // agent 2's original, or agent 3's own decision made under either
        // of its two prefixes.
        assert_eq!(
            knowledge[&4],
            vec![
                vec!["x1g1".to_string()],
                vec!["x2g1".to_string()],
                vec!["x3g1".to_string()],
                vec!["x3g2".to_string()],
            ]
        );
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let graph = Graph::new(4, [(1, 2), (1, 3), (2, 4), (3, 4)]).unwrap();
        let first = enumerate_knowledge_sets(&graph).unwrap();
        let second = enumerate_knowledge_sets(&graph).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_aborts_enumeration() {
        let graph = Graph::new(2, [(1, 2), (2, 1)]).unwrap();
        assert!(enumerate_knowledge_sets(&graph).is_err());
    }

    #[test]
    fn test_token_ordering_is_structural() {
        let a = Token::OwnDecision {
            agent: 1,
            prefix: vec![],
        };
        let b = Token::OwnDecision {
            agent: 2,
            prefix: vec![a.clone()],
        };
        assert!(a < b);
        assert!(Token::Known("x1g1".to_string()) < a);
    }
}
