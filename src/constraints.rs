use crate::error::{PriceError, Result};
use crate::ground_set::{GroundSet, SubsetUniverse, cartesian_product};
use crate::types::{SubsetKey, VarName};
use std::collections::BTreeSet;

/// Row sense in `a · x (sense) rhs` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Eq,
    Le,
}

/// One linear constraint over the LP columns. Columns `0..n_subsets` are
/// the set-function values `f[S]` in universe order; column `n_subsets`
/// is the scalar bound `z`.
#[derive(Debug, Clone)]
pub struct ConstraintRow {
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl ConstraintRow {
    /// `f[greater] >= f[lesser]`, in `a · x <= 0` form.
    fn dominates(greater: usize, lesser: usize) -> Self {
        Self {
            terms: vec![(lesser, 1.0), (greater, -1.0)],
            sense: Sense::Le,
            rhs: 0.0,
        }
    }
}

/// Per-family constraint counts, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintCounts {
    pub greedy_local: usize,
    pub optimality: usize,
    pub greedy_global: usize,
    pub submodularity: usize,
    pub monotonicity: usize,
    pub normalization: usize,
}

impl ConstraintCounts {
    pub fn total(&self) -> usize {
        self.greedy_local
            + self.optimality
            + self.greedy_global
            + self.submodularity
            + self.monotonicity
            + self.normalization
    }

    /// (family name, count) pairs in emission order.
    pub fn families(&self) -> [(&'static str, usize); 6] {
        [
            ("Local greedy domination", self.greedy_local),
            ("Optimality ceiling", self.optimality),
            ("Global greedy bound", self.greedy_global),
            ("Submodularity", self.submodularity),
            ("Monotonicity", self.monotonicity),
            ("Normalization", self.normalization),
        ]
    }
}

/// The assembled LP: minimize `z` subject to `rows`.
#[derive(Debug, Clone)]
pub struct LpProgram {
    pub n_subsets: usize,
    pub rows: Vec<ConstraintRow>,
    pub counts: ConstraintCounts,
}

impl LpProgram {
    pub fn z_column(&self) -> usize {
        self.n_subsets
    }

    pub fn n_columns(&self) -> usize {
        self.n_subsets + 1
    }
}

/// Emit the six constraint families over the admissible universe.
///
/// Families that only touch profile subsets (local domination, optimality,
/// the global greedy bound) must find every key they reference in either
/// mode; a miss is a generation defect and is surfaced as an error.
/// Submodularity and monotonicity skip combinations whose keys fall outside
/// the universe, which is exactly the pruned-mode omission rule.
pub fn generate(ground_set: &GroundSet, universe: &SubsetUniverse) -> Result<LpProgram> {
    let mut rows = Vec::new();
    let mut counts = ConstraintCounts::default();
    let z = universe.len();

    let position = |key: &SubsetKey| -> Result<usize> {
        universe
            .position(key)
            .ok_or_else(|| PriceError::MissingSubset {
                subset: key.clone(),
            })
    };

    // 1. Local greedy domination: each greedy choice, evaluated at its own
    // knowledge prefix, beats the agent's optimal choice and every
    // alternative greedy choice at that same prefix.
    for agent in ground_set.agents() {
        let choices = ground_set.greedy_choices(agent);
        let opt = ground_set.optimal_variable(agent);
        for (prefix, gvar) in choices {
            let lhs = position(&union(prefix, gvar))?;
            rows.push(ConstraintRow::dominates(lhs, position(&union(prefix, opt))?));
            counts.greedy_local += 1;
            for (_, other) in choices {
                if other != gvar {
                    rows.push(ConstraintRow::dominates(lhs, position(&union(prefix, other))?));
                    counts.greedy_local += 1;
                }
            }
        }
    }

    // 2. Optimality ceiling: f(P*) = 1 and f(P*) dominates every other
    // admissible subset.
    let p_star = position(&ground_set.optimal_profile())?;
    rows.push(ConstraintRow {
        terms: vec![(p_star, 1.0)],
        sense: Sense::Eq,
        rhs: 1.0,
    });
    counts.optimality += 1;
    for idx in 0..universe.len() {
        if idx != p_star {
            rows.push(ConstraintRow::dominates(p_star, idx));
            counts.optimality += 1;
        }
    }

    // 3. Global greedy bound: z sits above every all-greedy profile.
    let greedy_lists: Vec<Vec<VarName>> = ground_set
        .agents()
        .map(|agent| {
            ground_set
                .greedy_choices(agent)
                .iter()
                .map(|(_, var)| var.clone())
                .collect()
        })
        .collect();
    for mut profile in cartesian_product(&greedy_lists) {
        profile.sort();
        rows.push(ConstraintRow {
            terms: vec![(position(&profile)?, 1.0), (z, -1.0)],
            sense: Sense::Le,
            rhs: 0.0,
        });
        counts.greedy_global += 1;
    }

    // 4. Submodularity, once per unordered pair {x, y}:
    // f(A ∪ {x}) + f(A ∪ {y}) >= f(A ∪ {x, y}) + f(A).
    let vars = ground_set.variables();
    for (a_idx, a_key) in universe.subsets().iter().enumerate() {
        for (xi, x) in vars.iter().enumerate() {
            if a_key.binary_search(x).is_ok() {
                continue;
            }
            let ax = insert_var(a_key, x);
            let Some(ax_idx) = universe.position(&ax) else {
                continue;
            };
            for y in vars.iter().skip(xi + 1) {
                if a_key.binary_search(y).is_ok() {
                    continue;
                }
                let ay = insert_var(a_key, y);
                let Some(ay_idx) = universe.position(&ay) else {
                    continue;
                };
                let Some(axy_idx) = universe.position(&insert_var(&ax, y)) else {
                    continue;
                };
                rows.push(ConstraintRow {
                    terms: vec![(axy_idx, 1.0), (a_idx, 1.0), (ax_idx, -1.0), (ay_idx, -1.0)],
                    sense: Sense::Le,
                    rhs: 0.0,
                });
                counts.submodularity += 1;
            }
        }
    }

    // 5. Monotonicity: f(A ∪ {x}) >= f(A).
    for (a_idx, a_key) in universe.subsets().iter().enumerate() {
        for x in vars {
            if a_key.binary_search(x).is_ok() {
                continue;
            }
            if let Some(b_idx) = universe.position(&insert_var(a_key, x)) {
                rows.push(ConstraintRow::dominates(b_idx, a_idx));
                counts.monotonicity += 1;
            }
        }
    }

    // 6. Normalization: f(∅) = 0.
    rows.push(ConstraintRow {
        terms: vec![(position(&SubsetKey::new())?, 1.0)],
        sense: Sense::Eq,
        rhs: 0.0,
    });
    counts.normalization += 1;

    Ok(LpProgram {
        n_subsets: universe.len(),
        rows,
        counts,
    })
}

/// Sorted union of a knowledge prefix and a single variable.
fn union(prefix: &[VarName], var: &VarName) -> SubsetKey {
    let mut key: BTreeSet<&VarName> = prefix.iter().collect();
    key.insert(var);
    key.into_iter().cloned().collect()
}

/// Insert `var` into an already-sorted key, keeping it sorted.
fn insert_var(key: &[VarName], var: &VarName) -> SubsetKey {
    let mut out = key.to_vec();
    if let Err(pos) = out.binary_search(var) {
        out.insert(pos, var.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::ground_set::Mode;
    use crate::knowledge::enumerate_knowledge_sets;

    fn program_for(n: u32, edges: &[(u32, u32)], mode: Mode) -> LpProgram {
        let graph = Graph::new(n, edges.iter().copied()).unwrap();
        let knowledge = enumerate_knowledge_sets(&graph).unwrap();
        let ground_set = GroundSet::build(&graph, &knowledge).unwrap();
        let universe = SubsetUniverse::build(&ground_set, mode).unwrap();
        generate(&ground_set, &universe).unwrap()
    }

    #[test]
    fn test_single_agent_counts() {
        // Ground set {x1g1, x1o}, universe of 4 subsets.
        let program = program_for(1, &[], Mode::Full);

        assert_eq!(program.n_subsets, 4);
        assert_eq!(program.counts.greedy_local, 1);
        assert_eq!(program.counts.optimality, 4); // equality + 3 dominance rows
        assert_eq!(program.counts.greedy_global, 1);
        assert_eq!(program.counts.submodularity, 1);
        assert_eq!(program.counts.monotonicity, 4);
        assert_eq!(program.counts.normalization, 1);
        assert_eq!(program.counts.total(), program.rows.len());
    }

    #[test]
    fn test_counts_match_rows_in_both_modes() {
        for mode in [Mode::Full, Mode::Pruned] {
            let program = program_for(3, &[(1, 2), (2, 3)], mode);
            assert_eq!(program.counts.total(), program.rows.len());
            assert!(program.counts.normalization == 1);
        }
    }

    #[test]
    fn test_pruned_omits_constraints_never_rows_outside_universe() {
        let full = program_for(3, &[(1, 2), (2, 3)], Mode::Full);
        let pruned = program_for(3, &[(1, 2), (2, 3)], Mode::Pruned);

        // Profile-only families are identical across modes.
        assert_eq!(full.counts.greedy_local, pruned.counts.greedy_local);
        assert_eq!(full.counts.greedy_global, pruned.counts.greedy_global);
        // Universe-wide families shrink with the universe.
        assert!(pruned.counts.optimality < full.counts.optimality);
        assert!(pruned.counts.submodularity < full.counts.submodularity);
        assert!(pruned.counts.monotonicity < full.counts.monotonicity);

        // Every term stays within the LP's columns.
        for row in &pruned.rows {
            for &(col, _) in &row.terms {
                assert!(col <= pruned.z_column());
            }
        }
    }

    #[test]
    fn test_six_agent_pruned_program_is_consistent() {
        // Larger instance: generation is deterministic, every family's keys
        // resolve, and no term escapes the column range.
        let edges = [(1, 2), (3, 4), (5, 6)];
        let first = program_for(6, &edges, Mode::Pruned);
        let second = program_for(6, &edges, Mode::Pruned);

        assert_eq!(first.counts, second.counts);
        assert_eq!(first.counts.total(), first.rows.len());
        for row in &first.rows {
            for &(col, _) in &row.terms {
                assert!(col <= first.z_column());
            }
        }
    }

    #[test]
    fn test_z_column_is_last() {
        let program = program_for(2, &[(1, 2)], Mode::Full);
        assert_eq!(program.z_column(), 16);
        assert_eq!(program.n_columns(), 17);

        let z_rows = program
            .rows
            .iter()
            .filter(|row| row.terms.iter().any(|&(col, _)| col == 16))
            .count();
        assert_eq!(z_rows, program.counts.greedy_global);
    }

    #[test]
    fn test_insert_var_keeps_order() {
        let key = vec!["x1g1".to_string(), "x2o".to_string()];
        let out = insert_var(&key, &"x1o".to_string());
        assert_eq!(out, vec!["x1g1", "x1o", "x2o"]);
        // Already present: unchanged.
        assert_eq!(insert_var(&key, &"x2o".to_string()), key);
    }
}
