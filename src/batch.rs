use crate::error::{PriceError, Result};
use crate::graph::Graph;
use crate::ground_set::Mode;
use crate::knowledge::enumerate_knowledge_sets;
use crate::price::PriceOfInformation;
use crate::report::{NullSink, Sink};
use crate::types::AgentId;
use rayon::prelude::*;
use std::time::Duration;

/// Which LPs each batch case solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Full,
    Pruned,
    Both,
}

/// Outcome of one batch case. Failures stay local to the case.
#[derive(Debug)]
pub struct CaseReport {
    /// 1-based case number, following input order.
    pub case: usize,
    pub full: Option<std::result::Result<f64, PriceError>>,
    pub pruned: Option<std::result::Result<f64, PriceError>>,
}

/// Every graph on `n` agents built from a non-empty subset of the forward
/// edges `{(i, j) : i < j}`. Forward edges cannot form a cycle, so every
/// member is a DAG. Exponential in `n * (n - 1) / 2`.
pub fn forward_dags(n: AgentId) -> Result<Vec<Graph>> {
    let edges: Vec<(AgentId, AgentId)> = (1..=n)
        .flat_map(|i| ((i + 1)..=n).map(move |j| (i, j)))
        .collect();
    // Edge subsets are walked as u64 bitmasks.
    if edges.len() > 63 {
        return Err(PriceError::EnumerationOverflow {
            elements: edges.len(),
        });
    }

    let mut graphs = Vec::with_capacity((1usize << edges.len()) - 1);
    for mask in 1u64..(1u64 << edges.len()) {
        let subset: Vec<(AgentId, AgentId)> = edges
            .iter()
            .enumerate()
            .filter(|(k, _)| mask >> k & 1 == 1)
            .map(|(_, &edge)| edge)
            .collect();
        graphs.push(Graph::new(n, subset)?);
    }
    Ok(graphs)
}

/// Solve a batch of independent graph instances in parallel, discarding
/// per-case reports.
pub fn solve_cases(
    graphs: &[Graph],
    mode: BatchMode,
    time_limit: Option<Duration>,
) -> Vec<CaseReport> {
    solve_cases_with(graphs, mode, time_limit, |_, _| NullSink)
}

/// Solve a batch of independent graph instances in parallel, giving each
/// (case, mode) run its own report sink.
///
/// Knowledge sets are enumerated once per case and shared between the full
/// and pruned runs. A failing case records its error and the rest of the
/// batch continues.
pub fn solve_cases_with<S, F>(
    graphs: &[Graph],
    mode: BatchMode,
    time_limit: Option<Duration>,
    make_sink: F,
) -> Vec<CaseReport>
where
    S: Sink,
    F: Fn(usize, Mode) -> S + Sync,
{
    graphs
        .par_iter()
        .enumerate()
        .map(|(idx, graph)| {
            let case = idx + 1;
            let knowledge = enumerate_knowledge_sets(graph);

            let run = |lp_mode: Mode| -> std::result::Result<f64, PriceError> {
                let mut builder = PriceOfInformation::builder(graph.clone()).mode(lp_mode);
                if let Some(limit) = time_limit {
                    builder = builder.time_limit(limit);
                }
                // A cyclic case fails identically inside compute.
                if let Ok(map) = &knowledge {
                    builder = builder.knowledge(map.clone());
                }
                let mut sink = make_sink(case, lp_mode);
                builder.build().compute(&mut sink).map(|report| report.bound)
            };

            CaseReport {
                case,
                full: matches!(mode, BatchMode::Full | BatchMode::Both)
                    .then(|| run(Mode::Full)),
                pruned: matches!(mode, BatchMode::Pruned | BatchMode::Both)
                    .then(|| run(Mode::Pruned)),
            }
        })
        .collect()
}

#[cfg(feature = "serde")]
pub use summary::{SummaryRow, render_summary, summary_rows, write_summary_csv};

#[cfg(feature = "serde")]
mod summary {
    use super::CaseReport;
    use crate::error::{PriceError, Result};
    use serde::Serialize;
    use tabled::{Table, Tabled};

    /// One rendered summary line per batch case.
    #[derive(Debug, Clone, Serialize, Tabled)]
    pub struct SummaryRow {
        #[tabled(rename = "Case")]
        pub case: usize,
        #[tabled(rename = "Full LP")]
        pub full: String,
        #[tabled(rename = "Pruned LP")]
        pub pruned: String,
    }

    fn cell(outcome: &Option<std::result::Result<f64, PriceError>>) -> String {
        match outcome {
            None => "-".to_string(),
            Some(Ok(bound)) => format!("{bound:.6}"),
            Some(Err(e)) => format!("error: {e}"),
        }
    }

    pub fn summary_rows(reports: &[CaseReport]) -> Vec<SummaryRow> {
        reports
            .iter()
            .map(|report| SummaryRow {
                case: report.case,
                full: cell(&report.full),
                pruned: cell(&report.pruned),
            })
            .collect()
    }

    /// Render the batch summary as a plain-text table.
    pub fn render_summary(reports: &[CaseReport]) -> String {
        Table::new(summary_rows(reports)).to_string()
    }

    /// Export the batch summary as CSV.
    pub fn write_summary_csv<W: std::io::Write>(reports: &[CaseReport], out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        for row in summary_rows(reports) {
            writer
                .serialize(row)
                .map_err(|e| PriceError::Export(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| PriceError::Export(e.to_string()))?;
        Ok(())
    }
}
