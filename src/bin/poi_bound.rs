use clap::{Parser, ValueEnum};
use price_of_information::{
    BatchMode, Graph, Mode, NullSink, PriceOfInformation, Sink, WriteSink, batch,
};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "poi-bound",
    about = "Price-of-information bound for an information-sharing DAG"
)]
struct Args {
    /// Number of agents (ids 1..=n)
    #[arg(long)]
    agents: u32,

    /// Directed edges as from>to pairs, e.g. "1>2,2>3"
    #[arg(long, default_value = "")]
    edges: String,

    /// Which admissible-subset universe to solve over
    #[arg(long, value_enum, default_value_t = CliMode::Full)]
    mode: CliMode,

    /// Solve every forward DAG on the given number of agents instead of a
    /// single graph, and print a summary table
    #[arg(long)]
    all_graphs: bool,

    /// Solver time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Emit single-graph results as JSON
    #[arg(long)]
    json: bool,

    /// Write the per-instance report to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliMode {
    Full,
    Pruned,
    Both,
}

fn parse_edges(input: &str) -> Result<Vec<(u32, u32)>, String> {
    let mut edges = Vec::new();
    for part in input.split(',').filter(|p| !p.trim().is_empty()) {
        let (from, to) = part
            .split_once('>')
            .ok_or_else(|| format!("edge '{part}' is not of the form from>to"))?;
        let from = from
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("edge '{part}': {e}"))?;
        let to = to
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("edge '{part}': {e}"))?;
        edges.push((from, to));
    }
    Ok(edges)
}

fn run(args: &Args) -> Result<(), String> {
    let time_limit = args.time_limit.map(Duration::from_secs_f64);

    if args.all_graphs {
        let graphs = batch::forward_dags(args.agents).map_err(|e| e.to_string())?;
        let batch_mode = match args.mode {
            CliMode::Full => BatchMode::Full,
            CliMode::Pruned => BatchMode::Pruned,
            CliMode::Both => BatchMode::Both,
        };
        eprintln!(
            "Solving {} LPs for {} graphs...",
            args.mode_label(),
            graphs.len()
        );
        let reports = batch::solve_cases(&graphs, batch_mode, time_limit);
        println!("{}", batch::render_summary(&reports));
        return Ok(());
    }

    let edges = parse_edges(&args.edges)?;
    let graph = Graph::new(args.agents, edges).map_err(|e| e.to_string())?;

    let modes: &[Mode] = match args.mode {
        CliMode::Full => &[Mode::Full],
        CliMode::Pruned => &[Mode::Pruned],
        CliMode::Both => &[Mode::Full, Mode::Pruned],
    };

    let mut sink: Box<dyn Sink> = match &args.log {
        Some(path) => {
            let file = File::create(path).map_err(|e| format!("cannot open {path:?}: {e}"))?;
            Box::new(WriteSink::new(file))
        }
        None if args.json => Box::new(NullSink),
        None => Box::new(WriteSink::new(std::io::stdout())),
    };

    for &mode in modes {
        let mut builder = PriceOfInformation::builder(graph.clone()).mode(mode);
        if let Some(limit) = time_limit {
            builder = builder.time_limit(limit);
        }
        let report = builder
            .build()
            .compute(&mut *sink)
            .map_err(|e| e.to_string())?;

        if args.json {
            let value = serde_json::json!({
                "mode": mode.to_string(),
                "status": format!("{:?}", report.status),
                "bound": report.bound,
                "constraints": report.counts.total(),
            });
            println!("{value}");
        } else {
            println!("{mode}: z = {:.6} ({:?})", report.bound, report.status);
        }
    }
    Ok(())
}

impl Args {
    fn mode_label(&self) -> &'static str {
        match self.mode {
            CliMode::Full => "FULL",
            CliMode::Pruned => "PRUNED",
            CliMode::Both => "FULL and PRUNED",
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}
