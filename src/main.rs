use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::info;

use kaku_core::{Position, divide};
use kaku_engine::{SearchConfig, SolveConfig, Solver};
use kaku_usi::UsiEngine;

const USAGE: &str = "usage: kaku [solve <file> [depth] [seconds] | perft <depth> [sfen]]";

fn main() -> Result<()> {
    // stdout belongs to the protocol.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {
            info!("kaku starting");
            UsiEngine::new(SearchConfig::default()).run()?;
        }
        Some("solve") => solve(&args[1..])?,
        Some("perft") => perft(&args[1..])?,
        Some(other) => bail!("unknown command {other:?}\n{USAGE}"),
    }
    Ok(())
}

fn solve(args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        bail!(USAGE);
    };
    let mut config = SolveConfig::default();
    if let Some(depth) = args.get(1) {
        config.max_depth = depth.parse().with_context(|| format!("invalid depth {depth:?}"))?;
    }
    if let Some(seconds) = args.get(2) {
        let seconds: f64 = seconds.parse().with_context(|| format!("invalid time {seconds:?}"))?;
        if !(seconds.is_finite() && seconds > 0.0) {
            bail!("time must be a positive number of seconds");
        }
        config.time_limit = Duration::from_secs_f64(seconds);
    }

    let summary = Solver::new(config).solve_file(&PathBuf::from(path))?;
    println!("{summary}");
    Ok(())
}

fn perft(args: &[String]) -> Result<()> {
    let Some(depth) = args.first() else {
        bail!(USAGE);
    };
    let depth: usize = depth.parse().with_context(|| format!("invalid depth {depth:?}"))?;
    let mut position = match args.get(1..) {
        Some(rest) if !rest.is_empty() => rest.join(" ").parse::<Position>()?,
        _ => Position::starting_position(),
    };

    let start = Instant::now();
    let mut total = 0;
    for (mv, nodes) in divide(&mut position, depth) {
        println!("{mv}: {nodes}");
        total += nodes;
    }
    println!("\nnodes {total} time {}ms", start.elapsed().as_millis());
    Ok(())
}
