mod report;
mod stp;

use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, Command};
use log::{info, warn};
use report::{FileStats, Report, Summary};
use serde_json::{Map, Value};
use sfp_algorithms::steiner_forest::grasp::{Grasp, Hyperparameters};
use sfp_challenges::steiner_forest::{Problem, Track};
use sfp_utils::{dejsonify, jsonify_pretty};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

fn cli() -> Command {
    Command::new("sfp-runtime")
        .about("Solves and generates Steiner Forest instances")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("solve")
                .about("Solves an instance file, or every instance under a directory")
                .arg(
                    arg!(<PATH> "Path to a .stp/.json file or a directory")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--alpha [ALPHA] "Share of the candidate list eligible at each step")
                        .default_value("1.0")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--iterations [ITERATIONS] "Number of GRASP iterations")
                        .default_value("50")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--seed [SEED] "Seed for reproducible runs")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--sweep "Try alpha 0.0, 0.1 .. 1.0 and keep the best")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--hyperparameters [HYPERPARAMETERS] "Hyperparameters json string or path to json file. Overrides --alpha, --iterations and --seed")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--format [FORMAT] "Report format")
                        .default_value("markdown")
                        .value_parser(["markdown", "json"]),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generates a random connected instance in STP format")
                .arg(
                    arg!(--seed [SEED] "Generator seed")
                        .default_value("0")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--nodes [NODES] "Number of nodes")
                        .default_value("100")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--edges [EDGES] "Number of undirected edges")
                        .default_value("250")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--pairs [PAIRS] "Number of terminal pairs")
                        .default_value("10")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"max-weight" [MAX_WEIGHT] "Largest edge weight")
                        .default_value("100")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the instance is written to this path instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("solve", sub_m)) => solve(
            sub_m.get_one::<PathBuf>("PATH").unwrap().clone(),
            Hyperparameters {
                alpha: *sub_m.get_one::<f64>("alpha").unwrap(),
                iterations: *sub_m.get_one::<usize>("iterations").unwrap(),
                seed: sub_m.get_one::<u64>("seed").copied(),
            },
            sub_m.get_one::<String>("hyperparameters").cloned(),
            sub_m.get_flag("sweep"),
            sub_m.get_one::<String>("format").unwrap() == "json",
        ),
        Some(("generate", sub_m)) => generate(
            *sub_m.get_one::<u64>("seed").unwrap(),
            Track {
                num_nodes: *sub_m.get_one::<usize>("nodes").unwrap(),
                num_edges: *sub_m.get_one::<usize>("edges").unwrap(),
                num_terminal_pairs: *sub_m.get_one::<usize>("pairs").unwrap(),
                max_weight: *sub_m.get_one::<u32>("max-weight").unwrap(),
            },
            sub_m.get_one::<PathBuf>("output").cloned(),
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

pub fn solve(
    path: PathBuf,
    hyperparameters: Hyperparameters,
    hyperparameters_json: Option<String>,
    sweep: bool,
    json: bool,
) -> Result<()> {
    let hyperparameters = match hyperparameters_json {
        Some(s) => Hyperparameters::from_map(&Some(load_hyperparameters(&s)?))?,
        None => {
            hyperparameters.validate()?;
            hyperparameters
        }
    };

    let is_dir = path.is_dir();
    let files = if is_dir {
        let mut files = Vec::new();
        collect_instance_files(&path, &mut files)?;
        files.sort();
        if files.is_empty() {
            return Err(anyhow!("No instance files found in {}", path.display()));
        }
        files
    } else {
        vec![path.clone()]
    };

    if !json {
        println!("{}", report::markdown_header());
    }
    let mut results = Vec::with_capacity(files.len());
    for file in &files {
        match solve_file(file, &hyperparameters, sweep) {
            Ok(stats) => {
                if !json {
                    println!("{}", report::markdown_row(&stats));
                }
                results.push(stats);
            }
            // a broken file only aborts a single-file run
            Err(e) if is_dir => warn!("Skipping {}: {}", file.display(), e),
            Err(e) => return Err(e),
        }
    }

    let summary = if is_dir {
        Summary::from_stats(&stp::file_name(&path), &results)
    } else {
        None
    };
    if json {
        let report = Report {
            files: results,
            summary,
        };
        println!("{}", jsonify_pretty(&report)?);
    } else if let Some(summary) = summary {
        println!();
        println!("{}", summary.to_markdown());
    }
    Ok(())
}

pub fn generate(seed: u64, track: Track, output_file: Option<PathBuf>) -> Result<()> {
    let mut seed_bytes = [0u8; 32];
    seed_bytes[..8].copy_from_slice(&seed.to_le_bytes());
    let problem = Problem::generate_instance(&seed_bytes, &track)?;
    let text = stp::write(&problem.to_instance());
    match output_file {
        Some(path) => {
            fs::write(&path, text)
                .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
            info!("{} written to {}", problem.name(), path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn solve_file(path: &Path, hyperparameters: &Hyperparameters, sweep: bool) -> Result<FileStats> {
    let instance = stp::load(path)?;
    let problem = Problem::from_instance(&instance)?;
    let file = stp::file_name(path);
    if !sweep {
        return run(&problem, &file, *hyperparameters);
    }

    let mut best: Option<FileStats> = None;
    for step in 0..=10 {
        let stats = run(
            &problem,
            &file,
            Hyperparameters {
                alpha: step as f64 / 10.0,
                ..*hyperparameters
            },
        )?;
        if best.as_ref().map_or(true, |b| stats.is_better_than(b)) {
            best = Some(stats);
        }
    }
    best.ok_or_else(|| anyhow!("Alpha sweep produced no result"))
}

fn run(problem: &Problem, file: &str, hyperparameters: Hyperparameters) -> Result<FileStats> {
    let grasp = Grasp::new(hyperparameters)?;
    let start = Instant::now();
    let solution = grasp.solve(problem)?;
    let time_ms = start.elapsed().as_secs_f64() * 1000.0;
    let cost = problem.evaluate_total_weight(&solution)?;
    info!("{} solved with alpha {}: {}", file, hyperparameters.alpha, cost);
    Ok(FileStats {
        file: file.to_string(),
        num_nodes: problem.num_nodes(),
        num_terminal_pairs: problem.terminal_pairs().len(),
        cost,
        graph_weight: problem.graph().total_weight(),
        time_ms,
        alpha: hyperparameters.alpha,
        solution: solution.to_data(),
    })
}

fn collect_instance_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).map_err(|e| anyhow!("Could not open directory {}: {}", dir.display(), e))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_instance_files(&path, files)?;
        } else if stp::is_instance_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn load_hyperparameters(hyperparameters: &str) -> Result<Map<String, Value>> {
    let hyperparameters = if hyperparameters.ends_with(".json") {
        fs::read_to_string(hyperparameters)
            .map_err(|e| anyhow!("Failed to read hyperparameters file {}: {}", hyperparameters, e))?
    } else {
        hyperparameters.to_string()
    };
    dejsonify::<Map<String, Value>>(&hyperparameters)
        .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e))
}
