//! Kuhn Poker solver binary.
//!
//! Usage:
//!   cargo run --release --bin solve_kuhn -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>      SolverConfig JSON file (optional)
//!   --sampler <NAME>     chance | robust (default: chance)
//!   --k <N>              Actions explored per traverser node with robust sampling (default: 2)
//!   --discount <NAME>    vanilla | cfr+ | linear | dcfr (default: vanilla)
//!   --iterations <N>     Number of iterations (default: 100000)
//!   --seed <N>           Random seed (optional)
//!   --checkpoint <FILE>  Checkpoint file for the policy table (optional)
//!   --resume             Continue from the checkpoint file
//!   --output <FILE>      Output file (default: kuhn_strategy.json)
//!   --progress           Show a progress bar

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use mccfr_solver::cfr::{
    expected_value, ChanceSampling, DiscountParams, PolicyTable, RobustSampling, Sampler,
    SamplingScheme, SolverConfig, StrategyKind, StrategyProfile, Trainer,
};
use mccfr_solver::games::kuhn::{KuhnAction, KuhnNode};
use mccfr_solver::{NodeStrategy, Result};

const DEFAULT_CHECKPOINT_INTERVAL: u64 = 10_000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut config_file: Option<String> = None;
    let mut sampler: Option<String> = None;
    let mut k: usize = 2;
    let mut discount: Option<String> = None;
    let mut iterations: u64 = 100_000;
    let mut seed: Option<u64> = None;
    let mut checkpoint: Option<String> = None;
    let mut resume = false;
    let mut output_file = "kuhn_strategy.json".to_string();
    let mut progress = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--sampler" => {
                i += 1;
                if i < args.len() {
                    sampler = Some(args[i].clone());
                }
            }
            "--k" | "-k" => {
                i += 1;
                if i < args.len() {
                    k = args[i].parse().unwrap_or(2);
                }
            }
            "--discount" | "-d" => {
                i += 1;
                if i < args.len() {
                    discount = Some(args[i].clone());
                }
            }
            "--iterations" | "-i" => {
                i += 1;
                if i < args.len() {
                    iterations = args[i].parse().unwrap_or(100_000);
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--checkpoint" => {
                i += 1;
                if i < args.len() {
                    checkpoint = Some(args[i].clone());
                }
            }
            "--resume" => {
                resume = true;
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--progress" | "-p" => {
                progress = true;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    // Load or create configuration; command-line flags win.
    let mut config = match &config_file {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return;
            }
        },
        None => SolverConfig::default(),
    };
    match sampler.as_deref() {
        Some("chance") => config.sampling = SamplingScheme::Chance,
        Some("robust") => config.sampling = SamplingScheme::Robust { k },
        Some(other) => {
            eprintln!("Unknown sampler: {}", other);
            return;
        }
        None => {}
    }
    if let Some(name) = discount.as_deref() {
        config.discount = match parse_discount(name) {
            Some(params) => params,
            None => {
                eprintln!("Unknown discount schedule: {}", name);
                return;
            }
        };
    }
    if let Some(s) = seed {
        config = config.with_seed(s);
    }
    if checkpoint.is_some() && config.checkpoint_interval.is_none() {
        config = config.with_checkpoint_interval(DEFAULT_CHECKPOINT_INTERVAL);
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return;
    }

    println!("=================================================");
    println!("  Kuhn Poker MCCFR Solver");
    println!("=================================================");
    println!();
    println!("Sampler: {:?}", config.sampling);
    println!("Discount: {:?}", config.discount);
    println!("Iterations: {}", iterations);
    if let Some(s) = config.seed {
        println!("Seed: {}", s);
    }
    println!("Output: {}", output_file);
    println!();

    let table = if resume {
        let Some(path) = &checkpoint else {
            eprintln!("--resume needs --checkpoint <FILE>");
            return;
        };
        match PolicyTable::<DiscountParams>::load_from_file(path) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("Error loading checkpoint: {}", e);
                return;
            }
        }
    } else {
        PolicyTable::new(config.discount)
    };

    let run = Run {
        config: &config,
        iterations,
        checkpoint: checkpoint.as_deref().map(Path::new),
        progress,
    };
    let table = match config.sampling {
        SamplingScheme::Chance => {
            let sampler = match config.seed {
                Some(s) => ChanceSampling::with_seed(table, s),
                None => ChanceSampling::new(table),
            };
            run.train(sampler).map(ChanceSampling::into_profile)
        }
        SamplingScheme::Robust { k } => {
            let sampler = match config.seed {
                Some(s) => RobustSampling::with_seed(table, k, s),
                None => RobustSampling::new(table, k),
            };
            run.train(sampler).map(RobustSampling::into_profile)
        }
    };
    let table = match table {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Training failed: {}", e);
            return;
        }
    };

    print_strategies(&table);

    let value = expected_value(KuhnNode::new(), 0, &table, StrategyKind::Average);
    println!();
    println!("Player 1 EV: {:.4} (equilibrium: {:.4})", value, -1.0 / 18.0);
    println!();

    // Export results
    println!("Exporting results to {}...", output_file);
    match save_export(&table, &output_file) {
        Ok(_) => println!("Results saved successfully!"),
        Err(e) => eprintln!("Error saving results: {}", e),
    }
}

struct Run<'a> {
    config: &'a SolverConfig,
    iterations: u64,
    checkpoint: Option<&'a Path>,
    progress: bool,
}

impl Run<'_> {
    fn train<S>(&self, sampler: S) -> Result<S>
    where
        S: Sampler<Profile = PolicyTable>,
    {
        let mut trainer = Trainer::new(sampler).with_progress(self.progress);
        if let (Some(path), Some(interval)) = (self.checkpoint, self.config.checkpoint_interval) {
            trainer = trainer.with_checkpoint(path, interval);
        }

        let report_interval = (self.iterations / 10).max(1000);
        let stats = trainer.train_with_callback(KuhnNode::new, self.iterations, report_interval, |stats, table| {
            println!(
                "Iteration {:>8} | Info sets: {:>3} | Mean value: {:>7.4} | Speed: {:>8.0} it/s | Elapsed: {:>6.1}s",
                table.iter() - 1,
                stats.info_sets,
                stats.mean_value,
                stats.iterations_per_second,
                stats.elapsed_seconds
            );
        })?;

        println!();
        println!("Training complete!");
        println!("Total time: {:.2}s", stats.elapsed_seconds);
        println!("Average speed: {:.0} iterations/second", stats.iterations_per_second);
        println!();
        Ok(trainer.into_sampler())
    }
}

fn load_config(path: &str) -> std::result::Result<SolverConfig, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

fn parse_discount(name: &str) -> Option<DiscountParams> {
    match name {
        "vanilla" => Some(DiscountParams::Vanilla),
        "cfr+" | "rm+" => Some(DiscountParams::RegretMatchingPlus),
        "linear" => Some(DiscountParams::Linear),
        "dcfr" => Some(DiscountParams::dcfr()),
        _ => None,
    }
}

fn print_strategies(table: &PolicyTable) {
    println!("=== Average Strategies ===");
    println!();

    let mut keys: Vec<&[u8]> = table.keys().collect();
    keys.sort();
    for key in keys {
        let Some(policy) = table.get(key) else {
            continue;
        };
        let key = String::from_utf8_lossy(key).into_owned();
        let (card, history) = key.split_once(':').unwrap_or((key.as_str(), ""));
        let card = card.parse().map(KuhnNode::card_name).unwrap_or("?");
        let facing_bet = history.ends_with('b');

        print!("{:<6} {:<3}", card, history);
        for (action, prob) in KuhnAction::ALL.iter().zip(policy.average_strategy()) {
            let name = match (action, facing_bet) {
                (KuhnAction::Pass, true) => "Fold".to_string(),
                (KuhnAction::Bet, true) => "Call".to_string(),
                _ => action.to_string(),
            };
            print!("  {}: {:>5.1}%", name, prob * 100.0);
        }
        println!();
    }
}

fn save_export(table: &PolicyTable, path: &str) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &table.export_average_strategies())?;
    Ok(())
}

fn print_help() {
    println!("Kuhn Poker MCCFR Solver");
    println!();
    println!("Usage: solve_kuhn [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>      SolverConfig JSON file");
    println!("  --sampler <NAME>         chance | robust (default: chance)");
    println!("  -k, --k <N>              Actions per traverser node for robust sampling (default: 2)");
    println!("  -d, --discount <NAME>    vanilla | cfr+ | linear | dcfr (default: vanilla)");
    println!("  -i, --iterations <N>     Number of iterations (default: 100000)");
    println!("  -s, --seed <N>           Random seed");
    println!("  --checkpoint <FILE>      Save the policy table here during training");
    println!("  --resume                 Continue from the checkpoint file");
    println!("  -o, --output <FILE>      Output file (default: kuhn_strategy.json)");
    println!("  -p, --progress           Show a progress bar");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Robust sampling with DCFR");
    println!("  solve_kuhn --sampler robust --k 2 --discount dcfr --iterations 200000");
    println!();
    println!("  # Checkpoint every 10k iterations, then resume");
    println!("  solve_kuhn --iterations 50000 --checkpoint kuhn.bin");
    println!("  solve_kuhn --iterations 50000 --checkpoint kuhn.bin --resume");
}
