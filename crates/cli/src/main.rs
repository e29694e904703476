//! Tomasulo simulator CLI.
//!
//! This binary runs programs through the simulator and prints the result. It provides:
//! 1. **Run:** Simulate an assembly file and print every cycle, the timeline and stats.
//! 2. **Template:** Same as run, for one of the built-in example programs.
//! 3. **Parse:** List the instructions of a file with their English descriptions.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (e.g. `RUST_LOG=debug`).

use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tomasim_core::isa::describe;
use tomasim_core::{Completion, Config, Simulation, Template, simulate_source};

#[derive(Parser, Debug)]
#[command(
    name = "tomasim",
    author,
    version,
    about = "Cycle-accurate Tomasulo out-of-order execution simulator",
    long_about = "Simulate a small RISC-V-like program on a Tomasulo machine and print every cycle.\n\nExamples:\n  tomasim run program.s\n  tomasim run program.s --config machine.json --max-cycles 40\n  tomasim template loop --json\n  tomasim parse program.s"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate an assembly file.
    Run {
        /// Assembly source file.
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Simulate a built-in example program (default, raw, war, waw, loop).
    Template {
        /// Template name.
        name: Template,

        /// Print the template source instead of simulating it.
        #[arg(long)]
        source: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the instructions of an assembly file with their descriptions.
    Parse {
        /// Assembly source file.
        file: PathBuf,
    },
}

/// Options shared by the simulating subcommands.
#[derive(Args, Debug)]
struct OutputArgs {
    /// JSON configuration file (station pool, cycle cap, queue window).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the cycle cap.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Print the whole run as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Print only the timeline and statistics, not every cycle.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, output } => {
            let source = read_source(&file);
            cmd_simulate(&source, &output);
        }
        Commands::Template {
            name,
            source,
            output,
        } => {
            if source {
                println!("{}", name.source());
            } else {
                cmd_simulate(name.source(), &output);
            }
        }
        Commands::Parse { file } => cmd_parse(&read_source(&file)),
    }
}

/// Reads a source file, exiting with code 1 when it cannot be read.
fn read_source(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    })
}

/// Loads the configuration and applies command-line overrides.
///
/// Exits with code 2 when the configuration file is unreadable or invalid.
fn load_config(args: &OutputArgs) -> Config {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config {}: {e}", path.display());
                process::exit(2);
            });
            Config::from_json(&json).unwrap_or_else(|e| {
                eprintln!("Error in config {}: {e}", path.display());
                process::exit(2);
            })
        }
        None => Config::default(),
    };
    if let Some(max) = args.max_cycles {
        config.general.max_cycles = max;
    }
    debug!(?config, "configuration loaded");
    config
}

/// Simulates `source` and prints the run.
fn cmd_simulate(source: &str, args: &OutputArgs) {
    let config = load_config(args);
    let sim = simulate_source(source, &config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    if args.json {
        match serde_json::to_string_pretty(&sim) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing simulation: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if !args.quiet {
        print_cycles(&sim);
    }
    print_timeline(&sim);
    println!();
    print!("{}", sim.stats);
    if sim.completion == Completion::CycleLimit {
        println!(
            "\n[!] Stopped after {} cycles; the program did not finish.",
            sim.stats.cycles
        );
    }
}

/// Prints the narration and the state dump of every cycle.
fn print_cycles(sim: &Simulation) {
    for (state, steps) in sim.states.iter().zip(&sim.traces) {
        for step in steps {
            println!("  > {}", step.narration);
        }
        println!("{state}");
    }
}

/// Prints which action each instruction performed in each cycle.
fn print_timeline(sim: &Simulation) {
    let timeline = sim.timeline();
    let width = sim
        .listing
        .instructions
        .iter()
        .map(|inst| inst.line.len())
        .max()
        .unwrap_or(0);

    print!("{:width$} ", "", width = width);
    for cycle in 1..sim.states.len() {
        print!("{cycle:>7}");
    }
    println!();

    for (inst, row) in sim.listing.instructions.iter().zip(&timeline) {
        print!("{:width$} ", inst.line, width = width);
        for action in row.iter().skip(1) {
            match action {
                Some(action) => print!("{:>7}", action.to_string()),
                None => print!("{:>7}", "."),
            }
        }
        println!();
    }
}

/// Prints every parsed instruction with its description and the section table.
fn cmd_parse(source: &str) {
    let Some(listing) = tomasim_core::isa::parse(source) else {
        eprintln!("Error: the source contains no recognizable instruction");
        process::exit(1);
    };

    for inst in &listing.instructions {
        println!("{:>3}  {:<28} {}", inst.code_order, inst.line, describe(inst));
    }

    println!();
    for name in &listing.section_order {
        let members: Vec<String> = listing
            .section(name)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("{name}: [{}]", members.join(", "));
    }

    if !listing.initial_values.is_empty() {
        println!();
        for (register, value) in &listing.initial_values {
            println!("{register} = {value}");
        }
    }
}
