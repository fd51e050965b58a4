use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use huffcost::{calculate_entropy, properties::CoderProperties, stats::randomize_counts, total_cost, CodeTable};

#[derive(Parser, Debug)]
#[command(about = "Canonical Huffman codes and entropy costs of symbol alphabets")]
struct Args {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign canonical codes to comma separated code lengths
    Codes {
        /// Code length of each symbol, 0 for unused symbols
        #[arg(value_delimiter = ',', required = true)]
        lengths: Vec<u32>,
        /// Maximum code length, overrides the properties file
        #[arg(long)]
        max_bits: Option<usize>,
        /// A .properties file with the coder settings
        #[arg(long)]
        properties: Option<PathBuf>,
        /// Print the code table as JSON
        #[arg(long)]
        json: bool,
        /// Also store the code table in binary form
        #[arg(long)]
        bin: Option<PathBuf>,
    },
    /// Estimate the cost in bits of each symbol from comma separated counts
    Entropy {
        /// Occurrences of each symbol
        #[arg(value_delimiter = ',', required = true)]
        counts: Vec<usize>,
        /// Perturb the counts with the seeded generator before costing
        #[arg(long)]
        randomize: bool,
        /// A .properties file with the coder settings
        #[arg(long)]
        properties: Option<PathBuf>,
        /// Print the costs as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct EntropyReport {
    bitlengths: Vec<f32>,
    total_bits: f64,
}

fn load_properties(path: Option<PathBuf>) -> huffcost::Result<CoderProperties> {
    match path {
        Some(path) => CoderProperties::load(path),
        None => Ok(CoderProperties::default()),
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Codes { lengths, max_bits, properties, json, bin } => {
            let props = load_properties(properties)?;
            let max_bits = max_bits.unwrap_or(props.max_bits);

            let comp_time = Instant::now();
            let table = CodeTable::from_lengths(&lengths, max_bits)?;
            debug!("assigned codes in {}ns", comp_time.elapsed().as_nanos());

            if let Some(path) = bin {
                fs::write(path, bincode::serialize(&table)?)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                for symbol in 0..table.len() {
                    match table.code(symbol) {
                        Some((code, len)) => println!("{}\t{}\t{:0width$b}", symbol, len, code, width = len as usize),
                        None => println!("{}\t0\t-", symbol),
                    }
                }
            }
        }
        Command::Entropy { mut counts, randomize, properties, json } => {
            if randomize {
                let props = load_properties(properties)?;
                randomize_counts(&mut counts, &mut props.rng());
                debug!(seed = props.seed, "randomized counts");
            }

            let comp_time = Instant::now();
            let bitlengths = calculate_entropy(&counts)?;
            let total_bits = total_cost(&counts, &bitlengths)?;
            debug!("estimated costs in {}ns", comp_time.elapsed().as_nanos());

            if json {
                println!("{}", serde_json::to_string_pretty(&EntropyReport { bitlengths, total_bits })?);
            } else {
                for (symbol, bits) in bitlengths.iter().enumerate() {
                    println!("{}\t{}\t{:.6}", symbol, counts[symbol], bits);
                }
                println!("total\t{:.3} bits", total_bits);
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("huffcost: {}", e);
            ExitCode::FAILURE
        }
    }
}
