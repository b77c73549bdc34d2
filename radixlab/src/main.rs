/*!
# Radix Lab

Command-line front end for the radix core: converts numbers between binary,
octal, decimal and hexadecimal with arbitrary precision, explains each
conversion step by step, and drives a 32-bit two's-complement bit field.

## Features

- Exact conversion of values of any size (no 64-bit truncation)
- Derivation traces (repeated division, positional expansion)
- 32-bit manipulator: toggle, NOT, logical shifts, rotates, set/clear all
- Text or JSON output, configurable through a TOML file

## Usage

### Convert
```bash
radixlab convert 18446744073709551616 --from dec --explain
```

### Explain a single pair
```bash
radixlab explain 1aF --from hex --to bin --html
```

### Bit manipulation
```bash
radixlab bits --value -1 shl ror toggle:0
```
*/

use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser, Subcommand};
use radix_core::{convert, explain, explain_all, BitField32, BitOp, Radix};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{AppConfig, OutputFormat};

#[derive(Parser)]
#[command(name = "radixlab")]
#[command(about = "Exact multi-base number converter and 32-bit bit manipulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "radixlab.toml")]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a digit string into all four radices
    Convert {
        /// Digits to convert (empty string clears all fields)
        #[arg(allow_hyphen_values = true)]
        digits: String,

        /// Radix the digits are written in (bin, oct, dec, hex)
        #[arg(short, long, default_value = "dec")]
        from: Radix,

        /// Also print how to get to each other radix
        #[arg(short, long)]
        explain: bool,
    },

    /// Show the arithmetic behind one conversion
    Explain {
        /// Digits to explain
        #[arg(allow_hyphen_values = true)]
        digits: String,

        /// Source radix
        #[arg(short, long)]
        from: Radix,

        /// Target radix
        #[arg(short, long)]
        to: Radix,

        /// Use <sup>/<sub> markup for positions
        #[arg(long)]
        html: bool,
    },

    /// Apply bit operations to a 32-bit field
    Bits {
        /// Starting integer value (any size, wraps modulo 2^32; 0x/0o/0b prefixes allowed)
        #[arg(long, allow_hyphen_values = true)]
        value: Option<String>,

        /// Operations in order: not, shl, shr, rol, ror, set-all, clear, toggle:N, set:N
        ops: Vec<BitOp>,
    },

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "radixlab.toml")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("⚠️ Failed to load config, using defaults: {:#}", e);
            AppConfig::new()
        }
    };

    init_logging(cli.verbose, &config.log_level);
    debug!(config = %cli.config.display(), "configuration loaded");

    let json = cli.json || config.output.format == OutputFormat::Json;

    match cli.command {
        Commands::Convert { digits, from, explain } => {
            run_convert(&digits, from, explain || config.output.explain, json, &config)
        }

        Commands::Explain { digits, from, to, html } => {
            run_explain(&digits, from, to, html || config.output.html, json)
        }

        Commands::Bits { value, ops } => run_bits(value.as_deref(), &ops, json, &config),

        Commands::Config { output } => generate_config_file(output),
    }
}

/// Initialize logging to stderr to keep stdout clean for results
fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("radixlab={level},radix_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Convert and print all four renderings
fn run_convert(
    digits: &str,
    from: Radix,
    with_explain: bool,
    json: bool,
    config: &AppConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    info!("🔢 Converting {:?} from {}", digits, from.label());

    let result = convert(from, digits);

    // Traces are only meaningful for a valid, non-empty value
    let traces = if with_explain && result.is_ok() {
        explain_all(from, digits)?
    } else {
        Vec::new()
    };

    if json {
        println!("{}", render::conversion_json(&result, &traces)?);
    } else {
        println!("{}", render::conversion_text(&result));
        if !traces.is_empty() {
            println!();
            println!("{}", render::traces_text(&traces, config.output.html));
        }
    }

    // The error line is already part of the rendered output
    if result.error().is_some() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Explain a single source → target conversion
fn run_explain(
    digits: &str,
    from: Radix,
    to: Radix,
    html: bool,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    info!("📖 Explaining {} → {} for {:?}", from.label(), to.label(), digits);

    let trace = match explain(from, to, digits) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("{}", render::error_text(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!("{}", render::trace_json(&trace)?);
    } else {
        println!("{}", render::trace_text(&trace, html));
    }

    Ok(ExitCode::SUCCESS)
}

/// Build the starting field, apply each op in order, print the final state
fn run_bits(
    value: Option<&str>,
    ops: &[BitOp],
    json: bool,
    config: &AppConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let start = match value {
        None => BitField32::zeroed(),
        Some(text) => BitField32::try_parse_integer(text).unwrap_or_else(|| {
            warn!("⚠️ Could not parse {:?} as an integer, starting from zero", text);
            BitField32::zeroed()
        }),
    };

    let field = ops.iter().fold(start, |field, op| field.apply(op));
    info!("🧮 Applied {} operation(s): 0x{} → 0x{}", ops.len(), start.hex(), field.hex());

    if json {
        println!("{}", render::bits_json(field)?);
    } else {
        println!("{}", render::bits_text(field, config.group_width(), config.bits.show_binary));
    }

    Ok(ExitCode::SUCCESS)
}

/// Generate a default configuration file
fn generate_config_file(output_path: PathBuf) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = AppConfig::new();
    config.save_to_file(&output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   radixlab --config {} convert 42", output_path.display());

    Ok(ExitCode::SUCCESS)
}
