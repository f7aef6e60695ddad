//! Command-line interface for the Ember language.

mod colors;
mod config;
mod repl;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use ember_core::debug::disassemble_chunk;
use ember_core::Heap;
use ember_vm::{InterpretResult, VM};
use tracing_subscriber::EnvFilter;

use colors::{bold, gray, green, red, status_label};
use config::{EmberConfig, CONFIG_FILE};

/// sysexits-style process exit codes.
const EXIT_COMPILE_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;
const EXIT_IO_ERROR: i32 = 74;

#[derive(ClapParser)]
#[command(name = "ember", version, about = "The Ember scripting language")]
struct Cli {
    /// Log every executed instruction with the stack contents
    #[arg(long, global = true)]
    trace: bool,

    /// Use this config file instead of searching for ember.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and run a script
    Run {
        /// Path to the script
        #[arg()]
        file: PathBuf,
    },
    /// Compile a script and report diagnostics without running it
    Check {
        #[arg()]
        file: PathBuf,
    },
    /// Print the bytecode a script compiles to
    Disasm {
        #[arg()]
        file: PathBuf,
    },
    /// Start an interactive REPL
    Repl,
    /// Create an ember.toml config file in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    match cli.command {
        Commands::Run { file } => cmd_run(&file, cli.config.as_deref()),
        Commands::Check { file } => cmd_check(&file),
        Commands::Disasm { file } => cmd_disasm(&file),
        Commands::Repl => cmd_repl(cli.config.as_deref()),
        Commands::Init => cmd_init(),
    }
}

/// `--trace` wins over `EMBER_LOG`; the default shows warnings only.
fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("ember_vm=trace,ember_compiler=debug")
    } else {
        EnvFilter::try_from_env("EMBER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn exit_code(result: InterpretResult) -> i32 {
    match result {
        InterpretResult::Ok => 0,
        InterpretResult::CompileError => EXIT_COMPILE_ERROR,
        InterpretResult::RuntimeError => EXIT_RUNTIME_ERROR,
    }
}

fn read_source(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!(
            "{} cannot read file '{}': {}",
            red("error:"),
            bold(&path.display().to_string()),
            e
        );
        process::exit(EXIT_IO_ERROR);
    })
}

fn load_config(explicit: Option<&Path>) -> EmberConfig {
    match EmberConfig::load(explicit) {
        Ok((path, cfg)) => {
            if let Some(path) = path {
                tracing::debug!(path = %path.display(), "loaded config");
            }
            cfg
        }
        Err(e) => {
            eprintln!("{} {}", red("error:"), e);
            process::exit(EXIT_IO_ERROR);
        }
    }
}

fn cmd_run(file: &Path, config_path: Option<&Path>) {
    let source = read_source(file);
    let config = load_config(config_path);
    let mut vm = VM::new(config.vm_config());
    let code = exit_code(vm.interpret(&source));
    if code != 0 {
        process::exit(code);
    }
}

fn cmd_check(file: &Path) {
    let source = read_source(file);
    let filename = file.display().to_string();
    let mut heap = Heap::new();
    match ember_compiler::compile(&source, &mut heap) {
        Ok(_) => {
            println!("{} {} {}", green("✓"), bold(&filename), gray("no errors found"));
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_COMPILE_ERROR);
        }
    }
}

fn cmd_disasm(file: &Path) {
    let source = read_source(file);
    let filename = file.display().to_string();
    let mut heap = Heap::new();
    match ember_compiler::compile(&source, &mut heap) {
        Ok(chunk) => print!("{}", disassemble_chunk(&chunk, &heap, &filename)),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_COMPILE_ERROR);
        }
    }
}

fn cmd_repl(config_path: Option<&Path>) {
    let config = load_config(config_path);
    if let Err(e) = repl::run_repl(&config) {
        eprintln!("{} {}", red("error:"), e);
        process::exit(EXIT_IO_ERROR);
    }
}

fn cmd_init() {
    let path = PathBuf::from(CONFIG_FILE);
    if path.exists() {
        eprintln!("{} {} already exists, not overwriting", red("error:"), CONFIG_FILE);
        process::exit(1);
    }
    std::fs::write(&path, EmberConfig::default_template()).unwrap_or_else(|e| {
        eprintln!("{} writing {}: {}", red("error:"), CONFIG_FILE, e);
        process::exit(EXIT_IO_ERROR);
    });
    println!("{} {}", status_label("Created"), CONFIG_FILE);
}
