//! Compy Compiler CLI
//!
//! Command-line interface for compiling `.compy` programs to native
//! executables.

use clap::Parser;
use compyc::config::{CompilerConfig, ProjectFile};
use std::path::PathBuf;
use std::process::{self, Command};

#[derive(Parser)]
#[command(name = "compyc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compy compiler - compile .compy programs to executables", long_about = None)]
struct Cli {
    /// Input .compy source file
    source: PathBuf,

    /// Output executable path (defaults to the source prefix + .out)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the scope tree after each pipeline stage
    #[arg(long)]
    debug_pipeline: bool,

    /// Keep the generated .nasm file next to the source
    #[arg(long)]
    debug_asm: bool,

    /// Keep the assembled .o file next to the source
    #[arg(long)]
    debug_obj: bool,

    /// Run the produced executable after a successful build
    #[arg(short, long)]
    run: bool,

    /// Verbose logging (equivalent to RUST_LOG=compyc=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config =
        CompilerConfig { debug_pipeline: cli.debug_pipeline, debug_asm: cli.debug_asm, debug_obj: cli.debug_obj, run_after_compile: cli.run, output: cli.output };

    if let Some(dir) = cli.source.parent() {
        match ProjectFile::load(dir) {
            Ok(project) => project.apply_defaults(&mut config),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }

    match compyc::compile_file(&cli.source, &config) {
        Ok(output_path) => {
            if config.run_after_compile {
                let status = Command::new(&output_path).status();
                match status {
                    Ok(status) => process::exit(status.code().unwrap_or(1)),
                    Err(e) => {
                        eprintln!("Error: {}", compyc::OperationalError::Run(e));
                        process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
