use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "helix", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that every allocation in a typed module has a safe region
    Check {
        /// Typed modules (JSON) to check
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Compile typed modules to C
    Build {
        /// Typed modules (JSON) to compile
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Write `<name>.c` files here instead of printing them
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Header included at the top of every unit
        #[arg(long)]
        runtime_header: Option<String>,
        /// Omit `// Line N` comments
        #[arg(long, default_value_t = false)]
        no_line_comments: bool,
        /// Omit the runtime declarations
        #[arg(long, default_value_t = false)]
        no_prelude: bool,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Print a module annotated with its lifetimes
    Dump {
        /// Typed modules (JSON) to print
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Line width
        #[arg(short, long, default_value_t = 100)]
        width: usize,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            | Commands::Check { verbose, .. }
            | Commands::Build { verbose, .. }
            | Commands::Dump { verbose, .. } => *verbose,
        }
    }
}
