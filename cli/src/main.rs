use clap::Parser;
use colored::Colorize;
use helix_cli::{Cli, execute};
use helix_driver::BuildSystem;

fn main() {
    let cli = Cli::parse();
    let mut logger = env_logger::Builder::from_default_env();
    if cli.command.verbose() {
        logger.filter_level(log::LevelFilter::Trace);
    }
    logger.init();

    let mut build = BuildSystem::new();
    match execute(cli.command, &mut build) {
        | Ok(out) => {
            for chunk in out {
                println!("{}", chunk);
            }
        }
        | Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            std::process::exit(1);
        }
    }
}
