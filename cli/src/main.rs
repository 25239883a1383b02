mod cli;

use clap::Parser;
use owo_colors::OwoColorize;

fn main() {
    // Initialize logger
    env_logger::init();

    let args = cli::Cli::parse();

    if let Err(e) = cli::run(&args) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
