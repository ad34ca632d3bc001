use clap::Parser;
use colorful::Colorful;

pub mod cli;
pub mod config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    if let Err(err) = cli::Cli::parse().execute() {
        eprintln!("{}", format!("🧯 {err:#}").red());

        std::process::exit(1);
    }
}
