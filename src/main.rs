use std::process;

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};

use bgp_models::cli::{run, Args};

fn main() {
    let args = Args::parse();

    let (crate_level, other_level) = match args.verbose {
        0 => (LevelFilter::Warn, LevelFilter::Warn),
        1 => (LevelFilter::Info, LevelFilter::Warn),
        2 => (LevelFilter::Debug, LevelFilter::Warn),
        3 => (LevelFilter::Trace, LevelFilter::Warn),
        _ => (LevelFilter::Trace, LevelFilter::Trace),
    };
    Builder::new()
        .filter(Some("bgp_models"), crate_level)
        .filter(None, other_level)
        .init();
    info!("Logging at levels {}/{}", crate_level, other_level);

    if !run(&args) {
        process::exit(1);
    }
}
