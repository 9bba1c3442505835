use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;

mod args;
mod matrix;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::new();
    builder.filter_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    builder.parse_default_env().init();
    debug!("args: {:?}", args);

    if let Err(e) = matrix::run(&args) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
