use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod rcv;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let mut logs = env_logger::Builder::from_default_env();
    if args.verbose {
        logs.filter_level(LevelFilter::Debug);
    }
    logs.init();
    info!("args: {:?}", args);

    if let Err(e) = rcv::run_election_args(&args) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&*e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
