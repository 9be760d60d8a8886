use std::process;

use clap::Parser;

use scotty::{actions, cli};

fn main() {
    let args = cli::Args::parse();

    if let Err(err) = actions::handle(args) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
