//! tsq CLI entrypoint

use clap::Parser;

use tsq::cli::Cli;
use tsq::output;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
