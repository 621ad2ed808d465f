// src/main.rs

use buildgen::{cli, logging, run};

fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level()) {
        eprintln!("buildgen error: {err:?}");
        std::process::exit(1);
    }
    if let Err(err) = run(args) {
        eprintln!("buildgen error: {err}");
        std::process::exit(1);
    }
}
