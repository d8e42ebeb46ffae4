//! DrawTime CLI - Draw timing diagrams from text descriptions

mod cli;
mod report;

use clap::Parser;

fn main() {
    // Logging is initialized inside run() once the flags are known
    let cli_args = cli::Cli::parse();
    let app = cli::DrawtimeApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
