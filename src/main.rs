// tinypack command line entry point

use colored::Colorize;
use tinypack::cli::CliHandler;

fn main() {
    let handler = CliHandler::new();

    if let Err(e) = handler.run() {
        eprintln!("{}", e.format_detailed().red());
        std::process::exit(1);
    }
}
