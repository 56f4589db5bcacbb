//! anchorage CLI entry point
//!
//! Parses arguments, installs logging, runs the command and renders failures
//! as colored error reports with suggestions.
//!
//! - `check` - Validate includes, aliases and the dependency graph
//! - `graph` - Show the dependency order or tree
//! - `render` - Print the resolved document

use anchorage::cli;
use anchorage::core::user_friendly_error;
use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
