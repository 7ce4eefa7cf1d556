//! Seasonfall - Command-line renderer for the seasonal particle scene

use std::process::ExitCode;

use seasonfall::cli;

fn main() -> ExitCode {
    cli::run()
}
