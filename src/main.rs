//! Lifeboard - Local-first personal organizer

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = lifeboard::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
