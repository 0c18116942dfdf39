//! eightx - plan, implement and review coding tasks with an agent CLI

use std::process::ExitCode;

fn main() -> ExitCode {
    match eightx::cli::run() {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
