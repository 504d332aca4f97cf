//! mt-vikunja - Import Meistertask exports into Vikunja

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = mt_vikunja::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
