//! Binary entrypoint for the `export-project` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Recording and replaying are selected via EXPORT_PROJECT_RECORD / EXPORT_PROJECT_REPLAY.
    dotenvy::dotenv().ok();
    export_project::logger::init();
    match export_project::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
