use std::process::ExitCode;

use wpdkit::WpdError;

fn main() -> ExitCode {
    match wpdkit::run() {
        Ok(()) => ExitCode::SUCCESS,
        // The report has already been printed to stdout.
        Err(WpdError::ValidationFailed { .. }) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
