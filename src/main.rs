use std::process::ExitCode;

fn main() -> ExitCode {
    match topo_sync::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
