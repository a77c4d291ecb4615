use std::process::ExitCode;

fn main() -> ExitCode {
    storegrid_cli::run()
}
