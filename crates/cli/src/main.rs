use std::process::ExitCode;

fn main() -> ExitCode {
    rigsmith_cli::run()
}
