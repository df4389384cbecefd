use std::process::ExitCode;

fn main() -> ExitCode {
    flowgate_cli::run()
}
