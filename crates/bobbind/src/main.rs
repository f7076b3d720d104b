use std::process::ExitCode;

fn main() -> ExitCode {
    bobbind::run()
}
