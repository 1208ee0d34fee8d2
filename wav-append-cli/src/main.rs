use std::process::ExitCode;
use wav_append_cli::cli::{Cli, Parser};
use wav_append_cli::run;
use yansi::{Condition, Paint};

fn main() -> ExitCode {
    env_logger::init();
    yansi::whenever(Condition::TTY_AND_COLOR);
    match run::run(Cli::parse()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "An error occurred:".bold().bright().red());
            ExitCode::FAILURE
        }
    }
}
