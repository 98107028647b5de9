// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use ownhandle_harness::{scenario, Cli, Result, ScenarioConfig};
use std::process::ExitCode;

fn run(cli: &Cli) -> Result<()> {
    let config = ScenarioConfig::try_from(cli)?;
    let report = scenario::run(&config);

    for event in &report.events {
        if event.is_fault() {
            warn!("{:?}", event);
        } else {
            info!("{:?}", event);
        }
    }
    info!(
        "{} deleter call(s), {} native(s) left alive",
        report.deleter_calls, report.leaked
    );

    report.check()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
