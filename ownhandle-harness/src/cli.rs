// SPDX-License-Identifier: Apache-2.0

use crate::{Error, ScenarioConfig};
use clap::Parser;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "ownhandle harness")]
#[command(about = "Runs a create/destroy scenario against the simulated API and reports every deleter call")]
pub struct Cli {
    #[arg(short = 'b')]
    #[arg(long = "batch")]
    #[arg(help = "Number of natives in the vector handle (at least 2)")]
    #[arg(default_value_t = 3)]
    pub batch: usize,

    #[arg(long = "fail-after")]
    #[arg(help = "Make the creation call after this many successful ones fail")]
    pub fail_after: Option<usize>,

    #[arg(long = "sim-config")]
    #[arg(
        help = "Scenario options in the format 'batch=N,fail_after=K'; they take precedence over the flags"
    )]
    pub sim_config: Option<HarnessConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub batch: Option<usize>,
    pub fail_after: Option<usize>,
}

fn parse_count(key: &str, value: &str) -> Result<usize, Error> {
    value
        .parse::<usize>()
        .map_err(|_| Error::CliError(format!("Invalid integer for {}: {}", key, value)))
}

impl FromStr for HarnessConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut batch = None;
        let mut fail_after = None;

        for part in s.split(',') {
            let mut kv = part.splitn(2, '=');
            let key = kv
                .next()
                .ok_or(Error::CliError("Missing key".to_string()))?;
            let value = kv
                .next()
                .ok_or(Error::CliError(format!("Missing value for {}", key)))?;
            match key {
                "batch" => batch = Some(parse_count(key, value)?),
                "fail_after" => fail_after = Some(parse_count(key, value)?),
                _ => return Err(Error::CliError(format!("Unknown key: {}", key))),
            }
        }

        Ok(HarnessConfig { batch, fail_after })
    }
}

impl TryFrom<&Cli> for ScenarioConfig {
    type Error = Error;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let overrides = cli.sim_config.clone().unwrap_or_default();
        let batch = overrides.batch.unwrap_or(cli.batch);
        if batch < 2 {
            return Err(Error::CliError(format!(
                "A batch holds at least two natives, got {}",
                batch
            )));
        }

        Ok(ScenarioConfig {
            batch,
            fail_after: overrides.fail_after.or(cli.fail_after),
        })
    }
}
