// SPDX-License-Identifier: Apache-2.0

pub mod cli;
pub mod scenario;

pub use cli::{Cli, HarnessConfig};
pub use scenario::{Report, ScenarioConfig};

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Handle framework error
    #[error("Handle error: {0}")]
    HandleError(ownhandle::Error),

    /// CLI error
    #[error("CLI error: {0}")]
    CliError(String),

    /// The simulated API saw the handles misbehave
    #[error("{0} fault(s) in the event log")]
    Faults(usize),
}

impl From<ownhandle::Error> for Error {
    fn from(err: ownhandle::Error) -> Self {
        Error::HandleError(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
