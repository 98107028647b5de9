// SPDX-License-Identifier: Apache-2.0

use derive_more::{Display, From, Into};
use thiserror::Error as ThisError;

/// Status code returned by an external creation call.
///
/// Only [`Status::SUCCESS`] counts as success; every other value, including
/// positive "not quite" codes, is treated as a failed creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct Status(pub i32);

impl Status {
    pub const SUCCESS: Status = Status(0);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

/// The core error variants.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The external creation call returned a non-success status.
    #[error("Could not create {object} ({context}): status {status}")]
    Creation {
        object: &'static str,
        status: Status,
        context: String,
    },

    /// A derived handle was requested from a dead parent.
    #[error("Uninitialized parent handle")]
    Uninitialized,

    /// The creation call reported success but left the null sentinel.
    #[error("Empty value")]
    EmptyValue,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn creation(object: &'static str, status: Status, context: &str) -> Self {
        Error::Creation {
            object,
            status,
            context: context.to_string(),
        }
    }

    /// Returns the external status code for creation failures.
    pub fn status(&self) -> Option<Status> {
        match self {
            Error::Creation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the resource kind that failed to be created.
    pub fn object(&self) -> Option<&'static str> {
        match self {
            Error::Creation { object, .. } => Some(*object),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_zero_is_success() {
        assert!(Status::SUCCESS.is_success());
        assert!(!Status(1).is_success());
        assert!(!Status(-3).is_success());
        assert_eq!(i32::from(Status(-3)), -3);
        assert_eq!(Status::from(2), Status(2));
    }

    #[test]
    fn creation_error_carries_status_kind_and_context() {
        let err = Error::creation("fence", Status(-2), "frame sync");
        assert_eq!(err.status(), Some(Status(-2)));
        assert_eq!(err.object(), Some("fence"));
        assert_eq!(
            err.to_string(),
            "Could not create fence (frame sync): status -2"
        );
        assert_eq!(Error::Uninitialized.status(), None);
    }
}
