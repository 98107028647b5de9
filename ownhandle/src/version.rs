// SPDX-License-Identifier: Apache-2.0

use crate::{Error, Result};
use derive_more::Display;

const MAJOR_OFFSET: u32 = 22;
const MINOR_OFFSET: u32 = 12;

const MINOR_MASK: u32 = (1 << (MAJOR_OFFSET - MINOR_OFFSET)) - 1;
const PATCH_MASK: u32 = (1 << MINOR_OFFSET) - 1;

/// A `major.minor.patch` triple packed into 32 bits.
///
/// Major takes the top 10 bits, minor the next 10 and patch the low 12.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{}.{}.{}", self.major(), self.minor(), self.patch())]
pub struct Version {
    packed: u32,
}

impl Version {
    pub const MAJOR_MAX: u16 = (u32::MAX >> MAJOR_OFFSET) as u16;
    pub const MINOR_MAX: u16 = MINOR_MASK as u16;
    pub const PATCH_MAX: u16 = PATCH_MASK as u16;

    /// # Panics
    ///
    /// Panics if a component does not fit its bit width.
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        assert!(major <= Self::MAJOR_MAX, "major version out of range");
        assert!(minor <= Self::MINOR_MAX, "minor version out of range");
        assert!(patch <= Self::PATCH_MAX, "patch version out of range");
        Version {
            packed: (major as u32) << MAJOR_OFFSET | (minor as u32) << MINOR_OFFSET | patch as u32,
        }
    }

    /// Like [`Version::new`], but reports out-of-range components as an
    /// error.
    pub fn try_new(major: u16, minor: u16, patch: u16) -> Result<Self> {
        if major > Self::MAJOR_MAX || minor > Self::MINOR_MAX || patch > Self::PATCH_MAX {
            return Err(Error::InvalidArgument(format!(
                "version {}.{}.{} exceeds {}.{}.{}",
                major,
                minor,
                patch,
                Self::MAJOR_MAX,
                Self::MINOR_MAX,
                Self::PATCH_MAX
            )));
        }

        Ok(Self::new(major, minor, patch))
    }

    pub const fn from_packed(packed: u32) -> Self {
        Version { packed }
    }

    pub const fn packed(self) -> u32 {
        self.packed
    }

    pub const fn major(self) -> u16 {
        (self.packed >> MAJOR_OFFSET) as u16
    }

    pub const fn minor(self) -> u16 {
        ((self.packed >> MINOR_OFFSET) & MINOR_MASK) as u16
    }

    pub const fn patch(self) -> u16 {
        (self.packed & PATCH_MASK) as u16
    }
}

impl From<u32> for Version {
    fn from(packed: u32) -> Self {
        Version::from_packed(packed)
    }
}

impl From<Version> for u32 {
    fn from(version: Version) -> Self {
        version.packed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_components() {
        let version = Version::new(1, 2, 3);
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert_eq!(u32::from(version), (1 << 22) | (2 << 12) | 3);
    }

    #[test]
    fn boundary_values_round_trip() {
        let version = Version::new(1023, 1023, 4095);
        assert_eq!(
            (version.major(), version.minor(), version.patch()),
            (1023, 1023, 4095)
        );
        assert_eq!(version.packed(), u32::MAX);
        assert_eq!(Version::from(u32::MAX), version);
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(Version::new(1, 2, 154).to_string(), "1.2.154");
        assert_eq!(Version::default().to_string(), "0.0.0");
    }

    #[test]
    fn orders_by_significance() {
        assert!(Version::new(1, 0, 0) > Version::new(0, 1023, 4095));
        assert!(Version::new(1, 2, 0) < Version::new(1, 2, 1));
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(matches!(
            Version::try_new(1024, 0, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(Version::try_new(0, 0, 4096).is_err());
        assert_eq!(Version::try_new(0, 0, 1), Ok(Version::new(0, 0, 1)));
    }

    #[test]
    #[should_panic(expected = "minor version out of range")]
    fn new_panics_on_overflow() {
        let _ = Version::new(0, 1024, 0);
    }
}
