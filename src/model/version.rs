//! Schema revisions known to the converter.

use std::fmt;
use std::str::FromStr;

use crate::util::Error;

/// Schema revision of a track collection.
///
/// Ordered from oldest to newest; [`AclVersion::Unknown`] sorts before every
/// real revision and is never writable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AclVersion {
    /// Unrecognized or not yet determined
    #[default]
    Unknown,
    /// ACL 2.0
    V02_00_00,
    /// ACL 2.1
    V02_01_00,
}

impl AclVersion {
    /// Newest supported revision.
    pub const LATEST: Self = Self::V02_01_00;

    /// All real revisions, oldest first.
    pub const ALL: [Self; 2] = [Self::V02_00_00, Self::V02_01_00];

    /// Short name as used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::V02_00_00 => "2.0",
            Self::V02_01_00 => "2.1",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this is a real revision.
    #[inline]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for AclVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AclVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2.0" => Ok(Self::V02_00_00),
            "2.1" => Ok(Self::V02_01_00),
            _ => Err(Error::Argument(format!("Unknown ACL version: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(AclVersion::V02_00_00 < AclVersion::V02_01_00);
        assert!(AclVersion::Unknown < AclVersion::V02_00_00);
        assert_eq!(AclVersion::LATEST, AclVersion::V02_01_00);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2.0".parse::<AclVersion>().unwrap(), AclVersion::V02_00_00);
        assert_eq!("2.1".parse::<AclVersion>().unwrap(), AclVersion::V02_01_00);
        assert!("2.2".parse::<AclVersion>().is_err());
        assert!("unknown".parse::<AclVersion>().is_err());
    }
}
