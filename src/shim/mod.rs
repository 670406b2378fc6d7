//! Revision shims.
//!
//! A shim bridges one schema revision's native tracks to the
//! revision-independent [`TrackArray`]. Every revision exposes the same
//! [`RevisionShim`] capability; the orchestrator iterates them newest
//! first, so supporting a new revision means adding one table entry in
//! [`crate::config`].

mod reader;
mod writer;

use std::path::Path;

use crate::config::{self, RevisionConfig};
use crate::model::{AclVersion, TrackArray};
use crate::util::Result;

/// Result of asking one revision to read a file.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The revision understood the file.
    Recognized(TrackArray),
    /// The file is not in this revision's shape; the diagnostic explains why.
    Unrecognized(String),
}

/// Reader/writer pair of one schema revision.
pub trait RevisionShim {
    /// Revision handled by this shim.
    fn version(&self) -> AclVersion;

    /// Read `path`. Recognition failures are `Ok(Unrecognized)`; every
    /// `Err` is fatal for the whole probe.
    fn try_read(&self, path: &Path) -> Result<ReadOutcome>;

    /// Write `tracks` to `path` in this revision's format.
    fn write(&self, path: &Path, tracks: &TrackArray) -> Result<()>;
}

/// Shim driven entirely by a revision configuration entry.
#[derive(Clone, Copy, Debug)]
pub struct Shim {
    config: &'static RevisionConfig,
}

impl Shim {
    pub const fn new(config: &'static RevisionConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &'static RevisionConfig {
        self.config
    }
}

impl RevisionShim for Shim {
    fn version(&self) -> AclVersion {
        self.config.version
    }

    fn try_read(&self, path: &Path) -> Result<ReadOutcome> {
        reader::read_tracks(self.config, path)
    }

    fn write(&self, path: &Path, tracks: &TrackArray) -> Result<()> {
        writer::write_tracks(self.config, path, tracks)
    }
}

/// One shim per known revision, newest first.
pub fn all() -> Vec<Box<dyn RevisionShim>> {
    config::REVISIONS
        .iter()
        .rev()
        .map(|config| Box::new(Shim::new(config)) as Box<dyn RevisionShim>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shims_newest_first() {
        let versions: Vec<AclVersion> = all().iter().map(|shim| shim.version()).collect();
        assert_eq!(versions, vec![AclVersion::V02_01_00, AclVersion::V02_00_00]);
    }
}
