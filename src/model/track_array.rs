//! Ordered collection of tracks sharing one revision.

use super::{AclVersion, Metadata, SampleType, Track};
use crate::util::{Error, Result};

/// Tracks plus the metadata recorded when they were read.
///
/// Derived facts (sample count, rate, duration) come from the first track
/// and are zero for an empty collection.
#[derive(Debug, Default, PartialEq)]
pub struct TrackArray {
    tracks: Vec<Track>,
    metadata: Metadata,
}

impl TrackArray {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            tracks: Vec::new(),
            metadata,
        }
    }

    /// Empty collection tagged with `version`.
    pub fn with_version(version: AclVersion) -> Self {
        Self::new(Metadata::new(version))
    }

    /// Append a track.
    pub fn append(&mut self, track: Track) {
        self.tracks.push(track);
    }

    #[inline]
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn num_samples_per_track(&self) -> usize {
        self.tracks.first().map_or(0, Track::num_samples)
    }

    pub fn sample_rate(&self) -> f32 {
        self.tracks.first().map_or(0.0, Track::sample_rate)
    }

    /// Sample type of the first track, `None` when empty.
    pub fn sample_type(&self) -> Option<SampleType> {
        self.tracks.first().map(Track::sample_type)
    }

    /// Duration in seconds: `(num_samples - 1) / sample_rate`.
    pub fn duration(&self) -> f32 {
        let num_samples = self.num_samples_per_track();
        let sample_rate = self.sample_rate();
        if num_samples == 0 || !(sample_rate.is_finite() && sample_rate > 0.0) {
            return 0.0;
        }
        (num_samples - 1) as f32 / sample_rate
    }

    #[inline]
    pub fn version(&self) -> AclVersion {
        self.metadata.version
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Bounds-checked track access.
    pub fn get(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            count: self.tracks.len(),
        })
    }


    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }
}

impl std::ops::Index<usize> for TrackArray {
    type Output = Track;

    fn index(&self, index: usize) -> &Track {
        &self.tracks[index]
    }
}

impl<'a> IntoIterator for &'a TrackArray {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
