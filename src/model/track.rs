//! A single named, uniformly sampled track.

use super::{
    Sample, SampleType, ScalarTrackDescription, TrackDescription, TransformTrackDescription,
};
use crate::util::{Error, Result};

/// Ordered samples of one sample type plus their description.
///
/// Not `Clone`: tracks move between owners, they are never duplicated.
#[derive(Debug, PartialEq)]
pub struct Track {
    samples: Vec<Sample>,
    name: String,
    description: TrackDescription,
    sample_type: SampleType,
    sample_rate: f32,
}

impl Track {
    /// Create an empty track with the default description for its type.
    pub fn new(sample_type: SampleType, sample_rate: f32, name: impl Into<String>) -> Self {
        let description = if sample_type.is_transform() {
            TrackDescription::Transform(TransformTrackDescription::default())
        } else {
            TrackDescription::Scalar(ScalarTrackDescription::default())
        };

        Self {
            samples: Vec::new(),
            name: name.into(),
            description,
            sample_type,
            sample_rate,
        }
    }

    /// Create an empty track with room for `capacity` samples.
    pub fn with_capacity(
        sample_type: SampleType,
        sample_rate: f32,
        name: impl Into<String>,
        capacity: usize,
    ) -> Self {
        let mut track = Self::new(sample_type, sample_rate, name);
        track.samples.reserve_exact(capacity);
        track
    }

    #[inline]
    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &TrackDescription {
        &self.description
    }

    /// Replace the description. Its variant must match the sample type.
    pub fn set_description(&mut self, description: TrackDescription) -> Result<()> {
        if description.is_transform() != self.sample_type.is_transform() {
            return Err(Error::KindMismatch {
                expected: self.expected_description_kind(),
                actual: description.kind(),
            });
        }
        self.description = description;
        Ok(())
    }

    /// Append a sample. Its tag must match the track's sample type.
    pub fn push(&mut self, sample: Sample) -> Result<()> {
        if sample.sample_type() != self.sample_type {
            return Err(Error::KindMismatch {
                expected: self.sample_type.name(),
                actual: sample.sample_type().name(),
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Bounds-checked sample access.
    pub fn get(&self, index: usize) -> Result<&Sample> {
        self.samples.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            count: self.samples.len(),
        })
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    fn expected_description_kind(&self) -> &'static str {
        if self.sample_type.is_transform() {
            "transform"
        } else {
            "scalar"
        }
    }
}

impl std::ops::Index<usize> for Track {
    type Output = Sample;

    fn index(&self, index: usize) -> &Sample {
        &self.samples[index]
    }
}
