//! Conversion orchestrator and the `info` report.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::model::{AclVersion, SampleType, TrackArray, TrackVariant};
use crate::shim::{self, ReadOutcome, RevisionShim};
use crate::util::{Error, Result};

/// Probes revisions and dispatches writes.
pub struct Converter {
    /// Newest revision first.
    shims: Vec<Box<dyn RevisionShim>>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Converter over every known revision.
    pub fn new() -> Self {
        Self::with_shims(shim::all())
    }

    /// Converter over `shims`, probed in the given order.
    pub fn with_shims(shims: Vec<Box<dyn RevisionShim>>) -> Self {
        Self { shims }
    }

    fn shim(&self, version: AclVersion) -> Option<&dyn RevisionShim> {
        self.shims
            .iter()
            .find(|shim| shim.version() == version)
            .map(|shim| shim.as_ref())
    }

    /// Read `path` with the first revision that recognizes it.
    pub fn read(&self, path: &Path) -> Result<TrackArray> {
        let mut diagnostic = String::from("no revision available");

        for shim in &self.shims {
            match shim.try_read(path)? {
                ReadOutcome::Recognized(tracks) => {
                    debug!(path = %path.display(), revision = %shim.version(), "input recognized");
                    return Ok(tracks);
                }
                ReadOutcome::Unrecognized(reason) => {
                    debug!(revision = %shim.version(), %reason, "input not recognized");
                    diagnostic = reason;
                }
            }
        }

        Err(Error::UnrecognizedFormat {
            path: path.to_path_buf(),
            diagnostic,
        })
    }

    /// Convert `input` to `output`, writing at `target` or the source revision.
    pub fn convert(&self, input: &Path, output: &Path, target: Option<AclVersion>) -> Result<()> {
        if input == output {
            return Err(Error::SameFile);
        }

        let tracks = self.read(input)?;
        if !tracks.version().is_known() {
            return Err(Error::UnknownVersion);
        }

        let target = target.unwrap_or(tracks.version());
        let writer = self
            .shim(target)
            .ok_or_else(|| Error::UnsupportedTarget(target.to_string()))?;
        writer.write(output, &tracks)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            source = %tracks.version(),
            target = %target,
            tracks = tracks.num_tracks(),
            "converted"
        );
        Ok(())
    }

    /// Inspect `input` without writing anything.
    pub fn info(&self, input: &Path) -> Result<InfoReport> {
        let tracks = self.read(input)?;
        if !tracks.version().is_known() {
            return Err(Error::UnknownVersion);
        }
        Ok(InfoReport::new(input, &tracks))
    }
}

/// Summary of a track file.
#[derive(Clone, Debug, PartialEq)]
pub struct InfoReport {
    pub filename: PathBuf,
    pub version: AclVersion,
    pub size: usize,
    pub name: String,
    pub num_tracks: usize,
    pub num_samples_per_track: usize,
    pub sample_rate: f32,
    pub duration: f32,
    pub sample_type: Option<SampleType>,
    pub track_variant: TrackVariant,
}

impl InfoReport {
    pub fn new(filename: &Path, tracks: &TrackArray) -> Self {
        let metadata = tracks.metadata();
        Self {
            filename: filename.to_path_buf(),
            version: tracks.version(),
            size: metadata.size,
            name: metadata.name.clone(),
            num_tracks: tracks.num_tracks(),
            num_samples_per_track: tracks.num_samples_per_track(),
            sample_rate: tracks.sample_rate(),
            duration: tracks.duration(),
            sample_type: tracks.sample_type(),
            track_variant: metadata.track_variant,
        }
    }
}

/// Human readable byte size, e.g. `1.50 KB`.
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Filename: {}", self.filename.display())?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Size: {}", format_size(self.size))?;
        if !self.name.is_empty() {
            writeln!(f, "Name: {}", self.name)?;
        }
        writeln!(f, "Num tracks: {}", self.num_tracks)?;
        writeln!(f, "Num samples per track: {}", self.num_samples_per_track)?;
        writeln!(f, "Sample rate: {:.2}", self.sample_rate)?;
        writeln!(f, "Duration: {:.3} sec", self.duration)?;
        match self.sample_type {
            Some(sample_type) => writeln!(f, "Sample type: {sample_type}")?,
            None => writeln!(f, "Sample type: none")?,
        }
        writeln!(f, "Track type: {}", self.track_variant.name())?;

        if let TrackVariant::Transform(meta) = &self.track_variant {
            writeln!(f, "Rotation format: {}", meta.rotation_format)?;
            writeln!(f, "Translation format: {}", meta.translation_format)?;
            match meta.scale_format {
                Some(format) => writeln!(f, "Scale format: {format}")?,
                None => writeln!(f, "Scale format: none")?,
            }
            writeln!(f, "Num segments: {}", meta.num_segments)?;
            writeln!(
                f,
                "Animated sub-tracks: {} rotation, {} translation, {} scale",
                meta.num_animated_rotation_sub_tracks,
                meta.num_animated_translation_sub_tracks,
                meta.num_animated_scale_sub_tracks
            )?;
            writeln!(
                f,
                "Constant samples: {} rotation, {} translation, {} scale",
                meta.num_constant_rotation_samples,
                meta.num_constant_translation_samples,
                meta.num_constant_scale_samples
            )?;
        }
        Ok(())
    }
}
