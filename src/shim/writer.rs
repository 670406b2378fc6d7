//! Revision-independent tracks to native tracks.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::acl::sjson::write_track_list;
use crate::acl::{
    encode, CompressionSettings, NativeTrack, NativeTrackList, TrackDesc, TrackDescScalarf,
    TrackDescTransformf, TrackType8,
};
use crate::config::RevisionConfig;
use crate::io::FileKind;
use crate::model::{Qvv, SampleType, Track, TrackArray};
use crate::util::{Error, Result};

pub(crate) fn write_tracks(config: &RevisionConfig, path: &Path, tracks: &TrackArray) -> Result<()> {
    if !tracks.version().is_known() {
        return Err(Error::UnknownVersion);
    }

    let native = to_native(config, tracks)?;

    match FileKind::classify(path) {
        FileKind::Binary => {
            let blob = encode(&native, config.binary_write_version, &CompressionSettings::default())?;
            write_blob(path, &blob)?;
            debug!(
                path = %path.display(),
                binary_version = config.binary_write_version,
                size = blob.len(),
                "wrote binary tracks"
            );
            Ok(())
        }
        FileKind::Text => {
            if !FileKind::is_sjson_name(path) {
                warn!(path = %path.display(), "writing SJSON to a file without the .acl.sjson extension");
            }
            write_track_list(&native, config, path)
        }
    }
}

fn track_type(sample_type: SampleType) -> Result<TrackType8> {
    Ok(match sample_type {
        SampleType::Float1 => TrackType8::Float1f,
        SampleType::Float2 => TrackType8::Float2f,
        SampleType::Float3 => TrackType8::Float3f,
        SampleType::Float4 => TrackType8::Float4f,
        SampleType::Vector4 => TrackType8::Vector4f,
        SampleType::Qvv => TrackType8::Qvvf,
        SampleType::Quat => return Err(Error::UnsupportedFeature("quat tracks")),
    })
}

fn native_desc(config: &RevisionConfig, track: &Track, track_type: TrackType8) -> Result<TrackDesc> {
    if track_type != TrackType8::Qvvf {
        let desc = track.description().as_scalar()?;
        return Ok(TrackDesc::Scalar(TrackDescScalarf {
            output_index: desc.output_index,
            precision: desc.precision,
        }));
    }

    let desc = track.description().as_transform()?;
    let default_value = if config.supports_default_value {
        desc.default_value
    } else {
        if desc.default_value != Qvv::IDENTITY && desc.default_value != Qvv::ZERO {
            warn!(
                track = track.name(),
                revision = %config.version,
                "default pose dropped, revision cannot store it"
            );
        }
        Qvv::IDENTITY
    };

    Ok(TrackDesc::Transform(TrackDescTransformf {
        default_value,
        output_index: desc.output_index,
        parent_index: desc.parent_index,
        precision: desc.precision,
        shell_distance: desc.shell_distance,
        constant_rotation_threshold_angle: desc.constant_rotation_threshold_angle,
        constant_translation_threshold: desc.constant_translation_threshold,
        constant_scale_threshold: desc.constant_scale_threshold,
    }))
}

/// Rebuild native tracks, copying sample bytes verbatim.
fn to_native(config: &RevisionConfig, tracks: &TrackArray) -> Result<NativeTrackList> {
    let mut native = NativeTrackList::new(tracks.name());

    for track in tracks {
        let track_type = track_type(track.sample_type())?;
        let desc = native_desc(config, track, track_type)?;
        let mut native_track = NativeTrack::make_reserve(
            track_type,
            desc,
            track.num_samples(),
            track.sample_rate(),
            track.name(),
        )?;
        for (index, sample) in track.samples().iter().enumerate() {
            native_track.sample_mut(index).copy_from_slice(sample.as_bytes());
        }
        native.tracks.push(native_track);
    }

    Ok(native)
}

fn write_blob(path: &Path, blob: &[u8]) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| Error::io("open", path, e))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(blob)
        .map_err(|e| Error::io("write", path, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::io("write", path, e.into_error()))?;
    file.sync_all().map_err(|e| Error::io("close", path, e))
}
