//! Native tracks to revision-independent tracks.

use std::path::Path;

use tracing::debug;

use super::ReadOutcome;
use crate::acl::sjson::{ClipReader, SjsonFile, SjsonFileType};
use crate::acl::{
    self, CompressedTracks, NativeTrackList, RotationFormat8, TrackDesc, TrackType8, VectorFormat8,
};
use crate::config::{RevisionConfig, MIN_SJSON_VERSION};
use crate::io::{AlignedBuffer, FileKind};
use crate::model::*;
use crate::util::{Error, Result};

pub(crate) fn read_tracks(config: &RevisionConfig, path: &Path) -> Result<ReadOutcome> {
    match FileKind::classify(path) {
        FileKind::Binary => read_binary(config, path),
        FileKind::Text => read_text(config, path),
    }
}

fn rotation_format(format: RotationFormat8) -> RotationFormat {
    match format {
        RotationFormat8::QuatfFull => RotationFormat::QuatfFull,
        RotationFormat8::QuatfDropWFull => RotationFormat::QuatfDropWFull,
        RotationFormat8::QuatfDropWVariable => RotationFormat::QuatfDropWVariable,
    }
}

fn vector_format(format: VectorFormat8) -> VectorFormat {
    match format {
        VectorFormat8::Vector3fFull => VectorFormat::Vector3fFull,
        VectorFormat8::Vector3fVariable => VectorFormat::Vector3fVariable,
    }
}

/// Layout facts straight from the blob headers.
fn binary_track_variant(compressed: &CompressedTracks<'_>) -> TrackVariant {
    let Some(transform) = compressed.transform_header() else {
        return TrackVariant::Scalar;
    };
    let header = compressed.tracks_header();

    TrackVariant::Transform(TransformMetadata {
        rotation_format: rotation_format(header.rotation_format),
        translation_format: vector_format(header.translation_format),
        scale_format: header.has_scale.then(|| vector_format(header.scale_format)),
        num_segments: transform.num_segments,
        num_animated_rotation_sub_tracks: transform.num_animated_rotation_sub_tracks,
        num_animated_translation_sub_tracks: transform.num_animated_translation_sub_tracks,
        num_animated_scale_sub_tracks: transform.num_animated_scale_sub_tracks,
        num_constant_rotation_samples: transform.num_constant_rotation_samples,
        num_constant_translation_samples: transform.num_constant_translation_samples,
        num_constant_scale_samples: transform.num_constant_scale_samples,
    })
}

fn read_binary(config: &RevisionConfig, path: &Path) -> Result<ReadOutcome> {
    let buffer = AlignedBuffer::read_file(path)?;

    let (native, metadata) = {
        let compressed = match CompressedTracks::validate(buffer.as_slice(), config.binary_versions) {
            Ok(compressed) => compressed,
            Err(Error::InvalidBinary(msg)) => {
                debug!(revision = %config.version, %msg, "binary not recognized");
                return Ok(ReadOutcome::Unrecognized(format!(
                    "Invalid binary ACL file provided: {msg}"
                )));
            }
            Err(e) => return Err(e),
        };

        let native = match acl::decode(&compressed) {
            Ok(native) => native,
            Err(Error::InvalidBinary(msg)) => {
                return Ok(ReadOutcome::Unrecognized(format!(
                    "Failed to convert input binary track list: {msg}"
                )));
            }
            Err(e) => return Err(e),
        };

        debug!(
            revision = %config.version,
            binary_version = compressed.version(),
            size = compressed.size(),
            track_type = compressed.track_type().name(),
            "binary recognized"
        );

        let metadata = Metadata {
            version: config.version,
            size: compressed.size(),
            name: native.name.clone(),
            track_variant: binary_track_variant(&compressed),
        };
        (native, metadata)
    };
    buffer.release();

    convert_tracks(config, native, metadata).map(ReadOutcome::Recognized)
}

fn read_text(config: &RevisionConfig, path: &Path) -> Result<ReadOutcome> {
    let buffer = AlignedBuffer::read_file(path)?;

    let file = {
        let reader = ClipReader::new(buffer.as_slice())?;
        let version = reader.version();
        if !(MIN_SJSON_VERSION..=config.sjson_version).contains(&version) {
            return Ok(ReadOutcome::Unrecognized(format!(
                "Unsupported SJSON version: {version}"
            )));
        }
        if reader.file_type() == SjsonFileType::Unknown {
            return Ok(ReadOutcome::Unrecognized("Unknown file type".to_owned()));
        }
        reader.read(config)?
    };

    match &file {
        SjsonFile::RawClip(clip) if clip.has_additive_base() => {
            debug!(
                additive_format = clip.additive_format.as_deref().unwrap_or("none"),
                base_tracks = clip.num_additive_base_tracks,
                "clip carries an additive base"
            );
            return Err(Error::UnsupportedFeature("Additive base"));
        }
        SjsonFile::RawClip(clip) if clip.has_settings => {
            return Err(Error::UnsupportedFeature("Settings"));
        }
        SjsonFile::RawTrackList(list) if list.has_settings => {
            return Err(Error::UnsupportedFeature("Settings"));
        }
        _ => {}
    }

    let size = buffer.len();
    buffer.release();

    let native = file.into_track_list();
    let track_variant = if native.track_type() == Some(TrackType8::Qvvf) {
        TrackVariant::Transform(TransformMetadata {
            rotation_format: config.text_rotation_format,
            translation_format: config.text_vector_format,
            scale_format: Some(config.text_vector_format),
            ..TransformMetadata::default()
        })
    } else {
        TrackVariant::Scalar
    };
    let metadata = Metadata {
        version: config.version,
        size,
        name: native.name.clone(),
        track_variant,
    };

    debug!(revision = %config.version, size, "text recognized");
    convert_tracks(config, native, metadata).map(ReadOutcome::Recognized)
}

fn sample_type(track_type: TrackType8) -> SampleType {
    match track_type {
        TrackType8::Float1f => SampleType::Float1,
        TrackType8::Float2f => SampleType::Float2,
        TrackType8::Float3f => SampleType::Float3,
        TrackType8::Float4f => SampleType::Float4,
        TrackType8::Vector4f => SampleType::Vector4,
        TrackType8::Qvvf => SampleType::Qvv,
    }
}

fn description(config: &RevisionConfig, desc: &TrackDesc) -> TrackDescription {
    match desc {
        TrackDesc::Scalar(desc) => TrackDescription::Scalar(ScalarTrackDescription {
            output_index: desc.output_index,
            precision: desc.precision,
        }),
        TrackDesc::Transform(desc) => TrackDescription::Transform(TransformTrackDescription {
            default_value: if config.supports_default_value {
                desc.default_value
            } else {
                Qvv::ZERO
            },
            output_index: desc.output_index,
            parent_index: desc.parent_index,
            precision: desc.precision,
            shell_distance: desc.shell_distance,
            constant_rotation_threshold_angle: desc.constant_rotation_threshold_angle,
            constant_translation_threshold: desc.constant_translation_threshold,
            constant_scale_threshold: desc.constant_scale_threshold,
        }),
    }
}

/// Copy native tracks into the model, sample bytes verbatim.
fn convert_tracks(
    config: &RevisionConfig,
    native: NativeTrackList,
    metadata: Metadata,
) -> Result<TrackArray> {
    let mut tracks = TrackArray::new(metadata);

    for native_track in &native.tracks {
        let sample_type = sample_type(native_track.track_type());
        let mut track = Track::with_capacity(
            sample_type,
            native_track.sample_rate(),
            native_track.name(),
            native_track.num_samples(),
        );
        track.set_description(description(config, native_track.desc()))?;

        for index in 0..native_track.num_samples() {
            track.push(Sample::from_bytes(sample_type, native_track.sample(index))?)?;
        }
        tracks.append(track);
    }

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{encode, CompressionSettings, NativeTrack, TrackDescTransformf};
    use crate::config;
    use glam::{Quat, Vec3};

    fn write_blob(dir: &Path, version: u16, settings: &CompressionSettings) -> std::path::PathBuf {
        let default_value = Qvv::new(Quat::IDENTITY, Vec3::new(0.0, 5.0, 0.0), Vec3::ONE);
        let desc = TrackDesc::Transform(TrackDescTransformf {
            default_value,
            output_index: 0,
            parent_index: u32::MAX,
            precision: 0.01,
            shell_distance: 3.0,
            constant_rotation_threshold_angle: 0.00284714461,
            constant_translation_threshold: 0.001,
            constant_scale_threshold: 0.00001,
        });
        let mut track = NativeTrack::make_reserve(TrackType8::Qvvf, desc, 3, 30.0, "root").unwrap();
        for i in 0..3 {
            let qvv = Qvv::new(Quat::from_rotation_y(i as f32), Vec3::ZERO, Vec3::ONE);
            track.sample_mut(i).copy_from_slice(bytemuck::bytes_of(&qvv));
        }
        let list = NativeTrackList {
            name: "walk".into(),
            tracks: vec![track],
        };
        let path = dir.join("walk.acl");
        std::fs::write(&path, encode(&list, version, settings).unwrap()).unwrap();
        path
    }

    fn revision(version: AclVersion) -> &'static RevisionConfig {
        config::revision(version).unwrap()
    }

    #[test]
    fn test_binary_metadata_from_headers() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CompressionSettings {
            rotation_format: RotationFormat8::QuatfDropWFull,
            ..CompressionSettings::default()
        };
        let path = write_blob(dir.path(), 10, &settings);

        let ReadOutcome::Recognized(tracks) =
            read_tracks(revision(AclVersion::V02_01_00), &path).unwrap()
        else {
            panic!("2.1 should recognize a version 10 blob");
        };
        let meta = tracks.metadata();
        assert_eq!(meta.version, AclVersion::V02_01_00);
        assert_eq!(meta.size, std::fs::metadata(&path).unwrap().len() as usize);
        assert_eq!(meta.name, "walk");

        let transform = meta.track_variant.transform().unwrap();
        assert_eq!(transform.rotation_format, RotationFormat::QuatfDropWFull);
        assert_eq!(transform.translation_format, VectorFormat::Vector3fFull);
        assert_eq!(transform.scale_format, None);
        assert_eq!(transform.num_segments, 1);
        assert_eq!(transform.num_animated_rotation_sub_tracks, 1);

        let desc = tracks[0].description().as_transform().unwrap();
        assert_eq!(desc.default_value.translation.y, 5.0);
    }

    #[test]
    fn test_older_blob_falls_through_newer_revision() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_blob(dir.path(), 7, &CompressionSettings::default());

        match read_tracks(revision(AclVersion::V02_01_00), &path).unwrap() {
            ReadOutcome::Unrecognized(msg) => assert!(msg.contains("Unsupported version: 7"), "{msg}"),
            ReadOutcome::Recognized(_) => panic!("2.1 must not claim a version 7 blob"),
        }

        let ReadOutcome::Recognized(tracks) =
            read_tracks(revision(AclVersion::V02_00_00), &path).unwrap()
        else {
            panic!("2.0 should recognize a version 7 blob");
        };
        assert_eq!(tracks.version(), AclVersion::V02_00_00);
        let desc = tracks[0].description().as_transform().unwrap();
        assert_eq!(desc.default_value, Qvv::ZERO);
    }

    #[test]
    fn test_garbage_is_unrecognized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.acl");
        std::fs::write(&path, vec![0x5a; 100]).unwrap();
        for config in &config::REVISIONS {
            assert!(matches!(
                read_tracks(config, &path).unwrap(),
                ReadOutcome::Unrecognized(_)
            ));
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.acl");
        assert!(matches!(
            read_tracks(config::latest(), &path),
            Err(Error::Io { op: "open", .. })
        ));
    }

    #[test]
    fn test_text_version_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.acl.sjson");
        std::fs::write(
            &path,
            r#"{"version": 6, "track_list": {"num_samples": 0, "sample_rate": 30}, "tracks": []}"#,
        )
        .unwrap();

        assert!(matches!(
            read_tracks(revision(AclVersion::V02_00_00), &path).unwrap(),
            ReadOutcome::Unrecognized(_)
        ));
        let ReadOutcome::Recognized(tracks) =
            read_tracks(revision(AclVersion::V02_01_00), &path).unwrap()
        else {
            panic!("2.1 reads version 6 documents");
        };
        assert_eq!(tracks.version(), AclVersion::V02_01_00);
        assert_eq!(tracks.metadata().track_variant, TrackVariant::Scalar);
    }

    #[test]
    fn test_text_unsupported_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.acl.sjson");

        std::fs::write(
            &path,
            r#"{"version": 5, "clip": {"num_samples": 1, "sample_rate": 30},
                "bones": [{"name": "root"}], "base_tracks": [{"name": "root"}]}"#,
        )
        .unwrap();
        let err = read_tracks(config::latest(), &path).unwrap_err();
        assert_eq!(err.to_string(), "Additive base not supported yet");

        std::fs::write(
            &path,
            r#"{"version": 5, "track_list": {"num_samples": 0, "sample_rate": 30},
                "settings": {}, "tracks": []}"#,
        )
        .unwrap();
        let err = read_tracks(config::latest(), &path).unwrap_err();
        assert_eq!(err.to_string(), "Settings not supported yet");
    }

    #[test]
    fn test_text_transform_metadata_is_full() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.acl.sjson");
        std::fs::write(
            &path,
            r#"{"version": 4, "clip": {"name": "idle", "num_samples": 2, "sample_rate": 30},
                "bones": [{"name": "root"}]}"#,
        )
        .unwrap();

        let ReadOutcome::Recognized(tracks) = read_tracks(config::latest(), &path).unwrap() else {
            panic!("clip should be recognized");
        };
        assert_eq!(tracks.name(), "idle");
        assert_eq!(tracks.num_tracks(), 1);
        assert_eq!(tracks.sample_type(), Some(SampleType::Qvv));
        let transform = tracks.metadata().track_variant.transform().unwrap();
        assert_eq!(transform.rotation_format, RotationFormat::QuatfFull);
        assert_eq!(transform.scale_format, Some(VectorFormat::Vector3fFull));
        assert_eq!(transform.num_segments, 0);
    }
}
