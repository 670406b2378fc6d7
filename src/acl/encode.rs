//! Native track list to compressed tracks blob.
//!
//! Samples are stored at full precision; only the storage layout choices
//! that do not need the bit-rate optimizer are supported.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use glam::{Quat, Vec4};

use super::compressed::{compute_hash, TransformTracksHeader};
use super::format::*;
use super::{
    NativeTrack, NativeTrackList, RotationFormat8, TrackDesc, TrackDescTransformf, TrackType8,
    VectorFormat8,
};
use crate::config;
use crate::model::Qvv;
use crate::util::{Error, Result};

/// Storage formats used when encoding transform tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompressionSettings {
    pub rotation_format: RotationFormat8,
    pub translation_format: VectorFormat8,
    pub scale_format: VectorFormat8,
}

impl CompressionSettings {
    fn check(&self) -> Result<()> {
        if self.rotation_format == RotationFormat8::QuatfDropWVariable
            || self.translation_format == VectorFormat8::Vector3fVariable
            || self.scale_format == VectorFormat8::Vector3fVariable
        {
            return Err(Error::encode(
                "variable bit rate formats need the bit rate optimizer",
            ));
        }
        Ok(())
    }
}

/// How a sub-track would be stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SubTrackKind {
    Default,
    Constant,
    Animated,
}

fn classify<T: Copy>(values: impl Iterator<Item = T> + Clone, default: T, near: impl Fn(T, T) -> bool) -> SubTrackKind {
    if values.clone().all(|v| near(v, default)) {
        return SubTrackKind::Default;
    }
    let mut iter = values.clone();
    match iter.next() {
        Some(first) if values.clone().all(|v| near(v, first)) => SubTrackKind::Constant,
        _ => SubTrackKind::Animated,
    }
}

fn rotation_near(threshold: f32) -> impl Fn(Quat, Quat) -> bool {
    move |a, b| a.angle_between(b) <= threshold
}

fn vector_near(threshold: f32) -> impl Fn(Vec4, Vec4) -> bool {
    move |a, b| (a - b).truncate().abs().max_element() <= threshold
}

fn count(kind: SubTrackKind, animated: &mut u32, constant: &mut u32) {
    match kind {
        SubTrackKind::Animated => *animated += 1,
        SubTrackKind::Constant => *constant += 1,
        SubTrackKind::Default => {}
    }
}

/// Derive segment and sub-track counts for a transform list.
fn transform_header(
    list: &NativeTrackList,
    has_default_value: bool,
    num_samples: u32,
) -> TransformTracksHeader {
    let mut header = TransformTracksHeader {
        num_segments: num_segments(num_samples),
        ..TransformTracksHeader::default()
    };

    for track in &list.tracks {
        let TrackDesc::Transform(desc) = track.desc() else {
            continue;
        };
        let default = if has_default_value {
            desc.default_value
        } else {
            Qvv::IDENTITY
        };
        let samples = (0..track.num_samples()).map(|i| track.qvv(i));

        let rotation = classify(
            samples.clone().map(|q| q.rotation),
            default.rotation,
            rotation_near(desc.constant_rotation_threshold_angle),
        );
        let translation = classify(
            samples.clone().map(|q| q.translation),
            default.translation,
            vector_near(desc.constant_translation_threshold),
        );
        let scale = classify(
            samples.map(|q| q.scale),
            default.scale,
            vector_near(desc.constant_scale_threshold),
        );

        count(
            rotation,
            &mut header.num_animated_rotation_sub_tracks,
            &mut header.num_constant_rotation_samples,
        );
        count(
            translation,
            &mut header.num_animated_translation_sub_tracks,
            &mut header.num_constant_translation_samples,
        );
        count(
            scale,
            &mut header.num_animated_scale_sub_tracks,
            &mut header.num_constant_scale_samples,
        );
    }

    header
}

fn write_string(out: &mut Vec<u8>, value: &str) -> Result<()> {
    let len = u32::try_from(value.len()).map_err(|_| Error::encode("string too long"))?;
    out.write_u32::<LittleEndian>(len).map_err(io_encode)?;
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

fn io_encode(err: std::io::Error) -> Error {
    Error::encode(err.to_string())
}

fn write_f32s(out: &mut Vec<u8>, values: &[f32]) -> Result<()> {
    for value in values {
        out.write_f32::<LittleEndian>(*value).map_err(io_encode)?;
    }
    Ok(())
}

fn write_transform_desc(out: &mut Vec<u8>, desc: &TrackDescTransformf, has_default_value: bool) -> Result<()> {
    out.write_u32::<LittleEndian>(desc.parent_index).map_err(io_encode)?;
    write_f32s(
        out,
        &[
            desc.precision,
            desc.shell_distance,
            desc.constant_rotation_threshold_angle,
            desc.constant_translation_threshold,
            desc.constant_scale_threshold,
        ],
    )?;
    if has_default_value {
        let d = &desc.default_value;
        write_f32s(out, &d.rotation.to_array())?;
        write_f32s(out, &d.translation.to_array())?;
        write_f32s(out, &d.scale.to_array())?;
    }
    Ok(())
}

fn write_qvv(out: &mut Vec<u8>, qvv: &Qvv, settings: &CompressionSettings, has_scale: bool) -> Result<()> {
    match settings.rotation_format {
        RotationFormat8::QuatfFull => write_f32s(out, &qvv.rotation.to_array())?,
        _ => {
            // q and -q are the same rotation; keep w positive so it can be rebuilt.
            let q = if qvv.rotation.w < 0.0 { -qvv.rotation } else { qvv.rotation };
            write_f32s(out, &[q.x, q.y, q.z])?;
        }
    }
    write_f32s(out, &qvv.translation.truncate().to_array())?;
    if has_scale {
        write_f32s(out, &qvv.scale.truncate().to_array())?;
    }
    Ok(())
}

/// Check shared layout of all tracks; returns (type, samples, rate).
fn check_layout(list: &NativeTrackList) -> Result<(TrackType8, u32, f32)> {
    let Some(first) = list.tracks.first() else {
        return Ok((TrackType8::Float1f, 0, 0.0));
    };

    for track in &list.tracks {
        if track.track_type() != first.track_type() {
            return Err(Error::encode(format!(
                "mixed track types: {} and {}",
                first.track_type().name(),
                track.track_type().name()
            )));
        }
        if track.num_samples() != first.num_samples() {
            return Err(Error::encode(format!(
                "track '{}' has {} samples, expected {}",
                track.name(),
                track.num_samples(),
                first.num_samples()
            )));
        }
        if track.sample_rate().to_bits() != first.sample_rate().to_bits() {
            return Err(Error::encode(format!(
                "track '{}' has sample rate {}, expected {}",
                track.name(),
                track.sample_rate(),
                first.sample_rate()
            )));
        }
    }

    let num_samples = u32::try_from(first.num_samples())
        .map_err(|_| Error::encode("too many samples"))?;
    let sample_rate = first.sample_rate();
    if num_samples > 0 && !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(Error::encode(format!("invalid sample rate: {sample_rate}")));
    }

    Ok((first.track_type(), num_samples, sample_rate))
}

fn has_non_unit_scale(tracks: &[NativeTrack]) -> bool {
    tracks.iter().any(|track| {
        (0..track.num_samples()).any(|i| track.qvv(i).scale.truncate() != glam::Vec3::ONE)
    })
}

/// Encode `list` as a blob of binary `version`.
pub fn encode(list: &NativeTrackList, version: u16, settings: &CompressionSettings) -> Result<Vec<u8>> {
    if config::revision_for_binary(version).is_none() {
        return Err(Error::encode(format!("unknown binary version {version}")));
    }
    settings.check()?;

    let (track_type, num_samples, sample_rate) = check_layout(list)?;
    let num_tracks = u32::try_from(list.tracks.len()).map_err(|_| Error::encode("too many tracks"))?;
    let is_transform = track_type == TrackType8::Qvvf;
    let has_default_value = version >= FIRST_VERSION_WITH_DEFAULT_VALUE;
    let has_scale = is_transform && has_non_unit_scale(&list.tracks);

    let mut out = Vec::with_capacity(TRACKS_HEADER_SIZE + TRANSFORM_HEADER_SIZE);
    out.resize(TAG_OFFSET, 0); // size + hash, patched below
    out.write_u32::<LittleEndian>(COMPRESSED_TRACKS_TAG).map_err(io_encode)?;
    out.write_u16::<LittleEndian>(version).map_err(io_encode)?;
    out.write_u8(ALGORITHM_UNIFORMLY_SAMPLED).map_err(io_encode)?;
    out.write_u8(track_type as u8).map_err(io_encode)?;
    out.write_u32::<LittleEndian>(num_tracks).map_err(io_encode)?;
    out.write_u32::<LittleEndian>(num_samples).map_err(io_encode)?;
    out.write_f32::<LittleEndian>(sample_rate).map_err(io_encode)?;
    let misc = if is_transform {
        pack_misc(
            settings.rotation_format as u8,
            settings.translation_format as u8,
            settings.scale_format as u8,
            has_scale,
        )
    } else {
        0
    };
    out.write_u32::<LittleEndian>(misc).map_err(io_encode)?;
    debug_assert_eq!(out.len(), TRACKS_HEADER_SIZE);

    if is_transform {
        let header = transform_header(list, has_default_value, num_samples);
        for word in header.to_words() {
            out.write_u32::<LittleEndian>(word).map_err(io_encode)?;
        }
    }

    write_string(&mut out, &list.name)?;
    for track in &list.tracks {
        write_string(&mut out, track.name())?;
        match track.desc() {
            TrackDesc::Scalar(desc) => {
                out.write_u32::<LittleEndian>(desc.output_index).map_err(io_encode)?;
                write_f32s(&mut out, &[desc.precision])?;
            }
            TrackDesc::Transform(desc) => {
                out.write_u32::<LittleEndian>(desc.output_index).map_err(io_encode)?;
                write_transform_desc(&mut out, desc, has_default_value)?;
            }
        }
    }

    for track in &list.tracks {
        for sample_index in 0..track.num_samples() {
            if is_transform {
                write_qvv(&mut out, &track.qvv(sample_index), settings, has_scale)?;
            } else {
                for component in track.sample(sample_index).chunks_exact(4) {
                    let value = f32::from_ne_bytes([component[0], component[1], component[2], component[3]]);
                    out.write_f32::<LittleEndian>(value).map_err(io_encode)?;
                }
            }
        }
    }

    let size = u32::try_from(out.len()).map_err(|_| Error::encode("blob exceeds 4 GiB"))?;
    LittleEndian::write_u32(&mut out[SIZE_OFFSET..], size);
    let hash = compute_hash(&out);
    LittleEndian::write_u32(&mut out[HASH_OFFSET..], hash);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{decode, CompressedTracks, TrackDescScalarf};
    use glam::Vec3;

    fn scalar_list(num_tracks: usize, num_samples: usize) -> NativeTrackList {
        let mut list = NativeTrackList::new("scalars");
        for t in 0..num_tracks {
            let desc = TrackDesc::Scalar(TrackDescScalarf {
                output_index: t as u32,
                precision: 0.0001,
            });
            let mut track =
                NativeTrack::make_reserve(TrackType8::Float2f, desc, num_samples, 30.0, format!("t{t}"))
                    .unwrap();
            for s in 0..num_samples {
                let v = glam::Vec2::new(t as f32, s as f32 * 0.5);
                track.sample_mut(s).copy_from_slice(bytemuck::bytes_of(&v));
            }
            list.tracks.push(track);
        }
        list
    }

    fn transform_list(samples: &[Qvv]) -> NativeTrackList {
        let desc = TrackDesc::Transform(TrackDescTransformf {
            default_value: Qvv::IDENTITY,
            output_index: 0,
            parent_index: u32::MAX,
            precision: 0.01,
            shell_distance: 3.0,
            constant_rotation_threshold_angle: 0.00284714461,
            constant_translation_threshold: 0.001,
            constant_scale_threshold: 0.00001,
        });
        let mut track =
            NativeTrack::make_reserve(TrackType8::Qvvf, desc, samples.len(), 60.0, "root").unwrap();
        for (i, qvv) in samples.iter().enumerate() {
            track.sample_mut(i).copy_from_slice(bytemuck::bytes_of(qvv));
        }
        NativeTrackList {
            name: "clip".into(),
            tracks: vec![track],
        }
    }

    #[test]
    fn test_scalar_blob_decodes_to_same_list() {
        let list = scalar_list(3, 7);
        let blob = encode(&list, VERSION_02_00_00, &CompressionSettings::default()).unwrap();
        let compressed = CompressedTracks::validate(&blob, &[VERSION_02_00_00]).unwrap();
        assert_eq!(compressed.size(), blob.len());
        assert_eq!(compressed.num_tracks(), 3);
        assert_eq!(compressed.num_samples_per_track(), 7);
        assert_eq!(decode(&compressed).unwrap(), list);
    }

    #[test]
    fn test_transform_header_counts() {
        let moving: Vec<Qvv> = (0..40)
            .map(|i| Qvv::new(Quat::IDENTITY, Vec3::new(i as f32, 0.0, 0.0), Vec3::ONE))
            .collect();
        let list = transform_list(&moving);
        let blob = encode(&list, VERSION_02_01_99_2, &CompressionSettings::default()).unwrap();
        let compressed = CompressedTracks::validate(&blob, &[VERSION_02_01_99_2]).unwrap();
        let header = compressed.transform_header().unwrap();
        assert_eq!(header.num_segments, 3);
        assert_eq!(header.num_animated_translation_sub_tracks, 1);
        assert_eq!(header.num_animated_rotation_sub_tracks, 0);
        assert_eq!(header.num_constant_rotation_samples, 0);
        assert_eq!(header.num_animated_scale_sub_tracks, 0);
        assert!(!compressed.tracks_header().has_scale);
        assert_eq!(decode(&compressed).unwrap(), list);
    }

    #[test]
    fn test_constant_rotation_is_counted() {
        let q = Quat::from_rotation_y(1.0);
        let samples = vec![Qvv::new(q, Vec3::ZERO, Vec3::splat(2.0)); 4];
        let list = transform_list(&samples);
        let blob = encode(&list, VERSION_02_00_00, &CompressionSettings::default()).unwrap();
        let compressed = CompressedTracks::validate(&blob, &[VERSION_02_00_00]).unwrap();
        let header = compressed.transform_header().unwrap();
        assert_eq!(header.num_constant_rotation_samples, 1);
        assert_eq!(header.num_constant_scale_samples, 1);
        assert_eq!(header.num_constant_translation_samples, 0);
        assert!(compressed.tracks_header().has_scale);
    }

    #[test]
    fn test_drop_w_rebuilds_rotation() {
        let q = Quat::from_rotation_x(2.5);
        let list = transform_list(&[Qvv::new(-q, Vec3::ONE, Vec3::ONE)]);
        let settings = CompressionSettings {
            rotation_format: RotationFormat8::QuatfDropWFull,
            ..CompressionSettings::default()
        };
        let blob = encode(&list, VERSION_02_01_99_2, &settings).unwrap();
        let compressed = CompressedTracks::validate(&blob, &[VERSION_02_01_99_2]).unwrap();
        assert_eq!(
            compressed.tracks_header().rotation_format,
            RotationFormat8::QuatfDropWFull
        );
        let decoded = decode(&compressed).unwrap();
        let rotation = decoded.tracks[0].qvv(0).rotation;
        assert!(rotation.angle_between(q) < 1.0e-3);
        assert!(rotation.w >= 0.0);
    }

    #[test]
    fn test_rejects_variable_formats_and_mixed_layouts() {
        let settings = CompressionSettings {
            translation_format: VectorFormat8::Vector3fVariable,
            ..CompressionSettings::default()
        };
        assert!(matches!(
            encode(&scalar_list(1, 1), VERSION_02_00_00, &settings),
            Err(Error::Encode(_))
        ));

        let mut list = scalar_list(2, 3);
        list.tracks.push(scalar_list(1, 4).tracks.remove(0));
        assert!(encode(&list, VERSION_02_00_00, &CompressionSettings::default()).is_err());

        assert!(encode(&scalar_list(1, 1), 42, &CompressionSettings::default()).is_err());
    }

    #[test]
    fn test_empty_list() {
        let list = NativeTrackList::new("empty");
        let blob = encode(&list, VERSION_02_00_00, &CompressionSettings::default()).unwrap();
        let compressed = CompressedTracks::validate(&blob, &[VERSION_02_00_00]).unwrap();
        let decoded = decode(&compressed).unwrap();
        assert!(decoded.tracks.is_empty());
        assert_eq!(decoded.name, "empty");
    }
}
