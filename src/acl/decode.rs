//! Compressed tracks blob to native track list.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Quat, Vec3, Vec4};

use super::format::FIRST_VERSION_WITH_DEFAULT_VALUE;
use super::{
    CompressedTracks, NativeTrack, NativeTrackList, RotationFormat8, TrackDesc,
    TrackDescScalarf, TrackDescTransformf, TrackType8, TracksHeader, VectorFormat8,
};
use crate::model::Qvv;
use crate::util::{Error, Result};

/// Longest string accepted in a blob.
const MAX_STRING_LEN: usize = 64 * 1024;

fn truncated(what: &str) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |_| Error::invalid_binary(format!("Truncated data while reading {what}"))
}

fn read_string(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<String> {
    let len = cursor.read_u32::<LittleEndian>().map_err(truncated(what))? as usize;
    if len > MAX_STRING_LEN {
        return Err(Error::invalid_binary(format!("{what} too long: {len} bytes")));
    }
    let mut bytes = vec![0u8; len];
    cursor.read_exact(&mut bytes).map_err(truncated(what))?;
    String::from_utf8(bytes).map_err(|_| Error::invalid_binary(format!("{what} is not UTF-8")))
}

fn read_f32s<const N: usize>(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<[f32; N]> {
    let mut values = [0f32; N];
    cursor
        .read_f32_into::<LittleEndian>(&mut values)
        .map_err(truncated(what))?;
    Ok(values)
}

fn read_vec3(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<Vec3> {
    Ok(Vec3::from_array(read_f32s::<3>(cursor, what)?))
}

/// Full 12-float transform as stored for default poses.
fn read_qvv_full(cursor: &mut Cursor<&[u8]>) -> Result<Qvv> {
    let v = read_f32s::<12>(cursor, "default value")?;
    Ok(Qvv {
        rotation: Quat::from_xyzw(v[0], v[1], v[2], v[3]),
        translation: Vec4::new(v[4], v[5], v[6], v[7]),
        scale: Vec4::new(v[8], v[9], v[10], v[11]),
    })
}

fn read_rotation(cursor: &mut Cursor<&[u8]>, format: RotationFormat8) -> Result<Quat> {
    match format {
        RotationFormat8::QuatfFull => {
            let [x, y, z, w] = read_f32s::<4>(cursor, "rotation")?;
            Ok(Quat::from_xyzw(x, y, z, w))
        }
        RotationFormat8::QuatfDropWFull => {
            let [x, y, z] = read_f32s::<3>(cursor, "rotation")?;
            let w = (1.0 - x * x - y * y - z * z).max(0.0).sqrt();
            Ok(Quat::from_xyzw(x, y, z, w))
        }
        RotationFormat8::QuatfDropWVariable => Err(Error::invalid_binary(
            "Variable bit rate rotations cannot be decoded",
        )),
    }
}

/// Bytes one qvvf sample occupies in the blob.
fn stored_qvv_size(header: &TracksHeader) -> usize {
    let rotation = match header.rotation_format {
        RotationFormat8::QuatfFull => 16,
        _ => 12,
    };
    let scale = if header.has_scale { 12 } else { 0 };
    rotation + 12 + scale
}

fn read_desc(
    cursor: &mut Cursor<&[u8]>,
    track_type: TrackType8,
    has_default_value: bool,
) -> Result<TrackDesc> {
    let output_index = cursor
        .read_u32::<LittleEndian>()
        .map_err(truncated("output index"))?;

    if track_type != TrackType8::Qvvf {
        let [precision] = read_f32s::<1>(cursor, "scalar description")?;
        return Ok(TrackDesc::Scalar(TrackDescScalarf {
            output_index,
            precision,
        }));
    }

    let parent_index = cursor
        .read_u32::<LittleEndian>()
        .map_err(truncated("parent index"))?;
    let [precision, shell_distance, rotation, translation, scale] =
        read_f32s::<5>(cursor, "transform description")?;
    let default_value = if has_default_value {
        read_qvv_full(cursor)?
    } else {
        Qvv::IDENTITY
    };

    Ok(TrackDesc::Transform(TrackDescTransformf {
        default_value,
        output_index,
        parent_index,
        precision,
        shell_distance,
        constant_rotation_threshold_angle: rotation,
        constant_translation_threshold: translation,
        constant_scale_threshold: scale,
    }))
}

/// Decode a validated blob into native tracks.
pub fn decode(compressed: &CompressedTracks<'_>) -> Result<NativeTrackList> {
    let header = *compressed.tracks_header();
    if header.translation_format == VectorFormat8::Vector3fVariable
        || (header.has_scale && header.scale_format == VectorFormat8::Vector3fVariable)
    {
        return Err(Error::invalid_binary(
            "Variable bit rate vectors cannot be decoded",
        ));
    }

    let data = compressed.as_bytes();
    let track_type = compressed.track_type();
    let num_tracks = compressed.num_tracks() as usize;
    let num_samples = compressed.num_samples_per_track() as usize;
    let sample_rate = compressed.sample_rate();
    let has_default_value = compressed.version() >= FIRST_VERSION_WITH_DEFAULT_VALUE;

    let stored_sample_size = match track_type {
        TrackType8::Qvvf => stored_qvv_size(&header),
        other => other.sample_size(),
    };
    let payload = num_tracks
        .checked_mul(num_samples)
        .and_then(|n| n.checked_mul(stored_sample_size));
    if payload.map_or(true, |bytes| bytes > data.len()) {
        return Err(Error::invalid_binary(format!(
            "{num_tracks} tracks of {num_samples} samples exceed the blob size"
        )));
    }

    let mut cursor = Cursor::new(data);
    cursor.set_position(compressed.body_offset() as u64);

    let mut list = NativeTrackList::new(read_string(&mut cursor, "track list name")?);

    for _ in 0..num_tracks {
        let name = read_string(&mut cursor, "track name")?;
        let desc = read_desc(&mut cursor, track_type, has_default_value)?;
        list.tracks.push(NativeTrack::make_reserve(
            track_type,
            desc,
            num_samples,
            sample_rate,
            name,
        )?);
    }

    for track in &mut list.tracks {
        for sample_index in 0..num_samples {
            let slot = track.sample_mut(sample_index);
            if track_type == TrackType8::Qvvf {
                let rotation = read_rotation(&mut cursor, header.rotation_format)?;
                let translation = read_vec3(&mut cursor, "translation")?;
                let scale = if header.has_scale {
                    read_vec3(&mut cursor, "scale")?
                } else {
                    Vec3::ONE
                };
                let qvv = Qvv::new(rotation, translation, scale);
                slot.copy_from_slice(bytemuck::bytes_of(&qvv));
            } else {
                for component in slot.chunks_exact_mut(4) {
                    let value = cursor
                        .read_f32::<LittleEndian>()
                        .map_err(truncated("samples"))?;
                    component.copy_from_slice(&value.to_ne_bytes());
                }
            }
        }
    }

    if cursor.position() as usize != data.len() {
        return Err(Error::invalid_binary(format!(
            "{} unexpected trailing bytes",
            data.len() - cursor.position() as usize
        )));
    }

    Ok(list)
}
