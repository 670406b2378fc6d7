//! SJSON document reader.
//!
//! The document is parsed twice: a cheap probe for the version and kind,
//! then the typed parse of the matching shape. Both come from the same
//! text, so `serde_json` line and column positions stay accurate.

use glam::{Quat, Vec3};
use tracing::debug;

use super::document::*;
use super::float::to_f32s;
use super::SjsonFloat;
use crate::acl::{
    NativeTrack, NativeTrackList, TrackDesc, TrackDescScalarf, TrackDescTransformf, TrackType8,
};
use crate::config::RevisionConfig;
use crate::model::Qvv;
use crate::util::{Error, Result};

/// Most bone samples a clip may expand to.
///
/// Bones without channel data repeat their bind pose for every sample, so
/// the header alone decides the allocation.
pub const MAX_CLIP_SAMPLES: usize = 1 << 24;

/// Kind of an SJSON document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SjsonFileType {
    Unknown,
    RawClip,
    RawTrackList,
}

/// Skeleton clip: one transform track per bone.
#[derive(Debug)]
pub struct RawClip {
    pub track_list: NativeTrackList,
    pub additive_format: Option<String>,
    /// Bone tracks of the additive base clip.
    pub num_additive_base_tracks: usize,
    pub has_settings: bool,
}

impl RawClip {
    #[inline]
    pub fn has_additive_base(&self) -> bool {
        self.num_additive_base_tracks != 0
    }
}

/// Plain list of tracks.
#[derive(Debug)]
pub struct RawTrackList {
    pub track_list: NativeTrackList,
    pub has_settings: bool,
}

/// Parsed SJSON payload.
#[derive(Debug)]
pub enum SjsonFile {
    RawClip(RawClip),
    RawTrackList(RawTrackList),
}

impl SjsonFile {
    pub fn track_list(&self) -> &NativeTrackList {
        match self {
            Self::RawClip(clip) => &clip.track_list,
            Self::RawTrackList(list) => &list.track_list,
        }
    }

    pub fn into_track_list(self) -> NativeTrackList {
        match self {
            Self::RawClip(clip) => clip.track_list,
            Self::RawTrackList(list) => list.track_list,
        }
    }
}

/// Reader over one SJSON text buffer.
pub struct ClipReader<'a> {
    text: &'a str,
    version: u32,
    file_type: SjsonFileType,
}

impl<'a> ClipReader<'a> {
    /// Probe `bytes` for the document version and kind.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            Error::invalid_text(format!("document is not UTF-8 (byte {})", e.valid_up_to()))
        })?;
        let probe: Probe = serde_json::from_str(text)?;

        let file_type = if probe.clip.is_some() {
            SjsonFileType::RawClip
        } else if probe.track_list.is_some() {
            SjsonFileType::RawTrackList
        } else {
            SjsonFileType::Unknown
        };
        debug!(version = probe.version, ?file_type, "probed SJSON document");

        Ok(Self {
            text,
            version: probe.version,
            file_type,
        })
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn file_type(&self) -> SjsonFileType {
        self.file_type
    }

    /// Parse the full document; missing description fields take the
    /// defaults of `config`.
    pub fn read(&self, config: &RevisionConfig) -> Result<SjsonFile> {
        match self.file_type {
            SjsonFileType::RawTrackList => {
                let doc: TrackListDoc = serde_json::from_str(self.text)?;
                Ok(SjsonFile::RawTrackList(RawTrackList {
                    has_settings: doc.settings.is_some(),
                    track_list: track_list_from_doc(doc, config)?,
                }))
            }
            SjsonFileType::RawClip => {
                let doc: ClipDoc = serde_json::from_str(self.text)?;
                Ok(SjsonFile::RawClip(RawClip {
                    has_settings: doc.settings.is_some(),
                    additive_format: doc.clip.additive_format.clone(),
                    num_additive_base_tracks: doc.base_tracks.len(),
                    track_list: track_list_from_clip(&doc, config)?,
                }))
            }
            SjsonFileType::Unknown => Err(Error::invalid_text("Unknown file type")),
        }
    }
}

fn index_field(value: Option<i64>, default: u32, what: &str, track: &str) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(v) => index_from_doc(v)
            .ok_or_else(|| Error::invalid_text(format!("track '{track}': invalid {what} {v}"))),
    }
}

fn float_field(value: Option<SjsonFloat>, default: f32) -> f32 {
    value.map_or(default, f32::from)
}

/// Rate of a header; only empty collections may omit a usable rate.
fn sample_rate_field(rate: SjsonFloat, num_samples: usize) -> Result<f32> {
    let rate = f32::from(rate);
    if num_samples > 0 && !(rate.is_finite() && rate > 0.0) {
        return Err(Error::invalid_text(format!(
            "sample rate must be positive, got {rate}"
        )));
    }
    Ok(rate)
}

fn qvv_from_row(row: &[SjsonFloat]) -> Qvv {
    let v: Vec<f32> = row.iter().map(|f| f.0).collect();
    Qvv::new(
        Quat::from_xyzw(v[0], v[1], v[2], v[3]),
        Vec3::new(v[4], v[5], v[6]),
        Vec3::new(v[7], v[8], v[9]),
    )
}

fn track_list_from_doc(doc: TrackListDoc, config: &RevisionConfig) -> Result<NativeTrackList> {
    let header = doc.track_list;
    let num_samples = header.num_samples as usize;
    let sample_rate = sample_rate_field(header.sample_rate, num_samples)?;
    let mut list = NativeTrackList::new(header.name);

    for (track_index, entry) in doc.tracks.into_iter().enumerate() {
        let track_type = TrackType8::from_name(&entry.track_type).ok_or_else(|| {
            Error::invalid_text(format!(
                "track '{}': unknown track type '{}'",
                entry.name, entry.track_type
            ))
        })?;
        let output_index = index_field(
            entry.output_index,
            track_index as u32,
            "output index",
            &entry.name,
        )?;

        let desc = if track_type == TrackType8::Qvvf {
            let defaults = &config.transform;
            let default_value = match &entry.default_value {
                None => Qvv::IDENTITY,
                Some(row) if row.len() == QVV_ROW_LEN => qvv_from_row(row),
                Some(row) => {
                    return Err(Error::invalid_text(format!(
                        "track '{}': default value has {} values, expected {QVV_ROW_LEN}",
                        entry.name,
                        row.len()
                    )))
                }
            };
            TrackDesc::Transform(TrackDescTransformf {
                default_value,
                output_index,
                parent_index: index_field(
                    entry.parent_index,
                    u32::MAX,
                    "parent index",
                    &entry.name,
                )?,
                precision: float_field(entry.precision, defaults.precision),
                shell_distance: float_field(entry.shell_distance, defaults.shell_distance),
                constant_rotation_threshold_angle: float_field(
                    entry.constant_rotation_threshold_angle,
                    defaults.constant_rotation_threshold_angle,
                ),
                constant_translation_threshold: float_field(
                    entry.constant_translation_threshold,
                    defaults.constant_translation_threshold,
                ),
                constant_scale_threshold: float_field(
                    entry.constant_scale_threshold,
                    defaults.constant_scale_threshold,
                ),
            })
        } else {
            TrackDesc::Scalar(TrackDescScalarf {
                output_index,
                precision: float_field(entry.precision, config.scalar.precision),
            })
        };

        if entry.data.len() != num_samples {
            return Err(Error::invalid_text(format!(
                "track '{}' has {} samples, expected {num_samples}",
                entry.name,
                entry.data.len()
            )));
        }

        let row_len = match track_type {
            TrackType8::Qvvf => QVV_ROW_LEN,
            other => other.num_components(),
        };
        let mut track =
            NativeTrack::make_reserve(track_type, desc, num_samples, sample_rate, entry.name)?;
        for (sample_index, row) in entry.data.iter().enumerate() {
            if row.len() != row_len {
                return Err(Error::invalid_text(format!(
                    "track '{}' sample {sample_index} has {} values, expected {row_len}",
                    track.name(),
                    row.len()
                )));
            }
            let slot = track.sample_mut(sample_index);
            if track_type == TrackType8::Qvvf {
                slot.copy_from_slice(bytemuck::bytes_of(&qvv_from_row(row)));
            } else {
                let values: Vec<f32> = row.iter().map(|f| f.0).collect();
                slot.copy_from_slice(bytemuck::cast_slice(&values));
            }
        }
        list.tracks.push(track);
    }

    Ok(list)
}

/// Expand a channel to `num_samples` values, repeating `bind` when absent.
fn channel<const N: usize>(
    values: Option<&Vec<[SjsonFloat; N]>>,
    bind: [f32; N],
    num_samples: usize,
    what: &str,
    bone: &str,
) -> Result<Vec<[f32; N]>> {
    match values {
        None => Ok(vec![bind; num_samples]),
        Some(values) if values.len() == num_samples => Ok(values.iter().map(to_f32s).collect()),
        Some(values) => Err(Error::invalid_text(format!(
            "bone '{bone}' has {} {what}, expected {num_samples}",
            values.len()
        ))),
    }
}

/// Check channel lengths and the expanded size before anything is allocated.
fn check_clip_size(doc: &ClipDoc, num_samples: usize) -> Result<()> {
    for track in &doc.tracks {
        let lengths = [
            ("rotations", track.rotations.as_ref().map(Vec::len)),
            ("translations", track.translations.as_ref().map(Vec::len)),
            ("scales", track.scales.as_ref().map(Vec::len)),
        ];
        for (what, len) in lengths {
            if let Some(len) = len.filter(|&len| len != num_samples) {
                return Err(Error::invalid_text(format!(
                    "bone '{}' has {len} {what}, expected {num_samples}",
                    track.name
                )));
            }
        }
    }

    let total = doc.bones.len().saturating_mul(num_samples);
    if total > MAX_CLIP_SAMPLES {
        return Err(Error::invalid_text(format!(
            "clip expands to {} bones x {num_samples} samples, limit is {MAX_CLIP_SAMPLES}",
            doc.bones.len()
        )));
    }
    Ok(())
}

fn track_list_from_clip(doc: &ClipDoc, config: &RevisionConfig) -> Result<NativeTrackList> {
    let num_samples = doc.clip.num_samples as usize;
    let sample_rate = sample_rate_field(doc.clip.sample_rate, num_samples)?;
    check_clip_size(doc, num_samples)?;
    let defaults = &config.transform;
    let mut list = NativeTrackList::new(doc.clip.name.clone());

    for (bone_index, bone) in doc.bones.iter().enumerate() {
        let parent_index = if bone.parent.is_empty() {
            u32::MAX
        } else {
            doc.bones
                .iter()
                .position(|b| b.name == bone.parent)
                .map(|i| i as u32)
                .ok_or_else(|| {
                    Error::invalid_text(format!(
                        "bone '{}' has unknown parent '{}'",
                        bone.name, bone.parent
                    ))
                })?
        };

        let bind_rotation = bone.bind_rotation.as_ref().map_or([0.0, 0.0, 0.0, 1.0], to_f32s);
        let bind_translation = bone.bind_translation.as_ref().map_or([0.0; 3], to_f32s);
        let bind_scale = bone.bind_scale.as_ref().map_or([1.0; 3], to_f32s);
        let bind_pose = Qvv::new(
            Quat::from_array(bind_rotation),
            Vec3::from_array(bind_translation),
            Vec3::from_array(bind_scale),
        );

        let desc = TrackDesc::Transform(TrackDescTransformf {
            default_value: bind_pose,
            output_index: bone_index as u32,
            parent_index,
            precision: defaults.precision,
            shell_distance: float_field(bone.vertex_distance, defaults.shell_distance),
            constant_rotation_threshold_angle: defaults.constant_rotation_threshold_angle,
            constant_translation_threshold: defaults.constant_translation_threshold,
            constant_scale_threshold: defaults.constant_scale_threshold,
        });

        let bone_track = doc.tracks.iter().find(|t| t.name == bone.name);
        let rotations = channel(
            bone_track.and_then(|t| t.rotations.as_ref()),
            bind_rotation,
            num_samples,
            "rotations",
            &bone.name,
        )?;
        let translations = channel(
            bone_track.and_then(|t| t.translations.as_ref()),
            bind_translation,
            num_samples,
            "translations",
            &bone.name,
        )?;
        let scales = channel(
            bone_track.and_then(|t| t.scales.as_ref()),
            bind_scale,
            num_samples,
            "scales",
            &bone.name,
        )?;

        let mut track = NativeTrack::make_reserve(
            TrackType8::Qvvf,
            desc,
            num_samples,
            sample_rate,
            bone.name.clone(),
        )?;
        for sample_index in 0..num_samples {
            let qvv = Qvv::new(
                Quat::from_array(rotations[sample_index]),
                Vec3::from_array(translations[sample_index]),
                Vec3::from_array(scales[sample_index]),
            );
            track
                .sample_mut(sample_index)
                .copy_from_slice(bytemuck::bytes_of(&qvv));
        }
        list.tracks.push(track);
    }

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    fn read(text: &str) -> Result<SjsonFile> {
        ClipReader::new(text.as_bytes())?.read(config::latest())
    }

    #[test]
    fn test_probe_kinds() {
        let reader = ClipReader::new(br#"{"version": 5, "track_list": {}}"#).unwrap();
        assert_eq!(reader.version(), 5);
        assert_eq!(reader.file_type(), SjsonFileType::RawTrackList);

        let reader = ClipReader::new(br#"{"version": 3, "clip": {}}"#).unwrap();
        assert_eq!(reader.file_type(), SjsonFileType::RawClip);

        let reader = ClipReader::new(br#"{"version": 3}"#).unwrap();
        assert_eq!(reader.file_type(), SjsonFileType::Unknown);
        assert!(reader.read(config::latest()).is_err());
    }

    #[test]
    fn test_parse_error_has_location() {
        match ClipReader::new(b"{\n  \"version\": 5,\n  oops\n}") {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other.map(|r| r.version())),
        }
    }

    #[test]
    fn test_track_list_defaults() {
        let file = read(
            r#"{
                "version": 5,
                "track_list": { "name": "list", "num_samples": 2, "sample_rate": 30 },
                "tracks": [
                    { "name": "a", "type": "float2f", "data": [[1, 2], [3, "40800000"]] },
                    { "name": "b", "type": "float2f", "output_index": -1, "precision": 0.5,
                      "data": [[0, 0], [0, 0]] }
                ]
            }"#,
        )
        .unwrap();

        let SjsonFile::RawTrackList(list) = file else {
            panic!("expected a raw track list");
        };
        assert!(!list.has_settings);
        let tracks = &list.track_list.tracks;
        assert_eq!(list.track_list.name, "list");
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            *tracks[0].desc(),
            TrackDesc::Scalar(TrackDescScalarf {
                output_index: 0,
                precision: config::latest().scalar.precision,
            })
        );
        assert_eq!(
            *tracks[1].desc(),
            TrackDesc::Scalar(TrackDescScalarf {
                output_index: u32::MAX,
                precision: 0.5,
            })
        );
        let last: [f32; 2] = bytemuck::pod_read_unaligned(tracks[0].sample(1));
        assert_eq!(last, [3.0, 4.0]);
    }

    #[test]
    fn test_track_list_shape_errors() {
        let wrong_count = r#"{"version": 5, "track_list": {"num_samples": 2, "sample_rate": 30},
            "tracks": [{"name": "a", "type": "float1f", "data": [[1]]}]}"#;
        assert!(matches!(read(wrong_count), Err(Error::InvalidText(_))));

        let wrong_width = r#"{"version": 5, "track_list": {"num_samples": 1, "sample_rate": 30},
            "tracks": [{"name": "a", "type": "float3f", "data": [[1, 2]]}]}"#;
        assert!(matches!(read(wrong_width), Err(Error::InvalidText(_))));

        let bad_type = r#"{"version": 5, "track_list": {"num_samples": 0, "sample_rate": 30},
            "tracks": [{"name": "a", "type": "quatf", "data": []}]}"#;
        assert!(matches!(read(bad_type), Err(Error::InvalidText(_))));
    }

    #[test]
    fn test_clip_bones_become_transform_tracks() {
        let file = read(
            r#"{
                "version": 5,
                "clip": { "name": "walk", "num_samples": 2, "sample_rate": 60 },
                "settings": { "level": "medium" },
                "bones": [
                    { "name": "root", "parent": "", "vertex_distance": 1.5 },
                    { "name": "hip", "parent": "root", "bind_translation": [0, 1, 0] }
                ],
                "tracks": [
                    { "name": "hip", "translations": [[0, 1, 0], [0, 2, 0]] }
                ]
            }"#,
        )
        .unwrap();

        let SjsonFile::RawClip(clip) = file else {
            panic!("expected a raw clip");
        };
        assert!(clip.has_settings);
        assert!(!clip.has_additive_base());

        let tracks = &clip.track_list.tracks;
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].sample_rate(), 60.0);

        let TrackDesc::Transform(root) = tracks[0].desc() else {
            panic!("expected a transform description");
        };
        assert_eq!(root.parent_index, u32::MAX);
        assert_eq!(root.shell_distance, 1.5);
        assert_eq!(tracks[0].qvv(1), Qvv::IDENTITY);

        let TrackDesc::Transform(hip) = tracks[1].desc() else {
            panic!("expected a transform description");
        };
        assert_eq!(hip.parent_index, 0);
        assert_eq!(hip.output_index, 1);
        assert_eq!(hip.default_value.translation.y, 1.0);
        assert_eq!(tracks[1].qvv(1).translation.y, 2.0);
    }

    #[test]
    fn test_clip_with_base_tracks() {
        let file = read(
            r#"{
                "version": 5,
                "clip": { "num_samples": 1, "sample_rate": 30, "additive_format": "additive1" },
                "bones": [ { "name": "root" } ],
                "base_tracks": [ { "name": "root" } ]
            }"#,
        )
        .unwrap();
        let SjsonFile::RawClip(clip) = file else {
            panic!("expected a raw clip");
        };
        assert!(clip.has_additive_base());
        assert_eq!(clip.additive_format.as_deref(), Some("additive1"));
    }

    #[test]
    fn test_clip_size_is_checked_before_expansion() {
        let huge = r#"{"version": 5, "clip": {"num_samples": 4294967295, "sample_rate": 30},
            "bones": [{"name": "root"}]}"#;
        match read(huge) {
            Err(Error::InvalidText(msg)) => assert!(msg.contains("limit"), "{msg}"),
            other => panic!("expected invalid text, got {other:?}"),
        }

        let short_channel = r#"{"version": 5, "clip": {"num_samples": 4294967295, "sample_rate": 30},
            "bones": [{"name": "root"}],
            "tracks": [{"name": "root", "scales": [[1, 1, 1]]}]}"#;
        match read(short_channel) {
            Err(Error::InvalidText(msg)) => assert!(msg.contains("1 scales"), "{msg}"),
            other => panic!("expected invalid text, got {other:?}"),
        }

        // Header size alone is fine when no bones expand it.
        let no_bones = r#"{"version": 5, "clip": {"num_samples": 4294967295, "sample_rate": 30}}"#;
        let file = read(no_bones).unwrap();
        assert!(file.track_list().tracks.is_empty());
    }

    #[test]
    fn test_sample_rate_must_be_positive() {
        for rate in ["0", "-30", "\"7fc00000\"", "\"7f800000\""] {
            let list = format!(
                r#"{{"version": 5, "track_list": {{"num_samples": 1, "sample_rate": {rate}}},
                    "tracks": [{{"name": "a", "type": "float1f", "data": [[1]]}}]}}"#
            );
            assert!(matches!(read(&list), Err(Error::InvalidText(_))), "track list rate {rate}");

            let clip = format!(
                r#"{{"version": 5, "clip": {{"num_samples": 2, "sample_rate": {rate}}},
                    "bones": [{{"name": "root"}}]}}"#
            );
            assert!(matches!(read(&clip), Err(Error::InvalidText(_))), "clip rate {rate}");
        }

        // Empty collections keep a zero rate.
        let empty = r#"{"version": 5, "track_list": {"num_samples": 0, "sample_rate": 0}, "tracks": []}"#;
        assert!(read(empty).is_ok());
        let empty_clip = r#"{"version": 5, "clip": {"num_samples": 0, "sample_rate": 0},
            "bones": [{"name": "root"}]}"#;
        assert!(read(empty_clip).is_ok());
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let text = r#"{"version": 5, "clip": {"num_samples": 0, "sample_rate": 30},
            "bones": [{"name": "a", "parent": "ghost"}]}"#;
        assert!(matches!(read(text), Err(Error::InvalidText(_))));
    }
}
