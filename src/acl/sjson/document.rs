//! Serde shapes of the two SJSON document kinds.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::SjsonFloat;

/// Number of values in one qvvf sample row.
pub const QVV_ROW_LEN: usize = 10;

/// Top-level keys needed to pick a document kind.
#[derive(Deserialize)]
pub(crate) struct Probe {
    pub version: u32,
    pub clip: Option<IgnoredAny>,
    pub track_list: Option<IgnoredAny>,
}

/// Raw track list document.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct TrackListDoc {
    pub version: u32,
    pub track_list: TrackListHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub tracks: Vec<TrackEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct TrackListHeader {
    #[serde(default)]
    pub name: String,
    pub num_samples: u32,
    pub sample_rate: SjsonFloat,
    #[serde(default)]
    pub is_binary_exact: bool,
}

/// One track of a raw track list. Transform-only fields are absent on
/// scalar tracks.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct TrackEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub track_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<SjsonFloat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_distance: Option<SjsonFloat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_rotation_threshold_angle: Option<SjsonFloat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_translation_threshold: Option<SjsonFloat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_scale_threshold: Option<SjsonFloat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Vec<SjsonFloat>>,
    #[serde(default)]
    pub data: Vec<Vec<SjsonFloat>>,
}

/// Raw clip document.
#[derive(Debug, Deserialize)]
pub(crate) struct ClipDoc {
    pub version: u32,
    pub clip: ClipHeader,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub bones: Vec<Bone>,
    #[serde(default)]
    pub tracks: Vec<BoneTrack>,
    #[serde(default)]
    pub base_tracks: Vec<BoneTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClipHeader {
    #[serde(default)]
    pub name: String,
    pub num_samples: u32,
    pub sample_rate: SjsonFloat,
    #[serde(default)]
    pub is_binary_exact: bool,
    #[serde(default)]
    pub additive_format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Bone {
    pub name: String,
    #[serde(default)]
    pub parent: String,
    pub vertex_distance: Option<SjsonFloat>,
    pub bind_rotation: Option<[SjsonFloat; 4]>,
    pub bind_translation: Option<[SjsonFloat; 3]>,
    pub bind_scale: Option<[SjsonFloat; 3]>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BoneTrack {
    pub name: String,
    pub rotations: Option<Vec<[SjsonFloat; 4]>>,
    pub translations: Option<Vec<[SjsonFloat; 3]>>,
    pub scales: Option<Vec<[SjsonFloat; 3]>>,
}

/// Index as written in documents: `-1` stands for "none".
pub(crate) fn index_to_doc(index: u32) -> i64 {
    if index == u32::MAX {
        -1
    } else {
        i64::from(index)
    }
}

/// Inverse of [`index_to_doc`]; `None` when out of range.
pub(crate) fn index_from_doc(value: i64) -> Option<u32> {
    match value {
        -1 => Some(u32::MAX),
        v => u32::try_from(v).ok(),
    }
}
