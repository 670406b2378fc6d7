//! SJSON raw track list writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::document::*;
use super::SjsonFloat;
use crate::acl::{NativeTrackList, TrackDesc, TrackType8};
use crate::config::RevisionConfig;
use crate::model::Qvv;
use crate::util::{Error, Result};

fn floats(values: &[f32]) -> Vec<SjsonFloat> {
    values.iter().copied().map(SjsonFloat).collect()
}

fn qvv_row(qvv: &Qvv) -> Vec<SjsonFloat> {
    let mut row = Vec::with_capacity(QVV_ROW_LEN);
    row.extend(floats(&qvv.rotation.to_array()));
    row.extend(floats(&qvv.translation.truncate().to_array()));
    row.extend(floats(&qvv.scale.truncate().to_array()));
    row
}

/// Build the binary exact document for `list` at `config`'s revision.
pub(crate) fn track_list_doc(list: &NativeTrackList, config: &RevisionConfig) -> TrackListDoc {
    let tracks = list
        .tracks
        .iter()
        .map(|track| {
            let data = (0..track.num_samples())
                .map(|i| match track.track_type() {
                    TrackType8::Qvvf => qvv_row(&track.qvv(i)),
                    _ => floats(&sample_floats(track.sample(i))),
                })
                .collect();

            let mut entry = TrackEntry {
                name: track.name().to_owned(),
                track_type: track.track_type().name().to_owned(),
                output_index: None,
                precision: None,
                parent_index: None,
                shell_distance: None,
                constant_rotation_threshold_angle: None,
                constant_translation_threshold: None,
                constant_scale_threshold: None,
                default_value: None,
                data,
            };

            match track.desc() {
                TrackDesc::Scalar(desc) => {
                    entry.output_index = Some(index_to_doc(desc.output_index));
                    entry.precision = Some(SjsonFloat(desc.precision));
                }
                TrackDesc::Transform(desc) => {
                    entry.output_index = Some(index_to_doc(desc.output_index));
                    entry.parent_index = Some(index_to_doc(desc.parent_index));
                    entry.precision = Some(SjsonFloat(desc.precision));
                    entry.shell_distance = Some(SjsonFloat(desc.shell_distance));
                    entry.constant_rotation_threshold_angle =
                        Some(SjsonFloat(desc.constant_rotation_threshold_angle));
                    entry.constant_translation_threshold =
                        Some(SjsonFloat(desc.constant_translation_threshold));
                    entry.constant_scale_threshold = Some(SjsonFloat(desc.constant_scale_threshold));
                    if config.supports_default_value {
                        entry.default_value = Some(qvv_row(&desc.default_value));
                    }
                }
            }
            entry
        })
        .collect();

    TrackListDoc {
        version: config.sjson_version,
        track_list: TrackListHeader {
            name: list.name.clone(),
            num_samples: list.num_samples_per_track() as u32,
            sample_rate: SjsonFloat(list.sample_rate()),
            is_binary_exact: true,
        },
        settings: None,
        tracks,
    }
}

fn sample_floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Write `list` as a raw track list document to `path`.
pub fn write_track_list(list: &NativeTrackList, config: &RevisionConfig, path: &Path) -> Result<()> {
    let doc = track_list_doc(list, config);

    let file = File::create(path).map_err(|e| Error::io("open", path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &doc)
        .map_err(|e| Error::io("write", path, e.into()))?;
    writer
        .write_all(b"\n")
        .map_err(|e| Error::io("write", path, e))?;
    writer.flush().map_err(|e| Error::io("close", path, e))?;

    debug!(
        path = %path.display(),
        version = config.sjson_version,
        tracks = list.tracks.len(),
        "wrote SJSON track list"
    );
    Ok(())
}
