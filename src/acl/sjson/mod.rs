//! SJSON text documents.
//!
//! SJSON here is the JSON-compatible subset: quoted keys, commas, no
//! comments. Two document kinds exist, a raw clip (bones plus per-bone
//! channels) and a raw track list. Only raw track lists are written.

mod document;
mod float;
mod reader;
mod writer;

pub use document::QVV_ROW_LEN;
pub use float::SjsonFloat;
pub use reader::{ClipReader, RawClip, RawTrackList, SjsonFile, SjsonFileType};
pub use writer::write_track_list;
