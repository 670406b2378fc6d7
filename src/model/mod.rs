//! Revision-independent track model.
//!
//! - [`Sample`] / [`SampleType`] - tagged sample payloads
//! - [`TrackDescription`] - per-track compression settings
//! - [`Track`] / [`TrackArray`] - tracks and collections
//! - [`Metadata`] - revision, size and layout facts of a collection

mod version;
mod sample;
mod description;
mod track;
mod track_array;
mod metadata;

pub use version::*;
pub use sample::*;
pub use description::*;
pub use track::*;
pub use track_array::*;
pub use metadata::*;
