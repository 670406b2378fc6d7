//! Native track codec.
//!
//! Binary blob layout (all little-endian):
//!
//! ```text
//! +--------------------------+  0
//! | tracks header (32 bytes) |  size, hash, tag, version, type, counts, formats
//! +--------------------------+ 32
//! | transform header (28)    |  qvvf only: segments, sub-track counts
//! +--------------------------+
//! | list name                |  u32 length + UTF-8
//! | track descriptions       |  name, output index, settings
//! | samples                  |  track after track
//! +--------------------------+ size
//! ```
//!
//! [`sjson`] handles the text form of the same native tracks.

pub mod format;
mod track;
mod compressed;
mod decode;
mod encode;
pub mod sjson;

pub use track::*;
pub use compressed::{CompressedTracks, TracksHeader, TransformTracksHeader};
pub use decode::decode;
pub use encode::{encode, CompressionSettings};
