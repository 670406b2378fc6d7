//! # ACL SJSON
//!
//! Converts ACL animation tracks between the packed binary form (`*.acl`)
//! and the human readable SJSON form (`*.acl.sjson`), across the 2.0 and
//! 2.1 schema revisions.
//!
//! ## Modules
//!
//! - [`util`] - Error handling
//! - [`io`] - Aligned file reads and file classification
//! - [`model`] - Revision-independent tracks, samples and metadata
//! - [`config`] - Per-revision defaults and version tags
//! - [`acl`] - Native tracks, binary blob codec and SJSON documents
//! - [`shim`] - Per-revision readers and writers
//! - [`convert`] - Revision probing, conversion and `info` reports
//!
//! ## Example
//!
//! ```ignore
//! use acl_sjson::{AclVersion, Converter};
//! use std::path::Path;
//!
//! let converter = Converter::new();
//! converter.convert(Path::new("walk.acl"), Path::new("walk.acl.sjson"), Some(AclVersion::V02_00_00))?;
//! println!("{}", converter.info(Path::new("walk.acl.sjson"))?);
//! ```

pub mod util;
pub mod io;
pub mod model;
pub mod config;
pub mod acl;
pub mod shim;
pub mod convert;

// Re-export commonly used types
pub use convert::{Converter, InfoReport};
pub use model::{AclVersion, Sample, SampleType, Track, TrackArray};
pub use util::{Error, Result};
