//! Aligned whole-file reads and file classification.
//!
//! Input files are read in one go into a heap buffer whose payload starts
//! on a 64-byte boundary. The buffer owns its allocation and remembers the
//! padding it skipped, so releasing it is just dropping it.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::trace;

use crate::util::{Error, Result};

/// Alignment of the payload returned by [`AlignedBuffer::read_file`].
pub const FILE_ALIGNMENT: usize = 64;

/// Read buffer capacity used while loading a file.
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Extension of binary compressed track files.
pub const BINARY_EXTENSION: &str = ".acl";

/// Extension of human readable track files.
pub const TEXT_EXTENSION: &str = ".acl.sjson";

/// Owned file contents aligned to [`FILE_ALIGNMENT`] bytes.
pub struct AlignedBuffer {
    storage: Vec<u8>,
    offset: usize,
    len: usize,
}

impl AlignedBuffer {
    /// Allocate a zeroed buffer able to hold `len` aligned bytes.
    fn with_len(len: usize) -> Self {
        let storage = vec![0u8; len + FILE_ALIGNMENT];
        let offset = storage.as_ptr().align_offset(FILE_ALIGNMENT);
        debug_assert!(offset < FILE_ALIGNMENT);
        Self { storage, offset, len }
    }

    /// Read an entire file into a new aligned buffer.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io("open", path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let size = reader
            .seek(SeekFrom::End(0))
            .map_err(|e| Error::io("seek", path, e))?;
        let size = usize::try_from(size).map_err(|_| {
            Error::io(
                "size",
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "file too large"),
            )
        })?;
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io("seek", path, e))?;

        let mut buffer = Self::with_len(size);
        let mut read = 0;
        {
            let dst = buffer.as_mut_slice();
            while read < size {
                match reader.read(&mut dst[read..]) {
                    Ok(0) => break,
                    Ok(n) => read += n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(Error::io("read", path, e)),
                }
            }
        }

        if read != size {
            return Err(Error::ShortRead {
                path: path.to_path_buf(),
                expected: size,
                actual: read,
            });
        }

        trace!(path = %path.display(), size, "read file");
        Ok(buffer)
    }

    /// Number of payload bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Padding skipped at the start of the allocation to reach alignment.
    #[inline]
    pub fn padding(&self) -> usize {
        self.offset
    }

    /// Aligned payload.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.len]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.offset..self.offset + self.len]
    }

    /// Release the buffer. Equivalent to dropping it.
    #[inline]
    pub fn release(self) {}
}

impl AsRef<[u8]> for AlignedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("padding", &self.offset)
            .finish()
    }
}

/// On-disk representation of a track file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// Packed binary blob (`*.acl`)
    Binary,
    /// Structured text document (`*.acl.sjson`)
    Text,
}

impl FileKind {
    /// Classify a file by name only. Binary iff the last four characters
    /// are exactly `.acl`; everything else is text.
    pub fn classify(filename: impl AsRef<Path>) -> Self {
        let name = filename.as_ref().as_os_str().as_encoded_bytes();
        if name.ends_with(BINARY_EXTENSION.as_bytes()) {
            Self::Binary
        } else {
            Self::Text
        }
    }

    /// Whether the name carries the reserved text extension.
    pub fn is_sjson_name(filename: impl AsRef<Path>) -> bool {
        filename
            .as_ref()
            .as_os_str()
            .as_encoded_bytes()
            .ends_with(TEXT_EXTENSION.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(len: usize) -> NamedTempFile {
        let mut temp = NamedTempFile::new().expect("temp file");
        let data: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
        temp.write_all(&data).expect("write");
        temp.flush().expect("flush");
        temp
    }

    #[test]
    fn test_read_file_is_aligned() {
        for len in [0usize, 1, 63, 64, 65, 4096, 1024 * 1024 + 17] {
            let temp = temp_with(len);
            let buffer = AlignedBuffer::read_file(temp.path()).expect("read");
            assert_eq!(buffer.len(), len);
            assert_eq!(buffer.as_slice().as_ptr() as usize % FILE_ALIGNMENT, 0, "len {len}");
            assert!(buffer.padding() < FILE_ALIGNMENT);
        }
    }

    #[test]
    fn test_read_file_contents() {
        let temp = temp_with(300);
        let buffer = AlignedBuffer::read_file(temp.path()).expect("read");
        let expected = std::fs::read(temp.path()).expect("std read");
        assert_eq!(buffer.as_slice(), expected.as_slice());
        buffer.release();
    }

    #[test]
    fn test_read_missing_file() {
        let err = AlignedBuffer::read_file("/definitely/not/here.acl").unwrap_err();
        assert!(matches!(err, Error::Io { op: "open", .. }));
    }

    #[test]
    fn test_classify() {
        assert_eq!(FileKind::classify("clip.acl"), FileKind::Binary);
        assert_eq!(FileKind::classify("dir/clip.acl"), FileKind::Binary);
        assert_eq!(FileKind::classify("clip.acl.sjson"), FileKind::Text);
        assert_eq!(FileKind::classify("clip.ACL"), FileKind::Text);
        assert_eq!(FileKind::classify("acl"), FileKind::Text);
        assert_eq!(FileKind::classify(""), FileKind::Text);
        assert!(FileKind::is_sjson_name("clip.acl.sjson"));
        assert!(!FileKind::is_sjson_name("clip.acl"));
    }

    #[test]
    fn test_classify_is_lexical() {
        // Does not exist on disk; result must not depend on it.
        let name = "nowhere/at/all/track.acl";
        assert_eq!(FileKind::classify(name), FileKind::classify(name));
        assert_eq!(FileKind::classify(name), FileKind::Binary);
    }
}
