//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path (repo-relative, POSIX separators)
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! Entries are stored in a binary format with 8-byte alignment. A 62-byte
//! fixed block (ten big-endian u32 stat fields, the raw 20-byte hash, and a
//! 16-bit flags field) is followed by the NUL-terminated path and zero
//! padding up to the next 8-byte boundary. When the NUL already lands on a
//! boundary no padding is written.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::io::Write;
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Maximum path length representable in the flags field (12 bits)
pub const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of an index entry in bytes: the 62-byte fixed block, a
/// one-byte path, and its NUL terminator
pub const ENTRY_MIN_SIZE: usize = 64;

/// Size of the fixed-width block preceding the path
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Index entry representing a staged file
///
/// Contains the file path, content hash, and metadata needed for
/// efficient change detection.
#[derive(Debug, Clone, Default, PartialEq, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: PathBuf,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    pub fn basename(&self) -> anyhow::Result<&str> {
        self.name
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name"))
    }

    /// All ancestor directories of the entry, outermost first.
    pub fn parent_dirs(&self) -> anyhow::Result<Vec<&Path>> {
        let mut dirs = Vec::new();
        let mut parent = self.name.parent();

        while let Some(new_parent) = parent {
            dirs.push(new_parent);
            parent = new_parent.parent();
        }
        dirs.reverse();
        let dirs = dirs[1..].to_vec();

        Ok(dirs)
    }

    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }
}

/// Stat metadata recorded per index entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: i64,
    /// Change time nanoseconds
    pub ctime_nsec: i64,
    /// Modification time (seconds since Unix epoch)
    pub mtime: i64,
    /// Modification time nanoseconds
    pub mtime_nsec: i64,
    /// Device ID
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// File mode (permissions and type)
    pub mode: EntryMode,
    /// User ID of owner
    pub uid: u32,
    /// Group ID of owner
    pub gid: u32,
    /// File size in bytes
    pub size: u64,
    /// Entry flags: low 12 bits hold min(path length, 0xFFF), the rest are
    /// stage/assume-valid bits
    pub flags: u32,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid entry name"))?;
        let entry_mode = self.metadata.mode.as_u32();

        // Path length lives in the low 12 bits; stage bits are preserved
        let flags =
            (self.metadata.flags as u16 & !(MAX_PATH_SIZE as u16))
                | min(entry_name.len(), MAX_PATH_SIZE) as u16;

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(entry_mode)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(flags)?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // NUL-terminate the path, then pad to the ENTRY_BLOCK boundary;
        // nothing is written when the terminator already lands on one
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl IndexEntry {
    /// Decode one entry from its padded byte block.
    ///
    /// The caller hands over the fixed block plus everything up to the next
    /// 8-byte boundary; the path is delimited by its NUL terminator, not by
    /// the (possibly truncated) length stored in flags.
    pub fn parse(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!("Invalid index entry size"));
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]) as u64;
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let mode = EntryMode::try_from(byteorder::NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]) as u64;
        let mut oid_bytes = std::io::Cursor::new(&bytes[40..60]);
        let oid = ObjectId::read_h40_from(&mut oid_bytes)?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]) as u32;

        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("Missing null terminator in entry name"))?;
        let name_bytes = &bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end];
        let name = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| anyhow::anyhow!("Invalid UTF-8 in entry name"))?,
        );

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
                flags,
            },
        })
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = anyhow::Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self, Self::Error> {
        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else {
            match file_path.is_executable() {
                true => EntryMode::File(FileMode::Executable),
                false => EntryMode::File(FileMode::Regular),
            }
        };
        let file_path = file_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid file path"))?;

        Ok(Self {
            ctime: metadata.ctime(),
            ctime_nsec: metadata.ctime_nsec(),
            mtime: metadata.mtime(),
            mtime_nsec: metadata.mtime_nsec(),
            dev: metadata.dev(),
            ino: metadata.ino(),
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            flags: min(file_path.len(), MAX_PATH_SIZE) as u32,
        })
    }
}
