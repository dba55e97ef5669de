// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The engine's package archive format.
//!
//! A package is a single file holding many resources:
//!
//! ```text
//! id        4 bytes   "UPAK" (or "ULZ4" when entries are compressed)
//! count     u32 LE    number of entries
//! checksum  u32 LE    checksum of all entry data
//! entries   count x { name: NUL-terminated UTF-8, offset: u32, size: u32, checksum: u32 }
//! data      entry payloads, addressed by absolute offset
//! ```
//!
//! In a `ULZ4` package each payload is a run of LZ4 blocks, each prefixed by
//! its unpacked and packed sizes as `u32 LE`. The index then records the
//! unpacked size and the checksum of the unpacked bytes.

use crate::error::{ResourceError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File extension of package archives.
pub const PACKAGE_EXTENSION: &str = "pak";

const PLAIN_ID: &[u8; 4] = b"UPAK";
const COMPRESSED_ID: &[u8; 4] = b"ULZ4";

/// Unpacked size of the blocks written into compressed packages.
const COMPRESSED_BLOCK_SIZE: usize = 32 * 1024;

/// Location of one resource inside a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageEntry {
    /// Absolute byte offset of the payload.
    pub offset: u32,
    /// Payload size in bytes, unpacked.
    pub size: u32,
    /// Checksum of the payload.
    pub checksum: u32,
}

/// An opened package archive. Only the index is held in memory; payloads are
/// read on demand.
#[derive(Debug, Clone)]
pub struct PackageFile {
    path: PathBuf,
    entries: BTreeMap<String, PackageEntry>,
    checksum: u32,
    compressed: bool,
    total_size: u64,
}

impl PackageFile {
    /// Opens a package and reads its index.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let total_size = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let invalid = |reason: &str| ResourceError::InvalidPackage {
            path: path.clone(),
            reason: reason.to_string(),
        };

        let mut id = [0u8; 4];
        reader
            .read_exact(&mut id)
            .map_err(|_| invalid("missing header"))?;
        let compressed = match &id {
            PLAIN_ID => false,
            COMPRESSED_ID => true,
            _ => return Err(invalid("unknown package id")),
        };

        let count = read_u32(&mut reader).map_err(|_| invalid("truncated header"))?;
        let checksum = read_u32(&mut reader).map_err(|_| invalid("truncated header"))?;

        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let mut raw_name = Vec::new();
            reader
                .read_until(0, &mut raw_name)
                .map_err(|_| invalid("truncated entry name"))?;
            if raw_name.pop() != Some(0) {
                return Err(invalid("unterminated entry name"));
            }
            let name = String::from_utf8(raw_name).map_err(|_| invalid("entry name is not UTF-8"))?;

            let entry = PackageEntry {
                offset: read_u32(&mut reader).map_err(|_| invalid("truncated entry"))?,
                size: read_u32(&mut reader).map_err(|_| invalid("truncated entry"))?,
                checksum: read_u32(&mut reader).map_err(|_| invalid("truncated entry"))?,
            };
            // Compressed payloads are stored in blocks, so their size is not a span of the file.
            if !compressed && u64::from(entry.offset) + u64::from(entry.size) > total_size {
                return Err(invalid("entry extends past end of file"));
            }
            entries.insert(normalize_name(&name), entry);
        }

        Ok(Self {
            path,
            entries,
            checksum,
            compressed,
            total_size,
        })
    }

    /// Writes a new uncompressed package containing `files` and opens it.
    pub fn create<N, D>(path: impl AsRef<Path>, files: &[(N, D)]) -> Result<Self>
    where
        N: AsRef<str>,
        D: AsRef<[u8]>,
    {
        write_package(path.as_ref(), files, false)?;
        Self::open(path)
    }

    /// Writes a new package whose entries are LZ4-compressed and opens it.
    pub fn create_compressed<N, D>(path: impl AsRef<Path>, files: &[(N, D)]) -> Result<Self>
    where
        N: AsRef<str>,
        D: AsRef<[u8]>,
    {
        write_package(path.as_ref(), files, true)?;
        Self::open(path)
    }

    /// Path the package was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the package contains `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Looks up the index entry for `name`.
    pub fn entry(&self, name: &str) -> Option<&PackageEntry> {
        self.entries.get(&normalize_name(name))
    }

    /// Reads the payload of `name`, decompressing it if needed.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = *self
            .entry(name)
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))?;

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(u64::from(entry.offset)))?;
        if self.compressed {
            return read_blocks(&mut BufReader::new(file), name, entry.size as usize);
        }

        let mut bytes = vec![0u8; entry.size as usize];
        file.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Entry names in sorted order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn num_files(&self) -> usize {
        self.entries.len()
    }

    /// Checksum stored in the header.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Whether entries are stored compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Size of the archive on disk.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

fn write_package<N, D>(path: &Path, files: &[(N, D)], compressed: bool) -> Result<()>
where
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    let id = if compressed { COMPRESSED_ID } else { PLAIN_ID };
    let index_size: usize = files
        .iter()
        .map(|(name, _)| normalize_name(name.as_ref()).len() + 1 + 12)
        .sum();
    let header_size = id.len() + 8 + index_size;

    let mut index = Vec::with_capacity(index_size);
    let mut data = Vec::new();
    let mut checksum = 0u32;
    for (name, bytes) in files {
        let bytes = bytes.as_ref();
        let offset = to_u32(header_size + data.len(), path)?;
        let size = to_u32(bytes.len(), path)?;

        index.extend_from_slice(normalize_name(name.as_ref()).as_bytes());
        index.push(0);
        index.extend_from_slice(&offset.to_le_bytes());
        index.extend_from_slice(&size.to_le_bytes());
        index.extend_from_slice(&sdbm_hash(0, bytes).to_le_bytes());

        checksum = sdbm_hash(checksum, bytes);
        if compressed {
            for block in bytes.chunks(COMPRESSED_BLOCK_SIZE) {
                let packed = lz4_flex::block::compress(block);
                data.extend_from_slice(&to_u32(block.len(), path)?.to_le_bytes());
                data.extend_from_slice(&to_u32(packed.len(), path)?.to_le_bytes());
                data.extend_from_slice(&packed);
            }
        } else {
            data.extend_from_slice(bytes);
        }
    }

    let mut file = File::create(path)?;
    file.write_all(id)?;
    file.write_all(&to_u32(files.len(), path)?.to_le_bytes())?;
    file.write_all(&checksum.to_le_bytes())?;
    file.write_all(&index)?;
    file.write_all(&data)?;
    file.flush()?;
    Ok(())
}

fn read_blocks(reader: &mut impl Read, name: &str, size: usize) -> Result<Vec<u8>> {
    let corrupt = |reason: String| ResourceError::CorruptEntry {
        name: name.to_string(),
        reason,
    };

    let mut bytes = Vec::with_capacity(size);
    while bytes.len() < size {
        let unpacked = read_u32(reader)? as usize;
        let packed = read_u32(reader)? as usize;
        if unpacked == 0 || bytes.len() + unpacked > size {
            return Err(corrupt(format!("block of {unpacked} bytes overruns the entry")));
        }

        let mut block = vec![0u8; packed];
        reader.read_exact(&mut block)?;
        let decoded = lz4_flex::block::decompress(&block, unpacked)
            .map_err(|err| corrupt(err.to_string()))?;
        if decoded.len() != unpacked {
            return Err(corrupt(format!(
                "block unpacked to {} bytes, expected {unpacked}",
                decoded.len()
            )));
        }
        bytes.extend_from_slice(&decoded);
    }
    Ok(bytes)
}

fn normalize_name(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

fn read_u32(reader: &mut impl Read) -> std::io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn to_u32(value: usize, path: &Path) -> Result<u32> {
    u32::try_from(value).map_err(|_| ResourceError::InvalidPackage {
        path: path.to_path_buf(),
        reason: "package exceeds 4 GiB".to_string(),
    })
}

fn sdbm_hash(mut hash: u32, bytes: &[u8]) -> u32 {
    for &byte in bytes {
        hash = u32::from(byte)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn created_package_can_be_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.pak");
        let package = PackageFile::create(
            &path,
            &[("textures/stone.png", b"png!".as_slice()), ("scene.xml", b"<scene/>".as_slice())],
        )
        .unwrap();

        assert_eq!(package.num_files(), 2);
        assert!(package.exists("scene.xml"));
        assert!(package.exists("textures\\stone.png"));
        assert!(!package.exists("missing.xml"));
        assert_eq!(package.read("textures/stone.png").unwrap(), b"png!");
        assert_eq!(package.read("/scene.xml").unwrap(), b"<scene/>");
        assert_eq!(
            package.entry_names().collect::<Vec<_>>(),
            vec!["scene.xml", "textures/stone.png"]
        );
        assert_eq!(package.entry("scene.xml").unwrap().size, 8);
        assert!(!package.is_compressed());
    }

    #[test]
    fn reading_a_missing_entry_fails() {
        let dir = tempdir().unwrap();
        let package =
            PackageFile::create(dir.path().join("a.pak"), &[("a.txt", b"a".as_slice())]).unwrap();
        assert!(matches!(package.read("b.txt"), Err(ResourceError::NotFound(_))));
    }

    #[test]
    fn rejects_files_without_package_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.pak");
        fs::write(&path, b"not a package").unwrap();
        assert!(matches!(
            PackageFile::open(&path),
            Err(ResourceError::InvalidPackage { .. })
        ));
    }

    #[test]
    fn rejects_truncated_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.pak");
        let mut bytes = PLAIN_ID.to_vec();
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"name");
        fs::write(&path, bytes).unwrap();
        assert!(PackageFile::open(&path).is_err());
    }

    #[test]
    fn checksum_covers_entry_data() {
        let dir = tempdir().unwrap();
        let a = PackageFile::create(dir.path().join("a.pak"), &[("x", b"one".as_slice())]).unwrap();
        let b = PackageFile::create(dir.path().join("b.pak"), &[("x", b"two".as_slice())]).unwrap();
        assert_ne!(a.checksum(), b.checksum());
        assert_eq!(a.entry("x").unwrap().checksum, sdbm_hash(0, b"one"));
    }

    #[test]
    fn compressed_package_entries_are_decompressed_on_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("early.pak");
        let large: Vec<u8> = (0..COMPRESSED_BLOCK_SIZE * 2 + 100)
            .map(|i| (i % 251) as u8)
            .collect();
        let package = PackageFile::create_compressed(
            &path,
            &[("a.txt", b"hello hello hello".as_slice()), ("big.bin", large.as_slice())],
        )
        .unwrap();

        assert!(package.is_compressed());
        assert_eq!(package.read("a.txt").unwrap(), b"hello hello hello");
        assert_eq!(package.read("big.bin").unwrap(), large);
        assert_eq!(package.entry("big.bin").unwrap().size as usize, large.len());
        assert_eq!(package.entry("big.bin").unwrap().checksum, sdbm_hash(0, &large));
    }

    #[test]
    fn hand_built_compressed_package_is_readable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hand.pak");
        let payload = b"compressed payload";
        let packed = lz4_flex::block::compress(payload);
        let name = b"a.txt\0";
        let offset = (4 + 8 + name.len() + 12) as u32;

        let mut bytes = COMPRESSED_ID.to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&sdbm_hash(0, payload).to_le_bytes());
        bytes.extend_from_slice(name);
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&sdbm_hash(0, payload).to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&packed);
        fs::write(&path, bytes).unwrap();

        let package = PackageFile::open(&path).unwrap();
        assert_eq!(package.read("a.txt").unwrap(), payload);
    }

    #[test]
    fn oversized_compressed_block_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.pak");
        let packed = lz4_flex::block::compress(b"abcdef");
        let name = b"x\0";
        let offset = (4 + 8 + name.len() + 12) as u32;

        let mut bytes = COMPRESSED_ID.to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(name);
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&6u32.to_le_bytes());
        bytes.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&packed);
        fs::write(&path, bytes).unwrap();

        let package = PackageFile::open(&path).unwrap();
        assert!(matches!(
            package.read("x"),
            Err(ResourceError::CorruptEntry { .. })
        ));
    }
}
