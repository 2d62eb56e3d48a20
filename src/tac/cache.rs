//! Content-addressed cache of lowered TAC modules.
//!
//! Entries are keyed by the SHA-256 of the source bytes. Each file is a
//! small binary header (magic, format version, compiler version, the
//! source hash) followed by the module's TAC text. `load` validates the
//! header and re-parses the text; anything that fails validation is a
//! cache miss, never an error.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::tac::{Module, parser, writer};

const MAGIC: &[u8; 4] = b"TACC";
const FORMAT_VERSION: u16 = 1;

pub fn source_hash(source: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(source);
    hasher.finalize().into()
}

pub struct TacCache {
    dir: PathBuf,
}

impl TacCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the cached module for `source_hash`, or `None` when the
    /// entry is absent, stale, or damaged.
    pub fn load(&self, source_hash: &[u8; 32], compiler_version: &str) -> Option<Module> {
        let mut file = File::open(self.entry_path(source_hash)).ok()?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic).ok()?;
        if &magic != MAGIC {
            return None;
        }

        if read_u16(&mut file)? != FORMAT_VERSION {
            return None;
        }
        if read_string(&mut file)? != compiler_version {
            return None;
        }

        let mut cached_hash = [0u8; 32];
        file.read_exact(&mut cached_hash).ok()?;
        if &cached_hash != source_hash {
            return None;
        }

        let mut text = Vec::new();
        file.read_to_end(&mut text).ok()?;
        parser::parse_module(text.as_slice()).ok()
    }

    /// Writes `module` under `source_hash`, creating the cache directory
    /// on demand. Returns the entry path.
    pub fn store(
        &self,
        source_hash: &[u8; 32],
        compiler_version: &str,
        module: &Module,
    ) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.entry_path(source_hash);
        let mut file = File::create(&path)?;
        file.write_all(MAGIC)?;
        file.write_all(&FORMAT_VERSION.to_le_bytes())?;
        write_string(&mut file, compiler_version)?;
        file.write_all(source_hash)?;
        file.write_all(writer::module_to_string(module).as_bytes())?;

        Ok(path)
    }

    fn entry_path(&self, hash: &[u8; 32]) -> PathBuf {
        self.dir.join(format!("{}.tacc", hex(hash)))
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn read_u16(file: &mut File) -> Option<u16> {
    let mut buf = [0u8; 2];
    file.read_exact(&mut buf).ok()?;
    Some(u16::from_le_bytes(buf))
}

fn read_string(file: &mut File) -> Option<String> {
    let mut len = [0u8; 4];
    file.read_exact(&mut len).ok()?;
    let mut buf = vec![0u8; u32::from_le_bytes(len) as usize];
    file.read_exact(&mut buf).ok()?;
    String::from_utf8(buf).ok()
}

fn write_string(file: &mut File, s: &str) -> io::Result<()> {
    file.write_all(&(s.len() as u32).to_le_bytes())?;
    file.write_all(s.as_bytes())
}
