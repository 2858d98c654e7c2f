//! Snapshot file digests.
//!
//! Digests are SHA-256, stored next to the file they protect in a sidecar
//! named `<file>.sha256` whose content is `<hex digest> *<file name>`.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Suffix of digest sidecar files.
pub const DIGEST_SUFFIX: &str = ".sha256";

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Reader that hashes every byte it passes through.
///
/// Wrapping the source file lets a single copy both write the checkpoint and
/// compute the digest.
pub struct DigestingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes: u64,
}

impl<R: Read> DigestingReader<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        DigestingReader {
            inner,
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    /// Bytes read so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }

    /// Finish hashing and return the hex digest.
    pub fn finalize_hex(self) -> String {
        to_hex(&self.hasher.finalize())
    }
}

impl<R: Read> Read for DigestingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }
}

/// Lowercase hex encoding.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hex SHA-256 of an in-memory buffer.
pub fn digest_hex(data: &[u8]) -> String {
    to_hex(&Sha256::digest(data))
}

/// Sidecar path for `file`.
pub fn sidecar_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(DIGEST_SUFFIX);
    PathBuf::from(name)
}

/// Whether `path` names a digest sidecar.
pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(DIGEST_SUFFIX))
        .unwrap_or(false)
}

/// Sidecar file content for `digest` of a file called `file_name`.
pub fn sidecar_contents(digest: &str, file_name: &str) -> String {
    format!("{} *{}\n", digest, file_name)
}

/// Extract the digest from sidecar content.
///
/// Returns `None` if the first token is not a 64-character hex string.
pub fn parse_sidecar(contents: &str) -> Option<String> {
    let token = contents.split_whitespace().next()?;
    if token.len() != DIGEST_HEX_LEN || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(token.to_ascii_lowercase())
}
