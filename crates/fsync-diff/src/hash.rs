//! Streaming content digests

use fsync_types::{Error, HashAlgorithm, Result};
use sha2::Digest as _;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Chunk size used when hashing a file
pub const HASH_CHUNK_SIZE: usize = 256 * 1024;

/// Finished digest of a file's contents
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl ContentDigest {
    /// Algorithm that produced this digest
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hexadecimal rendering
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Incremental hasher for any supported algorithm
pub enum ContentHasher {
    /// XXH3, 128-bit output
    Xxh3(Box<xxhash_rust::xxh3::Xxh3>),
    /// BLAKE3
    Blake3(Box<blake3::Hasher>),
    /// SHA-256
    Sha256(sha2::Sha256),
}

impl fmt::Debug for ContentHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentHasher")
            .field(&self.algorithm())
            .finish()
    }
}

impl ContentHasher {
    /// Start a new digest
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Xxh3 => Self::Xxh3(Box::new(xxhash_rust::xxh3::Xxh3::new())),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
        }
    }

    /// Algorithm of this hasher
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Xxh3(_) => HashAlgorithm::Xxh3,
            Self::Blake3(_) => HashAlgorithm::Blake3,
            Self::Sha256(_) => HashAlgorithm::Sha256,
        }
    }

    /// Feed more input
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Xxh3(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
            Self::Sha256(h) => h.update(data),
        }
    }

    /// Finish and return the digest
    pub fn finalize(self) -> ContentDigest {
        let algorithm = self.algorithm();
        let bytes = match self {
            Self::Xxh3(h) => h.digest128().to_be_bytes().to_vec(),
            Self::Blake3(h) => h.finalize().as_bytes().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
        };
        ContentDigest { algorithm, bytes }
    }
}

/// Digest everything `reader` yields, `buffer` at a time
pub fn hash_reader<R: Read>(
    reader: &mut R,
    algorithm: HashAlgorithm,
    buffer: &mut [u8],
) -> io::Result<ContentDigest> {
    let mut hasher = ContentHasher::new(algorithm);
    loop {
        match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(hasher.finalize())
}

/// Digest the full contents of the file at `path`
pub fn hash_file(path: &Path, algorithm: HashAlgorithm, buffer: &mut [u8]) -> Result<ContentDigest> {
    let mut file = File::open(path).map_err(|e| Error::io_at(path, &e))?;
    hash_reader(&mut file, algorithm, buffer).map_err(|e| Error::io_at(path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(HashAlgorithm::Xxh3)]
    #[case(HashAlgorithm::Blake3)]
    #[case(HashAlgorithm::Sha256)]
    fn test_chunking_does_not_change_digest(#[case] algorithm: HashAlgorithm) {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 256) as u8).collect();

        let whole = hash_reader(&mut data.as_slice(), algorithm, &mut vec![0u8; 65_536]).unwrap();
        let chunked = hash_reader(&mut data.as_slice(), algorithm, &mut [0u8; 3]).unwrap();

        assert_eq!(whole, chunked);
        assert_eq!(whole.as_bytes().len(), algorithm.digest_len());
        assert_eq!(whole.algorithm(), algorithm);
    }

    #[test]
    fn test_known_sha256_vector() {
        let digest = hash_reader(&mut &b"abc"[..], HashAlgorithm::Sha256, &mut [0u8; 16]).unwrap();
        assert_eq!(
            digest.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_different_content_differs() {
        let mut buffer = [0u8; 64];
        let a = hash_reader(&mut &b"same length A"[..], HashAlgorithm::Xxh3, &mut buffer).unwrap();
        let b = hash_reader(&mut &b"same length B"[..], HashAlgorithm::Xxh3, &mut buffer).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = hash_file(
            &temp_dir.path().join("nope"),
            HashAlgorithm::Blake3,
            &mut [0u8; 64],
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
