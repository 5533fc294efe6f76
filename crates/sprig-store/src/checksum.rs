use crate::error::StoreResult;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 8 * 1024;

/// Lowercase hex SHA-256 of a file, read in fixed-size chunks.
pub fn sha256_file(path: &Path) -> StoreResult<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[must_use]
pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hash an in-memory buffer off the async executor.
pub async fn sha256_bytes_async(data: Bytes) -> StoreResult<String> {
    tokio::task::spawn_blocking(move || sha256_bytes(&data))
        .await
        .map_err(|e| crate::error::StoreError::Io(std::io::Error::other(e)))
}

/// Hash a file off the async executor.
pub async fn sha256_file_async(path: &Path) -> StoreResult<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || sha256_file(&path))
        .await
        .map_err(|e| crate::error::StoreError::Io(std::io::Error::other(e)))?
}
