//! Content hashing via blake3.

/// 64-bit content hash, used to skip reloads of unchanged files.
pub fn compute(data: &[u8]) -> u64 {
    let digest = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
