//! SHA-256 hashing and the proof-of-work difficulty predicate.
//!
//! Block hashes are hex-encoded SHA-256 digests; difficulty counts
//! leading zero *bits* of the raw digest.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a hash meets the difficulty target: the digest must begin
/// with `difficulty` zero bits.
pub fn meets_difficulty(hash: &[u8], difficulty: u32) -> bool {
    if hash.len() * 8 < difficulty as usize {
        return false;
    }

    let required_zeros = difficulty as usize / 8;
    let remaining_bits = difficulty as usize % 8;

    // Check full zero bytes
    for byte in hash.iter().take(required_zeros) {
        if *byte != 0 {
            return false;
        }
    }

    // Check remaining bits
    if remaining_bits > 0 && required_zeros < hash.len() {
        let mask = 0xFF << (8 - remaining_bits);
        if hash[required_zeros] & mask != 0 {
            return false;
        }
    }

    true
}

/// `meets_difficulty` over a hex-encoded digest. A string that is not
/// valid hex (the genesis sentinel, for instance) never meets a
/// positive difficulty.
pub fn hex_meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    match hex::decode(hash_hex) {
        Ok(bytes) => meets_difficulty(&bytes, difficulty),
        Err(_) => difficulty == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_meets_difficulty() {
        let hash = vec![0x00, 0x00, 0x0F, 0xFF, 0xFF, 0xFF];
        assert!(meets_difficulty(&hash, 16)); // 2 full zero bytes
        assert!(meets_difficulty(&hash, 20)); // plus 4 zero bits
        assert!(!meets_difficulty(&hash, 21));
        assert!(!meets_difficulty(&hash, 24));
    }

    #[test]
    fn test_meets_difficulty_short_input() {
        // A digest shorter than the required prefix can never qualify.
        assert!(!meets_difficulty(&[0x00], 16));
        assert!(meets_difficulty(&[], 0));
    }

    #[test]
    fn test_hex_meets_difficulty() {
        assert!(hex_meets_difficulty("00ff", 8));
        assert!(!hex_meets_difficulty("01ff", 8));
        // Non-hex sentinel values only pass at difficulty zero
        assert!(!hex_meets_difficulty("hash-one", 1));
        assert!(hex_meets_difficulty("hash-one", 0));
    }
}
