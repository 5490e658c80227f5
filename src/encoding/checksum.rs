//! # Record Checksums
//!
//! Record bodies are protected by a CRC-32 (IEEE polynomial, the zlib
//! variant). `crc32(seed, bytes)` continues a running checksum: passing the
//! result of one call as the seed of the next equals a single call over the
//! concatenated bytes. Records are always checksummed with seed 0.

use crc32fast::Hasher;

pub fn crc32(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(seed);
    hasher.update(bytes);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_reference_vector() {
        assert_eq!(crc32(0, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn crc32_of_empty_input_is_seed() {
        assert_eq!(crc32(0, &[]), 0);
        assert_eq!(crc32(0xDEAD_BEEF, &[]), 0xDEAD_BEEF);
    }

    #[test]
    fn crc32_chains_through_seed() {
        let whole = crc32(0, b"hello world");
        let split = crc32(crc32(0, b"hello "), b"world");
        assert_eq!(whole, split);
    }
}
