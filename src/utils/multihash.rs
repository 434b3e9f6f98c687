// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//!
//! Digest functions an archive may be addressed with. `multihash_codetable::Code`
//! has no `Identity` variant, so the table is declared here.
//! See <https://github.com/multiformats/rust-multihash/pull/289>
//!

pub mod prelude {
    pub use super::MultihashCode;
    pub use multihash_codetable::MultihashDigest as _;
}

use multihash_derive::MultihashDigest;

/// Longest input an identity digest holds in full.
pub const IDENTITY_MAX_LEN: usize = 64;

/// Digest functions understood when packing and verifying blocks.
#[derive(Clone, Copy, Debug, Eq, MultihashDigest, PartialEq)]
#[mh(alloc_size = 64)]
pub enum MultihashCode {
    #[mh(code = 0x0, hasher = IdentityHasher::<64>)]
    Identity,
    /// SHA-256 (32-byte hash size)
    #[mh(code = 0x12, hasher = multihash_codetable::Sha2_256)]
    Sha2_256,
    /// SHA-512 (64-byte hash size)
    #[mh(code = 0x13, hasher = multihash_codetable::Sha2_512)]
    Sha2_512,
    /// BLAKE2b-256 (32-byte hash size)
    #[mh(code = 0xb220, hasher = multihash_codetable::Blake2b256)]
    Blake2b256,
    /// BLAKE3-256 (32-byte hash size)
    #[mh(code = 0x1e, hasher = multihash_codetable::Blake3_256)]
    Blake3_256,
}

/// Identity hasher with a maximum size.
///
/// Input beyond `S` bytes is truncated, so identity digests are only
/// meaningful for inputs of at most `S` bytes.
#[derive(Debug)]
pub struct IdentityHasher<const S: usize> {
    i: usize,
    bytes: [u8; S],
}

impl<const S: usize> Default for IdentityHasher<S> {
    fn default() -> Self {
        Self {
            i: 0,
            bytes: [0u8; S],
        }
    }
}

impl<const S: usize> multihash_derive::Hasher for IdentityHasher<S> {
    fn update(&mut self, input: &[u8]) {
        let start = self.i.min(self.bytes.len());
        let end = (self.i + input.len()).min(self.bytes.len());
        self.bytes[start..end].copy_from_slice(&input[..end - start]);
        self.i = end;
    }

    fn finalize(&mut self) -> &[u8] {
        &self.bytes[..self.i]
    }

    fn reset(&mut self) {
        self.i = 0
    }
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn codes_match_the_multicodec_table() {
        assert_eq!(u64::from(MultihashCode::Sha2_256), 0x12);
        assert_eq!(u64::from(MultihashCode::Blake2b256), 0xb220);
        assert_eq!(MultihashCode::try_from(0x1e).unwrap(), MultihashCode::Blake3_256);
        assert!(MultihashCode::try_from(0x1234).is_err());
    }

    #[test]
    fn identity_keeps_the_input() {
        let mh = MultihashCode::Identity.digest(b"hi");
        assert_eq!(mh.digest(), b"hi");
    }

    #[test]
    fn identity_truncates_past_the_limit() {
        let long = [1u8; super::IDENTITY_MAX_LEN + 10];
        let mh = MultihashCode::Identity.digest(&long);
        assert_eq!(mh.digest(), &long[..super::IDENTITY_MAX_LEN]);
    }

    #[test]
    fn sha2_256_digest_length() {
        assert_eq!(MultihashCode::Sha2_256.digest(b"").size(), 32);
    }
}
