// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Content identifiers for archive blocks.
//!
//! Every block is addressed by a CIDv1:
//!
//! ```text
//! varint(version) ++ varint(codec) ++ varint(hash code) ++ varint(digest length) ++ digest
//! ```
//!
//! File chunks use the [`RAW`] codec; branch and directory nodes use [`DAG_CBOR`].

use cid::Cid;

use crate::error::{Error, Result};
use crate::utils::multihash::IDENTITY_MAX_LEN;
use crate::utils::multihash::prelude::*;

/// Raw binary, used for file chunks.
pub const RAW: u64 = 0x55;
/// DAG-CBOR, used for branch and directory nodes.
pub const DAG_CBOR: u64 = 0x71;
/// A CARv1 archive as a whole.
pub const CAR: u64 = 0x0202;

/// Computes the CIDv1 of `data` under `codec`, hashed with `code`.
pub fn compute_cid(data: &[u8], codec: u64, code: MultihashCode) -> Cid {
    Cid::new_v1(codec, code.digest(data))
}

/// Recomputes the CID of `data` with the codec and digest function named by
/// `cid`, and checks it matches.
///
/// Identity digests longer than [`IDENTITY_MAX_LEN`] cannot be checked and are
/// refused as unsupported.
pub fn verify(cid: &Cid, data: &[u8]) -> Result<()> {
    let unsupported = || Error::UnsupportedHash {
        cid: *cid,
        code: cid.hash().code(),
    };
    let code = MultihashCode::try_from(cid.hash().code()).map_err(|_| unsupported())?;
    if code == MultihashCode::Identity && data.len() > IDENTITY_MAX_LEN {
        return Err(unsupported());
    }
    let actual = Cid::new(cid.version(), cid.codec(), code.digest(data))
        .map_err(|e| Error::malformed(*cid, e))?;
    if actual != *cid {
        return Err(Error::CidMismatch {
            declared: *cid,
            actual,
        });
    }
    Ok(())
}

/// Extension methods for [`Cid`]s found in archives.
pub trait CidExt {
    /// File chunk addressed directly by its bytes.
    fn is_raw(&self) -> bool;
    /// Branch or directory node.
    fn is_dag_cbor(&self) -> bool;
}

impl CidExt for Cid {
    fn is_raw(&self) -> bool {
        self.codec() == RAW
    }

    fn is_dag_cbor(&self) -> bool {
        self.codec() == DAG_CBOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    #[test]
    fn binary_layout() {
        let cid = compute_cid(b"hi", RAW, MultihashCode::Sha2_256);
        let bytes = cid.to_bytes();
        // version, codec, hash code, digest length
        assert_eq!(&bytes[..4], &[0x01, 0x55, 0x12, 0x20]);
        assert_eq!(&bytes[4..], MultihashCode::Sha2_256.digest(b"hi").digest());
        assert_eq!(Cid::try_from(bytes.as_slice()).unwrap(), cid);
    }

    #[test]
    fn multi_byte_varints() {
        let cid = compute_cid(b"", CAR, MultihashCode::Blake2b256);
        let bytes = cid.to_bytes();
        assert_eq!(&bytes[..6], &[0x01, 0x82, 0x04, 0xa0, 0xe4, 0x02]);
        assert_eq!(bytes[6], 32);
    }

    #[test]
    fn string_form_round_trips() {
        let cid = compute_cid(b"bye", DAG_CBOR, MultihashCode::Sha2_256);
        let s = cid.to_string();
        assert!(s.starts_with('b'), "CIDv1 renders as base32: {s}");
        assert_eq!(s.parse::<Cid>().unwrap(), cid);
    }

    #[test]
    fn verify_detects_mismatch() {
        let cid = compute_cid(b"hello", RAW, MultihashCode::Sha2_256);
        verify(&cid, b"hello").unwrap();
        match verify(&cid, b"hellO") {
            Err(Error::CidMismatch { declared, .. }) => assert_eq!(declared, cid),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_unknown_hash() {
        let mh = cid::multihash::Multihash::<64>::wrap(0x1234, &[0; 4]).unwrap();
        let cid = Cid::new_v1(RAW, mh);
        assert!(matches!(
            verify(&cid, b""),
            Err(Error::UnsupportedHash { code: 0x1234, .. })
        ));
    }

    #[test]
    fn identity_cids_cover_every_byte() {
        let short = compute_cid(b"hi", RAW, MultihashCode::Identity);
        verify(&short, b"hi").unwrap();
        assert!(matches!(verify(&short, b"ho"), Err(Error::CidMismatch { .. })));
        assert!(matches!(verify(&short, b"hi!"), Err(Error::CidMismatch { .. })));

        let original = vec![7u8; 200];
        let cid = compute_cid(&original, RAW, MultihashCode::Identity);
        let mut tampered = original.clone();
        tampered[150] ^= 1;
        for data in [&original, &tampered] {
            assert!(matches!(
                verify(&cid, data),
                Err(Error::UnsupportedHash { code: 0, .. })
            ));
        }
    }

    #[quickcheck]
    fn computed_cids_verify(data: Vec<u8>, cbor: bool) -> bool {
        let codec = if cbor { DAG_CBOR } else { RAW };
        let cid = compute_cid(&data, codec, MultihashCode::Blake3_256);
        verify(&cid, &data).is_ok() && cid.is_dag_cbor() == cbor && cid.is_raw() != cbor
    }
}
