// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use serde::{Deserialize, Serialize};

use crate::car::CarBlock;
use crate::error::{Error, Result};
use crate::utils::cid::{CidExt as _, DAG_CBOR, RAW, compute_cid};
use crate::utils::encoding::{from_slice, to_vec};
use crate::utils::multihash::MultihashCode;

/// What a directory entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One chunk of a file, as referenced from a [`FileBranch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLink {
    pub cid: Cid,
    /// Bytes of the file up to and including this chunk.
    pub end: u64,
}

/// A file made of more than one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileBranch {
    pub links: Vec<ChunkLink>,
}

impl FileBranch {
    pub fn size(&self) -> u64 {
        self.links.last().map(|link| link.end).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub cid: Cid,
    pub kind: EntryKind,
    /// Logical size: file length, or the total of all file lengths below a
    /// directory.
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Directory {
    pub entries: Vec<DirEntry>,
}

impl Directory {
    pub fn size(&self) -> u64 {
        self.entries.iter().map(|entry| entry.size).sum()
    }
}

/// Encoded form of the DAG-CBOR nodes. The variant name is the persisted
/// discriminant: `{"branch": {...}}` or `{"directory": {...}}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EncodedNode {
    Branch(FileBranch),
    Directory(Directory),
}

/// A decoded archive block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DagNode {
    /// Chunk bytes, stored as-is under the raw codec.
    Leaf(Vec<u8>),
    Branch(FileBranch),
    Directory(Directory),
}

impl DagNode {
    pub fn kind(&self) -> EntryKind {
        match self {
            DagNode::Leaf(_) | DagNode::Branch(_) => EntryKind::File,
            DagNode::Directory(_) => EntryKind::Directory,
        }
    }

    /// Serializes the node and addresses it with `code`.
    pub fn into_block(self, code: MultihashCode) -> Result<CarBlock> {
        let (codec, data) = match self {
            DagNode::Leaf(data) => (RAW, data),
            DagNode::Branch(branch) => (DAG_CBOR, encode(&EncodedNode::Branch(branch))?),
            DagNode::Directory(dir) => (DAG_CBOR, encode(&EncodedNode::Directory(dir))?),
        };
        Ok(CarBlock {
            cid: compute_cid(&data, codec, code),
            data,
        })
    }

    /// Decodes the block addressed by `cid`, dispatching on its codec.
    pub fn decode(cid: &Cid, data: &[u8]) -> Result<Self> {
        if cid.is_raw() {
            return Ok(DagNode::Leaf(data.to_vec()));
        }
        Self::decode_structural(cid, data)
    }

    /// Decodes a branch or directory node; leaves are rejected.
    pub fn decode_structural(cid: &Cid, data: &[u8]) -> Result<Self> {
        if !cid.is_dag_cbor() {
            return Err(Error::malformed(
                *cid,
                format!("unexpected codec {:#x}", cid.codec()),
            ));
        }
        match from_slice::<EncodedNode>(data).map_err(|e| Error::malformed(*cid, e))? {
            EncodedNode::Branch(branch) => Ok(DagNode::Branch(branch)),
            EncodedNode::Directory(dir) => Ok(DagNode::Directory(dir)),
        }
    }
}

fn encode(node: &EncodedNode) -> Result<Vec<u8>> {
    to_vec(node).map_err(|e| Error::Format(e.to_string()))
}

/// Whether `name` can be used as a single path component below an output
/// directory.
pub fn is_safe_entry_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::encoding;
    use pretty_assertions::assert_eq;

    fn leaf(data: &[u8]) -> CarBlock {
        DagNode::Leaf(data.to_vec())
            .into_block(MultihashCode::Sha2_256)
            .unwrap()
    }

    #[test]
    fn leaves_are_raw_bytes() {
        let block = leaf(b"hi");
        assert_eq!(block.data, b"hi");
        assert!(block.cid.is_raw());
        assert_eq!(
            DagNode::decode(&block.cid, &block.data).unwrap(),
            DagNode::Leaf(b"hi".to_vec())
        );
    }

    #[test]
    fn empty_leaf() {
        let block = leaf(b"");
        assert!(block.data.is_empty());
        block.validate().unwrap();
    }

    #[test]
    fn directory_round_trip() {
        let dir = Directory {
            entries: vec![
                DirEntry {
                    name: "a.txt".into(),
                    cid: leaf(b"hi").cid,
                    kind: EntryKind::File,
                    size: 2,
                },
                DirEntry {
                    name: "sub".into(),
                    cid: leaf(b"bye").cid,
                    kind: EntryKind::Directory,
                    size: 3,
                },
            ],
        };
        let block = DagNode::Directory(dir.clone())
            .into_block(MultihashCode::Sha2_256)
            .unwrap();
        assert!(block.cid.is_dag_cbor());
        assert_eq!(
            DagNode::decode(&block.cid, &block.data).unwrap(),
            DagNode::Directory(dir)
        );
    }

    #[test]
    fn discriminant_is_persisted() {
        let block = DagNode::Branch(FileBranch {
            links: vec![ChunkLink {
                cid: leaf(b"x").cid,
                end: 1,
            }],
        })
        .into_block(MultihashCode::Sha2_256)
        .unwrap();
        let ipld: std::collections::BTreeMap<String, serde::de::IgnoredAny> =
            encoding::from_slice(&block.data).unwrap();
        assert_eq!(ipld.keys().collect::<Vec<_>>(), vec!["branch"]);
    }

    #[test]
    fn undecodable_dag_cbor_is_malformed() {
        let cid = compute_cid(b"\x01", DAG_CBOR, MultihashCode::Sha2_256);
        assert!(matches!(
            DagNode::decode(&cid, b"\x01"),
            Err(Error::MalformedNode { .. })
        ));
    }

    #[test]
    fn structural_decode_rejects_leaves() {
        let block = leaf(b"hi");
        assert!(DagNode::decode_structural(&block.cid, &block.data).is_err());
    }

    #[test]
    fn sizes() {
        let branch = FileBranch {
            links: vec![
                ChunkLink {
                    cid: Cid::default(),
                    end: 4,
                },
                ChunkLink {
                    cid: Cid::default(),
                    end: 6,
                },
            ],
        };
        assert_eq!(branch.size(), 6);
        assert_eq!(FileBranch::default().size(), 0);
    }

    #[test]
    fn entry_names() {
        assert!(is_safe_entry_name("a.txt"));
        assert!(is_safe_entry_name("..hidden"));
        for bad in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            assert!(!is_safe_entry_name(bad), "{bad:?}");
        }
    }
}
