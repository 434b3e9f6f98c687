// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! File trees as content-addressed DAGs.
//!
//! Files are split into raw leaf blocks, joined by a branch node when there is
//! more than one chunk. Directories list their entries by name. Packing goes
//! through [`DagBuilder`] / [`pack`]; unpacking and listing through [`walk`],
//! [`unpack`] and [`list`].

mod builder;
mod node;
mod walker;

pub use builder::{DagBuilder, OnEntry, PackOptions, PackStream, pack};
pub use node::{
    ChunkLink, DagNode, DirEntry, Directory, EntryKind, FileBranch, is_safe_entry_name,
};
pub use walker::{
    BlockIndex, ListMode, PathEntry, RootOutcome, WalkMode, list, select_roots, unpack, walk,
};
