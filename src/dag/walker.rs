// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Reconstruction of file trees from archives.
//!
//! Directory entries may reference blocks that appear anywhere in an archive,
//! so the whole block stream is first consumed into a [`BlockIndex`]. Each
//! selected root is then resolved against the index, depth-first and in
//! declared entry order, either writing files below an output directory or
//! only listing them.
//!
//! Blocks are checked against their CIDs when a walk reaches them, so a
//! corrupt block fails only the roots that reference it.

use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use ahash::{HashMap, HashMapExt as _};
use cid::Cid;
use futures::TryStreamExt as _;
use tokio::io::AsyncBufRead;
use tracing::{debug, info};

use super::node::{DagNode, DirEntry, EntryKind, is_safe_entry_name};
use crate::car::{CarBlock, CarStream, CarV1Header, ReadOptions};
use crate::error::{Error, Result};
use crate::utils::cid::{CidExt as _, verify};
use crate::utils::io::ProgressStreamExt as _;

enum Indexed {
    Block(Vec<u8>),
    /// A raw leaf whose bytes were not retained.
    Leaf { len: u64 },
}

/// Blocks of one archive, keyed by CID. Blocks are stored as read and
/// verified on access.
pub struct BlockIndex {
    blocks: HashMap<Cid, Indexed>,
    structure_only: bool,
}

impl BlockIndex {
    /// An index retaining every block.
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            structure_only: false,
        }
    }

    /// An index for listing: raw leaves are only counted.
    pub fn structure_only() -> Self {
        Self {
            blocks: HashMap::new(),
            structure_only: true,
        }
    }

    pub fn insert(&mut self, block: CarBlock) {
        let CarBlock { cid, data } = block;
        let indexed = if self.structure_only && cid.is_raw() {
            Indexed::Leaf {
                len: data.len() as u64,
            }
        } else {
            Indexed::Block(data)
        };
        self.blocks.entry(cid).or_insert(indexed);
    }

    /// Reads a whole archive into an index. Listing indexes drop leaf
    /// contents as they are read.
    pub async fn load<R: AsyncBufRead + Unpin>(
        reader: R,
        structure_only: bool,
        max_frame_len: usize,
    ) -> Result<(CarV1Header, Self)> {
        let options = ReadOptions {
            verify: false,
            max_frame_len,
        };
        let stream = CarStream::with_options(reader, options).await?;
        let header = stream.header.clone();
        let mut index = if structure_only {
            Self::structure_only()
        } else {
            Self::new()
        };
        let mut blocks = std::pin::pin!(stream.progress_count("Indexing blocks"));
        while let Some(block) = blocks.try_next().await? {
            index.insert(block);
        }
        debug!(blocks = index.blocks.len(), "indexed archive");
        Ok((header, index))
    }

    fn get(&self, cid: &Cid) -> Result<&Indexed> {
        self.blocks.get(cid).ok_or(Error::MissingBlock(*cid))
    }

    fn structural(&self, cid: &Cid) -> Result<DagNode> {
        match self.get(cid)? {
            Indexed::Block(data) => {
                verify(cid, data)?;
                DagNode::decode_structural(cid, data)
            }
            Indexed::Leaf { .. } => Err(Error::malformed(*cid, "expected a structural node")),
        }
    }

    fn leaf_len(&self, cid: &Cid) -> Result<u64> {
        match self.get(cid)? {
            Indexed::Block(data) => Ok(data.len() as u64),
            Indexed::Leaf { len } => Ok(*len),
        }
    }

    fn leaf_data(&self, cid: &Cid) -> Result<&[u8]> {
        match self.get(cid)? {
            Indexed::Block(data) => {
                verify(cid, data)?;
                Ok(data)
            }
            Indexed::Leaf { .. } => Err(Error::Constraint(format!(
                "contents of {cid} were not retained"
            ))),
        }
    }

    /// The chunks of the file rooted at `cid`, in order, and its length.
    fn file_chunks(&self, cid: &Cid) -> Result<(Vec<Cid>, u64)> {
        if cid.is_raw() {
            return Ok((vec![*cid], self.leaf_len(cid)?));
        }
        match self.structural(cid)? {
            DagNode::Branch(branch) => {
                let mut offset = 0;
                let mut chunks = Vec::with_capacity(branch.links.len());
                for link in &branch.links {
                    if !link.cid.is_raw() {
                        return Err(Error::malformed(*cid, format!("link {} is not a leaf", link.cid)));
                    }
                    offset += self.leaf_len(&link.cid)?;
                    if offset != link.end {
                        return Err(Error::malformed(
                            *cid,
                            format!("chunk {} ends at {offset}, declared {}", link.cid, link.end),
                        ));
                    }
                    chunks.push(link.cid);
                }
                Ok((chunks, offset))
            }
            other => Err(Error::malformed(*cid, format!("expected a file, found a {}", other.kind()))),
        }
    }
}

impl Default for BlockIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// How listing entries are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ListMode {
    Paths,
    Cids,
    #[default]
    Both,
}

/// A file or directory found while walking a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Relative to the root directory, or the CID string for a file root.
    pub path: PathBuf,
    pub cid: Cid,
    pub size: u64,
    pub kind: EntryKind,
}

impl PathEntry {
    pub fn render(&self, mode: ListMode) -> String {
        match mode {
            ListMode::Paths => self.path.display().to_string(),
            ListMode::Cids => self.cid.to_string(),
            ListMode::Both => format!("{}\t{}", self.path.display(), self.cid),
        }
    }
}

/// Whether a walk writes files or only lists them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkMode {
    Materialize { output_base: PathBuf },
    List,
}

/// Result of walking one root. A failed root does not affect the others.
#[derive(Debug)]
pub struct RootOutcome {
    pub root: Cid,
    pub result: Result<Vec<PathEntry>>,
}

/// The roots to walk: `selected` if given, every declared root otherwise.
pub fn select_roots(declared: &[Cid], selected: &[Cid]) -> Result<Vec<Cid>> {
    if selected.is_empty() {
        return Ok(declared.to_vec());
    }
    for root in selected {
        if !declared.contains(root) {
            return Err(Error::Constraint(format!(
                "{root} is not a root of this archive"
            )));
        }
    }
    Ok(selected.to_vec())
}

/// Walks every root in `roots`, see [`select_roots`].
///
/// Errors concerning the whole walk (an index that cannot materialize, an
/// output base that cannot be created) are returned directly; errors within a
/// root end up in its [`RootOutcome`].
pub fn walk(roots: &[Cid], index: &BlockIndex, mode: &WalkMode) -> Result<Vec<RootOutcome>> {
    if let WalkMode::Materialize { output_base } = mode {
        if index.structure_only {
            return Err(Error::Constraint("cannot materialize from a listing index".into()));
        }
        std::fs::create_dir_all(output_base).map_err(Error::io_at(output_base))?;
    }
    Ok(roots
        .iter()
        .map(|root| {
            let result = Walk { index, mode }.root(root);
            match &result {
                Ok(entries) => debug!(%root, entries = entries.len(), "walked root"),
                Err(e) => debug!(%root, "failed to walk root: {e}"),
            }
            RootOutcome {
                root: *root,
                result,
            }
        })
        .collect())
}

struct Walk<'a> {
    index: &'a BlockIndex,
    mode: &'a WalkMode,
}

impl Walk<'_> {
    fn target(&self, path: &Path) -> Option<PathBuf> {
        match self.mode {
            WalkMode::Materialize { output_base } => Some(output_base.join(path)),
            WalkMode::List => None,
        }
    }

    fn root(&self, root: &Cid) -> Result<Vec<PathEntry>> {
        let entries = match self.root_directory(root)? {
            Some(entries) => entries,
            None => vec![self.file(PathBuf::from(root.to_string()), root, None)?],
        };
        Ok(entries)
    }

    /// Walks `root` if it is a directory.
    fn root_directory(&self, root: &Cid) -> Result<Option<Vec<PathEntry>>> {
        if root.is_raw() {
            return Ok(None);
        }
        let dir = match self.index.structural(root)? {
            DagNode::Directory(dir) => dir,
            _ => return Ok(None),
        };
        let mut out = vec![];
        let mut stack = children(root, PathBuf::new(), dir.entries)?;
        while let Some((path, entry)) = stack.pop() {
            match entry.kind {
                EntryKind::File => out.push(self.file(path, &entry.cid, Some(entry.size))?),
                EntryKind::Directory => {
                    let dir = match self.index.structural(&entry.cid)? {
                        DagNode::Directory(dir) => dir,
                        other => {
                            return Err(Error::malformed(
                                entry.cid,
                                format!("declared as a directory, found a {}", other.kind()),
                            ));
                        }
                    };
                    if let Some(target) = self.target(&path) {
                        std::fs::create_dir(&target).map_err(Error::io_at(&target))?;
                    }
                    stack.extend(children(&entry.cid, path.clone(), dir.entries)?);
                    out.push(PathEntry {
                        path,
                        cid: entry.cid,
                        size: entry.size,
                        kind: EntryKind::Directory,
                    });
                }
            }
        }
        Ok(Some(out))
    }

    fn file(&self, path: PathBuf, cid: &Cid, declared_size: Option<u64>) -> Result<PathEntry> {
        let (chunks, size) = self.index.file_chunks(cid)?;
        if let Some(declared) = declared_size.filter(|declared| *declared != size) {
            return Err(Error::malformed(
                *cid,
                format!("file is {size} bytes, declared {declared}"),
            ));
        }
        if let Some(target) = self.target(&path) {
            // Every chunk is checked before the file is created.
            let data = chunks
                .iter()
                .map(|chunk| self.index.leaf_data(chunk))
                .collect::<Result<Vec<_>>>()?;
            write_file(&target, &data).map_err(Error::io_at(&target))?;
        }
        Ok(PathEntry {
            path,
            cid: *cid,
            size,
            kind: EntryKind::File,
        })
    }

}

fn write_file(target: &Path, chunks: &[&[u8]]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;
    for chunk in chunks {
        file.write_all(chunk)?;
    }
    file.flush()
}

/// Stack items for the entries of `parent`, popped in declared order.
fn children(parent: &Cid, base: PathBuf, entries: Vec<DirEntry>) -> Result<Vec<(PathBuf, DirEntry)>> {
    let mut items = Vec::with_capacity(entries.len());
    for entry in entries.into_iter().rev() {
        if !is_safe_entry_name(&entry.name) {
            return Err(Error::malformed(
                *parent,
                format!("invalid entry name {:?}", entry.name),
            ));
        }
        items.push((base.join(&entry.name), entry));
    }
    Ok(items)
}

/// Reads the archive from `reader` and writes the selected roots below
/// `output_base`.
pub async fn unpack<R: AsyncBufRead + Unpin>(
    reader: R,
    selected: &[Cid],
    output_base: PathBuf,
    max_frame_len: usize,
) -> Result<Vec<RootOutcome>> {
    let (header, index) = BlockIndex::load(reader, false, max_frame_len).await?;
    let roots = select_roots(&header.roots, selected)?;
    info!(
        "unpacking {} root(s) into {}",
        roots.len(),
        output_base.display()
    );
    let mode = WalkMode::Materialize { output_base };
    tokio::task::spawn_blocking(move || walk(&roots, &index, &mode))
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
}

/// Reads the archive from `reader` and lists the selected roots without
/// touching leaf contents.
pub async fn list<R: AsyncBufRead + Unpin>(
    reader: R,
    selected: &[Cid],
    max_frame_len: usize,
) -> Result<Vec<RootOutcome>> {
    let (header, index) = BlockIndex::load(reader, true, max_frame_len).await?;
    let roots = select_roots(&header.roots, selected)?;
    walk(&roots, &index, &WalkMode::List)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::write_car;
    use crate::dag::{ChunkLink, DagBuilder, Directory, FileBranch, PackOptions};
    use crate::utils::cid::{DAG_CBOR, RAW, compute_cid};
    use crate::utils::multihash::MultihashCode;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::num::NonZeroUsize;

    fn tree(files: &[(&str, &[u8])]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        dir
    }

    async fn archive(paths: &[PathBuf], options: PackOptions) -> (Vec<u8>, Vec<Cid>) {
        let mut builder = DagBuilder::new(paths, options).unwrap();
        let blocks = builder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        let roots = builder.roots().unwrap().to_vec();
        let car = write_car(
            nunny::Vec::new(roots.clone()).unwrap(),
            futures::stream::iter(blocks.into_iter().map(Ok)),
            vec![],
        )
        .await
        .unwrap();
        (car, roots)
    }

    fn archive_of(blocks: Vec<CarBlock>, roots: Vec<Cid>) -> Vec<u8> {
        futures::executor::block_on(write_car(
            nunny::Vec::new(roots).unwrap(),
            futures::stream::iter(blocks.into_iter().map(Ok)),
            vec![],
        ))
        .unwrap()
    }

    fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
        walkdir::WalkDir::new(root)
            .into_iter()
            .map(|entry| entry.unwrap())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let rel = entry.path().strip_prefix(root).unwrap();
                (
                    rel.to_string_lossy().into_owned(),
                    std::fs::read(entry.path()).unwrap(),
                )
            })
            .collect()
    }

    fn leaf(data: &[u8]) -> CarBlock {
        DagNode::Leaf(data.to_vec())
            .into_block(MultihashCode::Sha2_256)
            .unwrap()
    }

    fn dir(entries: Vec<DirEntry>) -> CarBlock {
        DagNode::Directory(Directory { entries })
            .into_block(MultihashCode::Sha2_256)
            .unwrap()
    }

    fn file_entry(name: &str, block: &CarBlock) -> DirEntry {
        DirEntry {
            name: name.into(),
            cid: block.cid,
            kind: EntryKind::File,
            size: block.data.len() as u64,
        }
    }

    #[tokio::test]
    async fn round_trip() {
        let files: &[(&str, &[u8])] = &[
            ("docs/a.txt", b"hi"),
            ("docs/sub/b.txt", b"bye"),
            ("docs/sub/empty", b""),
            ("docs/big.bin", &[42; 1000]),
        ];
        let source = tree(files);
        let options = PackOptions {
            chunk_size: NonZeroUsize::new(64).unwrap(),
            ..Default::default()
        };
        let (car, _) = archive(&[source.path().join("docs")], options).await;

        let out = tempfile::tempdir().unwrap();
        let outcomes = unpack(car.as_slice(), &[], out.path().to_path_buf(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        outcomes[0].result.as_ref().unwrap();
        assert_eq!(read_tree(out.path()), read_tree(source.path()));
    }

    #[tokio::test]
    async fn listing_scenario() {
        let source = tree(&[("docs/a.txt", b"hi"), ("docs/sub/b.txt", b"bye")]);
        let (car, roots) = archive(&[source.path().join("docs")], PackOptions::default()).await;

        let outcomes = list(car.as_slice(), &[], usize::MAX).await.unwrap();
        assert_eq!(outcomes[0].root, roots[0]);
        let entries = outcomes[0].result.as_ref().unwrap();
        let files: BTreeMap<_, _> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| (e.path.to_string_lossy().into_owned(), e.cid))
            .collect();
        assert_eq!(
            files,
            BTreeMap::from([
                ("docs/a.txt".to_owned(), leaf(b"hi").cid),
                ("docs/sub/b.txt".to_owned(), leaf(b"bye").cid),
            ])
        );
        let paths: Vec<_> = entries.iter().map(|e| e.render(ListMode::Paths)).collect();
        assert_eq!(paths, vec!["docs", "docs/a.txt", "docs/sub", "docs/sub/b.txt"]);
        assert_eq!(entries[0].size, 5);
    }

    #[tokio::test]
    async fn listing_ignores_corrupt_leaves() {
        let a = leaf(b"hello");
        let root = dir(vec![file_entry("a", &a)]);
        let roots = vec![root.cid];
        let mut corrupt = a.clone();
        corrupt.data[0] ^= 1;
        let car = archive_of(vec![corrupt, root], roots);

        let outcomes = list(car.as_slice(), &[], usize::MAX).await.unwrap();
        assert_eq!(outcomes[0].result.as_ref().unwrap().len(), 1);

        let out = tempfile::tempdir().unwrap();
        let outcomes = unpack(car.as_slice(), &[], out.path().to_path_buf(), usize::MAX)
            .await
            .unwrap();
        let err = outcomes[0].result.as_ref().unwrap_err();
        assert!(matches!(err, Error::CidMismatch { .. }), "{err}");
        assert!(!out.path().join("a").exists());
    }

    #[tokio::test]
    async fn listing_verifies_structure() {
        let a = leaf(b"hello");
        let mut root = dir(vec![file_entry("a", &a)]);
        let roots = vec![root.cid];
        *root.data.last_mut().unwrap() ^= 1;
        let car = archive_of(vec![a, root], roots);
        let outcomes = list(car.as_slice(), &[], usize::MAX).await.unwrap();
        let err = outcomes[0].result.as_ref().unwrap_err();
        assert!(matches!(err, Error::CidMismatch { .. }), "{err}");
    }

    #[tokio::test]
    async fn corrupt_block_fails_only_its_root() {
        let source = tree(&[("r1/one", b"1"), ("r2/two", b"2")]);
        let options = PackOptions {
            wrap_with_directory: false,
            ..Default::default()
        };
        let paths = [source.path().join("r1"), source.path().join("r2")];
        let mut builder = DagBuilder::new(&paths, options).unwrap();
        let mut blocks = builder.by_ref().collect::<Result<Vec<_>>>().unwrap();
        let roots = builder.roots().unwrap().to_vec();
        let one = leaf(b"1").cid;
        for block in blocks.iter_mut().filter(|block| block.cid == one) {
            block.data[0] ^= 1;
        }
        let car = archive_of(blocks, roots.clone());

        let out = tempfile::tempdir().unwrap();
        let outcomes = unpack(car.as_slice(), &roots[1..], out.path().to_path_buf(), usize::MAX)
            .await
            .unwrap();
        outcomes[0].result.as_ref().unwrap();
        assert_eq!(
            read_tree(out.path()),
            BTreeMap::from([("two".to_owned(), b"2".to_vec())])
        );

        let out = tempfile::tempdir().unwrap();
        let outcomes = unpack(car.as_slice(), &[], out.path().to_path_buf(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(outcomes[0].root, roots[0]);
        assert!(matches!(
            outcomes[0].result,
            Err(Error::CidMismatch { declared, .. }) if declared == one
        ));
        outcomes[1].result.as_ref().unwrap();
        assert_eq!(
            read_tree(out.path()),
            BTreeMap::from([("two".to_owned(), b"2".to_vec())])
        );
    }

    #[tokio::test]
    async fn selected_root_only() {
        let source = tree(&[("r1/one", b"1"), ("r2/two", b"2")]);
        let options = PackOptions {
            wrap_with_directory: false,
            ..Default::default()
        };
        let (car, roots) =
            archive(&[source.path().join("r1"), source.path().join("r2")], options).await;

        let out = tempfile::tempdir().unwrap();
        let outcomes = unpack(car.as_slice(), &roots[1..], out.path().to_path_buf(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].root, roots[1]);
        assert_eq!(
            read_tree(out.path()),
            BTreeMap::from([("two".to_owned(), b"2".to_vec())])
        );
    }

    #[tokio::test]
    async fn unknown_selected_root_is_a_constraint_error() {
        let source = tree(&[("a", b"a")]);
        let (car, _) = archive(&[source.path().join("a")], PackOptions::default()).await;
        let stranger = leaf(b"stranger").cid;
        let err = list(car.as_slice(), &[stranger], usize::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Constraint(_)), "{err}");
    }

    #[test]
    fn missing_block_fails_only_its_root() {
        let present = leaf(b"present");
        let absent = leaf(b"absent");
        let good = dir(vec![file_entry("p", &present)]);
        let bad = dir(vec![file_entry("a", &absent)]);
        let mut index = BlockIndex::new();
        for block in [present, good.clone(), bad.clone()] {
            index.insert(block);
        }

        let out = tempfile::tempdir().unwrap();
        let mode = WalkMode::Materialize {
            output_base: out.path().join("new"),
        };
        let outcomes = walk(&[bad.cid, good.cid], &index, &mode).unwrap();
        assert!(matches!(
            outcomes[0].result,
            Err(Error::MissingBlock(cid)) if cid == absent.cid
        ));
        assert_eq!(outcomes[1].result.as_ref().unwrap().len(), 1);
        assert_eq!(std::fs::read(out.path().join("new/p")).unwrap(), b"present");
    }

    #[test]
    fn existing_files_are_not_overwritten() {
        let a = leaf(b"new");
        let root = dir(vec![file_entry("a", &a)]);
        let mut index = BlockIndex::new();
        index.insert(a);
        index.insert(root.clone());

        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("a"), b"old").unwrap();
        let mode = WalkMode::Materialize {
            output_base: out.path().to_path_buf(),
        };
        let outcomes = walk(&[root.cid], &index, &mode).unwrap();
        let err = outcomes[0].result.as_ref().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert_eq!(std::fs::read(out.path().join("a")).unwrap(), b"old");
    }

    #[test]
    fn file_root_is_named_by_its_cid() {
        let a = leaf(b"lonely");
        let mut index = BlockIndex::new();
        index.insert(a.clone());
        let out = tempfile::tempdir().unwrap();
        let mode = WalkMode::Materialize {
            output_base: out.path().to_path_buf(),
        };
        let outcomes = walk(&[a.cid], &index, &mode).unwrap();
        let entries = outcomes[0].result.as_ref().unwrap();
        assert_eq!(entries[0].path, PathBuf::from(a.cid.to_string()));
        assert_eq!(
            std::fs::read(out.path().join(a.cid.to_string())).unwrap(),
            b"lonely"
        );
    }

    #[test]
    fn escaping_names_are_rejected() {
        let a = leaf(b"evil");
        let root = dir(vec![file_entry("..", &a)]);
        let mut index = BlockIndex::new();
        index.insert(a);
        index.insert(root.clone());
        let outcomes = walk(&[root.cid], &index, &WalkMode::List).unwrap();
        assert!(matches!(
            outcomes[0].result,
            Err(Error::MalformedNode { .. })
        ));
    }

    #[test]
    fn branch_ends_must_match_leaves() {
        let (x, y) = (leaf(b"abc"), leaf(b"de"));
        let branch = DagNode::Branch(FileBranch {
            links: vec![
                ChunkLink { cid: x.cid, end: 3 },
                ChunkLink { cid: y.cid, end: 6 },
            ],
        })
        .into_block(MultihashCode::Sha2_256)
        .unwrap();
        let mut index = BlockIndex::structure_only();
        for block in [x, y, branch.clone()] {
            index.insert(block);
        }
        let outcomes = walk(&[branch.cid], &index, &WalkMode::List).unwrap();
        assert!(matches!(
            outcomes[0].result,
            Err(Error::MalformedNode { .. })
        ));
    }

    #[test]
    fn listing_index_cannot_materialize() {
        let out = tempfile::tempdir().unwrap();
        let mode = WalkMode::Materialize {
            output_base: out.path().to_path_buf(),
        };
        let err = walk(&[], &BlockIndex::structure_only(), &mode).unwrap_err();
        assert!(matches!(err, Error::Constraint(_)));
    }

    #[test]
    fn placeholder_root_is_missing() {
        let placeholder = compute_cid(&[], DAG_CBOR, MultihashCode::Sha2_256);
        let outcomes = walk(&[placeholder], &BlockIndex::new(), &WalkMode::List).unwrap();
        assert!(matches!(outcomes[0].result, Err(Error::MissingBlock(_))));
    }

    #[test]
    fn render_modes() {
        let entry = PathEntry {
            path: PathBuf::from("docs/a.txt"),
            cid: compute_cid(b"hi", RAW, MultihashCode::Sha2_256),
            size: 2,
            kind: EntryKind::File,
        };
        assert_eq!(entry.render(ListMode::Paths), "docs/a.txt");
        assert_eq!(entry.render(ListMode::Cids), entry.cid.to_string());
        assert_eq!(
            entry.render(ListMode::Both),
            format!("docs/a.txt\t{}", entry.cid)
        );
    }
}
