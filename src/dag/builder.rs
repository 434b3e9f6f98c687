// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Turns file trees into a stream of blocks.
//!
//! Every block is produced before any block that references it, so a consumer
//! writing blocks in order never writes a dangling link. Directories are
//! enumerated by [`walkdir`] in post-order (contents first), with entries
//! sorted by file name, which makes the output deterministic.

use std::collections::VecDeque;
use std::fs::File;
use std::future::Future as _;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use ahash::{HashSet, HashSetExt as _};
use cid::Cid;
use futures::{Stream, ready};
use pin_project_lite::pin_project;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::node::{ChunkLink, DagNode, DirEntry, Directory, EntryKind, FileBranch};
use crate::car::CarBlock;
use crate::chunker::{Chunker, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::utils::multihash::MultihashCode;

/// Observer called with the path of every file and directory as it is packed.
pub type OnEntry = Box<dyn FnMut(&Path) + Send>;

pub struct PackOptions {
    /// Wrap all inputs in one synthesized directory, yielding a single root.
    /// Otherwise every input is a root of its own.
    pub wrap_with_directory: bool,
    pub chunk_size: NonZeroUsize,
    pub hash: MultihashCode,
    pub on_entry: Option<OnEntry>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            wrap_with_directory: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash: MultihashCode::Sha2_256,
            on_entry: None,
        }
    }
}

struct Input {
    path: PathBuf,
    name: String,
}

struct FileInProgress {
    path: PathBuf,
    name: String,
    depth: usize,
    chunks: Chunker<File>,
    links: Vec<ChunkLink>,
    size: u64,
}

/// Pull-based producer of the blocks of one or more file trees.
///
/// Yields blocks until the inputs are exhausted, after which
/// [`DagBuilder::roots`] returns the root CIDs. The first error ends the
/// iteration.
pub struct DagBuilder {
    inputs: std::vec::IntoIter<Input>,
    walker: Option<walkdir::IntoIter>,
    current_name: String,
    file: Option<FileInProgress>,
    // Completed entries by depth, waiting for their parent directory.
    pending: Vec<Vec<DirEntry>>,
    top: Vec<DirEntry>,
    queue: VecDeque<CarBlock>,
    roots: Option<Vec<Cid>>,
    options: PackOptions,
    failed: bool,
}

fn entry_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::Constraint(format!("{} has no file name", path.display())))?;
    name.to_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::Constraint(format!("{} is not valid UTF-8", path.display())))
}

fn walk_error(e: walkdir::Error) -> Error {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
    let source = match e.into_io_error() {
        Some(e) => e,
        None => io::Error::other("filesystem loop"),
    };
    Error::IoAt { path, source }
}

impl DagBuilder {
    /// Checks that every input exists and can be named, before any block is
    /// produced.
    pub fn new(paths: impl IntoIterator<Item = impl AsRef<Path>>, options: PackOptions) -> Result<Self> {
        let mut inputs = vec![];
        let mut names = HashSet::new();
        for path in paths {
            let path = path.as_ref();
            let path = match path.canonicalize() {
                Ok(path) => path,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(Error::Constraint(format!("{} does not exist", path.display())));
                }
                Err(e) => return Err(Error::io_at(path)(e)),
            };
            let file_type = std::fs::metadata(&path)
                .map_err(Error::io_at(&path))?
                .file_type();
            if !file_type.is_file() && !file_type.is_dir() {
                return Err(Error::Constraint(format!(
                    "{} is not a regular file or directory",
                    path.display()
                )));
            }
            let name = entry_name(&path)?;
            if options.wrap_with_directory && !names.insert(name.clone()) {
                return Err(Error::Constraint(format!(
                    "more than one input is named {name:?}"
                )));
            }
            inputs.push(Input { path, name });
        }
        if inputs.is_empty() {
            return Err(Error::Constraint("nothing to pack".into()));
        }
        Ok(Self {
            inputs: inputs.into_iter(),
            walker: None,
            current_name: String::new(),
            file: None,
            pending: vec![],
            top: vec![],
            queue: VecDeque::new(),
            roots: None,
            options,
            failed: false,
        })
    }

    /// Root CIDs, once every block has been produced.
    pub fn roots(&self) -> Option<&[Cid]> {
        self.roots.as_deref()
    }

    fn emit(&mut self, node: DagNode) -> Result<Cid> {
        let block = node.into_block(self.options.hash)?;
        let cid = block.cid;
        trace!(%cid, len = block.data.len(), "block");
        self.queue.push_back(block);
        Ok(cid)
    }

    fn complete(&mut self, depth: usize, entry: DirEntry) {
        if depth == 0 {
            self.top.push(entry);
        } else {
            if self.pending.len() <= depth {
                self.pending.resize_with(depth + 1, Vec::new);
            }
            self.pending[depth].push(entry);
        }
    }

    fn children_of(&mut self, depth: usize) -> Vec<DirEntry> {
        self.pending
            .get_mut(depth + 1)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Advances the file being chunked by one chunk. Returns `false` once the
    /// file is done.
    fn step_file(&mut self) -> Result<bool> {
        let Some(file) = self.file.as_mut() else {
            return Ok(false);
        };
        match file.chunks.next() {
            Some(chunk) => {
                let chunk = chunk.map_err(Error::io_at(&file.path))?;
                file.size += chunk.len() as u64;
                let end = file.size;
                let cid = self.emit(DagNode::Leaf(chunk))?;
                if let Some(file) = self.file.as_mut() {
                    file.links.push(ChunkLink { cid, end });
                }
                Ok(true)
            }
            None => {
                let Some(FileInProgress {
                    name,
                    depth,
                    links,
                    size,
                    ..
                }) = self.file.take()
                else {
                    return Ok(false);
                };
                let cid = match links.as_slice() {
                    [single] => single.cid,
                    _ => self.emit(DagNode::Branch(FileBranch { links }))?,
                };
                self.complete(
                    depth,
                    DirEntry {
                        name,
                        cid,
                        kind: EntryKind::File,
                        size,
                    },
                );
                Ok(true)
            }
        }
    }

    fn visit(&mut self, entry: walkdir::DirEntry) -> Result<()> {
        if let Some(on_entry) = self.options.on_entry.as_mut() {
            on_entry(entry.path());
        }
        let depth = entry.depth();
        let name = match depth {
            0 => self.current_name.clone(),
            _ => entry_name(entry.path())?,
        };
        let file_type = entry.file_type();
        if file_type.is_dir() {
            let entries = self.children_of(depth);
            let dir = Directory { entries };
            let size = dir.size();
            let cid = self.emit(DagNode::Directory(dir))?;
            self.complete(
                depth,
                DirEntry {
                    name,
                    cid,
                    kind: EntryKind::Directory,
                    size,
                },
            );
        } else if file_type.is_file() {
            let path = entry.into_path();
            let file = File::open(&path).map_err(Error::io_at(&path))?;
            self.file = Some(FileInProgress {
                chunks: Chunker::new(file, self.options.chunk_size),
                path,
                name,
                depth,
                links: vec![],
                size: 0,
            });
        } else {
            warn!("skipping {}: not a regular file or directory", entry.path().display());
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let top = std::mem::take(&mut self.top);
        let roots = if self.options.wrap_with_directory {
            vec![self.emit(DagNode::Directory(Directory { entries: top }))?]
        } else {
            top.into_iter().map(|entry| entry.cid).collect()
        };
        debug!(?roots, "packed");
        self.roots = Some(roots);
        Ok(())
    }

    /// Makes progress until at least one block is queued or the inputs are
    /// exhausted.
    fn advance(&mut self) -> Result<()> {
        while self.queue.is_empty() && self.roots.is_none() {
            if self.step_file()? {
                continue;
            }
            if let Some(walker) = self.walker.as_mut() {
                match walker.next() {
                    Some(entry) => self.visit(entry.map_err(walk_error)?)?,
                    None => self.walker = None,
                }
                continue;
            }
            match self.inputs.next() {
                Some(Input { path, name }) => {
                    debug!("packing {}", path.display());
                    self.current_name = name;
                    self.pending.clear();
                    self.walker = Some(
                        walkdir::WalkDir::new(path)
                            .follow_links(false)
                            .contents_first(true)
                            .sort_by_file_name()
                            .into_iter(),
                    );
                }
                None => self.finish()?,
            }
        }
        Ok(())
    }
}

impl Iterator for DagBuilder {
    type Item = Result<CarBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Err(e) = self.advance() {
            self.failed = true;
            self.queue.clear();
            return Some(Err(e));
        }
        self.queue.pop_front().map(Ok)
    }
}

pin_project! {
    /// Blocks of a file tree, produced on a blocking thread and handed over
    /// through a bounded channel.
    ///
    /// A failure of the producer is yielded as the final item. Dropping the
    /// stream stops the producer.
    pub struct PackStream {
        #[pin]
        blocks: flume::r#async::RecvStream<'static, CarBlock>,
        producer: Option<JoinHandle<Result<Vec<Cid>>>>,
        roots: Option<Vec<Cid>>,
    }
}

impl PackStream {
    /// Root CIDs, once the stream has ended without error.
    pub fn roots(&self) -> Option<&[Cid]> {
        self.roots.as_deref()
    }
}

impl Stream for PackStream {
    type Item = Result<CarBlock>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if let Some(block) = ready!(this.blocks.poll_next(cx)) {
            return Poll::Ready(Some(Ok(block)));
        }
        let Some(producer) = this.producer.as_mut() else {
            return Poll::Ready(None);
        };
        let result = ready!(Pin::new(producer).poll(cx));
        *this.producer = None;
        match result {
            Ok(Ok(roots)) => {
                *this.roots = Some(roots);
                Poll::Ready(None)
            }
            Ok(Err(e)) => Poll::Ready(Some(Err(e))),
            Err(e) => Poll::Ready(Some(Err(Error::Io(io::Error::other(e))))),
        }
    }
}

/// Packs `paths` into blocks, see [`DagBuilder`]. At most `capacity` blocks
/// are buffered between producer and consumer.
///
/// Input validation errors are returned immediately; must be called from
/// within a tokio runtime.
pub fn pack(
    paths: impl IntoIterator<Item = impl AsRef<Path>>,
    options: PackOptions,
    capacity: usize,
) -> Result<PackStream> {
    let mut builder = DagBuilder::new(paths, options)?;
    let (tx, rx) = flume::bounded(capacity);
    let producer = tokio::task::spawn_blocking(move || {
        for block in builder.by_ref() {
            if tx.send(block?).is_err() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "block consumer went away",
                )));
            }
        }
        Ok(builder.roots.take().unwrap_or_default())
    });
    Ok(PackStream {
        blocks: rx.into_stream(),
        producer: Some(producer),
        roots: None,
    })
}
