// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::pin::pin;

use anyhow::Context as _;
use human_repr::HumanCount as _;
use tokio::io::BufWriter;
use tracing::{debug, info, warn};

use super::is_stdio;
use crate::car::{placeholder_roots, update_roots, write_car};
use crate::cli_shared::cli::{Config, HashAlgorithm};
use crate::dag::{PackOptions, pack};
use crate::utils::cid::{RAW, compute_cid};
use crate::utils::multihash::MultihashCode;

#[derive(Debug, clap::Args)]
pub struct PackCommand {
    /// Files or directories to pack
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Archive to write, `-` for standard output
    #[arg(short, long)]
    output: PathBuf,
    /// Make every input a root of its own instead of wrapping them in one directory
    #[arg(long)]
    no_wrap: bool,
    /// Maximum size of a file chunk, in bytes
    #[arg(long)]
    chunk_size: Option<NonZeroUsize>,
    /// Digest function blocks are addressed with
    #[arg(long)]
    hash: Option<HashAlgorithm>,
    /// Replace the output file if it exists
    #[arg(long)]
    force: bool,
}

impl PackCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let hash = MultihashCode::from(self.hash.unwrap_or(config.pack.hash));
        let wrap_with_directory = config.pack.wrap_with_directory && !self.no_wrap;
        let chunk_size = self.chunk_size.unwrap_or(config.pack.chunk_size);
        check_chunk_size(chunk_size, hash, config.read.max_frame_len)?;
        let options = PackOptions {
            wrap_with_directory,
            chunk_size,
            hash,
            on_entry: Some(Box::new(|path: &Path| debug!("adding {}", path.display()))),
        };
        let root_count = match wrap_with_directory {
            true => 1,
            false => self.paths.len(),
        };
        let placeholders = placeholder_roots(root_count, hash)?;
        let mut blocks = pin!(pack(
            &self.paths,
            options,
            config.pack.channel_capacity.max(1)
        )?);

        if is_stdio(Some(self.output.as_path())) {
            write_car(placeholders, blocks.as_mut(), tokio::io::stdout())
                .await
                .context("couldn't pack")?;
            for root in blocks.roots().unwrap_or_default() {
                warn!("archive header was not finalized, root is {root}");
            }
            return Ok(());
        }

        let file = match self.force {
            true => tokio::fs::File::create(&self.output).await,
            false => {
                tokio::fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&self.output)
                    .await
            }
        }
        .map_err(crate::Error::io_at(&self.output))
        .context("couldn't create archive")?;

        let finalized = async {
            let mut file = write_car(placeholders, blocks.as_mut(), BufWriter::new(file))
                .await
                .context("couldn't pack")?
                .into_inner();
            let roots = nunny::Vec::new(blocks.roots().unwrap_or_default().to_vec())
                .map_err(|_| anyhow::anyhow!("packing produced no roots"))?;
            update_roots(&mut file, roots.clone())
                .await
                .context("couldn't finalize archive header")?;
            anyhow::Ok((file, roots))
        }
        .await;
        let (file, roots) = match finalized {
            Ok(finalized) => finalized,
            Err(e) => {
                // The header still holds placeholders, don't leave it around.
                if let Err(remove) = tokio::fs::remove_file(&self.output).await {
                    warn!("couldn't remove {}: {remove}", self.output.display());
                }
                return Err(e);
            }
        };
        let size = file.metadata().await?.len();
        info!(
            "wrote {} to {}",
            size.human_count_bytes(),
            self.output.display()
        );
        for root in roots {
            println!("{root}");
        }
        Ok(())
    }
}

/// Chunks must fit in a frame that the reading side accepts.
fn check_chunk_size(
    chunk_size: NonZeroUsize,
    hash: MultihashCode,
    max_frame_len: usize,
) -> crate::Result<()> {
    let cid_len = compute_cid(&[], RAW, hash).encoded_len();
    if chunk_size.get().saturating_add(cid_len) > max_frame_len {
        return Err(crate::Error::Constraint(format!(
            "chunk size {chunk_size} does not fit in the maximum frame length of {max_frame_len} bytes"
        )));
    }
    Ok(())
}
