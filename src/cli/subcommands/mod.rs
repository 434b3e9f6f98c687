// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod blocks_cmd;
mod hash_cmd;
mod ls_cmd;
mod pack_cmd;
mod roots_cmd;
mod unpack_cmd;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cid::Cid;
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::either::Either;
use tracing::error;

pub(super) use self::{
    blocks_cmd::BlocksCommand, hash_cmd::HashCommand, ls_cmd::LsCommand, pack_cmd::PackCommand,
    roots_cmd::RootsCommand, unpack_cmd::UnpackCommand,
};
use crate::dag::{PathEntry, RootOutcome};
use crate::utils::misc::LoggingColor;

/// Pack file trees into content-addressed archives and unpack them again
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), bin_name = "carpack", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// Configuration file, also read from `CARPACK_CONFIG`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Colorize log output: always, auto or never
    #[arg(long, global = true, default_value = "auto")]
    pub color: LoggingColor,
    #[command(subcommand)]
    pub cmd: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Pack files and directories into an archive
    Pack(PackCommand),
    /// Write the files and directories of an archive to disk
    Unpack(UnpackCommand),
    /// List the files and directories of an archive
    Ls(LsCommand),
    /// Print the roots declared in an archive header
    Roots(RootsCommand),
    /// Print the CID of every block of an archive, verifying each
    Blocks(BlocksCommand),
    /// Print the CID of an archive itself
    Hash(HashCommand),
}

/// `None` and `-` stand for standard input.
fn is_stdio(path: Option<&Path>) -> bool {
    path.is_none_or(|path| path == Path::new("-"))
}

type ArchiveReader = Either<BufReader<tokio::fs::File>, BufReader<tokio::io::Stdin>>;

/// Opens an archive file, or standard input.
async fn open_archive(path: Option<&Path>) -> anyhow::Result<ArchiveReader> {
    match path {
        Some(path) if !is_stdio(Some(path)) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(crate::Error::io_at(path))
                .context("couldn't open archive")?;
            Ok(Either::Left(BufReader::new(file)))
        }
        _ => Ok(Either::Right(BufReader::new(tokio::io::stdin()))),
    }
}

/// Hands every walked root to `on_success`, logs failed roots, and fails with
/// the first failure if there is any.
fn report_outcomes(
    outcomes: Vec<RootOutcome>,
    mut on_success: impl FnMut(Cid, Vec<PathEntry>) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let total = outcomes.len();
    let mut failures = vec![];
    for RootOutcome { root, result } in outcomes {
        match result {
            Ok(entries) => on_success(root, entries)?,
            Err(e) => {
                error!("root {root}: {e}");
                failures.push((root, e));
            }
        }
    }
    let failed = failures.len();
    match failures.into_iter().next() {
        None => Ok(()),
        Some((root, first)) => Err(anyhow::Error::from(first).context(format!(
            "{failed} of {total} root(s) failed, first was {root}"
        ))),
    }
}
