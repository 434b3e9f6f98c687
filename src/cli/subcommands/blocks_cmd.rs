// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write as _;
use std::path::PathBuf;

use futures::TryStreamExt as _;
use tracing::info;

use super::open_archive;
use crate::car::{CarStream, ReadOptions};
use crate::cli_shared::cli::Config;
use crate::utils::io::ProgressStreamExt as _;

#[derive(Debug, clap::Args)]
pub struct BlocksCommand {
    /// Archive to read, standard input if omitted or `-`
    archive: Option<PathBuf>,
}

impl BlocksCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let reader = open_archive(self.archive.as_deref()).await?;
        let options = ReadOptions {
            verify: true,
            max_frame_len: config.read.max_frame_len,
        };
        let mut blocks = std::pin::pin!(
            CarStream::with_options(reader, options)
                .await?
                .progress_count("Verified blocks")
        );
        let mut stdout = std::io::stdout().lock();
        let mut count = 0u64;
        while let Some(block) = blocks.try_next().await? {
            writeln!(stdout, "{}", block.cid)?;
            count += 1;
        }
        stdout.flush()?;
        info!("{count} block(s) verified");
        Ok(())
    }
}
