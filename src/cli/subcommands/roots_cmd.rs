// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use super::open_archive;
use crate::car::{CarStream, ReadOptions};
use crate::cli_shared::cli::Config;

#[derive(Debug, clap::Args)]
pub struct RootsCommand {
    /// Archive to read, standard input if omitted or `-`
    archive: Option<PathBuf>,
}

impl RootsCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let reader = open_archive(self.archive.as_deref()).await?;
        let options = ReadOptions {
            verify: false,
            max_frame_len: config.read.max_frame_len,
        };
        let stream = CarStream::with_options(reader, options).await?;
        for root in stream.header.roots.iter() {
            println!("{root}");
        }
        Ok(())
    }
}
