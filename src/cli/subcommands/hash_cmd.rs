// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use super::open_archive;
use crate::utils::io::{ProgressStreamExt as _, hash_archive};

#[derive(Debug, clap::Args)]
pub struct HashCommand {
    /// Archive to read, standard input if omitted or `-`
    archive: Option<PathBuf>,
}

impl HashCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        let reader = open_archive(self.archive.as_deref()).await?;
        let cid = hash_archive(reader.progress_bytes("Hashed")).await?;
        println!("{cid}");
        Ok(())
    }
}
