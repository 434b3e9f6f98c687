// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use cid::Cid;
use tracing::info;

use super::{open_archive, report_outcomes};
use crate::cli_shared::cli::Config;
use crate::dag::{EntryKind, unpack};

#[derive(Debug, clap::Args)]
pub struct UnpackCommand {
    /// Archive to read, standard input if omitted or `-`
    archive: Option<PathBuf>,
    /// Directory to write into, created if missing
    #[arg(short, long)]
    output: PathBuf,
    /// Only unpack these roots
    #[arg(long = "root")]
    roots: Vec<Cid>,
}

impl UnpackCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let reader = open_archive(self.archive.as_deref()).await?;
        let outcomes = unpack(
            reader,
            &self.roots,
            self.output.clone(),
            config.read.max_frame_len,
        )
        .await?;
        report_outcomes(outcomes, |root, entries| {
            let files = entries.iter().filter(|e| e.kind == EntryKind::File).count();
            info!(
                "unpacked {root}: {files} file(s) and {} directories",
                entries.len() - files
            );
            Ok(())
        })
    }
}
