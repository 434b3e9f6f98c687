// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write as _;
use std::path::PathBuf;

use cid::Cid;

use super::{open_archive, report_outcomes};
use crate::cli_shared::cli::Config;
use crate::dag::{ListMode, list};

#[derive(Debug, clap::Args)]
pub struct LsCommand {
    /// Archive to read, standard input if omitted or `-`
    archive: Option<PathBuf>,
    /// What to print for every file and directory
    #[arg(long, default_value_t = ListMode::Both)]
    format: ListMode,
    /// Only list these roots
    #[arg(long = "root")]
    roots: Vec<Cid>,
}

impl LsCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let reader = open_archive(self.archive.as_deref()).await?;
        let outcomes = list(reader, &self.roots, config.read.max_frame_len).await?;
        let mut stdout = std::io::stdout().lock();
        report_outcomes(outcomes, |_, entries| {
            for entry in entries {
                writeln!(stdout, "{}", entry.render(self.format))?;
            }
            Ok(())
        })?;
        stdout.flush()?;
        Ok(())
    }
}
