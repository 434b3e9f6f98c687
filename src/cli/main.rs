// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ffi::OsString;

use clap::Parser as _;
use tracing::debug;

use super::subcommands::{Cli, Subcommand};
use crate::cli_shared::{logger::setup_minimal_logger, read_config};
use crate::error::ErrorKind;

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    // Capture Cli inputs
    let Cli { config, color, cmd } = Cli::parse_from(args);
    setup_minimal_logger(color);

    let (config_path, config) = read_config(config.as_deref())?;
    if let Some(path) = config_path {
        debug!("using configuration from {}", path.as_path().display());
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            // Run command
            match cmd {
                Subcommand::Pack(cmd) => cmd.run(&config).await,
                Subcommand::Unpack(cmd) => cmd.run(&config).await,
                Subcommand::Ls(cmd) => cmd.run(&config).await,
                Subcommand::Roots(cmd) => cmd.run(&config).await,
                Subcommand::Blocks(cmd) => cmd.run(&config).await,
                Subcommand::Hash(cmd) => cmd.run().await,
            }
        })
}

/// Process exit status for a failed command, following `sysexits.h`.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    let kind = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<crate::Error>())
        .map(crate::Error::kind);
    match kind {
        Some(ErrorKind::Constraint) => 64,
        Some(ErrorKind::Format | ErrorKind::Integrity) => 65,
        Some(ErrorKind::Io) => 74,
        None => 1,
    }
}
