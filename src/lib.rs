// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Packs file trees into content-addressed archives (CARv1) and unpacks them.
//!
//! ```text
//! pack:   tree ─► DagBuilder ─► blocks + roots ─► CarWriter ─► archive
//! unpack: archive ─► CarStream ─► BlockIndex ─► walk ─► files or listing
//! ```

pub mod car;
pub mod chunker;
pub mod dag;
pub mod error;
pub mod utils;

mod cli;
mod cli_shared;

pub use cli::main::{exit_code, main as carpack_main};
pub use cli_shared::cli::{Config, HashAlgorithm, PackConfig, ReadConfig};
pub use error::{Error, ErrorKind, Result};
