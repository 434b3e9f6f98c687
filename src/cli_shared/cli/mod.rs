// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod config;

use std::path::{Path, PathBuf};

pub use self::config::*;

/// Environment variable naming a configuration file.
pub const CONFIG_PATH_ENV: &str = "CARPACK_CONFIG";

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPath {
    Cli(PathBuf),
    Env(PathBuf),
}

impl ConfigPath {
    pub fn as_path(&self) -> &Path {
        match self {
            ConfigPath::Cli(path) | ConfigPath::Env(path) => path,
        }
    }
}

/// The `--config` argument wins over the environment.
pub fn find_config_path(config: Option<&Path>) -> Option<ConfigPath> {
    if let Some(path) = config {
        return Some(ConfigPath::Cli(path.to_path_buf()));
    }
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|path| !path.is_empty())
        .map(|path| ConfigPath::Env(PathBuf::from(path)))
}
