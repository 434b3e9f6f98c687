// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod cli;
pub mod logger;

use std::path::Path;

use anyhow::Context as _;

use crate::cli_shared::cli::{Config, ConfigPath, find_config_path};
use crate::utils::io::read_toml;

pub fn read_config(config_path_opt: Option<&Path>) -> anyhow::Result<(Option<ConfigPath>, Config)> {
    let (path, config) = match find_config_path(config_path_opt) {
        Some(path) => {
            // Read from config file
            let toml = std::fs::read_to_string(path.as_path())
                .with_context(|| format!("couldn't read {}", path.as_path().display()))?;
            // Parse and return the configuration file
            let config = read_toml(&toml)
                .with_context(|| format!("invalid configuration in {}", path.as_path().display()))?;
            (Some(path), config)
        }
        None => (None, Config::default()),
    };
    Ok((path, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_shared::cli::HashAlgorithm;

    #[test]
    fn read_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carpack.toml");
        std::fs::write(&path, "[pack]\nhash = \"sha2-512\"\n").unwrap();

        let (config_path, config) = read_config(Some(&path)).unwrap();
        assert_eq!(config_path, Some(ConfigPath::Cli(path)));
        assert_eq!(config.pack.hash, HashAlgorithm::Sha2_512);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_config(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn invalid_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carpack.toml");
        std::fs::write(&path, "[pack\n").unwrap();
        let err = read_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("invalid configuration"));
    }
}
