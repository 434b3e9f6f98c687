// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::car::DEFAULT_MAX_FRAME_LEN;
use crate::chunker::DEFAULT_CHUNK_SIZE;
use crate::utils::multihash::MultihashCode;

/// Digest functions blocks can be addressed with when packing.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha2-256")]
    #[value(name = "sha2-256")]
    Sha2_256,
    #[serde(rename = "sha2-512")]
    #[value(name = "sha2-512")]
    Sha2_512,
    #[serde(rename = "blake2b-256")]
    #[value(name = "blake2b-256")]
    Blake2b256,
    #[serde(rename = "blake3-256")]
    #[value(name = "blake3-256")]
    Blake3_256,
}

impl From<HashAlgorithm> for MultihashCode {
    fn from(value: HashAlgorithm) -> Self {
        match value {
            HashAlgorithm::Sha2_256 => MultihashCode::Sha2_256,
            HashAlgorithm::Sha2_512 => MultihashCode::Sha2_512,
            HashAlgorithm::Blake2b256 => MultihashCode::Blake2b256,
            HashAlgorithm::Blake3_256 => MultihashCode::Blake3_256,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct PackConfig {
    /// Maximum size of a file chunk, in bytes.
    pub chunk_size: NonZeroUsize,
    pub hash: HashAlgorithm,
    pub wrap_with_directory: bool,
    /// Blocks buffered between the packer and the archive writer.
    pub channel_capacity: usize,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash: HashAlgorithm::default(),
            wrap_with_directory: true,
            channel_capacity: 64,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct ReadConfig {
    /// Longest frame accepted when reading an archive, in bytes.
    pub max_frame_len: usize,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub pack: PackConfig,
    pub read: ReadConfig,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::io::read_toml;
    use pretty_assertions::assert_eq;
    use quickcheck::Arbitrary;
    use quickcheck_macros::quickcheck;

    impl Arbitrary for Config {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            Config {
                pack: PackConfig {
                    chunk_size: NonZeroUsize::new(usize::from(u16::arbitrary(g)).max(1))
                        .unwrap(),
                    hash: *g
                        .choose(&[
                            HashAlgorithm::Sha2_256,
                            HashAlgorithm::Sha2_512,
                            HashAlgorithm::Blake2b256,
                            HashAlgorithm::Blake3_256,
                        ])
                        .unwrap(),
                    wrap_with_directory: bool::arbitrary(g),
                    channel_capacity: u16::arbitrary(g).into(),
                },
                read: ReadConfig {
                    max_frame_len: u32::arbitrary(g) as usize,
                },
            }
        }
    }

    #[quickcheck]
    fn test_config_all_params_under_section(config: Config) {
        let serialized_config =
            toml::to_string(&config).expect("could not serialize the configuration");
        assert_eq!(
            serialized_config
                .trim_start()
                .chars()
                .next()
                .expect("configuration empty"),
            '['
        );
        assert_eq!(read_toml::<Config>(&serialized_config).unwrap(), config);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = read_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.pack.chunk_size.get(), 262144);
        assert_eq!(config.read.max_frame_len, 64 * 1024 * 1024);
    }

    #[test]
    fn partial_sections() {
        let config: Config = read_toml(
            r#"
            [pack]
            hash = "blake3-256"
            wrap_with_directory = false
            "#,
        )
        .unwrap();
        assert_eq!(config.pack.hash, HashAlgorithm::Blake3_256);
        assert!(!config.pack.wrap_with_directory);
        assert_eq!(config.pack.channel_capacity, 64);
        assert_eq!(
            MultihashCode::from(config.pack.hash),
            MultihashCode::Blake3_256
        );
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(read_toml::<Config>("[pack]\nchunk_size = 0\n").is_err());
    }

    #[test]
    fn unknown_hash_is_rejected() {
        assert!(read_toml::<Config>("[pack]\nhash = \"md5\"\n").is_err());
    }
}
