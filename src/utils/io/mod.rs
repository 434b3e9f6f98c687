// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod progress_log;

use cid::Cid;
use multihash_derive::Hasher as _;
use tokio::io::{AsyncRead, AsyncReadExt as _};

use crate::error::{Error, Result};
use crate::utils::cid::CAR;
use crate::utils::multihash::prelude::*;

pub use progress_log::{ProgressStreamExt, WithProgress, WithProgressStream};

/// Converts a TOML file represented as a string to `S`
///
/// # Example
/// ```
/// use serde::Deserialize;
/// use carpack::utils::io::read_toml;
///
/// #[derive(Deserialize)]
/// struct Config {
///     name: String
/// };
///
/// let toml_string = "name = \"carpack\"\n";
/// let config: Config = read_toml(toml_string).unwrap();
/// assert_eq!(config.name, "carpack");
/// ```
pub fn read_toml<S>(toml_string: &str) -> anyhow::Result<S>
where
    for<'de> S: serde::de::Deserialize<'de>,
{
    let new_struct: S = toml::from_str(toml_string)?;
    Ok(new_struct)
}

/// The identifier of an archive as a whole: the SHA-256 of its bytes, under
/// the [`CAR`] codec. Only needs a forward pass over `reader`.
pub async fn hash_archive<R: AsyncRead + Unpin>(mut reader: R) -> Result<Cid> {
    let mut hasher = multihash_codetable::Sha2_256::default();
    let mut buf = vec![0; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = MultihashCode::Sha2_256
        .wrap(hasher.finalize())
        .map_err(|e| Error::Format(e.to_string()))?;
    Ok(Cid::new_v1(CAR, digest))
}
