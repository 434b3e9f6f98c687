// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Serialize, de::DeserializeOwned};

/// Encodes `value` as DAG-CBOR.
pub fn to_vec<T: Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| anyhow::anyhow!("dag-cbor encoding: {e}"))
}

/// Decodes a DAG-CBOR blob into `T`.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> anyhow::Result<T> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| anyhow::anyhow!("dag-cbor decoding: {e}"))
}
