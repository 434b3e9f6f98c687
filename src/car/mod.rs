// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! # Varint frames
//!
//! CARs are made of concatenations of _varint frames_. Each varint frame is a
//! concatenation of the _body length_ as an unsigned varint, and the _frame
//! body_ itself. [`unsigned_varint::codec::UviBytes`] is used to read frames
//! piecewise into memory.
//!
//! ```text
//!        varint frame
//! │◄───────────────────────►│
//! │                         │
//! ├───────────┬─────────────┤
//! │varint:    │             │
//! │body length│frame body   │
//! └───────────┼─────────────┤
//!             │             │
//! frame body ►│◄───────────►│
//!     offset     =body length
//! ```
//!
//! # CARv1 layout
//!
//! The first varint frame is a _header frame_, where the frame body is a
//! [`CarV1Header`] encoded using [`serde_ipld_dagcbor`].
//!
//! Subsequent varint frames are _block frames_, where the frame body is a
//! concatenation of a [`Cid`](cid::Cid) and the _block data_ addressed by that CID.
//!
//! ```text
//! block frame ►│
//! body offset  │
//!              │  =body length
//!              │◄────────────►│
//!  ┌───────────┼───┬──────────┤
//!  │body length│cid│block data│
//!  └───────────┴───┼──────────┤
//!                  │◄────────►│
//!                  │  =block data length
//!      block data  │
//!          offset ►│
//! ```
//!
//! The stream ends when the source is exhausted; there is no trailer.

mod car_stream;
mod car_writer;

pub use car_stream::{CarBlock, CarStream, CarV1Header, DEFAULT_MAX_FRAME_LEN, ReadOptions};
pub use car_writer::{CarWriter, placeholder_roots, update_roots, write_car};
