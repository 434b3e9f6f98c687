// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_compression::tokio::bufread::ZstdDecoder;
use bytes::{Buf, Bytes};
use cid::Cid;
use futures::{Stream, StreamExt};
use integer_encoding::VarInt;
use nunny::Vec as NonEmpty;
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead};
use tokio_util::codec::FramedRead;
use tokio_util::either::Either;
use tracing::debug;
use unsigned_varint::codec::UviBytes;

use crate::error::{Error, Result};
use crate::utils::encoding::from_slice;

/// 64 MiB
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarV1Header {
    // The roots array must contain one or more CIDs,
    // each of which should be present somewhere in the remainder of the CAR.
    // See <https://ipld.io/specs/transport/car/carv1/#constraints>
    pub roots: NonEmpty<Cid>,
    pub version: u64,
}

impl CarV1Header {
    pub fn new(roots: NonEmpty<Cid>) -> Self {
        Self { roots, version: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarBlock {
    pub cid: Cid,
    pub data: Vec<u8>,
}

impl CarBlock {
    // Write a varint frame containing the cid and the data
    pub fn write(&self, mut writer: &mut impl io::Write) -> io::Result<()> {
        let frame_length = self.cid.encoded_len() + self.data.len();
        writer.write_all(&frame_length.encode_var_vec())?;
        #[allow(clippy::needless_borrows_for_generic_args)]
        self.cid
            .write_bytes(&mut writer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Splits a block frame body into its CID and data.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<CarBlock> {
        let bytes: Bytes = bytes.into();
        let mut cursor = bytes.reader();
        let cid = Cid::read_bytes(&mut cursor)
            .map_err(|e| Error::Format(format!("invalid block CID: {e}")))?;
        let bytes = cursor.into_inner();
        Ok(CarBlock {
            cid,
            data: bytes.to_vec(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        crate::utils::cid::verify(&self.cid, &self.data)
    }
}

/// Knobs for [`CarStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Check every block against its CID as it is read.
    pub verify: bool,
    /// Frames declaring a longer body are rejected.
    pub max_frame_len: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            verify: true,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

pin_project! {
    /// Stream of CAR blocks, in archive order. If the input data is compressed
    /// with zstd, it will automatically be decompressed.
    ///
    /// Only a forward byte cursor is needed: the source may be a pipe of
    /// unknown length. At most one frame is held in memory at a time.
    pub struct CarStream<ReaderT> {
        #[pin]
        reader: FramedRead<Either<ReaderT, ZstdDecoder<ReaderT>>, UviBytes>,
        pub header: CarV1Header,
        first_block: Option<CarBlock>,
        verify: bool,
        failed: bool,
    }
}

// This method checks the header in order to see whether or not we are operating on a zstd
// archive. The zstd header has a maximum size of 18 bytes:
// https://github.com/facebook/zstd/blob/dev/doc/zstd_compression_format.md#zstandard-frames.
fn is_zstd(buf: &[u8]) -> bool {
    zstd::zstd_safe::get_frame_content_size(buf).is_ok()
}

/// Frame decoding reports malformed input through [`io::Error`]s; tell those
/// apart from failures of the source itself.
fn frame_error(e: io::Error) -> Error {
    // Messages of `UviBytes` (oversized frame) and `FramedRead` (truncated frame).
    const CODEC_MESSAGES: [&str; 2] = ["len > max", "bytes remaining on stream"];
    let from_codec = match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => true,
        io::ErrorKind::PermissionDenied | io::ErrorKind::Other => e.get_ref().is_some_and(|inner| {
            inner.is::<unsigned_varint::decode::Error>()
                || CODEC_MESSAGES.contains(&inner.to_string().as_str())
        }),
        _ => false,
    };
    if from_codec {
        Error::Format(format!("malformed frame: {e}"))
    } else {
        Error::Io(e)
    }
}

impl<ReaderT: AsyncBufRead + Unpin> CarStream<ReaderT> {
    /// Opens a stream that verifies every block.
    pub async fn new(reader: ReaderT) -> Result<Self> {
        Self::with_options(reader, ReadOptions::default()).await
    }

    /// Opens a stream that hands out blocks without checking them.
    pub async fn new_unverified(reader: ReaderT) -> Result<Self> {
        Self::with_options(
            reader,
            ReadOptions {
                verify: false,
                ..Default::default()
            },
        )
        .await
    }

    pub async fn with_options(mut reader: ReaderT, options: ReadOptions) -> Result<Self> {
        let is_compressed = is_zstd(reader.fill_buf().await?);
        let mut codec = UviBytes::default();
        codec.set_max_len(options.max_frame_len);
        let mut reader = if is_compressed {
            debug!("reading zstd compressed archive");
            let mut zstd = ZstdDecoder::new(reader);
            zstd.multiple_members(true);
            FramedRead::new(Either::Right(zstd), codec)
        } else {
            FramedRead::new(Either::Left(reader), codec)
        };
        let header = read_v1_header(&mut reader).await?;

        // Read the first block and check if it is valid. This check helps to
        // catch invalid CAR files as soon as we open.
        let first_block = match reader.next().await.transpose().map_err(frame_error)? {
            Some(first_entry) => {
                let block = CarBlock::from_bytes(first_entry.freeze())?;
                if options.verify {
                    block.validate()?;
                }
                Some(block)
            }
            None => None,
        };
        Ok(CarStream {
            reader,
            header,
            first_block,
            verify: options.verify,
            failed: false,
        })
    }
}

impl<ReaderT: AsyncBufRead> Stream for CarStream<ReaderT> {
    type Item = Result<CarBlock>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.failed {
            return Poll::Ready(None);
        }
        if let Some(block) = this.first_block.take() {
            return Poll::Ready(Some(Ok(block)));
        }
        let verify = *this.verify;
        let item = futures::ready!(this.reader.poll_next(cx)).map(|frame| -> Result<CarBlock> {
            let block = CarBlock::from_bytes(frame.map_err(frame_error)?.freeze())?;
            if verify {
                block.validate()?;
            }
            Ok(block)
        });
        if let Some(Err(_)) = &item {
            *this.failed = true;
        }
        Poll::Ready(item)
    }
}

async fn read_v1_header<ReaderT: AsyncRead + Unpin>(
    framed_reader: &mut FramedRead<ReaderT, UviBytes>,
) -> Result<CarV1Header> {
    let frame = framed_reader
        .next()
        .await
        .ok_or_else(|| Error::Format("missing header frame".into()))?
        .map_err(frame_error)?;
    let header = from_slice::<CarV1Header>(&frame)
        .map_err(|e| Error::Format(format!("invalid header block: {e}")))?;
    if header.version != 1 {
        return Err(Error::Format(format!(
            "unsupported CAR version {}",
            header.version
        )));
    }
    Ok(header)
}
