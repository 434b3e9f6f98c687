// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::pin::{Pin, pin};
use std::task::{Context, Poll};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use cid::Cid;
use futures::{Sink, SinkExt as _, Stream, TryStreamExt as _, ready};
use integer_encoding::VarInt;
use nunny::Vec as NonEmpty;
use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::debug;
use unsigned_varint::codec::UviBytes;

use super::{CarBlock, CarV1Header};
use crate::error::{Error, Result};
use crate::utils::cid::{DAG_CBOR, compute_cid};
use crate::utils::encoding::to_vec;
use crate::utils::multihash::MultihashCode;

pin_project! {
    /// [`Sink`] of blocks, written as CARv1 frames.
    ///
    /// The header frame is written before the first block. Each block is
    /// encoded into a single frame buffer which is drained to the inner writer
    /// before the next block is accepted.
    pub struct CarWriter<W> {
        #[pin]
        inner: W,
        buffer: BytesMut,
    }
}

fn encode_header(header: &CarV1Header) -> Result<BytesMut> {
    let mut header_uvi_frame = BytesMut::new();
    let body = to_vec(header).map_err(|e| Error::Format(e.to_string()))?;
    UviBytes::default().encode(Bytes::from(body), &mut header_uvi_frame)?;
    Ok(header_uvi_frame)
}

impl<W: AsyncWrite> CarWriter<W> {
    pub fn new_carv1(roots: NonEmpty<Cid>, writer: W) -> Result<Self> {
        Ok(Self {
            inner: writer,
            buffer: encode_header(&CarV1Header::new(roots))?,
        })
    }

    /// Gives back the inner writer. Frames not yet flushed are lost.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite> Sink<CarBlock> for CarWriter<W> {
    type Error = Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let mut this = self.as_mut().project();

        while !this.buffer.is_empty() {
            this = self.as_mut().project();
            let bytes_written = ready!(this.inner.poll_write(cx, this.buffer))?;
            if bytes_written == 0 {
                return Poll::Ready(Err(std::io::Error::from(std::io::ErrorKind::WriteZero).into()));
            }
            this.buffer.advance(bytes_written);
        }
        Poll::Ready(Ok(()))
    }
    fn start_send(self: Pin<&mut Self>, item: CarBlock) -> Result<(), Self::Error> {
        item.write(&mut self.project().buffer.writer())?;
        Ok(())
    }
    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        ready!(self.as_mut().poll_ready(cx))?;
        Poll::Ready(ready!(self.project().inner.poll_flush(cx)).map_err(Error::from))
    }
    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        ready!(self.as_mut().poll_ready(cx))?;
        Poll::Ready(ready!(self.project().inner.poll_shutdown(cx)).map_err(Error::from))
    }
}

/// Writes `roots` and every block of `blocks` to `writer` as a CARv1
/// archive, in a single forward pass, and hands the flushed writer back.
///
/// The first failing block aborts the write; whatever was written up to that
/// point stays in `writer`.
pub async fn write_car<W, S>(roots: NonEmpty<Cid>, blocks: S, writer: W) -> Result<W>
where
    W: AsyncWrite + Unpin,
    S: Stream<Item = Result<CarBlock>>,
{
    let mut sink = CarWriter::new_carv1(roots, writer)?;
    let mut blocks = pin!(blocks);
    let mut count = 0u64;
    while let Some(block) = blocks.try_next().await? {
        sink.feed(block).await?;
        count += 1;
    }
    sink.flush().await?;
    debug!(count, "wrote blocks");
    Ok(sink.into_inner())
}

/// `count` stand-in roots with the same encoded length as the real roots of a
/// DAG hashed with `code`, for archives whose roots are only known once every
/// block has been written.
pub fn placeholder_roots(count: usize, code: MultihashCode) -> Result<NonEmpty<Cid>> {
    let placeholder = compute_cid(&[], DAG_CBOR, code);
    NonEmpty::new(vec![placeholder; count])
        .map_err(|_| Error::Constraint("an archive needs at least one root".into()))
}

/// Rewrites the header of the archive in `file` with `roots`.
///
/// The new header must encode to exactly as many bytes as the old one, see
/// [`placeholder_roots`].
pub async fn update_roots<F>(file: &mut F, roots: NonEmpty<Cid>) -> Result<()>
where
    F: AsyncRead + AsyncWrite + AsyncSeek + Unpin,
{
    file.seek(std::io::SeekFrom::Start(0)).await?;
    let mut prefix = Vec::with_capacity(10);
    let body_len = loop {
        prefix.push(file.read_u8().await?);
        if let Some((len, _)) = usize::decode_var(&prefix) {
            break len;
        }
        if prefix.len() >= 10 {
            return Err(Error::Format("invalid header length".into()));
        }
    };
    let old_len = prefix.len() + body_len;

    let header = encode_header(&CarV1Header::new(roots))?;
    if header.len() != old_len {
        return Err(Error::Format(format!(
            "new header is {} bytes, existing header is {old_len} bytes",
            header.len()
        )));
    }
    // Make sure the existing header is intact before overwriting it.
    let mut old_body = vec![0u8; body_len];
    file.read_exact(&mut old_body).await?;
    crate::utils::encoding::from_slice::<CarV1Header>(&old_body)
        .map_err(|e| Error::Format(format!("invalid header block: {e}")))?;

    file.seek(std::io::SeekFrom::Start(0)).await?;
    file.write_all(&header).await?;
    file.flush().await?;
    Ok(())
}
