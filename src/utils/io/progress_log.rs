// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Periodic progress messages for long running streams.
//!
//! Archives may be piped in, so no total is assumed: the log reports what has
//! been processed so far and the throughput.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::Stream;
use human_repr::{HumanCount as _, HumanThroughput as _};
use humantime::format_duration;
use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, ReadBuf};
use tracing::info;

const UPDATE_FREQUENCY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Items,
    Bytes,
}

#[derive(Debug, Clone)]
pub struct WithProgress {
    completed: u64,
    unit: Unit,
    frequency: Duration,
    start: Instant,
    last_logged: Instant,
    message: String,
}

impl WithProgress {
    fn new(message: &str, unit: Unit) -> Self {
        let now = Instant::now();
        Self {
            completed: 0,
            unit,
            frequency: UPDATE_FREQUENCY,
            start: now,
            last_logged: now,
            message: message.into(),
        }
    }

    fn inc(&mut self, value: u64) {
        self.completed += value;
        let now = Instant::now();
        if now - self.last_logged > self.frequency {
            self.emit(now);
            self.last_logged = now;
        }
    }

    fn emit(&self, now: Instant) {
        let elapsed = now - self.start;
        let elapsed_secs = elapsed.as_secs_f64().max(f64::EPSILON);
        let elapsed = format_duration(Duration::from_secs(elapsed.as_secs()));
        match self.unit {
            Unit::Items => info!(
                "{} {} (elapsed: {elapsed}, {:.0}/s)",
                self.message,
                self.completed,
                self.completed as f64 / elapsed_secs
            ),
            Unit::Bytes => info!(
                "{} {} (elapsed: {elapsed}, {})",
                self.message,
                self.completed.human_count_bytes(),
                (self.completed as f64 / elapsed_secs).human_throughput_bytes()
            ),
        }
    }

    fn finish(&mut self) {
        if self.start.elapsed() > self.frequency {
            self.emit(Instant::now());
        }
        // Only report completion once.
        self.frequency = Duration::MAX;
    }
}

pin_project! {
    /// Counts the items of a stream, or the bytes of a reader.
    pub struct WithProgressStream<S> {
        #[pin]
        inner: S,
        progress: WithProgress,
    }
}

impl<S: Stream> Stream for WithProgressStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = futures::ready!(this.inner.poll_next(cx));
        match &item {
            Some(_) => this.progress.inc(1),
            None => this.progress.finish(),
        }
        Poll::Ready(item)
    }
}

impl<R: AsyncRead> AsyncRead for WithProgressStream<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        let prev_len = buf.filled().len();
        futures::ready!(this.inner.poll_read(cx, buf))?;
        let read = buf.filled().len() - prev_len;
        match read {
            0 => this.progress.finish(),
            n => this.progress.inc(n as u64),
        }
        Poll::Ready(Ok(()))
    }
}

pub trait ProgressStreamExt: Sized {
    /// Logs the number of items produced so far, every few seconds.
    fn progress_count(self, message: &str) -> WithProgressStream<Self> {
        WithProgressStream {
            inner: self,
            progress: WithProgress::new(message, Unit::Items),
        }
    }

    /// Logs the number of bytes read so far, every few seconds.
    fn progress_bytes(self, message: &str) -> WithProgressStream<Self> {
        WithProgressStream {
            inner: self,
            progress: WithProgress::new(message, Unit::Bytes),
        }
    }
}

impl<T> ProgressStreamExt for T {}
