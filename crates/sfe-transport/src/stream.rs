//! Typed message I/O over an ordered byte stream.
//!
//! Reads block until the full fixed-size message has arrived. When a
//! timeout is configured every read and write is bounded by it;
//! otherwise they wait indefinitely.

use std::future::Future;
use std::time::Duration;

use bytes::BytesMut;
use sfe_codec::wire;
use sfe_core::{CodeReply, Result, SfeError, SymbolRecord};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub struct MessageReader<R> {
    inner: R,
    timeout: Option<Duration>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(inner: R, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }

    pub async fn read_count(&mut self) -> Result<i32> {
        let buf: [u8; wire::COUNT_LEN] = self.read_exact("read symbol count").await?;
        Ok(wire::decode_count(&buf)?)
    }

    pub async fn read_record(&mut self) -> Result<SymbolRecord> {
        let buf: [u8; wire::RECORD_LEN] = self.read_exact("read symbol record").await?;
        Ok(wire::decode_record(&buf)?)
    }

    pub async fn read_reply(&mut self) -> Result<CodeReply> {
        let buf: [u8; wire::REPLY_LEN] = self.read_exact("read code reply").await?;
        Ok(wire::decode_reply(&buf)?)
    }

    async fn read_exact<const N: usize>(&mut self, op: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        bounded(self.timeout, op, self.inner.read_exact(&mut buf)).await?;
        Ok(buf)
    }
}

pub struct MessageWriter<W> {
    inner: W,
    timeout: Option<Duration>,
    scratch: BytesMut,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(inner: W, timeout: Option<Duration>) -> Self {
        Self {
            inner,
            timeout,
            scratch: BytesMut::with_capacity(wire::REPLY_LEN),
        }
    }

    pub async fn write_count(&mut self, count: i32) -> Result<()> {
        wire::encode_count(count, &mut self.scratch);
        self.flush_scratch("write symbol count").await
    }

    pub async fn write_record(&mut self, record: &SymbolRecord) -> Result<()> {
        wire::encode_record(record, &mut self.scratch);
        self.flush_scratch("write symbol record").await
    }

    pub async fn write_reply(&mut self, reply: &CodeReply) -> Result<()> {
        wire::encode_reply(reply, &mut self.scratch);
        self.flush_scratch("write code reply").await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        bounded(self.timeout, "shutdown stream", self.inner.shutdown()).await
    }

    async fn flush_scratch(&mut self, op: &'static str) -> Result<()> {
        let frame = self.scratch.split();
        bounded(self.timeout, op, async {
            self.inner.write_all(&frame).await?;
            self.inner.flush().await
        })
        .await
    }
}

async fn bounded<T, F>(timeout: Option<Duration>, op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| SfeError::Timeout {
                op,
                after_ms: limit.as_millis() as u64,
            })?,
        None => fut.await,
    };
    outcome.map_err(|e| SfeError::io(op, e))
}
