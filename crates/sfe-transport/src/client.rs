//! Client side of the coding protocol.
//!
//! One transport worker per symbol shares a single connection. Writes
//! and reads on that connection are relayed between workers in list
//! order, so the coordinator sees records in exactly the order the
//! orderer produced, whatever order the workers get scheduled in.

use std::io::{BufRead, Read};
use std::time::Duration;

use sfe_core::relay::{self, Leg};
use sfe_core::{
    ClientConfig, CodeReply, OrderedSymbols, ProtocolError, Result, SfeError, SymbolRecord,
    ALPHABET_SIZE,
};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpStream;

use crate::stream::{MessageReader, MessageWriter};

pub const TABLE_HEADER: &str = "SHANNON-FANO-ELIAS Codes:";

pub struct SfeClient<S> {
    reader: MessageReader<ReadHalf<S>>,
    writer: MessageWriter<WriteHalf<S>>,
}

impl SfeClient<TcpStream> {
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let addr = tokio::net::lookup_host(config.server_addr())
            .await
            .map_err(|e| SfeError::setup("resolve server host", e))?
            .next()
            .ok_or_else(|| {
                SfeError::setup(
                    "resolve server host",
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such host"),
                )
            })?;

        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| SfeError::setup("connect", e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| SfeError::setup("set TCP_NODELAY", e))?;
        tracing::info!("connected to SFE coordinator at {}", addr);

        Ok(Self::from_stream(stream, config.io_timeout()))
    }
}

impl<S> SfeClient<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn from_stream(stream: S, timeout: Option<Duration>) -> Self {
        let (rd, wr) = tokio::io::split(stream);
        Self {
            reader: MessageReader::new(rd, timeout),
            writer: MessageWriter::new(wr, timeout),
        }
    }

    /// Declares the count, then codes every symbol. Replies come back in
    /// list order regardless of which worker finished first.
    pub async fn encode_all(self, ordered: &OrderedSymbols) -> Result<Vec<CodeReply>> {
        let Self { reader, mut writer } = self;

        if ordered.len() > ALPHABET_SIZE {
            return Err(ProtocolError::CountTooLarge {
                count: ordered.len().min(i32::MAX as usize) as i32,
                max: ALPHABET_SIZE,
            }
            .into());
        }
        writer.write_count(ordered.len() as i32).await?;

        let (send_legs, send_tail) = relay::chain(ordered.len(), writer);
        let (recv_legs, recv_tail) = relay::chain(ordered.len(), reader);

        let workers: Vec<_> = ordered
            .iter()
            .copied()
            .zip(send_legs.into_iter().zip(recv_legs))
            .map(|(record, (send, recv))| tokio::spawn(transport_worker(record, send, recv)))
            .collect();

        let mut replies = Vec::with_capacity(workers.len());
        let mut first_error = None;
        for outcome in futures::future::join_all(workers).await {
            let outcome = outcome
                .map_err(|e| SfeError::Relay(format!("transport worker panicked: {}", e)))
                .and_then(|r| r);
            match outcome {
                Ok(reply) => replies.push(reply),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let mut writer = send_tail.finish().await?;
        recv_tail.finish().await?;
        writer.shutdown().await?;
        Ok(replies)
    }
}

/// Sends one record, then waits for its reply.
async fn transport_worker<S>(
    record: SymbolRecord,
    send: Leg<MessageWriter<WriteHalf<S>>>,
    recv: Leg<MessageReader<ReadHalf<S>>>,
) -> Result<CodeReply>
where
    S: AsyncRead + AsyncWrite,
{
    let (mut writer, handoff) = send.take().await?;
    writer.write_record(&record).await?;
    handoff.pass(writer)?;

    let (mut reader, handoff) = recv.take().await?;
    let reply = reader.read_reply().await?;
    handoff.pass(reader)?;

    tracing::debug!(glyph = record.glyph, code = %reply, "reply received");
    Ok(reply)
}

/// Formats the code table in list order. Each glyph is written as its raw
/// byte, so the output is only UTF-8 when the input was.
pub fn render_table(ordered: &OrderedSymbols, replies: &[CodeReply]) -> Vec<u8> {
    let mut out = Vec::with_capacity(TABLE_HEADER.len() + 1 + replies.len() * 32);
    out.extend_from_slice(TABLE_HEADER.as_bytes());
    out.push(b'\n');
    for (record, reply) in ordered.iter().zip(replies) {
        out.extend_from_slice(b"Symbol ");
        out.push(record.glyph);
        out.extend_from_slice(format!(", Code: {}\n", reply).as_bytes());
    }
    out
}

/// Reads one line of at most `max_bytes` bytes, without its line terminator.
pub fn read_input_line<R: BufRead>(reader: R, max_bytes: usize) -> std::io::Result<Vec<u8>> {
    let mut line = Vec::new();
    reader.take(max_bytes as u64).read_until(b'\n', &mut line)?;
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    Ok(line)
}
