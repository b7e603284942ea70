use std::net::SocketAddr;

use sfe_codec::Session;
use sfe_core::relay::{self, Leg};
use sfe_core::{CodingMode, Result, ServerConfig, SfeError};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::stream::{MessageReader, MessageWriter};

/// Accepts client connections and codes each session in isolation.
pub struct SfeServer {
    listener: TcpListener,
    config: ServerConfig,
}

impl SfeServer {
    /// Resolves, binds and listens. Every failure here is a setup error.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let addr = tokio::net::lookup_host(config.bind_addr())
            .await
            .map_err(|e| SfeError::setup("resolve bind address", e))?
            .next()
            .ok_or_else(|| {
                SfeError::setup(
                    "resolve bind address",
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no address for host"),
                )
            })?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| SfeError::setup("open socket", e))?;
        socket
            .set_reuse_address(true)
            .map_err(|e| SfeError::setup("set SO_REUSEADDR", e))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| SfeError::setup("set non-blocking", e))?;
        socket
            .bind(&addr.into())
            .map_err(|e| SfeError::setup("bind", e))?;
        socket
            .listen(config.backlog.min(i32::MAX as u32) as i32)
            .map_err(|e| SfeError::setup("listen", e))?;

        let listener = TcpListener::from_std(std::net::TcpListener::from(socket))
            .map_err(|e| SfeError::setup("register listener", e))?;

        tracing::info!(
            "SFE coordinator listening on {} ({:?} coding)",
            addr,
            config.coding_mode
        );
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| SfeError::setup("query local address", e))
    }

    /// Accepts forever. A failed session is logged and does not affect others.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = self
                .listener
                .accept()
                .await
                .map_err(|e| SfeError::setup("accept", e))?;
            if let Err(e) = stream.set_nodelay(true) {
                tracing::warn!("could not disable Nagle for {}: {}", peer, e);
            }

            let config = self.config.clone();
            let span = tracing::info_span!("session", %peer);
            tokio::spawn(
                async move {
                    match run_session(stream, &config).await {
                        Ok(coded) => tracing::info!(symbols = coded, "session complete"),
                        Err(e) => tracing::error!("session aborted: {}", e),
                    }
                }
                .instrument(span),
            );
        }
    }
}

/// Runs one session to completion and returns the number of symbols coded.
pub async fn run_session<S>(stream: S, config: &ServerConfig) -> Result<usize>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (rd, wr) = tokio::io::split(stream);
    let mut reader = MessageReader::new(rd, config.io_timeout());
    let writer = MessageWriter::new(wr, config.io_timeout());
    let mut session = Session::new(config.enforce_sequence);

    let count = reader.read_count().await?;
    let declared = session.declare(count)?;
    if declared == 0 {
        return Ok(0);
    }

    let mut link = Link {
        session,
        reader,
        writer,
    };
    match config.coding_mode {
        CodingMode::Sequential => {
            while !link.session.is_done() {
                link.code_one().await?;
            }
        }
        CodingMode::Pipelined => {
            link = code_pipelined(link, declared).await?;
        }
    }

    debug_assert!(link.session.is_done());
    Ok(declared)
}

/// Everything a per-symbol unit needs exclusive access to.
struct Link<S> {
    session: Session,
    reader: MessageReader<ReadHalf<S>>,
    writer: MessageWriter<WriteHalf<S>>,
}

impl<S: AsyncRead + AsyncWrite> Link<S> {
    /// Reads one record, codes it against the prefix sum, replies.
    async fn code_one(&mut self) -> Result<()> {
        let record = self.reader.read_record().await?;
        let reply = self.session.code_next(&record)?;
        self.writer.write_reply(&reply).await
    }
}

/// One task per symbol; the link is relayed from stage `k` to `k + 1`,
/// so the accumulator is read and advanced in list order.
async fn code_pipelined<S>(link: Link<S>, declared: usize) -> Result<Link<S>>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (legs, tail) = relay::chain(declared, link);
    let stages: Vec<_> = legs
        .into_iter()
        .map(|leg| tokio::spawn(code_stage(leg).in_current_span()))
        .collect();

    // Stages only fail forward, so the first error in list order is the cause.
    let mut first_error = None;
    for stage in stages {
        let outcome = stage
            .await
            .map_err(|e| SfeError::Relay(format!("coding stage panicked: {}", e)))
            .and_then(|r| r);
        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }
    tail.finish().await
}

async fn code_stage<S>(leg: Leg<Link<S>>) -> Result<()>
where
    S: AsyncRead + AsyncWrite,
{
    let (mut link, handoff) = leg.take().await?;
    link.code_one().await?;
    handoff.pass(link)
}
