//! Session handling and the TCP accept loop.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use pytok_lexer::{LexError, SourceBuffer, SourceError};

use crate::proto::{ErrorReply, TokenRecord, TokenizeReply, TokenizeRequest};

/// How long the accept loop sleeps when no connection is waiting.
const ACCEPT_POLL: Duration = Duration::from_millis(25);

/// Errors a single request can fail with.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected before scanning (too short, empty result).
    #[error("request rejected: {0}")]
    Rejected(SourceError),

    /// The source text could not be tokenized.
    #[error("tokenization failed: {0}")]
    Lex(#[from] LexError),

    /// The transport failed; this one does end the session.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<SourceError> for ServiceError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Lex(lex) => ServiceError::Lex(lex),
            other => ServiceError::Rejected(other),
        }
    }
}

/// Tokenize the source text of one request.
pub fn handle_request(python: &str) -> Result<TokenizeReply, ServiceError> {
    let buffer = SourceBuffer::from_source(python)?;
    let tokens = buffer.iter().map(TokenRecord::from).collect();
    Ok(TokenizeReply { tokens })
}

/// Serve one session: read JSON requests line by line, answer each with a
/// reply or an error object. Malformed and failing requests get an error
/// reply and the loop continues; only transport errors end the session.
pub fn serve_stream<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<TokenizeRequest>(&line) {
            Ok(request) => match handle_request(&request.python) {
                Ok(reply) => serde_json::to_string(&reply),
                Err(ServiceError::Io(e)) => return Err(e),
                Err(e) => {
                    debug!("request failed: {e}");
                    serde_json::to_string(&ErrorReply {
                        error: e.to_string(),
                    })
                }
            },
            Err(e) => {
                debug!("malformed request line: {e}");
                serde_json::to_string(&ErrorReply {
                    error: format!("malformed request: {e}"),
                })
            }
        };
        let reply = reply.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writer.write_all(reply.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    Ok(())
}

/// A TCP tokenization service: one session per connection, served in
/// arrival order.
pub struct Service {
    listener: TcpListener,
    running: Arc<AtomicBool>,
}

/// A stop switch for a running [`Service`]. The accept loop checks it
/// between connections.
#[derive(Clone)]
pub struct ServiceHandle(Arc<AtomicBool>);

impl ServiceHandle {
    /// Ask the accept loop to exit after the current connection.
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Service {
    /// Bind the listener. The accept loop polls, so `run` can notice a
    /// `stop` even when nobody connects.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A handle that can stop the accept loop from another thread.
    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle(Arc::clone(&self.running))
    }

    /// Accept and serve connections until the handle says stop. A failed
    /// session is logged and the loop moves on to the next connection.
    pub fn run(self) -> io::Result<()> {
        info!("listening on {}", self.listener.local_addr()?);
        while self.running.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!("connection from {peer}");
                    stream.set_nonblocking(false)?;
                    let reader = BufReader::new(stream.try_clone()?);
                    if let Err(e) = serve_stream(reader, stream) {
                        warn!("session with {peer} ended abnormally: {e}");
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    warn!("accept failed: {e}");
                }
            }
        }
        info!("service stopped");
        Ok(())
    }
}
