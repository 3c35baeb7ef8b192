use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use bytes::BytesMut;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{debug, error, trace};

use crate::codec::{ParseStatus, RequestParser, ResponseEncoder};
use crate::connection::{ConnectionSlot, ConnectionState};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, RequestHeader, Response, SendError};
use crate::panic_message;
use crate::scheduler::SchedulerHandle;

pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 4 * 1024;

/// One accepted connection and everything it owns.
///
/// The connection is driven by a single reactor task started with
/// [`HttpConnection::start`]. That task is its only owner: when the state
/// machine reaches [`ConnectionState::Closed`] the task ends, the connection is
/// dropped and its [`ConnectionSlot`] is released.
///
/// # Type Parameters
///
/// * `S`: the byte stream, a `TcpStream` in production
/// * `H`: the request handler
pub struct HttpConnection<S, H: ?Sized> {
    stream: S,
    handler: Rc<H>,
    scheduler: SchedulerHandle,
    slot: ConnectionSlot,
    state: ConnectionState,
    read_buf: BytesMut,
    read_buffer_size: usize,
    write_buf: BytesMut,
    parser: RequestParser,
    encoder: ResponseEncoder,
    keep_alive: bool,
}

impl<S, H: ?Sized> std::fmt::Debug for HttpConnection<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection")
            .field("id", &self.slot.id())
            .field("state", &self.state)
            .field("buffered", &self.read_buf.len())
            .field("keep_alive", &self.keep_alive)
            .finish_non_exhaustive()
    }
}

impl<S, H> HttpConnection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin + 'static,
    H: Handler + ?Sized + 'static,
{
    pub fn new(stream: S, handler: Rc<H>, scheduler: SchedulerHandle, slot: ConnectionSlot) -> Self {
        Self::with_capacity(stream, handler, scheduler, slot, DEFAULT_READ_BUFFER_SIZE, DEFAULT_WRITE_BUFFER_SIZE)
    }

    pub fn with_capacity(
        stream: S,
        handler: Rc<H>,
        scheduler: SchedulerHandle,
        slot: ConnectionSlot,
        read_buffer_size: usize,
        write_buffer_size: usize,
    ) -> Self {
        let read_buffer_size = read_buffer_size.max(1);
        Self {
            stream,
            handler,
            scheduler,
            slot,
            state: ConnectionState::AwaitingRequest,
            read_buf: BytesMut::with_capacity(read_buffer_size),
            read_buffer_size,
            write_buf: BytesMut::with_capacity(write_buffer_size),
            parser: RequestParser::new(),
            encoder: ResponseEncoder::new(),
            keep_alive: true,
        }
    }

    /// Hands the connection over to the reactor.
    ///
    /// The caller keeps no reference; the connection lives until it closes.
    pub fn start(self) {
        let scheduler = self.scheduler.clone();
        scheduler.spawn(self.process());
    }

    /// Runs the state machine until the connection is closed.
    pub async fn process(mut self) {
        let id = self.slot.id();
        debug!(%id, "connection started");

        loop {
            self.slot.set_state(self.state);
            trace!(%id, state = %self.state, "connection state");

            let next = match self.state {
                ConnectionState::AwaitingRequest => self.await_request().await.map_err(HttpError::from),
                ConnectionState::ParsingRequest => Ok(self.parse_request()),
                ConnectionState::Dispatching => match self.dispatch() {
                    Ok(next) => {
                        // the write runs on a later reactor turn, once this parse pass has unwound
                        self.scheduler.defer().await;
                        Ok(next)
                    }
                    Err(e) => Err(e.into()),
                },
                ConnectionState::WritingResponse => self.write_response().await.map_err(HttpError::from),
                ConnectionState::Closed => break,
            };

            self.state = next.unwrap_or_else(|e| {
                debug!(%id, cause = %e, "connection error");
                ConnectionState::Closed
            });
        }

        debug!(%id, "connection closed");
    }

    async fn await_request(&mut self) -> Result<ConnectionState, ParseError> {
        if self.read_buf.capacity() == self.read_buf.len() {
            self.read_buf.reserve(self.read_buffer_size);
        }

        match self.stream.read_buf(&mut self.read_buf).await.map_err(ParseError::io)? {
            0 => {
                debug!(id = %self.slot.id(), "peer closed the connection");
                Ok(ConnectionState::Closed)
            }
            n => {
                trace!(id = %self.slot.id(), bytes = n, buffered = self.read_buf.len(), "read request bytes");
                Ok(ConnectionState::ParsingRequest)
            }
        }
    }

    fn parse_request(&mut self) -> ConnectionState {
        let mut completed: Option<RequestHeader> = None;

        match self.parser.execute(&mut self.read_buf, |header| completed = Some(header)) {
            Ok(ParseStatus::Complete) => {
                if let Some(header) = completed {
                    trace!(id = %self.slot.id(), method = %header.method(), uri = %header.uri(), "request complete");
                }
                ConnectionState::Dispatching
            }
            Ok(ParseStatus::Partial) => ConnectionState::AwaitingRequest,
            Err(e) => {
                debug!(id = %self.slot.id(), cause = %e, discarded = self.read_buf.len(), "discard unparseable request bytes");
                self.read_buf.clear();
                ConnectionState::AwaitingRequest
            }
        }
    }

    fn dispatch(&mut self) -> Result<ConnectionState, SendError> {
        let mut response = Response::new();
        let handler = &self.handler;

        match panic::catch_unwind(AssertUnwindSafe(|| handler.call(&mut response))) {
            Ok(()) => self.encoder.encode(&response, &mut self.write_buf)?,
            Err(cause) => {
                error!(id = %self.slot.id(), cause = panic_message(cause.as_ref()), "handler panicked, answering 500 and closing");
                self.keep_alive = false;
                self.encoder.encode_status(StatusCode::INTERNAL_SERVER_ERROR, &mut self.write_buf)?;
            }
        }

        Ok(ConnectionState::WritingResponse)
    }

    async fn write_response(&mut self) -> Result<ConnectionState, SendError> {
        self.stream.write_all(&self.write_buf).await?;
        self.stream.flush().await?;
        trace!(id = %self.slot.id(), bytes = self.write_buf.len(), "response written");
        self.write_buf.clear();

        if !self.keep_alive {
            self.stream.shutdown().await?;
            return Ok(ConnectionState::Closed);
        }

        // a following request may already be buffered
        if self.read_buf.is_empty() { Ok(ConnectionState::AwaitingRequest) } else { Ok(ConnectionState::ParsingRequest) }
    }
}
