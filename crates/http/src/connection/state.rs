use std::fmt;

/// Where a connection is in its request/response cycle.
///
/// `AwaitingRequest → ParsingRequest → Dispatching → WritingResponse` and back
/// to `AwaitingRequest` for keep-alive; `Closed` is terminal and reachable from
/// every other state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    AwaitingRequest,
    ParsingRequest,
    Dispatching,
    WritingResponse,
    Closed,
}

impl ConnectionState {
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::AwaitingRequest => "awaiting_request",
            ConnectionState::ParsingRequest => "parsing_request",
            ConnectionState::Dispatching => "dispatching",
            ConnectionState::WritingResponse => "writing_response",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
