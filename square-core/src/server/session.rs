//! # Responder Session
//!
//! Per-stream state owned by the task that answers one `SquareStream` call. Nothing
//! in here is shared between sessions.
//!
//! ```text
//!  Open ──message──▶ Active ──message──▶ Active
//!    │                  │
//!    └──end of input────┴──▶ Draining ──▶ Closed
//!
//!  any state ──fault──▶ Closed
//! ```
use crate::{CorrelationId, square};
use square_service::pb::{SquareStreamRequest, SquareStreamResponse};
use tonic::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Channel established, nothing received yet.
    Open,
    /// At least one message answered.
    Active,
    /// The peer half-closed; the outbound direction is being closed.
    Draining,
    /// Terminal.
    Closed,
}

#[derive(Debug)]
pub struct ResponderSession {
    state: SessionState,
    /// First correlation id seen on the stream, used as log context.
    correlation_id: Option<CorrelationId>,
    answered: u64,
}

impl ResponderSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Open,
            correlation_id: None,
            answered: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// Name used for this session in logs and error messages.
    pub fn label(&self) -> &str {
        self.correlation_id
            .as_ref()
            .map(CorrelationId::as_str)
            .unwrap_or("<unknown>")
    }

    /// Number of responses produced so far.
    pub fn answered(&self) -> u64 {
        self.answered
    }

    /// Squares one inbound message, echoing its `uid` unchanged.
    ///
    /// A message without a number or with a blank `uid` is rejected with
    /// `INVALID_ARGUMENT` and closes the session.
    pub fn respond(
        &mut self,
        request: SquareStreamRequest,
    ) -> Result<SquareStreamResponse, Status> {
        match self.state {
            SessionState::Open | SessionState::Active => {}
            SessionState::Draining | SessionState::Closed => {
                return Err(Status::failed_precondition(format!(
                    "stream '{}' is already closed",
                    self.label()
                )));
            }
        }

        if request.uid.trim().is_empty() {
            self.close();
            return Err(Status::invalid_argument(format!(
                "message #{} on stream '{}' has a blank 'uid'",
                self.answered + 1,
                self.label()
            )));
        }

        if self.correlation_id.is_none() {
            self.correlation_id = Some(CorrelationId::from(request.uid.as_str()));
        }

        let Some(number) = request.number else {
            self.close();
            return Err(Status::invalid_argument(format!(
                "message #{} on stream '{}' is missing field 'number'",
                self.answered + 1,
                request.uid
            )));
        };

        self.state = SessionState::Active;
        self.answered += 1;

        Ok(SquareStreamResponse {
            number: square(number),
            uid: request.uid,
        })
    }

    /// The peer closed its send direction.
    pub fn drain(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Draining;
        }
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

impl Default for ResponderSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    fn request(number: Option<f64>, uid: &str) -> SquareStreamRequest {
        SquareStreamRequest {
            number,
            uid: uid.to_string(),
        }
    }

    #[test]
    fn answers_each_message_with_its_own_uid() {
        let mut session = ResponderSession::new();
        assert_eq!(session.state(), SessionState::Open);

        let first = session.respond(request(Some(3.0), "abc")).unwrap();
        assert_eq!(first.number, 9.0);
        assert_eq!(first.uid, "abc");
        assert_eq!(session.state(), SessionState::Active);

        let second = session.respond(request(Some(-4.0), "abc")).unwrap();
        assert_eq!(second.number, 16.0);
        assert_eq!(session.answered(), 2);
        assert_eq!(session.correlation_id(), Some(&CorrelationId::from("abc")));
    }

    #[test]
    fn never_rewrites_a_uid_that_differs_from_the_first_one() {
        let mut session = ResponderSession::new();
        session.respond(request(Some(1.0), "first")).unwrap();

        let response = session.respond(request(Some(2.0), "second")).unwrap();

        assert_eq!(response.uid, "second");
        assert_eq!(session.label(), "first");
    }

    #[test]
    fn missing_number_is_rejected_and_closes_the_session() {
        let mut session = ResponderSession::new();

        let status = session.respond(request(None, "abc")).unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("abc"));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn empty_uid_is_rejected() {
        let mut session = ResponderSession::new();

        let status = session.respond(request(Some(1.0), "")).unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn whitespace_only_uid_is_rejected() {
        let mut session = ResponderSession::new();

        let status = session.respond(request(Some(1.0), "  \t")).unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn drained_session_refuses_further_messages() {
        let mut session = ResponderSession::new();
        session.respond(request(Some(1.0), "abc")).unwrap();
        session.drain();
        assert_eq!(session.state(), SessionState::Draining);

        let status = session.respond(request(Some(2.0), "abc")).unwrap_err();
        assert_eq!(status.code(), Code::FailedPrecondition);

        session.close();
        session.drain();
        assert_eq!(session.state(), SessionState::Closed);
    }
}
