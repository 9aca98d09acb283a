use super::session::ResponderSession;
use crate::square;
use square_service::SquareService;
use square_service::pb::{
    SquareRequest, SquareResponse, SquareStreamRequest, SquareStreamResponse,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, info, warn};

/// Default capacity of the per-session outbound queue.
pub const DEFAULT_RESPONSE_BUFFER: usize = 16;

/// The `SquareService` implementation.
///
/// Stateless across calls: every stream gets its own [`ResponderSession`] living in
/// the task spawned for it.
#[derive(Debug, Clone)]
pub struct SquareResponder {
    response_buffer: usize,
}

impl SquareResponder {
    pub fn new() -> Self {
        Self {
            response_buffer: DEFAULT_RESPONSE_BUFFER,
        }
    }

    /// Sets how many squared responses a session may queue for a slow peer before it
    /// stops reading inbound messages. Clamped to at least 1.
    pub fn with_response_buffer(mut self, capacity: usize) -> Self {
        self.response_buffer = capacity.max(1);
        self
    }
}

impl Default for SquareResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[tonic::async_trait]
impl SquareService for SquareResponder {
    type SquareStreamStream = ReceiverStream<Result<SquareStreamResponse, Status>>;

    async fn square(
        &self,
        request: Request<SquareRequest>,
    ) -> Result<Response<SquareResponse>, Status> {
        let Some(number) = request.into_inner().number else {
            warn!("rejecting square request without a number");
            return Err(Status::invalid_argument("missing field 'number'"));
        };

        let squared = square(number);
        debug!(number, squared, "square");

        Ok(Response::new(SquareResponse { number: squared }))
    }

    async fn square_stream(
        &self,
        request: Request<Streaming<SquareStreamRequest>>,
    ) -> Result<Response<Self::SquareStreamStream>, Status> {
        let inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(self.response_buffer);

        tokio::spawn(run_session(inbound, tx));

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// Answers one stream until the peer half-closes or the session faults.
///
/// Dropping `tx` on return closes the outbound direction.
async fn run_session(
    mut inbound: Streaming<SquareStreamRequest>,
    tx: mpsc::Sender<Result<SquareStreamResponse, Status>>,
) {
    let mut session = ResponderSession::new();

    loop {
        match inbound.message().await {
            Ok(Some(request)) => {
                let number = request.number;
                match session.respond(request) {
                    Ok(response) => {
                        debug!(
                            uid = %response.uid,
                            ?number,
                            squared = response.number,
                            "stream message"
                        );
                        if tx.send(Ok(response)).await.is_err() {
                            info!(uid = session.label(), "peer dropped stream before it ended");
                            session.close();
                            break;
                        }
                    }
                    Err(status) => {
                        warn!(
                            uid = session.label(),
                            error = %status.message(),
                            "rejecting stream message"
                        );
                        if tx.send(Err(status)).await.is_err() {
                            debug!(uid = session.label(), "peer gone before rejection was sent");
                        }
                        break;
                    }
                }
            }
            Ok(None) => {
                session.drain();
                info!(
                    uid = session.label(),
                    answered = session.answered(),
                    "stream ended"
                );
                session.close();
                break;
            }
            Err(status) => {
                warn!(
                    uid = session.label(),
                    code = ?status.code(),
                    error = %status.message(),
                    "stream failed"
                );
                session.close();
                if tx.send(Err(status)).await.is_err() {
                    debug!(uid = session.label(), "peer gone before failure was sent");
                }
                break;
            }
        }
    }
}
