use super::CallError;
use crate::CorrelationId;
use futures_util::Stream;
use square_service::pb::SquareStreamResponse;
use tonic::Streaming;
use tracing::{debug, warn};

/// The receiving half of an open streaming session.
pub struct SquareStream {
    id: CorrelationId,
    inbound: Streaming<SquareStreamResponse>,
    received: usize,
}

impl SquareStream {
    pub(crate) fn new(id: CorrelationId, inbound: Streaming<SquareStreamResponse>) -> Self {
        Self {
            id,
            inbound,
            received: 0,
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.id
    }

    /// Responses received so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Waits for the next squared number.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(number))` - The next response of this session.
    /// * `Ok(None)` - The server closed its send direction.
    /// * `Err(CallError::Status)` - The server or the transport failed the session.
    /// * `Err(CallError::CorrelationMismatch)` - A response carried another session's id.
    pub async fn message(&mut self) -> Result<Option<f64>, CallError> {
        let response = match self.inbound.message().await {
            Ok(Some(response)) => response,
            Ok(None) => {
                debug!(uid = %self.id, received = self.received, "stream ended");
                return Ok(None);
            }
            Err(status) => {
                warn!(
                    uid = %self.id,
                    code = ?status.code(),
                    error = %status.message(),
                    "stream failed"
                );
                return Err(status.into());
            }
        };

        if self.id.as_str() != response.uid {
            warn!(uid = %self.id, received_uid = %response.uid, "response for another session");
            return Err(CallError::CorrelationMismatch {
                expected: self.id.clone(),
                received: response.uid,
            });
        }

        self.received += 1;
        Ok(Some(response.number))
    }

    /// Turns the session into a `Stream` of squared numbers. The stream ends after the
    /// first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<f64, CallError>> {
        futures_util::stream::unfold(Some(self), |state| async move {
            let mut session = state?;
            match session.message().await {
                Ok(Some(number)) => Some((Ok(number), Some(session))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}
