use square_service::SquareService;
use square_service::pb::{
    SquareRequest, SquareResponse, SquareStreamRequest, SquareStreamResponse,
};
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};

// A broken server that answers every stream message under someone else's uid.
pub struct MislabelingService;

#[tonic::async_trait]
impl SquareService for MislabelingService {
    type SquareStreamStream = ReceiverStream<Result<SquareStreamResponse, Status>>;

    async fn square(
        &self,
        _req: Request<SquareRequest>,
    ) -> Result<Response<SquareResponse>, Status> {
        unimplemented!("This will never be used")
    }

    async fn square_stream(
        &self,
        request: Request<Streaming<SquareStreamRequest>>,
    ) -> Result<Response<Self::SquareStreamStream>, Status> {
        let mut in_stream = request.into_inner();
        let (tx, rx) = mpsc::channel(4);

        tokio::spawn(async move {
            while let Some(Ok(req)) = in_stream.next().await {
                let resp = SquareStreamResponse {
                    number: req.number.unwrap_or_default(),
                    uid: "someone-else".to_string(),
                };
                if tx.send(Ok(resp)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}
