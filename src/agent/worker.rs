// ABOUTME: Background generation worker — a single task draining a bounded request queue.
// ABOUTME: Calls the model one request at a time and sends each outcome back over a channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::agent::provider::{GenerateResponse, GenerationError, GenerativeModel};

/// Capacity of the request queue feeding the worker.
pub const REQUEST_QUEUE_DEPTH: usize = 4;

/// A prompt handed to the worker.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub id: u64,
    pub prompt: String,
}

/// The worker's answer to one request.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub id: u64,
    pub result: Result<GenerateResponse, GenerationError>,
}

/// Why a request could not be handed to the worker.
#[derive(Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// The request queue is full.
    Full,
    /// The worker has shut down.
    Closed,
}

/// Handle to the running worker task.
pub struct GenerationWorker {
    request_tx: Option<mpsc::Sender<GenerationRequest>>,
    outcome_rx: mpsc::Receiver<GenerationOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl GenerationWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(model: Arc<dyn GenerativeModel>) -> Self {
        let (request_tx, request_rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let (outcome_tx, outcome_rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let handle = tokio::spawn(run_worker(model, request_rx, outcome_tx));
        Self {
            request_tx: Some(request_tx),
            outcome_rx,
            handle: Some(handle),
        }
    }

    /// Queue a request without waiting.
    pub fn dispatch(&self, request: GenerationRequest) -> Result<(), DispatchError> {
        let Some(tx) = &self.request_tx else {
            return Err(DispatchError::Closed);
        };
        tx.try_send(request).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Wait for the next outcome. `None` once the worker has stopped and all
    /// outcomes were received. Cancel-safe.
    pub async fn recv(&mut self) -> Option<GenerationOutcome> {
        self.outcome_rx.recv().await
    }

    /// Close the request queue and wait for the worker to finish the request
    /// it is running, if any.
    pub async fn shutdown(&mut self) {
        self.request_tx.take();
        // Unblock a worker waiting to deliver an outcome nobody will read.
        self.outcome_rx.close();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

async fn run_worker(
    model: Arc<dyn GenerativeModel>,
    mut requests: mpsc::Receiver<GenerationRequest>,
    outcomes: mpsc::Sender<GenerationOutcome>,
) {
    info!(model = model.model_name(), "generation worker started");
    while let Some(request) = requests.recv().await {
        debug!(id = request.id, "generation request started");
        let result = model.generate(&request.prompt).await;
        let outcome = GenerationOutcome {
            id: request.id,
            result,
        };
        if outcomes.send(outcome).await.is_err() {
            break;
        }
    }
    info!("generation worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Replies with the prompt reversed.
    struct Reverser;

    #[async_trait]
    impl GenerativeModel for Reverser {
        fn model_name(&self) -> &str {
            "reverser"
        }

        async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerationError> {
            Ok(GenerateResponse::text(prompt.chars().rev().collect::<String>()))
        }
    }

    fn request(id: u64, prompt: &str) -> GenerationRequest {
        GenerationRequest {
            id,
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn outcomes_arrive_in_submission_order() {
        let mut worker = GenerationWorker::spawn(Arc::new(Reverser));
        worker.dispatch(request(1, "abc")).unwrap();
        worker.dispatch(request(2, "xyz")).unwrap();

        let first = worker.recv().await.unwrap();
        let second = worker.recv().await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.result.unwrap().text.as_deref(), Some("cba"));
        assert_eq!(second.id, 2);
        assert_eq!(second.result.unwrap().text.as_deref(), Some("zyx"));

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn dispatch_after_shutdown_is_closed() {
        let mut worker = GenerationWorker::spawn(Arc::new(Reverser));
        worker.shutdown().await;
        assert_eq!(worker.dispatch(request(1, "late")), Err(DispatchError::Closed));
        assert!(worker.recv().await.is_none());
    }
}
