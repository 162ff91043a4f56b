//! The single in-flight generation request.
//!
//! A request runs on a tokio task so the terminal keeps redrawing. Its one
//! result comes back over a oneshot channel that [`App::tick`](crate::App::tick)
//! polls once per frame.

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use groflow_core::PromptKind;
use groflow_providers::{GeminiClient, GenerationError};
use groflow_types::ApiKey;

use crate::ActionError;

pub(crate) type GenerationResult = Result<String, GenerationError>;

#[derive(Debug)]
pub(crate) struct PendingGeneration {
    kind: PromptKind,
    started_tick: usize,
    receiver: oneshot::Receiver<GenerationResult>,
}

pub(crate) enum GenerationPoll {
    Pending,
    Finished(GenerationResult),
    /// The task ended without sending a result.
    Lost,
}

impl PendingGeneration {
    pub(crate) fn spawn(
        kind: PromptKind,
        client: GeminiClient,
        prompt: String,
        key: ApiKey,
        tick: usize,
    ) -> Result<Self, ActionError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ActionError::NoRuntime)?;
        let model = client.model().to_string();
        let (tx, rx) = oneshot::channel();
        runtime.spawn(async move {
            let result = client.generate(&prompt, &key).await;
            // The receiver is gone if the app quit first.
            let _ = tx.send(result);
        });
        tracing::info!(kind = %kind, %model, "Generation started");
        Ok(Self {
            kind,
            started_tick: tick,
            receiver: rx,
        })
    }

    pub(crate) fn kind(&self) -> PromptKind {
        self.kind
    }

    pub(crate) fn started_tick(&self) -> usize {
        self.started_tick
    }

    pub(crate) fn poll(&mut self) -> GenerationPoll {
        match self.receiver.try_recv() {
            Ok(result) => GenerationPoll::Finished(result),
            Err(TryRecvError::Empty) => GenerationPoll::Pending,
            Err(TryRecvError::Closed) => GenerationPoll::Lost,
        }
    }
}
