use std::sync::{mpsc, Arc};
use std::thread;

use ripper_logging::{ripper_debug, ripper_warn};

use crate::api::{ApiClient, ApiSettings, ReqwestApiClient};
use crate::{ApiError, EngineEvent, RequestId};

/// Receives engine completions. Called from the engine's runtime threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build api client: {0}")]
    Client(#[from] ApiError),
}

enum EngineCommand {
    Rip { request_id: RequestId, target: String },
    FetchCount,
}

/// Runs remote calls on a background Tokio runtime and reports each completion
/// to an [`EventSink`]. Calls are never cancelled or deduplicated.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let client = Arc::new(ReqwestApiClient::new(settings)?);
        Self::with_client(client, sink)
    }

    pub fn with_client(
        client: Arc<dyn ApiClient>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, sink.as_ref()).await;
                });
            }
            ripper_debug!("engine command channel closed");
        });

        Ok(Self { cmd_tx })
    }

    pub fn rip(&self, request_id: RequestId, target: impl Into<String>) {
        self.send(EngineCommand::Rip {
            request_id,
            target: target.into(),
        });
    }

    pub fn fetch_count(&self) {
        self.send(EngineCommand::FetchCount);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            ripper_warn!("engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(client: &dyn ApiClient, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Rip { request_id, target } => {
            let result = client.rip(&target).await;
            sink.emit(EngineEvent::RipCompleted { request_id, result });
        }
        EngineCommand::FetchCount => {
            let result = client.usage_count().await;
            sink.emit(EngineEvent::CountCompleted { result });
        }
    }
}
