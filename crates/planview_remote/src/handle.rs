use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use planview_logging::pv_error;

use crate::{DiagramCall, PlanService, RemoteError, RemoteEvent};

#[derive(Debug, Clone)]
enum RemoteCommand {
    Process { content: String },
    ClearSelection,
    Descendants { generation: u64, node: String },
    CopyText,
}

impl RemoteCommand {
    fn failed(self, error: RemoteError) -> RemoteEvent {
        match self {
            RemoteCommand::Process { .. } => RemoteEvent::Diagram {
                call: DiagramCall::Process,
                result: Err(error),
            },
            RemoteCommand::ClearSelection => RemoteEvent::Diagram {
                call: DiagramCall::ClearSelection,
                result: Err(error),
            },
            RemoteCommand::Descendants { generation, node } => RemoteEvent::Descendants {
                generation,
                node,
                result: Err(error),
            },
            RemoteCommand::CopyText => RemoteEvent::CopyText { result: Err(error) },
        }
    }
}

/// Receives one completion event per issued call.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RemoteEvent);
}

impl EventSink for mpsc::Sender<RemoteEvent> {
    fn emit(&self, event: RemoteEvent) {
        let _ = self.send(event);
    }
}

/// Non-blocking front to the remote calls. Calls run on a background tokio
/// runtime; every call posts exactly one event to the sink, even if the task
/// running it panics.
pub struct RemoteHandle {
    cmd_tx: mpsc::Sender<RemoteCommand>,
    sink: Arc<dyn EventSink>,
}

impl RemoteHandle {
    pub fn spawn(service: Arc<dyn PlanService>, sink: Arc<dyn EventSink>) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<RemoteCommand>();
        let worker_sink = sink.clone();

        thread::Builder::new()
            .name("planview-remote".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let service = service.clone();
                    let sink = worker_sink.clone();
                    runtime.spawn(async move {
                        let retained = command.clone();
                        let event = match tokio::spawn(execute(service, command)).await {
                            Ok(event) => event,
                            Err(err) => {
                                pv_error!("Remote call task failed: {}", err);
                                retained.failed(RemoteError::Network(format!(
                                    "remote call aborted: {err}"
                                )))
                            }
                        };
                        sink.emit(event);
                    });
                }
            })?;

        Ok(Self { cmd_tx, sink })
    }

    pub fn process(&self, content: impl Into<String>) {
        self.send(RemoteCommand::Process {
            content: content.into(),
        });
    }

    pub fn clear_selection(&self) {
        self.send(RemoteCommand::ClearSelection);
    }

    pub fn descendants(&self, generation: u64, node: impl Into<String>) {
        self.send(RemoteCommand::Descendants {
            generation,
            node: node.into(),
        });
    }

    pub fn copy_text(&self) {
        self.send(RemoteCommand::CopyText);
    }

    fn send(&self, command: RemoteCommand) {
        if let Err(mpsc::SendError(command)) = self.cmd_tx.send(command) {
            pv_error!("Remote worker is gone; failing {:?}", command);
            self.sink
                .emit(command.failed(RemoteError::Network("remote worker stopped".to_string())));
        }
    }
}

async fn execute(service: Arc<dyn PlanService>, command: RemoteCommand) -> RemoteEvent {
    match command {
        RemoteCommand::Process { content } => RemoteEvent::Diagram {
            call: DiagramCall::Process,
            result: service.process(&content).await,
        },
        RemoteCommand::ClearSelection => RemoteEvent::Diagram {
            call: DiagramCall::ClearSelection,
            result: service.clear_selection().await,
        },
        RemoteCommand::Descendants { generation, node } => {
            let result = service.descendants(&node).await;
            RemoteEvent::Descendants {
                generation,
                node,
                result,
            }
        }
        RemoteCommand::CopyText => RemoteEvent::CopyText {
            result: service.copy_text().await,
        },
    }
}
