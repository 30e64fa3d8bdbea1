use std::sync::{mpsc, Arc};
use std::thread;

use planview_core::{DiagramReply, Effect, Failure, Msg, NodeId, Notification, Severity};
use planview_logging::{pv_info, pv_warn};
use planview_remote::{EventSink, RemoteError, RemoteEvent, RemoteHandle, WireNotification};

use super::app::Inbound;
use super::clipboard::{export_text, ClipboardHost};

/// Carries out the effects `update` asks for and feeds their outcomes back
/// into the loop as messages.
pub struct EffectRunner {
    remote: RemoteHandle,
    clipboard: Box<dyn ClipboardHost>,
    inbound: mpsc::Sender<Inbound>,
}

impl EffectRunner {
    pub fn new(
        remote: RemoteHandle,
        clipboard: Box<dyn ClipboardHost>,
        inbound: mpsc::Sender<Inbound>,
    ) -> Self {
        Self {
            remote,
            clipboard,
            inbound,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Process { content } => {
                    pv_info!("Process content_len={}", content.len());
                    self.remote.process(content);
                }
                Effect::ClearSelection => {
                    self.remote.clear_selection();
                }
                Effect::ResolveDescendants { generation, node } => {
                    self.remote.descendants(generation, node.as_str());
                }
                Effect::FetchCopyText => {
                    self.remote.copy_text();
                }
                Effect::WriteClipboard { text } => {
                    let result = match export_text(self.clipboard.as_mut(), &text) {
                        Ok(path) => {
                            pv_info!("Copied {} bytes via {:?}", text.len(), path);
                            Ok(())
                        }
                        Err(err) => {
                            pv_warn!("Clipboard export failed: {}", err);
                            Err(err.to_string())
                        }
                    };
                    let _ = self.inbound.send(Inbound::Msg(Msg::CopyFinished(result)));
                }
                Effect::RestoreCopyLabel { flash, after } => {
                    let inbound = self.inbound.clone();
                    thread::spawn(move || {
                        thread::sleep(after);
                        let _ = inbound.send(Inbound::Msg(Msg::CopyLabelExpired { flash }));
                    });
                }
            }
        }
    }
}

/// Turns remote completions into loop messages.
pub struct MsgSink {
    inbound: mpsc::Sender<Inbound>,
}

impl MsgSink {
    pub fn new(inbound: mpsc::Sender<Inbound>) -> Arc<Self> {
        Arc::new(Self { inbound })
    }
}

impl EventSink for MsgSink {
    fn emit(&self, event: RemoteEvent) {
        let _ = self.inbound.send(Inbound::Msg(map_event(event)));
    }
}

fn map_event(event: RemoteEvent) -> Msg {
    match event {
        RemoteEvent::Diagram { call, result } => match result {
            Ok(payload) => {
                pv_info!("{:?} answered with {} notifications", call, payload.notifications.len());
                Msg::DiagramReceived(DiagramReply {
                    image: payload.image,
                    notifications: map_notifications(payload.notifications),
                })
            }
            Err(err) => {
                pv_warn!("{:?} failed: {}", call, err);
                Msg::DiagramFailed(map_failure(err))
            }
        },
        RemoteEvent::Descendants {
            generation,
            node,
            result,
        } => match result {
            Ok(tokens) => Msg::DescendantsResolved {
                generation,
                descendants: tokens.into_iter().map(NodeId::new).collect(),
            },
            Err(err) => Msg::DescendantsFailed {
                generation,
                node: NodeId::new(node),
                reason: err.to_string(),
            },
        },
        RemoteEvent::CopyText { result } => match result {
            Ok(text) => Msg::CopyTextReady(text),
            Err(err) => {
                pv_warn!("Fetching copy text failed: {}", err);
                Msg::CopyFinished(Err(err.to_string()))
            }
        },
    }
}

fn map_failure(err: RemoteError) -> Failure {
    match err {
        RemoteError::Rejected { payload, .. }
            if payload.message.is_some() || !payload.notifications.is_empty() =>
        {
            Failure::Rejected {
                message: payload.message,
                notifications: map_notifications(payload.notifications),
            }
        }
        // Unstructured error bodies (proxy pages and the like) keep only the status.
        other => Failure::Transport {
            message: other.to_string(),
        },
    }
}

fn map_notifications(wire: Vec<WireNotification>) -> Vec<Notification> {
    wire.into_iter()
        .map(|entry| Notification::new(Severity::from_label(&entry.severity), entry.message))
        .collect()
}
