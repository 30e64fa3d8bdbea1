use planview_logging::{pv_debug, pv_error, pv_info, pv_warn};

use crate::{
    DiagramDocument, DiagramReply, Effect, Failure, GuardedAction, Msg, NodeId, Notification,
    Severity, Size, ViewerController, ViewerPhase, COPY_LABEL_COPIED, COPY_LABEL_ERROR,
};

/// Pure update function: applies a message to the controller and returns any effects.
pub fn update(mut state: ViewerController, msg: Msg) -> (ViewerController, Vec<Effect>) {
    let effects = match msg {
        Msg::Pasted(content) => begin_process(&mut state, content),
        Msg::ClearClicked => begin_clear_selection(&mut state),
        Msg::CopyClicked => begin_copy(&mut state),
        Msg::NodeClicked(node) => select_node(&state, node),
        Msg::ContainerResized { width, height } => {
            let ops = state
                .canvas
                .resize(Size::new(f64::from(width), f64::from(height)));
            if !ops.is_empty() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::WheelScrolled { notches, x, y } => {
            if state.canvas.is_visible() {
                if let Some(handle) = state.canvas.pan_zoom_mut() {
                    handle.zoom_at(notches, (f64::from(x), f64::from(y)));
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::Dragged { dx, dy } => {
            if state.canvas.is_visible() {
                if let Some(handle) = state.canvas.pan_zoom_mut() {
                    handle.pan_by(f64::from(dx), f64::from(dy));
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::DiagramReceived(reply) => settle_diagram(&mut state, Ok(reply)),
        Msg::DiagramFailed(failure) => settle_diagram(&mut state, Err(failure)),
        Msg::DescendantsResolved {
            generation,
            descendants,
        } => {
            if generation == state.canvas.generation() {
                state.canvas.apply_highlight(&descendants);
                state.mark_dirty();
            } else {
                pv_debug!(
                    "Dropping descendants for generation {} (current {})",
                    generation,
                    state.canvas.generation()
                );
            }
            Vec::new()
        }
        Msg::DescendantsFailed { node, reason, .. } => {
            pv_warn!("Descendant lookup for node {} failed: {}", node, reason);
            Vec::new()
        }
        Msg::CopyTextReady(text) => {
            if state.guard.held() == Some(GuardedAction::CopyPlan) {
                vec![Effect::WriteClipboard { text }]
            } else {
                pv_warn!("Copy text arrived with no copy in flight");
                Vec::new()
            }
        }
        Msg::CopyFinished(result) => settle_copy(&mut state, result),
        Msg::CopyLabelExpired { flash } => {
            if state.copy.expire(flash) {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn begin_process(state: &mut ViewerController, content: String) -> Vec<Effect> {
    if content.trim().is_empty() {
        pv_debug!("Ignoring empty paste");
        return Vec::new();
    }
    if !state.guard.try_acquire(GuardedAction::Process) {
        pv_debug!("Paste ignored while {:?} is in flight", state.guard.held());
        return Vec::new();
    }

    pv_info!("Processing pasted content ({} bytes)", content.len());
    state.busy = true;
    state.notifications.clear();
    // Hidden, not discarded: a failed re-process keeps the last document.
    state.canvas.set_visible(false);
    state.phase = ViewerPhase::Processing(GuardedAction::Process);
    state.mark_dirty();
    vec![Effect::Process { content }]
}

fn begin_clear_selection(state: &mut ViewerController) -> Vec<Effect> {
    if !state.controls_revealed {
        return Vec::new();
    }
    if !state.guard.try_acquire(GuardedAction::ClearSelection) {
        pv_debug!("Clear ignored while {:?} is in flight", state.guard.held());
        return Vec::new();
    }

    pv_info!("Clearing last selection");
    state.busy = true;
    state.phase = ViewerPhase::Processing(GuardedAction::ClearSelection);
    state.mark_dirty();
    vec![Effect::ClearSelection]
}

fn begin_copy(state: &mut ViewerController) -> Vec<Effect> {
    if !state.controls_revealed {
        return Vec::new();
    }
    if !state.guard.try_acquire(GuardedAction::CopyPlan) {
        pv_debug!("Copy ignored while {:?} is in flight", state.guard.held());
        return Vec::new();
    }
    // Controls render disabled while the guard is held.
    state.mark_dirty();
    vec![Effect::FetchCopyText]
}

fn select_node(state: &ViewerController, node: NodeId) -> Vec<Effect> {
    if !state.canvas.is_visible() {
        pv_debug!("Ignoring click on node {} with no visible diagram", node);
        return Vec::new();
    }
    let known = state
        .canvas
        .document()
        .is_some_and(|document| document.contains(&node));
    if !known {
        pv_debug!("Ignoring click on unknown node {}", node);
        return Vec::new();
    }
    vec![Effect::ResolveDescendants {
        generation: state.canvas.generation(),
        node,
    }]
}

fn settle_diagram(
    state: &mut ViewerController,
    outcome: Result<DiagramReply, Failure>,
) -> Vec<Effect> {
    let action = match state.guard.held() {
        Some(action @ (GuardedAction::Process | GuardedAction::ClearSelection)) => action,
        other => {
            pv_warn!("Dropping diagram response; guard holds {:?}", other);
            return Vec::new();
        }
    };

    let rendered = match outcome {
        Ok(reply) => install_reply(state, reply),
        Err(failure) => Err(absorb_failure(state, failure)),
    };
    if let Err(reason) = rendered {
        enter_failed(state, reason);
    }

    finish_operation(state);
    pv_info!("{:?} settled in phase {}", action, phase_name(&state.phase));
    Vec::new()
}

/// Runs on every settled guarded operation, whatever its outcome.
fn finish_operation(state: &mut ViewerController) {
    state.busy = false;
    state.guard.release();
    state.mark_dirty();
}

fn install_reply(state: &mut ViewerController, reply: DiagramReply) -> Result<(), String> {
    state.notifications.extend(reply.notifications);

    let document = DiagramDocument::from_base64(&reply.image).map_err(|err| {
        pv_error!("Diagram decode failed: {}", err);
        format!("could not decode the diagram ({err})")
    })?;
    let node_count = document.nodes().len();
    let ops = state.canvas.install(document, state.settings.pan_zoom);
    pv_debug!(
        "Installed diagram generation {} with {} nodes, viewport {:?}",
        state.canvas.generation(),
        node_count,
        ops
    );

    state.canvas.set_visible(true);
    state.notifications_revealed = true;
    state.controls_revealed = true;
    state.phase = ViewerPhase::Rendered;
    Ok(())
}

fn absorb_failure(state: &mut ViewerController, failure: Failure) -> String {
    match failure {
        Failure::Rejected {
            message,
            notifications,
        } => {
            let message = message.filter(|message| !message.trim().is_empty());
            if message.is_none() && notifications.is_empty() {
                // Nothing structured to show; report it like a transport failure.
                state.notifications.append(Notification::new(
                    Severity::Error,
                    "Request failed: Unknown error",
                ));
            }
            state.notifications.extend(notifications);
            message.unwrap_or_else(|| "Unknown error".to_string())
        }
        Failure::Transport { message } => {
            state.notifications.append(Notification::new(
                Severity::Error,
                format!("Request failed: {message}"),
            ));
            message
        }
    }
}

fn enter_failed(state: &mut ViewerController, reason: String) {
    pv_warn!("Diagram request failed: {}", reason);
    state.canvas.set_visible(false);
    if !state.notifications.is_empty() {
        state.notifications_revealed = true;
    }
    state.phase = ViewerPhase::Failed { message: reason };
}

fn settle_copy(state: &mut ViewerController, result: Result<(), String>) -> Vec<Effect> {
    if state.guard.held() != Some(GuardedAction::CopyPlan) {
        pv_warn!("Copy result arrived with no copy in flight");
        return Vec::new();
    }

    let label = match &result {
        Ok(()) => COPY_LABEL_COPIED,
        Err(reason) => {
            pv_warn!("Copy failed: {}", reason);
            COPY_LABEL_ERROR
        }
    };
    let flash = state.copy.start_flash(label);
    state.guard.release();
    state.mark_dirty();
    vec![Effect::RestoreCopyLabel {
        flash,
        after: state.settings.copy_feedback_delay,
    }]
}

fn phase_name(phase: &ViewerPhase) -> &'static str {
    match phase {
        ViewerPhase::Idle => "Idle",
        ViewerPhase::Processing(_) => "Processing",
        ViewerPhase::Rendered => "Rendered",
        ViewerPhase::Failed { .. } => "Failed",
    }
}
