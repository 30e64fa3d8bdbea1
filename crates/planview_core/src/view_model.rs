use crate::{
    NodeId, Severity, Size, ViewerController, ViewerPhase, ViewportTransform,
};

/// Full description of what the viewer shows; a pure function of the controller.
///
/// `None` for an optional part means that part is hidden.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerView {
    pub phase: ViewerPhase,
    pub busy: bool,
    pub paste_surface: Option<PasteSurfaceView>,
    pub diagram: Option<DiagramView>,
    pub notifications: Option<Vec<NotificationRow>>,
    pub copy_button: Option<ButtonView>,
    pub clear_button: Option<ButtonView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteSurfaceView {
    pub prompt: String,
    /// Inline failure message shown in place of the prompt.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramView {
    pub markup: String,
    /// Pixel size of the document root.
    pub root_size: Size,
    /// Intrinsic size of the drawing, from its viewBox.
    pub content_size: Size,
    pub transform: Option<ViewportTransform>,
    pub nodes: Vec<NodeView>,
}

/// One click target, with its emphasis if a highlight is active.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub node: NodeId,
    pub element_id: Option<String>,
    pub opacity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRow {
    pub severity: Severity,
    pub class: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
}

pub const PASTE_PROMPT: &str = "Paste your spreadsheet content here";

impl ViewerController {
    pub fn view(&self) -> ViewerView {
        let paste_surface = match &self.phase {
            ViewerPhase::Idle => Some(PasteSurfaceView {
                prompt: PASTE_PROMPT.to_string(),
                error: None,
            }),
            ViewerPhase::Failed { message } => Some(PasteSurfaceView {
                prompt: PASTE_PROMPT.to_string(),
                error: Some(format!("Failed to load the image: {message}")),
            }),
            ViewerPhase::Processing(_) | ViewerPhase::Rendered => None,
        };

        let notifications = self.notifications_revealed.then(|| {
            self.notifications
                .entries()
                .iter()
                .map(|entry| NotificationRow {
                    severity: entry.severity,
                    class: entry.severity.display_class(),
                    message: entry.message.clone(),
                })
                .collect()
        });

        let enabled = !self.guard.is_held();
        let copy_button = self.controls_revealed.then(|| ButtonView {
            label: self.copy.label().to_string(),
            enabled,
        });
        let clear_button = self.controls_revealed.then(|| ButtonView {
            label: "Clear Selection".to_string(),
            enabled,
        });

        ViewerView {
            phase: self.phase.clone(),
            busy: self.busy,
            paste_surface,
            diagram: self.diagram_view(),
            notifications,
            copy_button,
            clear_button,
        }
    }

    fn diagram_view(&self) -> Option<DiagramView> {
        if !self.canvas.is_visible() {
            return None;
        }
        let document = self.canvas.document()?;
        let nodes = document
            .nodes()
            .iter()
            .map(|group| NodeView {
                node: group.node.clone(),
                element_id: group.element_id.clone(),
                opacity: self.canvas.opacity_of(&group.node),
            })
            .collect();

        Some(DiagramView {
            markup: document.markup().to_string(),
            root_size: self.canvas.root_size().unwrap_or(self.canvas.container()),
            content_size: document.content_size(),
            transform: self.canvas.pan_zoom().map(|handle| handle.transform()),
            nodes,
        })
    }
}
