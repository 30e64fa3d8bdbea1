use std::time::Duration;

use crate::canvas::{DiagramCanvas, PanZoomConfig, Size};
use crate::notification::NotificationLog;

pub const COPY_LABEL: &str = "Copy Plan";
pub const COPY_LABEL_COPIED: &str = "Copied!";
pub const COPY_LABEL_ERROR: &str = "Error";

/// User-triggered actions that share the processing guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    Process,
    ClearSelection,
    CopyPlan,
}

/// At most one guarded action is in flight. A second acquire while held fails
/// and the caller drops the triggering event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingGuard {
    held: Option<GuardedAction>,
}

impl ProcessingGuard {
    pub fn try_acquire(&mut self, action: GuardedAction) -> bool {
        if self.held.is_some() {
            return false;
        }
        self.held = Some(action);
        true
    }

    pub fn release(&mut self) -> Option<GuardedAction> {
        self.held.take()
    }

    pub fn held(&self) -> Option<GuardedAction> {
        self.held
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewerPhase {
    #[default]
    Idle,
    /// A process or clear-selection round trip is in flight.
    Processing(GuardedAction),
    Rendered,
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    pub pan_zoom: PanZoomConfig,
    pub copy_feedback_delay: Duration,
    pub container: Size,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            pan_zoom: PanZoomConfig::default(),
            copy_feedback_delay: Duration::from_secs(2),
            container: Size::new(1280.0, 720.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CopyControl {
    pub(crate) flash: Option<(u64, &'static str)>,
    pub(crate) flash_seq: u64,
}

impl CopyControl {
    pub(crate) fn label(&self) -> &'static str {
        self.flash.map(|(_, label)| label).unwrap_or(COPY_LABEL)
    }

    pub(crate) fn start_flash(&mut self, label: &'static str) -> u64 {
        self.flash_seq += 1;
        self.flash = Some((self.flash_seq, label));
        self.flash_seq
    }

    /// Restores the base label unless a newer flash replaced this one.
    pub(crate) fn expire(&mut self, flash: u64) -> bool {
        match self.flash {
            Some((current, _)) if current == flash => {
                self.flash = None;
                true
            }
            _ => false,
        }
    }
}

/// The viewer's state, owned by one controller for the page lifetime.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerController {
    pub(crate) settings: ViewerSettings,
    pub(crate) phase: ViewerPhase,
    pub(crate) guard: ProcessingGuard,
    pub(crate) busy: bool,
    pub(crate) notifications: NotificationLog,
    pub(crate) notifications_revealed: bool,
    pub(crate) canvas: DiagramCanvas,
    pub(crate) controls_revealed: bool,
    pub(crate) copy: CopyControl,
    dirty: bool,
}

impl ViewerController {
    pub fn new(settings: ViewerSettings) -> Self {
        let canvas = DiagramCanvas::new(settings.container);
        Self {
            settings,
            canvas,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> &ViewerPhase {
        &self.phase
    }

    pub fn guard(&self) -> ProcessingGuard {
        self.guard
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    pub fn canvas(&self) -> &DiagramCanvas {
        &self.canvas
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn copy_label(&self) -> &'static str {
        self.copy.label()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the view changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
