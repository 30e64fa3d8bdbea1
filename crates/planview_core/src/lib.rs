//! Planview core: the viewer state machine, its components, and the view model.
mod canvas;
mod document;
mod effect;
mod msg;
mod notification;
mod state;
mod update;
mod view_model;

pub use canvas::{
    DiagramCanvas, PanZoomConfig, PanZoomHandle, Size, ViewportOp, ViewportTransform,
    DIMMED_OPACITY, FULL_OPACITY,
};
pub use document::{DecodeError, DiagramDocument, NodeGroup, NodeId};
pub use effect::Effect;
pub use msg::{DiagramReply, Failure, Msg};
pub use notification::{Notification, NotificationLog, Severity};
pub use state::{
    GuardedAction, ProcessingGuard, ViewerController, ViewerPhase, ViewerSettings,
    COPY_LABEL, COPY_LABEL_COPIED, COPY_LABEL_ERROR,
};
pub use update::update;
pub use view_model::{
    ButtonView, DiagramView, NodeView, NotificationRow, PasteSurfaceView, ViewerView, PASTE_PROMPT,
};
