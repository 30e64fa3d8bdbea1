//! Planview remote: the four server calls and the runtime that executes them.
mod client;
mod handle;
mod types;

pub use client::{PlanService, RemoteSettings, ReqwestPlanService};
pub use handle::{EventSink, RemoteHandle};
pub use types::{
    CopyTextPayload, DescendantsPayload, DiagramCall, DiagramPayload, NodeToken, RejectionPayload,
    RemoteError, RemoteEvent, WireNotification,
};
