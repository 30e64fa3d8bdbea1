use crate::{NodeId, Notification};

/// Body of a successful process or clear-selection response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramReply {
    /// Base64-encoded SVG markup.
    pub image: String,
    pub notifications: Vec<Notification>,
}

/// Why a process or clear-selection round trip failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Non-2xx status with whatever JSON body the server sent.
    Rejected {
        message: Option<String>,
        notifications: Vec<Notification>,
    },
    /// No structured payload: connection, timeout or unreadable body.
    Transport { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Text pasted onto the paste surface.
    Pasted(String),
    /// User clicked the copy control.
    CopyClicked,
    /// User clicked the clear-selection control.
    ClearClicked,
    /// User clicked a node of the rendered diagram.
    NodeClicked(NodeId),
    /// The diagram container changed size (pixels).
    ContainerResized { width: u32, height: u32 },
    /// Pointer wheel over the diagram; positive notches zoom in.
    WheelScrolled { notches: i32, x: i32, y: i32 },
    /// Drag over the diagram (pixels).
    Dragged { dx: i32, dy: i32 },
    /// Process or clear-selection answered with a diagram.
    DiagramReceived(DiagramReply),
    /// Process or clear-selection failed.
    DiagramFailed(Failure),
    /// Descendant query answered, for the document of `generation`.
    DescendantsResolved {
        generation: u64,
        descendants: Vec<NodeId>,
    },
    /// Descendant query failed.
    DescendantsFailed {
        generation: u64,
        node: NodeId,
        reason: String,
    },
    /// Export text for the copy action arrived.
    CopyTextReady(String),
    /// The copy action settled, successfully or not.
    CopyFinished(Result<(), String>),
    /// The feedback delay for a copy label flash ran out.
    CopyLabelExpired { flash: u64 },
}
