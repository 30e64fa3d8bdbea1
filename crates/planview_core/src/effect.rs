use std::time::Duration;

use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST `/process` with the pasted text.
    Process { content: String },
    /// POST `/clear-last-selected`.
    ClearSelection,
    /// POST `/get-descendants`; the answer is tagged with `generation`.
    ResolveDescendants { generation: u64, node: NodeId },
    /// GET `/get-copy-text`.
    FetchCopyText,
    /// Write the export text to the clipboard.
    WriteClipboard { text: String },
    /// Post `Msg::CopyLabelExpired { flash }` after `after`.
    RestoreCopyLabel { flash: u64, after: Duration },
}
