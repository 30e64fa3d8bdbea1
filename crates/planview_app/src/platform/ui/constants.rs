pub const PAGE_TITLE: &str = "Plan Viewer";

pub const PASTE_AREA: &str = "pasteArea";
pub const PASTE_ERROR: &str = "pasteError";
pub const SPINNER: &str = "spinner";
pub const DIAGRAM_CONTAINER: &str = "svgContainer";
pub const DIAGRAM_VIEWPORT: &str = "svgViewport";
pub const NOTIFICATIONS_PANEL: &str = "notifications";
pub const BUTTON_COPY: &str = "copyPlanButton";
pub const BUTTON_CLEAR: &str = "clearSelectionButton";
pub const STATUS_FOOTER: &str = "status";
