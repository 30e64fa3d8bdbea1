use chrono::{DateTime, Local};
use planview_core::{
    ButtonView, DiagramView, NotificationRow, PasteSurfaceView, ViewerPhase, ViewerView,
    FULL_OPACITY,
};

use super::constants::*;
use super::layout;

/// Renders the whole page for `view`. Every visible region is rebuilt; hidden
/// regions are simply absent.
pub fn render_page(view: &ViewerView, rendered_at: DateTime<Local>) -> String {
    let mut body = String::new();

    let mut buttons = String::new();
    if let Some(button) = &view.copy_button {
        buttons.push_str(&render_button(BUTTON_COPY, button));
    }
    if let Some(button) = &view.clear_button {
        buttons.push_str(&render_button(BUTTON_CLEAR, button));
    }
    body.push_str(&layout::toolbar(&buttons));

    if let Some(surface) = &view.paste_surface {
        body.push_str(&render_paste_surface(surface));
    }
    if view.busy {
        body.push_str(&format!("<div id=\"{SPINNER}\" class=\"spinner\"></div>\n"));
    }

    let mut node_styles = String::new();
    if let Some(diagram) = &view.diagram {
        body.push_str(&render_diagram(diagram));
        node_styles = render_node_styles(diagram);
    }

    if let Some(rows) = &view.notifications {
        body.push_str(&render_notifications(rows));
    }

    body.push_str(&layout::footer(&format!(
        "{} &middot; rendered {}",
        escape_html(&status_line(view)),
        rendered_at.format("%Y-%m-%d %H:%M:%S")
    )));

    layout::page(&node_styles, &body)
}

/// One-line summary of the view, echoed on stdout after each render.
pub fn status_line(view: &ViewerView) -> String {
    let phase = match &view.phase {
        ViewerPhase::Idle => "idle".to_string(),
        ViewerPhase::Processing(action) => format!("processing ({action:?})"),
        ViewerPhase::Rendered => "rendered".to_string(),
        ViewerPhase::Failed { message } => format!("failed: {message}"),
    };
    let mut parts = vec![phase];

    if let Some(diagram) = &view.diagram {
        let highlighted = diagram
            .nodes
            .iter()
            .filter(|node| node.opacity == Some(FULL_OPACITY))
            .count();
        let mut summary = format!("{} nodes", diagram.nodes.len());
        if diagram.nodes.iter().any(|node| node.opacity.is_some()) {
            summary.push_str(&format!(", {highlighted} highlighted"));
        }
        if let Some(transform) = diagram.transform {
            summary.push_str(&format!(", scale {:.3}", transform.scale));
        }
        parts.push(summary);
    }
    if let Some(rows) = &view.notifications {
        parts.push(format!("{} notifications", rows.len()));
    }
    if let Some(button) = &view.copy_button {
        parts.push(format!("[{}]", button.label));
    }
    parts.join(" | ")
}

fn render_button(id: &str, button: &ButtonView) -> String {
    let disabled = if button.enabled { "" } else { " disabled" };
    format!(
        "<button id=\"{id}\"{disabled}>{}</button>",
        escape_html(&button.label)
    )
}

fn render_paste_surface(surface: &PasteSurfaceView) -> String {
    let mut html = format!(
        "<div id=\"{PASTE_AREA}\" class=\"paste-area\">{}",
        escape_html(&surface.prompt)
    );
    if let Some(error) = &surface.error {
        html.push_str(&format!(
            "<div id=\"{PASTE_ERROR}\" class=\"paste-error\">{}</div>",
            escape_html(error)
        ));
    }
    html.push_str("</div>\n");
    html
}

fn render_diagram(diagram: &DiagramView) -> String {
    let transform = diagram
        .transform
        .map(|transform| format!(" transform: {};", transform.to_css_matrix()))
        .unwrap_or_default();
    format!(
        "<div id=\"{DIAGRAM_CONTAINER}\" class=\"diagram\" style=\"width: {:.0}px; height: {:.0}px;\">\
<div id=\"{DIAGRAM_VIEWPORT}\" class=\"viewport\" style=\"width: {:.2}px; height: {:.2}px;{transform}\">\n\
{}\n</div></div>\n",
        diagram.root_size.width,
        diagram.root_size.height,
        diagram.content_size.width,
        diagram.content_size.height,
        diagram.markup
    )
}

/// Opacity rules keyed by node group id; groups without an id keep full opacity.
fn render_node_styles(diagram: &DiagramView) -> String {
    let mut css = format!("\n#{DIAGRAM_VIEWPORT} > svg {{ width: 100%; height: 100%; }}\n");
    for node in &diagram.nodes {
        if let (Some(id), Some(opacity)) = (&node.element_id, node.opacity) {
            css.push_str(&format!(
                "#{DIAGRAM_VIEWPORT} g[id=\"{}\"] {{ opacity: {opacity:.1}; }}\n",
                escape_css_string(id)
            ));
        }
    }
    css
}

fn render_notifications(rows: &[NotificationRow]) -> String {
    let mut html = format!("<table id=\"{NOTIFICATIONS_PANEL}\" class=\"notifications\">\n");
    for row in rows {
        html.push_str(&format!(
            "<tr><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            row.class,
            row.severity,
            escape_html(&row.message)
        ));
    }
    html.push_str("</table>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_css_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('<', "\\3C ")
}
