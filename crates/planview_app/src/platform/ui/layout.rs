use super::constants::*;

const STYLES: &str = "
body { font-family: sans-serif; margin: 0; padding: 16px; background: #fafafa; }
.toolbar { display: flex; gap: 8px; margin-bottom: 12px; }
.toolbar button { padding: 6px 14px; }
.toolbar button:disabled { opacity: 0.5; }
.paste-area { border: 2px dashed #999; padding: 48px; text-align: center; color: #555; }
.paste-error { color: #b00020; margin-top: 12px; }
.spinner { width: 32px; height: 32px; border: 4px solid #ddd; border-top-color: #333;
  border-radius: 50%; animation: spin 1s linear infinite; margin: 24px auto; }
@keyframes spin { to { transform: rotate(360deg); } }
.diagram { position: relative; overflow: hidden; border: 1px solid #ccc; background: #fff; }
.viewport { position: absolute; left: 0; top: 0; transform-origin: 0 0; }
.viewport g.node { cursor: pointer; }
table.notifications { border-collapse: collapse; margin-top: 12px; width: 100%; }
table.notifications td { border-bottom: 1px solid #eee; padding: 4px 8px; }
.severity-error { color: #b00020; font-weight: bold; }
.severity-warning { color: #a86500; }
.severity-info { color: #1a4f8b; }
.severity-success { color: #2e7d32; }
footer { margin-top: 12px; color: #777; font-size: 12px; }
";

/// Wraps rendered regions into a standalone page.
pub fn page(head_styles: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{PAGE_TITLE}</title>\n<style>{STYLES}{head_styles}</style>\n</head>\n\
<body>\n<h1>{PAGE_TITLE}</h1>\n{body}</body>\n</html>\n"
    )
}

pub fn toolbar(buttons: &str) -> String {
    if buttons.is_empty() {
        return String::new();
    }
    format!("<div class=\"toolbar\">{buttons}</div>\n")
}

pub fn footer(status: &str) -> String {
    format!("<footer id=\"{STATUS_FOOTER}\">{status}</footer>\n")
}
