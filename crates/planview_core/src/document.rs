use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use scraper::{ElementRef, Html, Selector};

use crate::canvas::Size;

/// Token identifying a node in the rendered diagram.
///
/// The scheduler numbers its tasks, but the token is carried as text so that
/// string identifiers round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("image payload is not valid base64: {0}")]
    Base64(String),
    #[error("image payload is not valid UTF-8: {0}")]
    Utf8(String),
    #[error("image payload does not contain an <svg> root")]
    MissingSvgRoot,
}

/// A node group of the diagram: its element id (if any) and its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    pub element_id: Option<String>,
    pub node: NodeId,
}

/// Decoded SVG document for one successful process or clear response.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramDocument {
    markup: String,
    content_size: Size,
    nodes: Vec<NodeGroup>,
}

impl DiagramDocument {
    /// Decodes the base64 `image` field of a response and indexes its node groups.
    pub fn from_base64(payload: &str) -> Result<Self, DecodeError> {
        let compact: String = payload.split_ascii_whitespace().collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|err| DecodeError::Base64(err.to_string()))?;
        let markup = String::from_utf8(bytes).map_err(|err| DecodeError::Utf8(err.to_string()))?;
        Self::from_markup(markup)
    }

    pub fn from_markup(markup: impl Into<String>) -> Result<Self, DecodeError> {
        let markup = markup.into();
        let start = markup.find("<svg").ok_or(DecodeError::MissingSvgRoot)?;
        let markup = markup[start..].to_string();

        let fragment = Html::parse_fragment(&markup);
        let svg_sel = Selector::parse("svg").ok();
        let root = svg_sel
            .as_ref()
            .and_then(|sel| fragment.select(sel).next())
            .ok_or(DecodeError::MissingSvgRoot)?;

        let content_size = root_geometry(root);
        let nodes = collect_node_groups(&fragment);

        Ok(Self {
            markup,
            content_size,
            nodes,
        })
    }

    /// SVG markup starting at the `<svg` root, without any XML prolog.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    pub fn nodes(&self) -> &[NodeGroup] {
        &self.nodes
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.iter().any(|group| &group.node == node)
    }
}

fn collect_node_groups(fragment: &Html) -> Vec<NodeGroup> {
    let Some(group_sel) = Selector::parse("g.node").ok() else {
        return Vec::new();
    };
    let Some(title_sel) = Selector::parse("title").ok() else {
        return Vec::new();
    };

    fragment
        .select(&group_sel)
        .filter_map(|group| {
            let title = group
                .select(&title_sel)
                .next()
                .map(|t| t.text().collect::<String>())?;
            let token = title.trim();
            if token.is_empty() {
                return None;
            }
            Some(NodeGroup {
                element_id: group.value().attr("id").map(ToOwned::to_owned),
                node: NodeId::new(token),
            })
        })
        .collect()
}

/// Content size from `viewBox`, falling back to `width`/`height`.
fn root_geometry(root: ElementRef<'_>) -> Size {
    let element = root.value();
    let view_box = element
        .attr("viewBox")
        .or_else(|| element.attr("viewbox"))
        .and_then(parse_view_box);
    if let Some(size) = view_box {
        return size;
    }

    let width = element.attr("width").and_then(parse_length);
    let height = element.attr("height").and_then(parse_length);
    match (width, height) {
        (Some(width), Some(height)) => Size::new(width, height),
        _ => Size::default(),
    }
}

fn parse_view_box(raw: &str) -> Option<Size> {
    let parts: Vec<f64> = raw
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => Some(Size::new(*width, *height)),
        _ => None,
    }
}

fn parse_length(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let numeric = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    numeric.trim().parse().ok().filter(|value: &f64| *value > 0.0)
}
