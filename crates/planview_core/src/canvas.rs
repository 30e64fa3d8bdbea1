use std::collections::{BTreeMap, HashSet};

use crate::document::{DiagramDocument, NodeId};

/// Opacity applied to nodes outside the highlighted set.
pub const DIMMED_OPACITY: f32 = 0.2;
/// Opacity applied to highlighted nodes.
pub const FULL_OPACITY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Settings for every pan/zoom handle the canvas creates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanZoomConfig {
    pub fit_on_load: bool,
    pub center_on_load: bool,
    /// Lower zoom bound relative to the fitted scale; below 1 allows an overview.
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom step per wheel notch, as a fraction of the current zoom.
    pub wheel_sensitivity: f64,
}

impl Default for PanZoomConfig {
    fn default() -> Self {
        Self {
            fit_on_load: true,
            center_on_load: true,
            min_zoom: 0.1,
            max_zoom: 7.0,
            wheel_sensitivity: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportOp {
    Resize,
    Fit,
    Center,
}

/// Uniform scale followed by a translation, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ViewportTransform {
    pub fn to_css_matrix(&self) -> String {
        format!(
            "matrix({s:.4}, 0, 0, {s:.4}, {x:.2}, {y:.2})",
            s = self.scale,
            x = self.translate_x,
            y = self.translate_y
        )
    }
}

/// Viewport controller bound to exactly one installed document.
#[derive(Debug, Clone, PartialEq)]
pub struct PanZoomHandle {
    config: PanZoomConfig,
    content: Size,
    viewport: Size,
    base_scale: f64,
    zoom: f64,
    pan: (f64, f64),
    recent_ops: Vec<ViewportOp>,
}

impl PanZoomHandle {
    pub fn new(config: PanZoomConfig, content: Size, viewport: Size) -> Self {
        let mut handle = Self {
            config,
            content,
            viewport,
            base_scale: 1.0,
            zoom: 1.0,
            pan: (0.0, 0.0),
            recent_ops: Vec::new(),
        };
        if config.fit_on_load {
            handle.fit();
        }
        if config.center_on_load {
            handle.center();
        }
        handle.recent_ops.clear();
        handle
    }

    pub fn config(&self) -> &PanZoomConfig {
        &self.config
    }

    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.recent_ops.push(ViewportOp::Resize);
    }

    /// Scales the content to fit the viewport and resets the relative zoom.
    pub fn fit(&mut self) {
        self.base_scale = if self.content.is_empty() || self.viewport.is_empty() {
            1.0
        } else {
            (self.viewport.width / self.content.width).min(self.viewport.height / self.content.height)
        };
        self.zoom = 1.0;
        self.pan = (0.0, 0.0);
        self.recent_ops.push(ViewportOp::Fit);
    }

    pub fn center(&mut self) {
        let scale = self.scale();
        self.pan = (
            (self.viewport.width - self.content.width * scale) / 2.0,
            (self.viewport.height - self.content.height * scale) / 2.0,
        );
        self.recent_ops.push(ViewportOp::Center);
    }

    /// Zooms by `notches` wheel steps around a point in container pixels.
    ///
    /// Positive notches zoom in. The zoom stays within the configured bounds.
    pub fn zoom_at(&mut self, notches: i32, point: (f64, f64)) {
        let factor = (1.0 + self.config.wheel_sensitivity).powi(notches);
        let target = (self.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        let ratio = target / self.zoom;
        self.pan = (
            point.0 - (point.0 - self.pan.0) * ratio,
            point.1 - (point.1 - self.pan.1) * ratio,
        );
        self.zoom = target;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = (self.pan.0 + dx, self.pan.1 + dy);
    }

    /// Zoom relative to the fitted scale.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scale(&self) -> f64 {
        self.base_scale * self.zoom
    }

    pub fn transform(&self) -> ViewportTransform {
        ViewportTransform {
            scale: self.scale(),
            translate_x: self.pan.0,
            translate_y: self.pan.1,
        }
    }

    /// Operations applied by the most recent canvas resize, in order.
    pub fn recent_ops(&self) -> &[ViewportOp] {
        &self.recent_ops
    }
}

/// Owns the installed document, its pan/zoom handle, and per-node emphasis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiagramCanvas {
    container: Size,
    root_size: Option<Size>,
    document: Option<DiagramDocument>,
    handle: Option<PanZoomHandle>,
    opacity: BTreeMap<NodeId, f32>,
    generation: u64,
    visible: bool,
}

impl DiagramCanvas {
    pub fn new(container: Size) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    /// Replaces the current document and handle, then sizes the new document.
    ///
    /// Returns the viewport operations applied by the follow-up resize.
    pub fn install(&mut self, document: DiagramDocument, config: PanZoomConfig) -> Vec<ViewportOp> {
        let handle = PanZoomHandle::new(config, document.content_size(), self.container);
        self.document = Some(document);
        self.handle = Some(handle);
        self.opacity.clear();
        self.generation += 1;
        self.resize(self.container)
    }

    /// Matches the document root to the container, then resizes, refits and
    /// recenters the handle. Without a handle only the container size is kept.
    pub fn resize(&mut self, container: Size) -> Vec<ViewportOp> {
        self.container = container;
        let Some(handle) = self.handle.as_mut() else {
            return Vec::new();
        };
        self.root_size = Some(container);

        handle.recent_ops.clear();
        handle.resize(container);
        handle.fit();
        handle.center();
        handle.recent_ops.clone()
    }

    /// Re-applies emphasis over every node: full for members of `highlighted`,
    /// dimmed for the rest.
    pub fn apply_highlight(&mut self, highlighted: &[NodeId]) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let members: HashSet<&NodeId> = highlighted.iter().collect();
        self.opacity = document
            .nodes()
            .iter()
            .map(|group| {
                let opacity = if members.contains(&group.node) {
                    FULL_OPACITY
                } else {
                    DIMMED_OPACITY
                };
                (group.node.clone(), opacity)
            })
            .collect();
    }

    pub fn opacity_of(&self, node: &NodeId) -> Option<f32> {
        self.opacity.get(node).copied()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible && self.document.is_some()
    }

    pub fn document(&self) -> Option<&DiagramDocument> {
        self.document.as_ref()
    }

    pub fn pan_zoom(&self) -> Option<&PanZoomHandle> {
        self.handle.as_ref()
    }

    pub fn pan_zoom_mut(&mut self) -> Option<&mut PanZoomHandle> {
        self.handle.as_mut()
    }

    pub fn container(&self) -> Size {
        self.container
    }

    /// Pixel size last written to the document root.
    pub fn root_size(&self) -> Option<Size> {
        self.root_size
    }

    /// Incremented on every install; used to discard answers meant for an
    /// earlier document.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> DiagramDocument {
        DiagramDocument::from_markup(
            r#"<svg viewBox="0 0 100 50"><g id="node1" class="node"><title>1</title></g><g id="node2" class="node"><title>2</title></g></svg>"#,
        )
        .unwrap()
    }

    #[test]
    fn resize_without_document_is_noop() {
        let mut canvas = DiagramCanvas::new(Size::new(10.0, 10.0));
        assert!(canvas.resize(Size::new(400.0, 300.0)).is_empty());
        assert!(canvas.pan_zoom().is_none());
        assert_eq!(canvas.root_size(), None);
    }

    #[test]
    fn fit_and_center_place_content_in_the_middle() {
        let mut canvas = DiagramCanvas::new(Size::new(400.0, 400.0));
        let ops = canvas.install(doc(), PanZoomConfig::default());
        assert_eq!(ops, vec![ViewportOp::Resize, ViewportOp::Fit, ViewportOp::Center]);

        let transform = canvas.pan_zoom().unwrap().transform();
        assert_eq!(transform.scale, 4.0);
        assert_eq!(transform.translate_x, 0.0);
        assert_eq!(transform.translate_y, 100.0);
        assert_eq!(canvas.root_size(), Some(Size::new(400.0, 400.0)));
    }

    #[test]
    fn wheel_zoom_is_clamped_to_configured_range() {
        let mut handle = PanZoomHandle::new(
            PanZoomConfig::default(),
            Size::new(100.0, 100.0),
            Size::new(100.0, 100.0),
        );
        handle.zoom_at(20, (50.0, 50.0));
        assert_eq!(handle.zoom(), 7.0);
        handle.zoom_at(-40, (50.0, 50.0));
        assert_eq!(handle.zoom(), 0.1);
    }

    #[test]
    fn wheel_zoom_keeps_pointer_anchored() {
        let mut handle = PanZoomHandle::new(
            PanZoomConfig::default(),
            Size::new(100.0, 100.0),
            Size::new(100.0, 100.0),
        );
        handle.zoom_at(1, (0.0, 0.0));
        let transform = handle.transform();
        assert_eq!(transform.scale, 1.5);
        assert_eq!((transform.translate_x, transform.translate_y), (0.0, 0.0));
    }

    #[test]
    fn install_resets_highlight_and_bumps_generation() {
        let mut canvas = DiagramCanvas::new(Size::new(100.0, 100.0));
        canvas.install(doc(), PanZoomConfig::default());
        canvas.apply_highlight(&[NodeId::from(1)]);
        assert_eq!(canvas.opacity_of(&NodeId::from(2)), Some(DIMMED_OPACITY));

        canvas.install(doc(), PanZoomConfig::default());
        assert_eq!(canvas.opacity_of(&NodeId::from(2)), None);
        assert_eq!(canvas.generation(), 2);
    }
}
