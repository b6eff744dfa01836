//! Boundary between the engine and the page it animates.
//!
//! The engine never reaches for ambient globals: every read of scroll position or layout and every
//! style write goes through a [`Host`]. [`MemoryHost`] is a complete in-memory document used by the
//! CLI and the test suite.

use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::{ElementId, Property, Rect, Viewport};

/// Fixed-position override applied to a pinned element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PinStyle {
    /// Distance from the viewport top while pinned.
    pub top_px: f64,
    /// Height of the spacer keeping document flow intact while pinned.
    pub spacer_px: f64,
}

/// Kind of document event a region subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerKind {
    /// Scroll events.
    Scroll,
    /// Viewport resize events.
    Resize,
}

/// Handle of an attached listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Handle of a scheduled animation-frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Capabilities the engine needs from the page.
pub trait Host {
    /// Current vertical scroll offset of the document.
    fn scroll_y(&self) -> f64;
    /// Current viewport size.
    fn viewport(&self) -> Viewport;
    /// Scroll the document to `(x, y)`.
    fn scroll_to(&mut self, x: f64, y: f64);
    /// Document-space layout box of `el`, or `None` when the element is absent.
    fn measure(&self, el: &ElementId) -> Option<Rect>;
    /// Write a style property; returns `false` when the element is absent.
    fn write(&mut self, el: &ElementId, prop: &Property, value: f64) -> bool;
    /// Apply (`Some`) or remove (`None`) a pin override; returns `false` when absent.
    fn set_pin(&mut self, el: &ElementId, pin: Option<PinStyle>) -> bool;
    /// Attach a listener.
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;
    /// Detach a listener. Unknown ids are ignored.
    fn remove_listener(&mut self, id: ListenerId);
    /// Start an animation-frame loop.
    fn request_frame(&mut self) -> FrameHandle;
    /// Cancel an animation-frame loop. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Page-level metadata sink used on route changes.
pub trait Document {
    /// Set `document.title`.
    fn set_title(&mut self, title: &str);
    /// Upsert a `<meta>` tag keyed by `name` or `property`.
    fn set_meta(&mut self, key: &str, content: &str);
    /// Set the canonical URL link.
    fn set_canonical(&mut self, url: &str);
    /// Scroll the window to `(x, y)`.
    fn reset_scroll(&mut self, x: f64, y: f64);
}

/// In-memory document.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    scroll: (f64, f64),
    viewport: Viewport,
    boxes: BTreeMap<ElementId, Rect>,
    styles: BTreeMap<ElementId, BTreeMap<Property, f64>>,
    pins: BTreeMap<ElementId, PinStyle>,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    frames: BTreeSet<FrameHandle>,
    next_handle: u64,
    writes: u64,
    title: String,
    meta: BTreeMap<String, String>,
    canonical: Option<String>,
}

impl MemoryHost {
    /// Empty document with the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            scroll: (0.0, 0.0),
            viewport,
            boxes: BTreeMap::new(),
            styles: BTreeMap::new(),
            pins: BTreeMap::new(),
            listeners: BTreeMap::new(),
            frames: BTreeSet::new(),
            next_handle: 1,
            writes: 0,
            title: String::new(),
            meta: BTreeMap::new(),
            canonical: None,
        }
    }

    /// Insert or move an element's layout box.
    pub fn insert(&mut self, el: impl Into<ElementId>, rect: Rect) {
        self.boxes.insert(el.into(), rect);
    }

    /// Builder form of [`MemoryHost::insert`].
    pub fn with_element(mut self, el: impl Into<ElementId>, rect: Rect) -> Self {
        self.insert(el, rect);
        self
    }

    /// Remove an element from the document, as an unmount would.
    pub fn remove(&mut self, el: &ElementId) {
        self.boxes.remove(el);
        self.styles.remove(el);
        self.pins.remove(el);
    }

    /// Set the scroll offset directly, as a user scroll would.
    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll.1 = y.max(0.0);
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Current horizontal and vertical scroll offsets.
    pub fn scroll(&self) -> (f64, f64) {
        self.scroll
    }

    /// Last written value of a style property.
    pub fn style(&self, el: &ElementId, prop: &Property) -> Option<f64> {
        self.styles.get(el).and_then(|m| m.get(prop)).copied()
    }

    /// All written styles of an element.
    pub fn styles_of(&self, el: &ElementId) -> Option<&BTreeMap<Property, f64>> {
        self.styles.get(el)
    }

    /// Active pin override of an element.
    pub fn pin(&self, el: &ElementId) -> Option<PinStyle> {
        self.pins.get(el).copied()
    }

    /// Number of elements currently pinned.
    pub fn pinned_count(&self) -> usize {
        self.pins.len()
    }

    /// Number of attached listeners of any kind.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of attached listeners of `kind`.
    pub fn listener_count_of(&self, kind: ListenerKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    /// Number of live animation-frame loops.
    pub fn active_frames(&self) -> usize {
        self.frames.len()
    }

    /// Total successful style writes so far.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Element ids in document order of insertion key.
    pub fn elements(&self) -> impl Iterator<Item = (&ElementId, &Rect)> {
        self.boxes.iter()
    }

    /// Current `document.title`.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Content of a meta tag.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Canonical URL, if set.
    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }

    fn next(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }
}

impl Host for MemoryHost {
    fn scroll_y(&self) -> f64 {
        self.scroll.1
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll = (x.max(0.0), y.max(0.0));
    }

    fn measure(&self, el: &ElementId) -> Option<Rect> {
        self.boxes.get(el).copied()
    }

    fn write(&mut self, el: &ElementId, prop: &Property, value: f64) -> bool {
        if !self.boxes.contains_key(el) {
            return false;
        }
        self.styles
            .entry(el.clone())
            .or_default()
            .insert(prop.clone(), value);
        self.writes += 1;
        true
    }

    fn set_pin(&mut self, el: &ElementId, pin: Option<PinStyle>) -> bool {
        match pin {
            Some(style) => {
                if !self.boxes.contains_key(el) {
                    return false;
                }
                self.pins.insert(el.clone(), style);
            }
            None => {
                self.pins.remove(el);
            }
        }
        true
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next());
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn request_frame(&mut self) -> FrameHandle {
        let h = FrameHandle(self.next());
        self.frames.insert(h);
        h
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.remove(&handle);
    }
}

impl Document for MemoryHost {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn set_meta(&mut self, key: &str, content: &str) {
        self.meta.insert(key.to_owned(), content.to_owned());
    }

    fn set_canonical(&mut self, url: &str) {
        self.canonical = Some(url.to_owned());
    }

    fn reset_scroll(&mut self, x: f64, y: f64) {
        self.scroll_to(x, y);
    }
}

#[cfg(test)]
#[path = "../tests/unit/host/memory.rs"]
mod tests;
