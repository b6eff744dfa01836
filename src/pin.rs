use crate::{
    foundation::core::ElementId,
    host::{Host, PinStyle},
    region::ResolvedRegion,
};

/// Pin state of one trigger element.
///
/// The element is pinned while `start <= scroll <= end` and in normal flow everywhere else.
#[derive(Clone, Debug)]
pub struct PinLifecycle {
    element: ElementId,
    pinned: Option<PinStyle>,
}

impl PinLifecycle {
    /// Unpinned lifecycle for `element`.
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            pinned: None,
        }
    }

    /// Pinned element.
    pub fn element(&self) -> &ElementId {
        &self.element
    }

    /// Whether the element is currently pinned.
    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    /// Pin or unpin for the current scroll position; returns `true` on a state change.
    pub fn update(&mut self, host: &mut dyn Host, region: &ResolvedRegion, scroll: f64) -> bool {
        let inside = region.start <= scroll && scroll <= region.end;
        match (inside, self.pinned.is_some()) {
            (true, false) => {
                let style = PinStyle {
                    top_px: region.trigger_top - region.start,
                    spacer_px: region.end - region.start,
                };
                if host.set_pin(&self.element, Some(style)) {
                    self.pinned = Some(style);
                    tracing::debug!(element = %self.element, "pinned");
                    true
                } else {
                    tracing::debug!(element = %self.element, "pin target absent");
                    false
                }
            }
            (false, true) => {
                self.release(host);
                true
            }
            _ => false,
        }
    }

    /// Restore normal document flow. Safe to call repeatedly.
    pub fn release(&mut self, host: &mut dyn Host) {
        if self.pinned.take().is_some() {
            host.set_pin(&self.element, None);
            tracing::debug!(element = %self.element, "unpinned");
        }
    }
}
