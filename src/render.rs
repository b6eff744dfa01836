//! Debug rasterizer: draws every element box of a headless document as it would sit in the
//! viewport for the current scroll offset, pin state and written styles.

use kurbo::Rect;

use crate::{
    animation::proc::stable_hash64,
    foundation::core::{ElementId, Property},
    foundation::error::{ScrollyteError, ScrollyteResult},
    host::{Host, MemoryHost},
};

const BACKGROUND: [u8; 4] = [18, 20, 28, 255];
const MAX_DIM: f64 = 8192.0;

/// Rendered frame, straight-alpha RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FrameRgba {
    fn new(width: u32, height: u32) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&BACKGROUND);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    fn fill(&mut self, rect: Rect, rgb: [u8; 3], alpha: f64) {
        let a = alpha.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let x0 = rect.x0.max(0.0).floor() as u32;
        let y0 = rect.y0.max(0.0).floor() as u32;
        let x1 = (rect.x1.min(f64::from(self.width))).ceil().max(0.0) as u32;
        let y1 = (rect.y1.min(f64::from(self.height))).ceil().max(0.0) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let i = (y as usize * self.width as usize + x as usize) * 4;
                for c in 0..3 {
                    let dst = f64::from(self.data[i + c]);
                    let src = f64::from(rgb[c]);
                    self.data[i + c] = (src * a + dst * (1.0 - a)).round() as u8;
                }
            }
        }
    }
}

/// Stable debug color for an element id.
pub fn element_color(id: &ElementId) -> [u8; 3] {
    let h = stable_hash64(0x5C40_11E5, id.as_str());
    // Keep channels away from the dark background.
    let ch = |shift: u32| 80 + ((h >> shift) & 0xAF) as u8;
    [ch(0), ch(16), ch(32)]
}

/// Rasterize the document's visible area.
#[tracing::instrument(skip(host))]
pub fn render_debug_frame(host: &MemoryHost) -> ScrollyteResult<FrameRgba> {
    let vp = host.viewport();
    if vp.width > MAX_DIM || vp.height > MAX_DIM {
        return Err(ScrollyteError::validation(format!(
            "viewport {}x{} is too large for a debug frame",
            vp.width, vp.height
        )));
    }
    let mut frame = FrameRgba::new(vp.width.round() as u32, vp.height.round() as u32);
    let scroll = host.scroll_y();

    let pinned: Vec<(Rect, f64)> = host
        .elements()
        .filter_map(|(id, r)| host.pin(id).map(|p| (*r, p.top_px)))
        .collect();

    for (id, doc) in host.elements() {
        let style = |p: Property| host.style(id, &p);
        let opacity = style(Property::Opacity).unwrap_or(1.0);
        let scale = style(Property::Scale).unwrap_or(1.0);
        let dx = style(Property::X).unwrap_or(0.0);
        let dy = style(Property::Y).unwrap_or(0.0);

        let anchor = pinned
            .iter()
            .find(|(p, _)| p.x0 <= doc.x0 && p.y0 <= doc.y0 && doc.x1 <= p.x1 && doc.y1 <= p.y1);
        let screen_y0 = match anchor {
            Some((p, top)) => doc.y0 - p.y0 + top,
            None => doc.y0 - scroll,
        };
        let screen = Rect::new(doc.x0, screen_y0, doc.x1, screen_y0 + doc.height());
        let c = screen.center();
        let (hw, hh) = (screen.width() * scale / 2.0, screen.height() * scale / 2.0);
        let drawn = Rect::new(c.x - hw + dx, c.y - hh + dy, c.x + hw + dx, c.y + hh + dy);

        frame.fill(drawn, element_color(id), opacity * 0.85);
    }
    Ok(frame)
}

#[cfg(test)]
#[path = "../tests/unit/render/debug.rs"]
mod tests;
