//! The page shell: routing plus the motion runtime that animates whichever page is mounted.

use crate::{
    driver::{MotionDriver, NullDriver},
    engine::{Engine, FrameReport},
    foundation::core::Viewport,
    foundation::error::ScrollyteResult,
    host::{Document, Host},
    presets::stacked_scene,
    section::{MountedSection, SceneDef, Section},
    site::routes::Route,
};

/// A site rendered into one document.
#[derive(Debug)]
pub struct Site<H: Host + Document> {
    engine: Engine<H>,
    fallback: NullDriver,
    animated: bool,
    site_url: String,
    route: Option<Route>,
    mounted: Vec<MountedSection>,
}

impl<H: Host + Document> Site<H> {
    /// Animated site over `host`; canonical links are built under `site_url`.
    pub fn new(host: H, site_url: impl Into<String>) -> Self {
        Self {
            engine: Engine::new(host),
            fallback: NullDriver::new(),
            animated: true,
            site_url: site_url.into(),
            route: None,
            mounted: Vec::new(),
        }
    }

    /// Site for an environment without a motion runtime. Pages mount and render statically.
    pub fn without_motion(host: H, site_url: impl Into<String>) -> Self {
        Self {
            animated: false,
            ..Self::new(host, site_url)
        }
    }

    /// Whether sections are animated.
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Current page.
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    /// Sections of the current page.
    pub fn mounted(&self) -> &[MountedSection] {
        &self.mounted
    }

    /// Motion runtime.
    pub fn engine(&self) -> &Engine<H> {
        &self.engine
    }

    /// Document.
    pub fn host(&self) -> &H {
        self.engine.host()
    }

    /// Mutable document, e.g. to scroll.
    pub fn host_mut(&mut self) -> &mut H {
        self.engine.host_mut()
    }

    /// Go to `location`. Unknown locations fail without leaving the current page.
    #[tracing::instrument(skip(self))]
    pub fn navigate(&mut self, location: &str) -> ScrollyteResult<Route> {
        let route = Route::parse(location)?;
        self.unmount();

        let host = self.engine.host_mut();
        host.reset_scroll(0.0, 0.0);
        route.seo().apply(host, &self.site_url);

        let driver: &mut dyn MotionDriver = if self.animated {
            &mut self.engine
        } else {
            &mut self.fallback
        };
        for (preset, id) in route.sections() {
            self.mounted.push(Section::mount(&preset.section(id), driver));
        }
        let degraded = self.mounted.iter().filter(|m| m.degraded().is_some()).count();
        if degraded > 0 {
            tracing::warn!(route = route.path(), degraded, "page mounted with static sections");
        }
        self.route = Some(route);
        Ok(route)
    }

    /// Tear down every section of the current page.
    pub fn unmount(&mut self) {
        let driver: &mut dyn MotionDriver = if self.animated {
            &mut self.engine
        } else {
            &mut self.fallback
        };
        for m in &mut self.mounted {
            m.teardown(driver);
        }
        self.mounted.clear();
        self.route = None;
    }

    /// Advance one frame. Static sites report an empty frame.
    pub fn tick(&mut self, now: f64) -> FrameReport {
        if !self.animated {
            return FrameReport {
                scroll: self.engine.host().scroll_y(),
                ..FrameReport::default()
            };
        }
        self.engine.tick(now)
    }

    /// Re-measure after a layout change.
    pub fn resize(&mut self) -> ScrollyteResult<()> {
        if self.animated {
            self.engine.resize()?;
        }
        Ok(())
    }
}

/// Headless layout of `route`'s sections.
pub fn route_scene(route: Route, viewport: Viewport) -> SceneDef {
    stacked_scene(viewport, &route.sections())
}

#[cfg(test)]
#[path = "../../tests/unit/site/app.rs"]
mod tests;
