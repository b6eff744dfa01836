//! Top-level pages and the metadata each one injects.

use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{ScrollyteError, ScrollyteResult},
    host::Document,
    presets::{Preset, landing},
};

/// A top-level page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// `/`
    Home,
    /// `/about`
    About,
    /// `/vision`
    Vision,
    /// `/contact`
    Contact,
}

impl Route {
    /// Every route, in navigation order.
    pub const ALL: [Route; 4] = [Route::Home, Route::About, Route::Vision, Route::Contact];

    /// Resolve a location. Query strings, fragments and a trailing slash are ignored.
    pub fn parse(location: &str) -> ScrollyteResult<Self> {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Self::ALL
            .into_iter()
            .find(|r| r.path() == path)
            .ok_or_else(|| ScrollyteError::validation(format!("no page at '{location}'")))
    }

    /// Canonical path.
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::About => "/about",
            Self::Vision => "/vision",
            Self::Contact => "/contact",
        }
    }

    /// Sections mounted on this page, top to bottom.
    pub fn sections(self) -> Vec<(Preset, &'static str)> {
        match self {
            Self::Home => landing().to_vec(),
            Self::About => vec![(Preset::Entrance, "about")],
            Self::Vision => vec![(Preset::Entrance, "vision")],
            Self::Contact => vec![(Preset::Entrance, "contact")],
        }
    }

    /// Metadata for this page.
    pub fn seo(self) -> SeoMeta {
        let (title, description) = match self {
            Self::Home => (
                "Scrollyte | Stories that move as you scroll",
                "Scroll-driven product stories for teams that want their launch page to explain itself.",
            ),
            Self::About => (
                "About | Scrollyte",
                "Who we are and why we build motion-first product pages.",
            ),
            Self::Vision => (
                "Vision | Scrollyte",
                "Where scroll-driven storytelling is headed and what we are building toward.",
            ),
            Self::Contact => (
                "Contact | Scrollyte",
                "Questions, partnerships or sales: get in touch with the team.",
            ),
        };
        SeoMeta {
            title: title.to_owned(),
            description: description.to_owned(),
            path: self.path().to_owned(),
            image: None,
        }
    }
}

/// Title, description and social tags for one page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeoMeta {
    /// Document title, also used for `og:title` and `twitter:title`.
    pub title: String,
    /// Meta description, also used for the social descriptions.
    pub description: String,
    /// Page path appended to the site URL for the canonical link.
    pub path: String,
    /// Absolute preview image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SeoMeta {
    /// Absolute canonical URL under `site_url`.
    pub fn canonical(&self, site_url: &str) -> String {
        let base = site_url.trim_end_matches('/');
        if self.path == "/" {
            format!("{base}/")
        } else {
            format!("{base}{}", self.path)
        }
    }

    /// Write everything into `doc`.
    pub fn apply(&self, doc: &mut dyn Document, site_url: &str) {
        let canonical = self.canonical(site_url);
        doc.set_title(&self.title);
        doc.set_meta("description", &self.description);
        doc.set_canonical(&canonical);

        doc.set_meta("og:type", "website");
        doc.set_meta("og:title", &self.title);
        doc.set_meta("og:description", &self.description);
        doc.set_meta("og:url", &canonical);

        let card = if self.image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        };
        doc.set_meta("twitter:card", card);
        doc.set_meta("twitter:title", &self.title);
        doc.set_meta("twitter:description", &self.description);
        if let Some(image) = &self.image {
            doc.set_meta("og:image", image);
            doc.set_meta("twitter:image", image);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/site/routes.rs"]
mod tests;
