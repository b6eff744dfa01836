//! Ready-made sections for the landing page, plus a stacked layout to preview them headlessly.
//!
//! Element ids follow one convention: the section root is `{id}`, its children are
//! `{id}-title`, `{id}-subtitle`, `{id}-panel-{n}`, `{id}-cta` and `{id}-orb`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    animation::ease::{Ease, EaseDir},
    foundation::core::{ElementId, Property, Rect, Viewport},
    idle::IdleDef,
    region::{Anchor, Edge, RegionDef, Scrub},
    section::{SceneDef, SectionDef},
    stage::StageDef,
    timeline::{Drive, Keyframe, Position, TimelineDef},
};

/// Canonical landing-page sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Pinned hero: title fades and scales away while the section is scrubbed through.
    Hero,
    /// Three-stage problem simulator.
    Challenge,
    /// Four-stage solutions visualizer.
    SolutionsGrid,
    /// Floating orb plus a one-shot entrance for the call to action.
    CallToAction,
    /// Plain entrance used by the informational pages.
    Entrance,
}

impl Preset {
    /// Number of mutually exclusive panels.
    pub fn panels(self) -> usize {
        match self {
            Self::Challenge => 3,
            Self::SolutionsGrid => 4,
            _ => 0,
        }
    }

    /// Section definition rooted at element `id`.
    pub fn section(self, id: &str) -> SectionDef {
        match self {
            Self::Hero => hero(id),
            Self::Challenge => staged(id, self.panels()),
            Self::SolutionsGrid => staged(id, self.panels()),
            Self::CallToAction => call_to_action(id),
            Self::Entrance => entrance(id),
        }
    }

    /// Section height in viewport heights.
    fn screens(self) -> f64 {
        match self {
            Self::Hero => 2.0,
            Self::Challenge => 3.0,
            Self::SolutionsGrid => 4.0,
            Self::CallToAction | Self::Entrance => 1.0,
        }
    }

    fn children(self, id: &str) -> Vec<String> {
        let mut out = vec![format!("{id}-title"), format!("{id}-subtitle")];
        out.extend((0..self.panels()).map(|i| format!("{id}-panel-{i}")));
        if self == Self::CallToAction {
            out.push(format!("{id}-cta"));
            out.push(format!("{id}-orb"));
        }
        out
    }
}

fn el(id: &str, suffix: &str) -> ElementId {
    ElementId::new(format!("{id}-{suffix}"))
}

fn hero(id: &str) -> SectionDef {
    let region = RegionDef {
        start: Anchor::edges(Edge::Top, Edge::Top),
        end: Anchor::AfterStart(Edge::Percent(100.0)),
        scrub: Scrub::Smoothed { secs: 0.6 },
        ..RegionDef::new(id).pinned()
    };
    let timeline = TimelineDef::new()
        .push(
            Keyframe::to(
                el(id, "title"),
                [(Property::Opacity, 0.0), (Property::Scale, 0.85), (Property::Y, -80.0)],
            )
            .duration(1.0)
            .ease(Ease::Power {
                degree: 2,
                dir: EaseDir::In,
            })
            .label("exit"),
        )
        .push(
            Keyframe::to(el(id, "subtitle"), [(Property::Opacity, 0.0)])
                .at(Position::Label("exit".to_owned(), 0.2))
                .duration(0.6),
        );
    SectionDef::new(id, region).timeline(Drive::Scrub, timeline)
}

fn staged(id: &str, panels: usize) -> SectionDef {
    let region = RegionDef {
        start: Anchor::edges(Edge::Top, Edge::Top),
        end: Anchor::edges(Edge::Bottom, Edge::Bottom),
        scrub: Scrub::Immediate,
        ..RegionDef::new(id)
    };
    let mut timeline = TimelineDef::new();
    for i in 0..panels {
        let panel = el(id, &format!("panel-{i}"));
        timeline = timeline.initial(panel.clone(), Property::Opacity, if i == 0 { 1.0 } else { 0.0 });
        if i > 0 {
            timeline = timeline
                .push(
                    Keyframe::to(el(id, &format!("panel-{}", i - 1)), [(Property::Opacity, 0.0)])
                        .duration(0.5),
                )
                .push(
                    Keyframe::from_to(
                        panel,
                        [(Property::Opacity, 0.0), (Property::Y, 40.0)],
                        [(Property::Opacity, 1.0), (Property::Y, 0.0)],
                    )
                    .at(Position::WithPrevious(0.0))
                    .duration(0.5),
                );
        }
    }
    let title = Keyframe::from_to(el(id, "title"), [(Property::X, -60.0)], [(Property::X, 0.0)])
        .at(Position::Absolute(0.0))
        .duration(0.5);
    // Stage i becomes current halfway through the crossfade that reveals panel i.
    let span = panels.saturating_sub(1).max(1) as f64;
    let thresholds: Vec<f64> = (0..panels)
        .map(|i| if i == 0 { 0.0 } else { (i as f64 - 0.5) / span })
        .collect();
    SectionDef::new(id, region)
        .timeline(Drive::Scrub, timeline.push(title))
        .stages(StageDef::new(thresholds))
}

fn call_to_action(id: &str) -> SectionDef {
    let region = RegionDef {
        start: Anchor::edges(Edge::Top, Edge::Percent(75.0)),
        ..RegionDef::new(id)
    };
    let timeline = TimelineDef::new()
        .push(
            Keyframe::from_to(
                el(id, "title"),
                [(Property::Opacity, 0.0), (Property::Y, 40.0)],
                [(Property::Opacity, 1.0), (Property::Y, 0.0)],
            )
            .duration(0.8)
            .ease(Ease::Power {
                degree: 3,
                dir: EaseDir::Out,
            }),
        )
        .push(
            Keyframe::from_to(el(id, "cta"), [(Property::Scale, 0.9)], [(Property::Scale, 1.0)])
                .at(Position::AfterEnd(-0.4))
                .duration(0.6)
                .ease(Ease::BackOut),
        );
    SectionDef::new(id, region)
        .timeline(Drive::entrance(), timeline)
        .idle(IdleDef::float(el(id, "orb"), 12.0, 6.0))
}

fn entrance(id: &str) -> SectionDef {
    let timeline = TimelineDef::new()
        .push(
            Keyframe::from_to(
                el(id, "title"),
                [(Property::Opacity, 0.0), (Property::Y, 30.0)],
                [(Property::Opacity, 1.0), (Property::Y, 0.0)],
            )
            .duration(0.7),
        )
        .push(
            Keyframe::from_to(el(id, "subtitle"), [(Property::Opacity, 0.0)], [(Property::Opacity, 1.0)])
                .at(Position::WithPrevious(0.2))
                .duration(0.7),
        );
    SectionDef::new(id, RegionDef::new(id)).timeline(Drive::entrance(), timeline)
}

/// Stack presets top to bottom and lay their elements out for a headless preview.
pub fn stacked_scene(viewport: Viewport, sections: &[(Preset, &str)]) -> SceneDef {
    let mut elements = BTreeMap::new();
    let mut top = 0.0;
    let (w, vh) = (viewport.width, viewport.height);
    for (preset, id) in sections {
        let h = preset.screens() * vh;
        elements.insert(ElementId::new(*id), Rect::new(0.0, top, w, top + h));
        for (i, child) in preset.children(id).into_iter().enumerate() {
            let y = top + vh * 0.2 + i as f64 * vh * 0.12;
            let rect = if child.ends_with("-orb") {
                Rect::new(w * 0.7, top + vh * 0.3, w * 0.7 + vh * 0.2, top + vh * 0.5)
            } else if child.contains("-panel-") {
                Rect::new(w * 0.1, top + vh * 0.45, w * 0.9, top + vh * 0.9)
            } else {
                Rect::new(w * 0.1, y, w * 0.9, y + vh * 0.1)
            };
            elements.insert(ElementId::new(child), rect);
        }
        top += h;
    }
    SceneDef {
        viewport,
        height: top.max(vh),
        elements,
        sections: sections.iter().map(|(p, id)| p.section(id)).collect(),
    }
}

/// The home page's sections in order.
pub fn landing() -> [(Preset, &'static str); 4] {
    [
        (Preset::Hero, "hero"),
        (Preset::Challenge, "challenge"),
        (Preset::SolutionsGrid, "solutions"),
        (Preset::CallToAction, "cta"),
    ]
}

#[cfg(test)]
#[path = "../tests/unit/section/presets.rs"]
mod tests;
