//! Scrollyte is a headless, deterministic scroll-driven animation engine for scrollytelling
//! pages, plus the typed boundaries a marketing site built on it talks to.
//!
//! The engine never touches a real document. It reads scroll and layout from, and writes styles
//! to, a [`Host`]:
//!
//! - Describe a page as [`SectionDef`]s (or load a [`SceneDef`] from JSON)
//! - Mount them on an [`Engine`] (or a [`NullDriver`] when motion is unavailable)
//! - Call [`Engine::tick`] once per frame
//!
//! The [`site`] module wires pages, forms, chat and SEO metadata around the engine.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Pure sampling primitives.
pub mod animation;
/// Viewport tiers.
pub mod breakpoint;
/// Motion driver capability and the static fallback.
pub mod driver;
/// Frame loop over registered regions, timelines, stages and idle loops.
pub mod engine;
/// Ids, geometry and the error taxonomy.
pub mod foundation;
/// Host capability trait and the in-memory document.
pub mod host;
/// Ambient idle motion and property ownership.
pub mod idle;
/// Pin lifecycle of a region's trigger element.
pub mod pin;
/// Canonical landing-page sections.
pub mod presets;
/// Scroll regions and progress signals.
pub mod region;
/// Debug rasterization of a headless document.
pub mod render;
/// Draggable 3D token.
pub mod rotatable;
/// Sections and scene documents.
pub mod section;
/// Site plumbing: routing, forms, datastore, email and chat.
pub mod site;
/// Stage dispatch over scroll progress.
pub mod stage;
/// Keyframe timelines and playback.
pub mod timeline;

pub use crate::animation::ease::{Ease, EaseDir};
pub use crate::breakpoint::{BreakpointObserver, TierChange, ViewportTier};
pub use crate::driver::{Handle, IdleHandle, MotionDriver, NullDriver, RegionHandle, StageHandle, TimelineHandle};
pub use crate::engine::{Engine, FrameReport, RegionEvent};
pub use crate::foundation::core::{ElementId, Property, Rect, Viewport};
pub use crate::foundation::error::{ScrollyteError, ScrollyteResult};
pub use crate::host::{Document, Host, MemoryHost};
pub use crate::idle::{IdleAnimator, IdleDef, OwnershipLedger};
pub use crate::presets::{Preset, landing, stacked_scene};
pub use crate::region::{Anchor, Edge, ProgressSignal, RegionDef, RegionStatus, Scrub, ThresholdEvent};
pub use crate::render::{FrameRgba, render_debug_frame};
pub use crate::rotatable::{Pose, Rotatable3DToken, TokenParams};
pub use crate::section::{MountedSection, SceneDef, Section, SectionDef};
pub use crate::stage::{StageChange, StageDef, StageDispatcher, StageIndex};
pub use crate::timeline::{AutoTrigger, Drive, Keyframe, Position, Repeat, Timeline, TimelineDef};
