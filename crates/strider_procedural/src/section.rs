//! # Sections
//!
//! A section is the smallest piece of terrain: a flat run, a ramp, a flight of
//! stairs, a jump. Each archetype is one terminal of the level grammar.
//!
//! ## Terminal Alphabet
//!
//! ```text
//! i = Flat        a = RampUp      b = RampDown
//! c = StairsUp    d = StairsDown  e = JumpUp
//! f = JumpDown    g = Hopscotch   x = end of chunk (spawns nothing)
//! ```
//!
//! `Start` has no terminal; it is only placed as the opening chunk of a level.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::random::{GenerationSeed, RandomSource, SeededRandom};

/// Terrain section archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionType {
    /// Opening platform of a level.
    Start,
    /// Level ground.
    Flat,
    /// Incline going up.
    RampUp,
    /// Incline going down.
    RampDown,
    /// Steps going up.
    StairsUp,
    /// Steps going down.
    StairsDown,
    /// Gap with a higher landing.
    JumpUp,
    /// Gap with a lower landing.
    JumpDown,
    /// Run of short, intense jumps.
    Hopscotch,
}

impl SectionType {
    /// Every archetype, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Start,
        Self::Flat,
        Self::RampUp,
        Self::RampDown,
        Self::StairsUp,
        Self::StairsDown,
        Self::JumpUp,
        Self::JumpDown,
        Self::Hopscotch,
    ];

    /// Maps a grammar terminal to its archetype.
    #[must_use]
    pub const fn from_terminal(symbol: char) -> Option<Self> {
        match symbol {
            'i' => Some(Self::Flat),
            'a' => Some(Self::RampUp),
            'b' => Some(Self::RampDown),
            'c' => Some(Self::StairsUp),
            'd' => Some(Self::StairsDown),
            'e' => Some(Self::JumpUp),
            'f' => Some(Self::JumpDown),
            'g' => Some(Self::Hopscotch),
            _ => None,
        }
    }

    /// Returns the grammar terminal for this archetype.
    #[must_use]
    pub const fn terminal(self) -> Option<char> {
        match self {
            Self::Start => None,
            Self::Flat => Some('i'),
            Self::RampUp => Some('a'),
            Self::RampDown => Some('b'),
            Self::StairsUp => Some('c'),
            Self::StairsDown => Some('d'),
            Self::JumpUp => Some('e'),
            Self::JumpDown => Some('f'),
            Self::Hopscotch => Some('g'),
        }
    }

    /// True for archetypes that end higher than they start.
    #[must_use]
    pub const fn is_ascent(self) -> bool {
        matches!(self, Self::RampUp | Self::StairsUp | Self::JumpUp)
    }

    /// True for archetypes that end lower than they start.
    #[must_use]
    pub const fn is_descent(self) -> bool {
        matches!(self, Self::RampDown | Self::StairsDown | Self::JumpDown)
    }
}

/// A point in level space where sections join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Horizontal position (run direction).
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Anchor {
    /// The level origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new anchor.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns this anchor moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Capability to place a section in the world.
///
/// Implementations put a section of `kind` with its start on `origin` and
/// return the section's end anchor, which becomes the next section's origin.
/// Returning `origin` unchanged means nothing was placed.
pub trait SectionSpawner {
    /// Places one section and returns its end anchor.
    fn spawn_section(&mut self, kind: SectionType, origin: Anchor) -> Anchor;
}

impl<S: SectionSpawner + ?Sized> SectionSpawner for &mut S {
    fn spawn_section(&mut self, kind: SectionType, origin: Anchor) -> Anchor {
        (**self).spawn_section(kind, origin)
    }
}

/// Geometry of one placeable section variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    /// Archetype this template belongs to.
    pub kind: SectionType,
    /// Horizontal distance from start anchor to end anchor.
    pub run: f32,
    /// Vertical distance from start anchor to end anchor.
    pub rise: f32,
}

impl SectionTemplate {
    /// Creates a template.
    #[inline]
    #[must_use]
    pub const fn new(kind: SectionType, run: f32, rise: f32) -> Self {
        Self { kind, run, rise }
    }

    /// End anchor when the template starts at `origin`.
    #[inline]
    #[must_use]
    pub fn end_from(self, origin: Anchor) -> Anchor {
        origin.offset(self.run, self.rise)
    }

    /// Returns the template with both extents multiplied by `factor`.
    #[inline]
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            run: self.run * factor,
            rise: self.rise * factor,
            ..self
        }
    }
}

/// Built-in catalogue, one or two variants per archetype.
pub const STANDARD_TEMPLATES: [SectionTemplate; 12] = [
    SectionTemplate::new(SectionType::Start, 12.0, 0.0),
    SectionTemplate::new(SectionType::Flat, 4.0, 0.0),
    SectionTemplate::new(SectionType::Flat, 6.0, 0.0),
    SectionTemplate::new(SectionType::RampUp, 4.0, 2.0),
    SectionTemplate::new(SectionType::RampDown, 4.0, -2.0),
    SectionTemplate::new(SectionType::StairsUp, 3.0, 3.0),
    SectionTemplate::new(SectionType::StairsDown, 3.0, -3.0),
    SectionTemplate::new(SectionType::JumpUp, 5.0, 2.0),
    SectionTemplate::new(SectionType::JumpUp, 6.0, 1.0),
    SectionTemplate::new(SectionType::JumpDown, 5.0, -2.0),
    SectionTemplate::new(SectionType::Hopscotch, 8.0, 0.0),
    SectionTemplate::new(SectionType::Hopscotch, 10.0, 1.0),
];

/// Spawner that places sections from a template catalogue.
///
/// When several templates share an archetype one is picked uniformly.
pub struct TemplateSpawner<R = SeededRandom> {
    templates: Vec<SectionTemplate>,
    rng: R,
    placed: usize,
}

impl TemplateSpawner<SeededRandom> {
    /// Spawner over [`STANDARD_TEMPLATES`].
    #[must_use]
    pub fn standard(seed: GenerationSeed) -> Self {
        Self::new(
            STANDARD_TEMPLATES.to_vec(),
            SeededRandom::new(seed.derive(GenerationSeed::SPAWNER_STREAM)),
        )
    }
}

impl<R: RandomSource> TemplateSpawner<R> {
    /// Creates a spawner over an explicit catalogue.
    #[must_use]
    pub fn new(templates: Vec<SectionTemplate>, rng: R) -> Self {
        Self {
            templates,
            rng,
            placed: 0,
        }
    }

    /// Returns the catalogue.
    #[must_use]
    pub fn templates(&self) -> &[SectionTemplate] {
        &self.templates
    }

    /// Number of sections placed so far.
    #[must_use]
    pub const fn placed_count(&self) -> usize {
        self.placed
    }
}

impl<R: RandomSource> SectionSpawner for TemplateSpawner<R> {
    fn spawn_section(&mut self, kind: SectionType, origin: Anchor) -> Anchor {
        let candidates = self.templates.iter().filter(|t| t.kind == kind).count();
        if candidates == 0 {
            warn!(?kind, "no section template for archetype, nothing placed");
            return origin;
        }

        let pick = self.rng.next_index(candidates);
        let Some(template) = self.templates.iter().filter(|t| t.kind == kind).nth(pick) else {
            return origin;
        };

        self.placed += 1;
        let end = template.end_from(origin);
        trace!(?kind, ?origin, ?end, "section placed");
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_mapping_round_trips() {
        for kind in SectionType::ALL {
            match kind.terminal() {
                Some(symbol) => assert_eq!(SectionType::from_terminal(symbol), Some(kind)),
                None => assert_eq!(kind, SectionType::Start),
            }
        }
        assert_eq!(SectionType::from_terminal('x'), None);
        assert_eq!(SectionType::from_terminal('A'), None);
    }

    #[test]
    fn test_ascent_descent_are_disjoint() {
        for kind in SectionType::ALL {
            assert!(!(kind.is_ascent() && kind.is_descent()), "{kind:?}");
        }
        assert!(SectionType::StairsUp.is_ascent());
        assert!(SectionType::JumpDown.is_descent());
        assert!(!SectionType::Hopscotch.is_ascent());
    }

    #[test]
    fn test_standard_catalogue_covers_every_archetype() {
        for kind in SectionType::ALL {
            assert!(
                STANDARD_TEMPLATES.iter().any(|t| t.kind == kind),
                "no template for {kind:?}"
            );
        }
    }

    #[test]
    fn test_standard_templates_match_direction() {
        for template in STANDARD_TEMPLATES {
            assert!(template.run > 0.0);
            if template.kind.is_ascent() {
                assert!(template.rise > 0.0, "{template:?}");
            }
            if template.kind.is_descent() {
                assert!(template.rise < 0.0, "{template:?}");
            }
        }
    }

    #[test]
    fn test_spawn_returns_end_anchor() {
        let mut spawner = TemplateSpawner::standard(GenerationSeed::new(3));
        let origin = Anchor::new(10.0, 5.0);

        let end = spawner.spawn_section(SectionType::StairsUp, origin);
        assert_eq!(end, Anchor::new(13.0, 8.0));
        assert_eq!(spawner.placed_count(), 1);
    }

    #[test]
    fn test_missing_archetype_places_nothing() {
        let templates = vec![SectionTemplate::new(SectionType::Flat, 4.0, 0.0)];
        let mut spawner = TemplateSpawner::new(templates, SeededRandom::new(GenerationSeed::new(1)));
        let origin = Anchor::new(1.0, 2.0);

        assert_eq!(spawner.spawn_section(SectionType::RampUp, origin), origin);
        assert_eq!(spawner.placed_count(), 0);
    }

    #[test]
    fn test_scaled_template() {
        let template = SectionTemplate::new(SectionType::RampDown, 4.0, -2.0).scaled(0.5);
        assert_eq!(template.end_from(Anchor::ORIGIN), Anchor::new(2.0, -1.0));
    }
}
