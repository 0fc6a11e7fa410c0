//! # Chunk Assembly
//!
//! A chunk is the run of sections produced by one grammar string. Sections
//! are chained end to end: each one starts on the anchor where the previous
//! one ended, so a chunk has no gaps or overlaps.
//!
//! ```text
//! origin ─[i]─> ─[a]─> ─[i]─> ─[d]─> end
//! ```

use crate::grammar::ProductionString;
use crate::section::{Anchor, SectionSpawner, SectionType};

/// One section as placed in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedSection {
    /// Archetype of the section.
    pub kind: SectionType,
    /// Where the section starts.
    pub start: Anchor,
    /// Where the section ends (the next section's start).
    pub end: Anchor,
}

/// Sections of one chunk plus summary geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkLayout {
    sections: Vec<PlacedSection>,
    start: Anchor,
    end: Anchor,
    slope: f32,
    straightness: f32,
}

impl ChunkLayout {
    /// Spawns every section of `production`, starting at `origin`.
    ///
    /// The end marker and separators spawn nothing.
    pub fn assemble<S: SectionSpawner + ?Sized>(
        production: &ProductionString,
        spawner: &mut S,
        origin: Anchor,
    ) -> Self {
        let mut sections = Vec::with_capacity(production.terminal_count());
        let mut cursor = origin;

        for kind in production.sections() {
            let end = spawner.spawn_section(kind, cursor);
            sections.push(PlacedSection {
                kind,
                start: cursor,
                end,
            });
            cursor = end;
        }

        Self::from_sections(sections, origin)
    }

    /// The opening chunk of a level: a single start platform.
    pub fn start_platform<S: SectionSpawner + ?Sized>(spawner: &mut S, origin: Anchor) -> Self {
        let end = spawner.spawn_section(SectionType::Start, origin);
        Self::from_sections(
            vec![PlacedSection {
                kind: SectionType::Start,
                start: origin,
                end,
            }],
            origin,
        )
    }

    fn from_sections(sections: Vec<PlacedSection>, origin: Anchor) -> Self {
        let start = sections.first().map_or(origin, |s| s.start);
        let end = sections.last().map_or(origin, |s| s.end);

        let mut points: Vec<Anchor> = sections.iter().map(|s| s.start).collect();
        points.push(end);
        let (slope, straightness) = fit_line(&points);

        Self {
            sections,
            start,
            end,
            slope,
            straightness,
        }
    }

    /// Placed sections in spawn order.
    #[must_use]
    pub fn sections(&self) -> &[PlacedSection] {
        &self.sections
    }

    /// Start anchor of the first section.
    #[must_use]
    pub const fn start(&self) -> Anchor {
        self.start
    }

    /// End anchor of the last section, where the next chunk begins.
    #[must_use]
    pub const fn end(&self) -> Anchor {
        self.end
    }

    /// Number of sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Horizontal length in world units.
    #[must_use]
    pub fn unit_length(&self) -> f32 {
        self.end.x - self.start.x
    }

    /// Slope of the least-squares line through the section anchors.
    #[must_use]
    pub const fn slope(&self) -> f32 {
        self.slope
    }

    /// How far the anchors stay on that line: 1 for a straight chunk, toward
    /// 0 as the terrain gets bumpier.
    #[must_use]
    pub const fn straightness(&self) -> f32 {
        self.straightness
    }
}

/// Least-squares slope and straightness of a point run.
#[allow(clippy::cast_precision_loss)]
fn fit_line(points: &[Anchor]) -> (f32, f32) {
    if points.len() < 2 {
        return (0.0, 1.0);
    }

    let n = points.len() as f32;
    let mean_x = points.iter().map(|p| p.x).sum::<f32>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f32>() / n;

    let (mut sxy, mut sxx) = (0.0f32, 0.0f32);
    for p in points {
        let dx = p.x - mean_x;
        sxy += dx * (p.y - mean_y);
        sxx += dx * dx;
    }
    let slope = if sxx > f32::EPSILON { sxy / sxx } else { 0.0 };

    let residual = points
        .iter()
        .map(|p| {
            let r = (p.y - mean_y) - slope * (p.x - mean_x);
            r * r
        })
        .sum::<f32>()
        / n;

    (slope, 1.0 / (1.0 + residual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{generate_with, GrammarTable, ProductionRule, DEFAULT_MAX_ATTEMPTS};
    use crate::random::RandomSource;
    use crate::section::{SectionTemplate, TemplateSpawner};

    /// Always accepts and always picks the first rule or template.
    struct FirstChoice;

    impl RandomSource for FirstChoice {
        fn next_unit(&mut self) -> f32 {
            0.0
        }

        fn next_index(&mut self, _len: usize) -> usize {
            0
        }
    }

    fn spawner() -> TemplateSpawner<FirstChoice> {
        TemplateSpawner::new(
            vec![
                SectionTemplate::new(SectionType::Start, 10.0, 0.0),
                SectionTemplate::new(SectionType::Flat, 4.0, 0.0),
                SectionTemplate::new(SectionType::RampUp, 4.0, 2.0),
                SectionTemplate::new(SectionType::RampDown, 4.0, -2.0),
            ],
            FirstChoice,
        )
    }

    #[test]
    fn test_sections_chain_end_to_end() {
        let mut table = GrammarTable::master();
        let production = generate_with(&mut table, &mut FirstChoice, 5, DEFAULT_MAX_ATTEMPTS);
        let chunk = ChunkLayout::assemble(&production, &mut spawner(), Anchor::new(2.0, 1.0));

        assert_eq!(chunk.section_count(), 6);
        assert_eq!(chunk.start(), Anchor::new(2.0, 1.0));
        for pair in chunk.sections().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(chunk.end(), Anchor::new(26.0, 7.0));
        assert!((chunk.unit_length() - 24.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_start_platform() {
        let chunk = ChunkLayout::start_platform(&mut spawner(), Anchor::ORIGIN);

        assert_eq!(chunk.section_count(), 1);
        assert_eq!(chunk.sections()[0].kind, SectionType::Start);
        assert_eq!(chunk.end(), Anchor::new(10.0, 0.0));
    }

    #[test]
    fn test_flat_chunk_is_straight() {
        let mut table = GrammarTable::from_rules([ProductionRule::new('A', "i+i+A", 1.0)]).unwrap();
        let production = generate_with(&mut table, &mut FirstChoice, 4, DEFAULT_MAX_ATTEMPTS);
        let chunk = ChunkLayout::assemble(&production, &mut spawner(), Anchor::ORIGIN);

        assert!(chunk.slope().abs() < 1e-6);
        assert!((chunk.straightness() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bumpy_chunk_is_less_straight() {
        // "i+a+b+x": flat, ramp up, ramp down.
        let mut table = GrammarTable::from_rules([
            ProductionRule::new('A', "i+B+A", 1.0),
            ProductionRule::new('B', "a+b", 1.0),
        ])
        .unwrap();
        let production = generate_with(&mut table, &mut FirstChoice, 3, DEFAULT_MAX_ATTEMPTS);
        let chunk = ChunkLayout::assemble(&production, &mut spawner(), Anchor::ORIGIN);

        assert_eq!(chunk.section_count(), 3);
        assert!(chunk.straightness() < 1.0);
        assert!(chunk.end().y.abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_production_places_nothing() {
        let mut table = GrammarTable::master();
        let production = generate_with(&mut table, &mut FirstChoice, 0, DEFAULT_MAX_ATTEMPTS);
        let chunk = ChunkLayout::assemble(&production, &mut spawner(), Anchor::new(5.0, 5.0));

        assert_eq!(chunk.section_count(), 0);
        assert_eq!(chunk.start(), chunk.end());
        assert!(chunk.unit_length().abs() < f32::EPSILON);
    }
}
