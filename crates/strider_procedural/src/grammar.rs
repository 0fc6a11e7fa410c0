//! # Terrain Grammar
//!
//! A probabilistic context-free grammar that rewrites the start symbol into a
//! string of section terminals.
//!
//! ## Master Rule Set
//!
//! ```text
//! A = i + (a | b | c | d | e | f | g | B) + A     obstacle after a flat run
//! B = (a | c | e) + (b | d | f)                   paired obstacle: climb, then descend
//! A = x                                           once enough sections exist
//! ```
//!
//! ## Selection
//!
//! Each rule carries a weight that acts as an independent acceptance
//! probability, not a share of a distribution. A candidate picked uniformly is
//! kept if a `[0, 1)` draw falls under its weight, and the weight is halved so
//! the same rule becomes less likely next time. After a bounded number of
//! rejected candidates a rule is picked uniformly, ignoring weights.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ProceduralError, ProceduralResult};
use crate::random::{GenerationSeed, RandomSource, SeededRandom};
use crate::section::SectionType;

/// Non-terminal every production starts from.
pub const START_SYMBOL: char = 'A';

/// Non-terminal for an ascent followed by a descent.
pub const PAIRED_SYMBOL: char = 'B';

/// Terminal that closes a chunk.
pub const END_MARKER: char = 'x';

/// Terminal-neutral separator used in right-hand sides.
pub const SEPARATOR: char = '+';

/// Weighted attempts per expansion before the uniform fallback.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Grouping characters removed from finished productions.
const GROUPING: [char; 2] = ['[', ']'];

/// The hard-coded rule set, all with weight 1.
const MASTER_RULES: [(char, &str); 17] = [
    ('A', "i+a+A"),
    ('A', "i+b+A"),
    ('A', "i+c+A"),
    ('A', "i+d+A"),
    ('A', "i+e+A"),
    ('A', "i+f+A"),
    ('A', "i+g+A"),
    ('A', "i+B+A"),
    ('B', "a+b"),
    ('B', "a+d"),
    ('B', "a+f"),
    ('B', "c+b"),
    ('B', "c+d"),
    ('B', "c+f"),
    ('B', "e+b"),
    ('B', "e+d"),
    ('B', "e+f"),
];

fn default_weight() -> f32 {
    1.0
}

/// A single rewrite rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionRule {
    /// Non-terminal this rule rewrites.
    pub lhs: char,
    /// Replacement text.
    pub rhs: String,
    /// Acceptance probability, halved every time the rule is accepted.
    #[serde(default = "default_weight")]
    pub weight: f32,
}

impl ProductionRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(lhs: char, rhs: impl Into<String>, weight: f32) -> Self {
        Self {
            lhs,
            rhs: rhs.into(),
            weight,
        }
    }

    fn validate(&self) -> ProceduralResult<()> {
        if !self.lhs.is_ascii_uppercase() {
            return Err(ProceduralError::InvalidRule {
                lhs: self.lhs,
                rhs: self.rhs.clone(),
                reason: "left-hand side must be an uppercase letter",
            });
        }
        if self.rhs.is_empty() {
            return Err(ProceduralError::InvalidRule {
                lhs: self.lhs,
                rhs: self.rhs.clone(),
                reason: "right-hand side is empty",
            });
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ProceduralError::InvalidWeight {
                lhs: self.lhs,
                rhs: self.rhs.clone(),
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Rules grouped by the non-terminal they rewrite, ordered by symbol.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrammarTable {
    rules: BTreeMap<char, Vec<ProductionRule>>,
}

impl GrammarTable {
    /// The built-in rule set.
    #[must_use]
    pub fn master() -> Self {
        let mut table = Self::default();
        for (lhs, rhs) in MASTER_RULES {
            table.insert(ProductionRule::new(lhs, rhs, default_weight()));
        }
        table
    }

    /// Builds a validated table from arbitrary rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule is malformed, the start symbol has no rules,
    /// a right-hand side references a non-terminal with no rules, or some
    /// symbol can keep rewriting without ever emitting a terminal.
    pub fn from_rules(rules: impl IntoIterator<Item = ProductionRule>) -> ProceduralResult<Self> {
        let mut table = Self::default();
        for rule in rules {
            rule.validate()?;
            table.insert(rule);
        }
        table.validate()?;
        Ok(table)
    }

    fn insert(&mut self, rule: ProductionRule) {
        self.rules.entry(rule.lhs).or_default().push(rule);
    }

    /// Checks that the table can drive generation.
    ///
    /// # Errors
    ///
    /// See [`GrammarTable::from_rules`].
    pub fn validate(&self) -> ProceduralResult<()> {
        if self.rules(START_SYMBOL).is_empty() {
            return Err(ProceduralError::MissingStartSymbol(START_SYMBOL));
        }
        for rule in self.iter() {
            if let Some(symbol) = rule
                .rhs
                .chars()
                .find(|c| c.is_ascii_uppercase() && !self.is_non_terminal(*c))
            {
                return Err(ProceduralError::UndefinedNonTerminal {
                    symbol,
                    lhs: rule.lhs,
                });
            }
        }
        if let Some(symbol) = self.silent_cycle() {
            return Err(ProceduralError::UnproductiveSymbol { symbol });
        }
        Ok(())
    }

    /// Symbols that can vanish without emitting a terminal.
    fn erasable(&self) -> BTreeSet<char> {
        let mut erasable = BTreeSet::new();
        loop {
            let before = erasable.len();
            for rule in self.iter() {
                let vanishes = rule.rhs.chars().all(|c| {
                    !c.is_ascii_lowercase() && (!c.is_ascii_uppercase() || erasable.contains(&c))
                });
                if vanishes {
                    erasable.insert(rule.lhs);
                }
            }
            if erasable.len() == before {
                return erasable;
            }
        }
    }

    /// First symbol (in symbol order) that can become the leftmost
    /// non-terminal again through rewrites that emit nothing.
    ///
    /// Generation always rewrites the leftmost non-terminal, so only the
    /// prefix of a silent right-hand side up to the first symbol that cannot
    /// vanish is reachable next.
    fn silent_cycle(&self) -> Option<char> {
        let erasable = self.erasable();
        let mut edges: BTreeMap<char, BTreeSet<char>> = BTreeMap::new();
        for rule in self.iter().filter(|r| !r.rhs.chars().any(|c| c.is_ascii_lowercase())) {
            let next = edges.entry(rule.lhs).or_default();
            for symbol in rule.rhs.chars().filter(char::is_ascii_uppercase) {
                next.insert(symbol);
                if !erasable.contains(&symbol) {
                    break;
                }
            }
        }

        edges.keys().copied().find(|&start| {
            let mut seen = BTreeSet::new();
            let mut stack: Vec<char> = edges.get(&start).into_iter().flatten().copied().collect();
            while let Some(symbol) = stack.pop() {
                if symbol == start {
                    return true;
                }
                if seen.insert(symbol) {
                    stack.extend(edges.get(&symbol).into_iter().flatten().copied());
                }
            }
            false
        })
    }

    /// Rules rewriting `lhs`, in insertion order.
    #[must_use]
    pub fn rules(&self, lhs: char) -> &[ProductionRule] {
        self.rules.get(&lhs).map(Vec::as_slice).unwrap_or_default()
    }

    /// True if `symbol` has at least one rule.
    #[inline]
    #[must_use]
    pub fn is_non_terminal(&self, symbol: char) -> bool {
        self.rules.get(&symbol).is_some_and(|rules| !rules.is_empty())
    }

    /// Iterates over every rule.
    pub fn iter(&self) -> impl Iterator<Item = &ProductionRule> {
        self.rules.values().flatten()
    }

    /// Total number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Picks the replacement for one occurrence of `symbol`.
    fn select<R: RandomSource + ?Sized>(
        &mut self,
        symbol: char,
        rng: &mut R,
        max_attempts: u32,
    ) -> Option<String> {
        let rules = self.rules.get_mut(&symbol).filter(|rules| !rules.is_empty())?;

        for _ in 0..max_attempts {
            let pick = rng.next_index(rules.len());
            let rule = &mut rules[pick];
            if rng.next_unit() < rule.weight {
                rule.weight /= 2.0;
                return Some(rule.rhs.clone());
            }
        }

        let pick = rng.next_index(rules.len());
        let rule = &rules[pick];
        trace!(%symbol, rhs = %rule.rhs, "weighted selection exhausted, uniform fallback");
        Some(rule.rhs.clone())
    }
}

/// Finished output of the grammar.
///
/// Lowercase letters are section terminals, [`END_MARKER`] closes the chunk
/// and [`SEPARATOR`] carries no meaning. Uppercase letters only survive when
/// generation stopped early.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProductionString(String);

impl ProductionString {
    /// Returns the raw text, separators included.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the production, returning the raw text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of terminal (lowercase) symbols.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        count_terminals(&self.0)
    }

    /// The text with separators removed, e.g. `"iaiaiax"`.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.chars().filter(|&c| c != SEPARATOR).collect()
    }

    /// Section archetypes in spawn order. The end marker is skipped.
    pub fn sections(&self) -> impl Iterator<Item = SectionType> + '_ {
        self.0.chars().filter_map(SectionType::from_terminal)
    }

    /// True if the production closes with the end marker.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.0.ends_with(END_MARKER)
    }
}

impl fmt::Display for ProductionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductionString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn count_terminals(text: &str) -> usize {
    text.chars().filter(char::is_ascii_lowercase).count()
}

/// Expands the start symbol until at least `target` terminals exist.
///
/// Weight decay is written back into `table`, so the caller decides whether
/// it carries over to the next call. Rewriting always restarts from the
/// leftmost non-terminal. If no non-terminal remains the loop stops early.
///
/// Rewrites are capped at `(target + 1) * (rule_count + 1)`. Validated
/// tables never reach the cap; if it is hit the production is returned as is.
///
/// A `target` of 0 produces `"x"`.
pub fn generate_with<R: RandomSource + ?Sized>(
    table: &mut GrammarTable,
    rng: &mut R,
    target: usize,
    max_attempts: u32,
) -> ProductionString {
    let mut current = String::from(START_SYMBOL);
    let mut terminals = 0;
    let max_rewrites = target
        .saturating_add(1)
        .saturating_mul(table.rule_count().saturating_add(1));
    let mut rewrites = 0;

    while terminals < target {
        if rewrites == max_rewrites {
            warn!(%current, terminals, target, rewrites, "rewrite limit reached, stopping early");
            break;
        }
        rewrites += 1;

        let Some((index, symbol)) = current.char_indices().find(|&(_, c)| table.is_non_terminal(c))
        else {
            debug!(%current, terminals, target, "no non-terminal left, stopping early");
            break;
        };
        let Some(replacement) = table.select(symbol, rng, max_attempts) else {
            break;
        };

        current.replace_range(index..index + symbol.len_utf8(), &replacement);
        terminals = count_terminals(&current);
    }

    if current.ends_with(START_SYMBOL) {
        current.pop();
        current.push(END_MARKER);
    }
    current.retain(|c| !GROUPING.contains(&c));

    ProductionString(current)
}

/// Stateful generator owning its rule table and random stream.
///
/// With `persist_weights` off every call starts from the default weights.
/// With it on, weight decay accumulates across calls until
/// [`reset_weights`](Self::reset_weights), which makes repeats rarer the
/// longer a level runs.
pub struct GrammarGenerator<R = SeededRandom> {
    defaults: GrammarTable,
    live: GrammarTable,
    rng: R,
    max_attempts: u32,
    persist_weights: bool,
    generated: u64,
}

impl GrammarGenerator<SeededRandom> {
    /// Generator over the master rule set.
    #[must_use]
    pub fn new(seed: GenerationSeed) -> Self {
        Self::with_source(
            GrammarTable::master(),
            SeededRandom::new(seed.derive(GenerationSeed::GRAMMAR_STREAM)),
        )
    }
}

impl<R: RandomSource> GrammarGenerator<R> {
    /// Generator over an explicit table and random source.
    #[must_use]
    pub fn with_source(table: GrammarTable, rng: R) -> Self {
        Self {
            live: table.clone(),
            defaults: table,
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            persist_weights: false,
            generated: 0,
        }
    }

    /// Sets the weighted attempts per expansion.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Keeps weight decay between calls.
    #[must_use]
    pub fn with_persisted_weights(mut self, persist: bool) -> Self {
        self.persist_weights = persist;
        self
    }

    /// Generates one production with at least `target` terminals.
    pub fn generate(&mut self, target: usize) -> ProductionString {
        if !self.persist_weights {
            self.live.clone_from(&self.defaults);
        }

        let production = generate_with(&mut self.live, &mut self.rng, target, self.max_attempts);
        self.generated += 1;
        debug!(
            production = %production,
            terminals = production.terminal_count(),
            call = self.generated,
            "production generated"
        );
        production
    }

    /// Restores every weight to its default.
    pub fn reset_weights(&mut self) {
        self.live.clone_from(&self.defaults);
    }

    /// Current (possibly decayed) rule table.
    #[must_use]
    pub fn table(&self) -> &GrammarTable {
        &self.live
    }

    /// Whether weight decay carries over between calls.
    #[must_use]
    pub const fn persists_weights(&self) -> bool {
        self.persist_weights
    }

    /// Number of productions generated so far.
    #[must_use]
    pub const fn generated_count(&self) -> u64 {
        self.generated
    }
}
