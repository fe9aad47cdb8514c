//! Qualitative behaviour patterns ("explorer", "easily_scared", ...).
//!
//! Detection is a fixed rule table evaluated once per analysis cycle. The
//! [`PatternBook`] persists across cycles: re-detecting a pattern averages
//! the old and new weight, so a label strengthens or fades gradually.

use crate::spatial::MovementAnalysis;
use crate::types::FearKind;
use serde::{Deserialize, Serialize};

/// A named behavioural tendency with a confidence weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorPattern {
    /// Stable identifier, e.g. `"explorer"`.
    pub name: String,
    /// Human-readable explanation.
    pub description: String,
    /// Confidence; higher is stronger.
    pub weight: f32,
}

impl BehaviorPattern {
    /// Create a new pattern.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            weight,
        }
    }
}

/// Inputs for one round of pattern detection.
#[derive(Debug, Clone, Copy)]
pub struct PatternInputs<'a> {
    /// Movement statistics, if at least two position samples exist.
    pub movement: Option<&'a MovementAnalysis>,
    /// Share of recorded actions that were interactions, if any actions exist.
    pub interaction_rate: Option<f32>,
    /// Mean response strength across fear kinds with data.
    pub mean_response: Option<f32>,
    /// Mean response strength per fear kind, `None` where no data exists.
    pub per_fear: &'a [Option<f32>; FearKind::COUNT],
}

/// Evaluate the rule table. Output order follows the table.
#[must_use]
pub fn detect(inputs: &PatternInputs<'_>) -> Vec<BehaviorPattern> {
    let mut found = Vec::new();

    if let Some(m) = inputs.movement {
        if m.explored_area > 500.0 && m.path_repetition < 2.0 {
            found.push(BehaviorPattern::new(
                "explorer",
                "Roams widely without lingering in one place",
                0.8 - m.path_repetition / 10.0,
            ));
        }
        if m.average_speed < 1.5 && m.direction_changes > 30 {
            found.push(BehaviorPattern::new(
                "cautious",
                "Moves slowly and changes direction often",
                0.9 - m.average_speed / 3.0,
            ));
        }
        if m.average_speed > 2.0 && m.direction_changes < 15 {
            found.push(BehaviorPattern::new(
                "determined",
                "Moves quickly along a chosen heading",
                0.7 + m.average_speed / 5.0,
            ));
        }
        if m.explored_area < 200.0 && m.path_repetition > 3.0 {
            found.push(BehaviorPattern::new(
                "indecisive",
                "Keeps returning to the same few places",
                0.6 + m.path_repetition / 5.0,
            ));
        }
    }

    if let Some(rate) = inputs.interaction_rate {
        if rate > 0.3 {
            found.push(BehaviorPattern::new(
                "interactive",
                "Handles everything within reach",
                0.7 + rate,
            ));
        }
        if rate < 0.1 {
            found.push(BehaviorPattern::new(
                "passive",
                "Rarely touches the environment",
                0.6 + (0.1 - rate),
            ));
        }
    }

    if let Some(mean) = inputs.mean_response {
        if mean < 0.3 {
            found.push(BehaviorPattern::new(
                "fearless",
                "Reacts weakly to frightening events",
                0.8 - mean,
            ));
        }
        if mean > 0.7 {
            found.push(BehaviorPattern::new(
                "easily_scared",
                "Reacts strongly to frightening events",
                0.7 + mean,
            ));
        }
    }

    if let Some(r) = inputs.per_fear[FearKind::SuddenNoises.index()].filter(|r| *r > 0.8) {
        found.push(BehaviorPattern::new(
            "startles_easily",
            "Particularly sensitive to sudden sounds",
            0.7 + r,
        ));
    }
    if let Some(r) = inputs.per_fear[FearKind::Creatures.index()].filter(|r| *r > 0.8) {
        found.push(BehaviorPattern::new(
            "monster_phobia",
            "Particularly afraid of creatures",
            0.7 + r,
        ));
    }

    found
}

/// Accumulated patterns, kept sorted by descending weight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternBook {
    patterns: Vec<BehaviorPattern>,
}

impl PatternBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern. An existing pattern with the same name takes the mean
    /// of its old and the new weight.
    pub fn add(&mut self, pattern: BehaviorPattern) {
        if let Some(existing) = self.patterns.iter_mut().find(|p| p.name == pattern.name) {
            existing.weight = (existing.weight + pattern.weight) / 2.0;
            existing.description = pattern.description;
        } else {
            self.patterns.push(pattern);
        }
        self.patterns.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    }

    /// Add several patterns.
    pub fn extend(&mut self, patterns: impl IntoIterator<Item = BehaviorPattern>) {
        for pattern in patterns {
            self.add(pattern);
        }
    }

    /// The `n` strongest patterns (fewer if fewer exist).
    #[must_use]
    pub fn top(&self, n: usize) -> &[BehaviorPattern] {
        &self.patterns[..n.min(self.patterns.len())]
    }

    /// Look up a pattern by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BehaviorPattern> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// Number of distinct patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern has been detected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FEAR: [Option<f32>; FearKind::COUNT] = [None; FearKind::COUNT];

    fn inputs<'a>(
        movement: Option<&'a MovementAnalysis>,
        per_fear: &'a [Option<f32>; FearKind::COUNT],
    ) -> PatternInputs<'a> {
        PatternInputs {
            movement,
            interaction_rate: None,
            mean_response: None,
            per_fear,
        }
    }

    fn names(found: &[BehaviorPattern]) -> Vec<&str> {
        found.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn duplicate_names_average() {
        let mut book = PatternBook::new();
        book.add(BehaviorPattern::new("explorer", "", 0.8));
        book.add(BehaviorPattern::new("explorer", "", 0.6));
        assert_eq!(book.len(), 1);
        assert!((book.get("explorer").unwrap().weight - 0.7).abs() < 1e-6);
    }

    #[test]
    fn book_sorted_by_weight() {
        let mut book = PatternBook::new();
        book.add(BehaviorPattern::new("passive", "", 0.65));
        book.add(BehaviorPattern::new("easily_scared", "", 1.5));
        book.add(BehaviorPattern::new("explorer", "", 0.8));
        let top = book.top(2);
        assert_eq!(names(top), vec!["easily_scared", "explorer"]);
        assert_eq!(book.top(10).len(), 3);
    }

    #[test]
    fn explorer_rule() {
        let m = MovementAnalysis {
            average_speed: 1.8,
            direction_changes: 20,
            explored_area: 600.0,
            path_repetition: 1.0,
            preferred_areas: Vec::new(),
        };
        let found = detect(&inputs(Some(&m), &NO_FEAR));
        assert_eq!(names(&found), vec!["explorer"]);
        assert!((found[0].weight - 0.7).abs() < 1e-6);
    }

    #[test]
    fn movement_rules_need_movement() {
        let found = detect(&inputs(None, &NO_FEAR));
        assert!(found.is_empty());
    }

    #[test]
    fn interaction_rules() {
        let mut i = inputs(None, &NO_FEAR);
        i.interaction_rate = Some(0.5);
        let found = detect(&i);
        assert_eq!(names(&found), vec!["interactive"]);
        assert!((found[0].weight - 1.2).abs() < 1e-6);

        i.interaction_rate = Some(0.0);
        let found = detect(&i);
        assert_eq!(names(&found), vec!["passive"]);
        assert!((found[0].weight - 0.7).abs() < 1e-6);
    }

    #[test]
    fn fear_rules() {
        let mut per_fear = NO_FEAR;
        per_fear[FearKind::SuddenNoises.index()] = Some(0.9);
        per_fear[FearKind::Creatures.index()] = Some(0.85);
        let mut i = inputs(None, &per_fear);
        i.mean_response = Some(0.875);
        let found = detect(&i);
        assert_eq!(
            names(&found),
            vec!["easily_scared", "startles_easily", "monster_phobia"]
        );
    }
}
