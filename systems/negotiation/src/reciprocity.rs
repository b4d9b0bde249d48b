//! Pluggable reciprocity scoring for the trade history kept per peer.

use std::fmt;

use colored_trails_core::ReciprocityRule;

/// Rule deciding how a giver's score toward a peer evolves.
pub trait ReciprocityScoring: fmt::Debug {
    /// Score after an offer of `amount` tokens was made to the peer.
    fn on_offer(&self, score: f64, amount: u32) -> f64;

    /// Score carried into the next round.
    fn on_round_end(&self, score: f64) -> f64;
}

/// Scores grow by a fixed increment per offer and never shrink.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonotonicReciprocity {
    increment: f64,
}

impl MonotonicReciprocity {
    /// Creates the rule with the given per-offer increment.
    #[must_use]
    pub const fn new(increment: f64) -> Self {
        Self { increment }
    }
}

impl ReciprocityScoring for MonotonicReciprocity {
    fn on_offer(&self, score: f64, _amount: u32) -> f64 {
        score + self.increment
    }

    fn on_round_end(&self, score: f64) -> f64 {
        score
    }
}

/// Scores grow per offer and fade geometrically between rounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecayingReciprocity {
    increment: f64,
    retention: f64,
}

impl DecayingReciprocity {
    /// Creates the rule; `retention` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(increment: f64, retention: f64) -> Self {
        Self {
            increment,
            retention: retention.clamp(0.0, 1.0),
        }
    }
}

impl ReciprocityScoring for DecayingReciprocity {
    fn on_offer(&self, score: f64, _amount: u32) -> f64 {
        score + self.increment
    }

    fn on_round_end(&self, score: f64) -> f64 {
        score * self.retention
    }
}

/// Builds the scoring rule described by the configuration.
#[must_use]
pub fn reciprocity_from(rule: ReciprocityRule) -> Box<dyn ReciprocityScoring> {
    match rule {
        ReciprocityRule::Monotonic { increment } => Box::new(MonotonicReciprocity::new(increment)),
        ReciprocityRule::Decaying {
            increment,
            retention,
        } => Box::new(DecayingReciprocity::new(increment, retention)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_scores_never_decay() {
        let rule = MonotonicReciprocity::new(0.5);
        let score = rule.on_offer(rule.on_offer(0.0, 3), 1);
        assert!((score - 1.0).abs() < f64::EPSILON);
        assert!((rule.on_round_end(score) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decaying_scores_fade_between_rounds() {
        let rule = reciprocity_from(ReciprocityRule::Decaying {
            increment: 1.0,
            retention: 0.5,
        });
        let score = rule.on_offer(0.0, 1);
        assert!((rule.on_round_end(score) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn retention_is_clamped() {
        let rule = DecayingReciprocity::new(1.0, 3.0);
        assert!((rule.on_round_end(2.0) - 2.0).abs() < f64::EPSILON);
    }
}
