//! Token bundles: the value type every agent holds, needs and trades.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Color;

/// Raised when a bundle operation would drive a count out of the `u32` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A debit requested more tokens of a color than the bundle holds.
    #[error("cannot remove {requested} {color} tokens from a bundle holding {held}")]
    Underflow {
        /// Color being debited.
        color: Color,
        /// Tokens of that color held before the debit.
        held: u32,
        /// Tokens the debit attempted to remove.
        requested: u32,
    },
    /// A credit would push a count past the largest representable value.
    #[error("cannot add {added} {color} tokens to a bundle holding {held}")]
    Overflow {
        /// Color being credited.
        color: Color,
        /// Tokens of that color held before the credit.
        held: u32,
        /// Tokens the credit attempted to add.
        added: u32,
    },
}

/// Mapping from color to a non-negative token count.
///
/// Zero counts are never stored, so two bundles holding the same tokens always
/// compare equal and iteration only yields colors that are actually present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Color, u32>", into = "BTreeMap<Color, u32>")]
pub struct TokenBundle {
    counts: BTreeMap<Color, u32>,
}

impl TokenBundle {
    /// Bundle holding no tokens.
    pub const EMPTY: TokenBundle = TokenBundle {
        counts: BTreeMap::new(),
    };

    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens of `color` held; absent colors count as zero.
    #[must_use]
    pub fn count(&self, color: Color) -> u32 {
        self.counts.get(&color).copied().unwrap_or(0)
    }

    /// Reports whether at least one token of `color` is held.
    #[must_use]
    pub fn has(&self, color: Color) -> bool {
        self.count(color) > 0
    }

    /// Sum of all token counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.values().copied().fold(0, u32::saturating_add)
    }

    /// Reports whether the bundle holds no tokens at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates `(color, count)` pairs with non-zero counts in color order.
    pub fn iter(&self) -> impl Iterator<Item = (Color, u32)> + '_ {
        self.counts.iter().map(|(&color, &count)| (color, count))
    }

    /// Adds `amount` tokens of `color`, refusing to overflow.
    pub fn credit(&mut self, color: Color, amount: u32) -> Result<(), TokenError> {
        let total = self.checked_total(color, amount)?;
        self.set(color, total);
        Ok(())
    }

    /// Removes `amount` tokens of `color`, refusing to go below zero.
    pub fn debit(&mut self, color: Color, amount: u32) -> Result<(), TokenError> {
        if amount == 0 {
            return Ok(());
        }

        let held = self.count(color);
        let remaining = held.checked_sub(amount).ok_or(TokenError::Underflow {
            color,
            held,
            requested: amount,
        })?;
        self.set(color, remaining);
        Ok(())
    }

    /// Adds every count of `other` into this bundle.
    ///
    /// Nothing is added when any color would overflow.
    pub fn merge(&mut self, other: &TokenBundle) -> Result<(), TokenError> {
        let mut merged = Vec::with_capacity(other.counts.len());
        for (color, count) in other.iter() {
            merged.push((color, self.checked_total(color, count)?));
        }
        for (color, total) in merged {
            self.set(color, total);
        }
        Ok(())
    }

    /// Counts `amount` more occurrences of `color`, clamping at `u32::MAX`.
    ///
    /// Only for tallies derived from other data, never for holdings.
    pub(crate) fn tally(&mut self, color: Color, amount: u32) {
        let total = self.count(color).saturating_add(amount);
        self.set(color, total);
    }

    fn checked_total(&self, color: Color, amount: u32) -> Result<u32, TokenError> {
        let held = self.count(color);
        held.checked_add(amount).ok_or(TokenError::Overflow {
            color,
            held,
            added: amount,
        })
    }

    /// Per-color amount by which `self` exceeds `other`, omitting non-positive entries.
    #[must_use]
    pub fn surplus_over(&self, other: &TokenBundle) -> TokenBundle {
        self.iter()
            .map(|(color, count)| (color, count.saturating_sub(other.count(color))))
            .collect()
    }

    fn set(&mut self, color: Color, count: u32) {
        if count == 0 {
            let _ = self.counts.remove(&color);
        } else {
            let _ = self.counts.insert(color, count);
        }
    }
}

impl FromIterator<(Color, u32)> for TokenBundle {
    fn from_iter<I: IntoIterator<Item = (Color, u32)>>(iter: I) -> Self {
        let mut bundle = TokenBundle::new();
        for (color, count) in iter {
            bundle.tally(color, count);
        }
        bundle
    }
}

impl From<BTreeMap<Color, u32>> for TokenBundle {
    fn from(counts: BTreeMap<Color, u32>) -> Self {
        counts.into_iter().collect()
    }
}

impl From<TokenBundle> for BTreeMap<Color, u32> {
    fn from(bundle: TokenBundle) -> Self {
        bundle.counts
    }
}

impl fmt::Display for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (color, count)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{color}: {count}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_not_stored() {
        let mut bundle: TokenBundle = [(Color::Red, 0), (Color::Blue, 2)].into_iter().collect();
        assert_eq!(bundle.iter().collect::<Vec<_>>(), vec![(Color::Blue, 2)]);

        bundle.debit(Color::Blue, 2).expect("debit within balance");
        assert!(bundle.is_empty());
        assert_eq!(bundle, TokenBundle::new());
    }

    #[test]
    fn debit_refuses_to_go_negative() {
        let mut bundle: TokenBundle = [(Color::Green, 1)].into_iter().collect();
        assert_eq!(
            bundle.debit(Color::Green, 2),
            Err(TokenError::Underflow {
                color: Color::Green,
                held: 1,
                requested: 2,
            })
        );
        assert_eq!(bundle.count(Color::Green), 1, "failed debit must not mutate");
    }

    #[test]
    fn credit_and_merge_refuse_to_overflow() {
        let mut bundle: TokenBundle = [(Color::Green, u32::MAX - 1), (Color::Red, 1)].into_iter().collect();
        bundle.credit(Color::Green, 1).expect("fits exactly");
        assert_eq!(
            bundle.credit(Color::Green, 1),
            Err(TokenError::Overflow {
                color: Color::Green,
                held: u32::MAX,
                added: 1,
            })
        );
        assert_eq!(bundle.count(Color::Green), u32::MAX, "failed credit must not mutate");

        let incoming: TokenBundle = [(Color::Red, 2), (Color::Green, 1)].into_iter().collect();
        assert!(bundle.merge(&incoming).is_err());
        assert_eq!(bundle.count(Color::Red), 1, "failed merge must not apply any color");
    }

    #[test]
    fn surplus_over_drops_non_positive_entries() {
        let held: TokenBundle = [(Color::Red, 3), (Color::Blue, 1)].into_iter().collect();
        let reserved: TokenBundle = [(Color::Red, 1), (Color::Blue, 4)].into_iter().collect();
        let surplus = held.surplus_over(&reserved);
        assert_eq!(surplus.iter().collect::<Vec<_>>(), vec![(Color::Red, 2)]);
    }

    #[test]
    fn bundle_deserializes_from_color_table() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            tokens: TokenBundle,
        }

        let parsed: Wrapper =
            toml::from_str("[tokens]\ngreen = 1\nyellow = 0\npurple = 2\n").expect("parse");
        assert_eq!(parsed.tokens.count(Color::Green), 1);
        assert_eq!(parsed.tokens.count(Color::Purple), 2);
        assert_eq!(parsed.tokens.total(), 3);
        assert_eq!(parsed.tokens.to_string(), "{green: 1, purple: 2}");
    }
}
