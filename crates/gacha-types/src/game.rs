//! Domain types for the gacha game itself.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Character identity extracted from one announcement. Values are stored
/// as announced; comparisons are case-insensitive on the matcher side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterInfo {
    pub name: String,
    pub anime: String,
}

impl CharacterInfo {
    pub fn new(name: &str, anime: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            anime: anime.trim().to_string(),
        }
    }
}

impl fmt::Display for CharacterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.anime.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.anime)
        }
    }
}

/// The eight currency reaction colors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum KakeraKind {
    Purple,
    Blue,
    Teal,
    Green,
    Yellow,
    Orange,
    Red,
    Rainbow,
}

impl KakeraKind {
    pub const ALL: [KakeraKind; 8] = [
        KakeraKind::Purple,
        KakeraKind::Blue,
        KakeraKind::Teal,
        KakeraKind::Green,
        KakeraKind::Yellow,
        KakeraKind::Orange,
        KakeraKind::Red,
        KakeraKind::Rainbow,
    ];

    /// Purple orbs are claimable without spending reaction power.
    pub fn consumes_power(self) -> bool {
        !matches!(self, KakeraKind::Purple)
    }

    /// Whether a reaction of this kind is covered by `targets`. Rainbow is
    /// the any-color wildcard: targeting it covers every kind, and a
    /// rainbow reaction is covered by any non-empty target set.
    pub fn is_targeted(self, targets: &HashSet<KakeraKind>) -> bool {
        targets.contains(&self)
            || targets.contains(&KakeraKind::Rainbow)
            || (self == KakeraKind::Rainbow && !targets.is_empty())
    }
}
