//! Wishlist pattern compilation and matching.
//!
//! Entries are globs: `*` matches any run of characters, `?` exactly one,
//! everything else is literal. Matching is case-insensitive and anchored
//! at both ends, so `re*` matches `Remilia` but not `Biscuit Krueger`.

use gacha_types::{CharacterInfo, WishlistConfig};
use regex::{Regex, RegexBuilder};
use tracing::warn;

fn glob_to_pattern(entry: &str) -> String {
    format!(
        "^{}$",
        regex::escape(entry).replace("\\*", ".*").replace("\\?", ".")
    )
}

fn compile_alternation(entries: &[String]) -> Result<Option<Regex>, regex::Error> {
    if entries.is_empty() {
        return Ok(None);
    }
    let pattern = entries
        .iter()
        .map(|entry| format!("(?:{})", glob_to_pattern(entry)))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
}

#[derive(Debug)]
struct AnimeMatcher {
    pattern: Regex,
    excluding: Option<Regex>,
}

/// Compiled wishlist. The default value matches nothing.
#[derive(Debug, Default)]
pub struct WishlistMatcher {
    characters: Option<Regex>,
    animes: Vec<AnimeMatcher>,
    wished_by: Vec<u64>,
}

impl WishlistMatcher {
    /// Compiles the configured wishlist, failing on an invalid pattern.
    pub fn try_compile(config: &WishlistConfig) -> Result<Self, regex::Error> {
        let characters = compile_alternation(&config.characters)?;

        let mut animes = Vec::with_capacity(config.animes.len());
        for wish in &config.animes {
            animes.push(AnimeMatcher {
                pattern: RegexBuilder::new(&glob_to_pattern(&wish.name))
                    .case_insensitive(true)
                    .build()?,
                excluding: compile_alternation(&wish.excluding)?,
            });
        }

        Ok(Self {
            characters,
            animes,
            wished_by: config.wished_by.clone(),
        })
    }

    /// Compiles the configured wishlist. A pattern that fails to build
    /// falls back to a matcher that never matches instead of serving a
    /// stale wishlist.
    pub fn compile_or_empty(config: &WishlistConfig) -> Self {
        match Self::try_compile(config) {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!("Could not build wishlist matcher, nothing will match: {}", e);
                Self::default()
            }
        }
    }

    /// True when the character's name is wished, or their anime is wished
    /// and the entry's exclusion list does not name them.
    pub fn is_wished(&self, character: &CharacterInfo) -> bool {
        if let Some(characters) = &self.characters {
            if characters.is_match(&character.name) {
                return true;
            }
        }

        self.animes.iter().any(|anime| {
            anime.pattern.is_match(&character.anime)
                && !anime
                    .excluding
                    .as_ref()
                    .map_or(false, |excluding| excluding.is_match(&character.name))
        })
    }

    /// True when any of the mentioned users is a trusted wisher.
    pub fn is_wished_by(&self, mentions: &[u64]) -> bool {
        mentions.iter().any(|id| self.wished_by.contains(id))
    }
}
