//! Reaction emoji classification.

use gacha_types::{Emoji, KakeraKind};

/// Heart glyphs the game accepts as claim reactions.
/// https://emojipedia.org/hearts/
const HEART_EMOJIS: [&str; 18] = [
    "\u{1f498}", // cupid
    "\u{1f49d}", // gift_heart
    "\u{1f496}", // sparkling_heart
    "\u{1f497}", // heartpulse
    "\u{1f493}", // heartbeat
    "\u{1f49e}", // revolving_hearts
    "\u{1f495}", // two_hearts
    "\u{1f49f}", // heart_decoration
    "\u{2764}",  // heart
    "\u{1f9e1}", // orange_heart
    "\u{1f49b}", // yellow_heart
    "\u{1f49a}", // green_heart
    "\u{1f499}", // blue_heart
    "\u{1f49c}", // purple_heart
    "\u{1f90e}", // brown_heart
    "\u{1f5a4}", // black_heart
    "\u{1f90d}", // white_heart
    "\u{2665}",  // hearts
];

/// Strips the emoji-presentation selector some clients append to the
/// plain glyphs.
fn canonical_name(name: &str) -> &str {
    name.trim_end_matches('\u{fe0f}')
}

/// True when the reaction counts as a claim reaction.
///
/// With `any_custom_emote` set every emoji counts; some servers configure
/// the game with custom claim emotes, at the cost of false positives.
pub fn is_claim_emoji(emoji: &Emoji, any_custom_emote: bool) -> bool {
    if any_custom_emote {
        return true;
    }
    let name = canonical_name(&emoji.name);
    HEART_EMOJIS.iter().any(|heart| *heart == name)
}

/// Maps a currency emote to its kakera kind by the game's emote naming.
/// Only custom emotes qualify; a unicode emoji that happens to share the
/// name is not kakera.
pub fn kakera_kind(emoji: &Emoji) -> Option<KakeraKind> {
    emoji.id?;
    match emoji.name.to_lowercase().as_str() {
        "kakerap" => Some(KakeraKind::Purple),
        "kakera" => Some(KakeraKind::Blue),
        "kakerat" => Some(KakeraKind::Teal),
        "kakerag" => Some(KakeraKind::Green),
        "kakeray" => Some(KakeraKind::Yellow),
        "kakerao" => Some(KakeraKind::Orange),
        "kakerar" => Some(KakeraKind::Red),
        "kakeraw" => Some(KakeraKind::Rainbow),
        _ => None,
    }
}
