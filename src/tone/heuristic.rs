//! Rule-based tone fallback: emoji, exclamation density and casual markers.

use regex::Regex;

use super::ToneHeuristic;
use crate::pipeline::types::Tone;

/// Emoji at or above this count read as casual.
const EMOJI_THRESHOLD: usize = 2;

/// Exclamation marks per hundred characters above which text reads as casual.
const EXCLAMATION_RATE_THRESHOLD: f64 = 2.0;

/// Heuristic tone classifier.
#[derive(Debug, Clone)]
pub struct RuleBasedTone {
    casual_markers: Regex,
}

impl RuleBasedTone {
    pub fn new() -> Self {
        Self {
            casual_markers: Regex::new(r"(?i)\b(lol|yo|hey|cheers)\b").unwrap(),
        }
    }
}

impl Default for RuleBasedTone {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneHeuristic for RuleBasedTone {
    fn infer(&self, text: &str) -> Tone {
        let chars = text.chars().count();
        if chars == 0 {
            return Tone::Formal;
        }

        let exclamations = text.chars().filter(|c| *c == '!').count();
        let exclamation_rate = exclamations as f64 / chars as f64 * 100.0;
        let emoji = text.chars().filter(|c| is_emoji(*c)).count();

        if emoji >= EMOJI_THRESHOLD
            || exclamation_rate > EXCLAMATION_RATE_THRESHOLD
            || self.casual_markers.is_match(text)
        {
            Tone::Casual
        } else {
            Tone::Formal
        }
    }
}

/// Pictographic code points: the Unicode `Extended_Pictographic` blocks plus
/// the older symbols that have an emoji presentation (arrows, geometric
/// shapes, `©`, `™`).
///
/// Counting is per code point, not per grapheme. Variation selectors and ZWJ
/// never count, keycap sequences (`1️⃣`) count zero, and a flag or a
/// skin-toned emoji counts two.
fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x00A9 | 0x00AE
            | 0x203C | 0x2049
            | 0x2122 | 0x2139
            | 0x2194..=0x2199   // arrows
            | 0x21A9..=0x21AA
            | 0x231A..=0x231B
            | 0x2328 | 0x23CF
            | 0x23E9..=0x23F3
            | 0x23F8..=0x23FA
            | 0x24C2
            | 0x25AA..=0x25AB
            | 0x25B6 | 0x25C0
            | 0x25FB..=0x25FE
            | 0x2600..=0x27BF   // misc symbols, dingbats
            | 0x2934..=0x2935
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50 | 0x2B55
            | 0x3030 | 0x303D
            | 0x3297 | 0x3299
            | 0x1F000..=0x1F0FF // mahjong, domino, playing cards
            | 0x1F10D..=0x1F10F
            | 0x1F12F
            | 0x1F16C..=0x1F171
            | 0x1F17E..=0x1F17F
            | 0x1F18E
            | 0x1F191..=0x1F19A
            | 0x1F1E6..=0x1F1FF // regional indicators
            | 0x1F201..=0x1F251 // enclosed ideographs
            | 0x1F300..=0x1F64F // symbols & pictographs, emoticons
            | 0x1F680..=0x1F6FF // transport & map
            | 0x1F774..=0x1F77F
            | 0x1F7D5..=0x1F7FF
            | 0x1F80C..=0x1F80F
            | 0x1F848..=0x1F84F
            | 0x1F85A..=0x1F85F
            | 0x1F888..=0x1F88F
            | 0x1F8AE..=0x1F8FF
            | 0x1F90C..=0x1FAFF // supplemental symbols & pictographs
            | 0x1FC00..=0x1FFFD
    )
}
