//! Splits cue text into emoji clusters.
//!
//! This is a narrow approximation of extended grapheme clusters that only
//! knows about emoji sequences: variation selectors, skin-tone modifiers,
//! ZWJ joins, regional indicators and keycaps.
//!
//! Limitations:
//! - a run of regional indicators is joined into one cluster rather than
//!   split into pairs, so adjacent flags such as `🇩🇪🇫🇷` form one cluster;
//! - generic combining marks and tag sequences (subdivision flags) are not
//!   recognised and come out as separate clusters.

use std::fmt;

pub const VARIATION_SELECTOR_16: char = '\u{FE0F}';
pub const ZERO_WIDTH_JOINER: char = '\u{200D}';
pub const COMBINING_KEYCAP: char = '\u{20E3}';

const SKIN_TONES: std::ops::RangeInclusive<char> = '\u{1F3FB}'..='\u{1F3FF}';
const REGIONAL_INDICATORS: std::ops::RangeInclusive<char> = '\u{1F1E6}'..='\u{1F1FF}';

/// One user-perceived emoji symbol, possibly spanning several scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmojiCluster(String);

impl EmojiCluster {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn chars(&self) -> std::str::Chars<'_> {
        self.0.chars()
    }

    fn is_whitespace(&self) -> bool {
        self.0.chars().all(char::is_whitespace)
    }
}

impl fmt::Display for EmojiCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for EmojiCluster {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Splits `text` into emoji clusters, dropping whitespace-only runs.
pub fn segment(text: &str) -> Vec<EmojiCluster> {
    let mut clusters = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(first) = chars.next() {
        let mut cluster = String::from(first);
        let mut last = first;

        while let Some(&next) = chars.peek() {
            if !extends(last, next) {
                break;
            }
            cluster.push(next);
            last = next;
            chars.next();
        }

        let cluster = EmojiCluster(cluster);
        if !cluster.is_whitespace() {
            clusters.push(cluster);
        }
    }

    clusters
}

fn extends(last: char, next: char) -> bool {
    next == VARIATION_SELECTOR_16
        || SKIN_TONES.contains(&next)
        || last == ZERO_WIDTH_JOINER
        || next == ZERO_WIDTH_JOINER
        || (REGIONAL_INDICATORS.contains(&last) && REGIONAL_INDICATORS.contains(&next))
        || next == COMBINING_KEYCAP
}
