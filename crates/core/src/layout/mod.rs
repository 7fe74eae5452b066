//! Pixel geometry of the emoji row and the typing-reveal curve.

use crate::config::{LayoutConfig, SafeAreaConfig};

const REVEAL_EPSILON: f64 = 1e-9;

/// Left edge of the first emoji: the safe area centred in the frame, shifted
/// by its offset and left padding. Fractions are truncated toward zero.
pub fn start_x(video_width: u32, safe_area: &SafeAreaConfig) -> i32 {
    let centred = (f64::from(video_width) - f64::from(safe_area.width)) / 2.0;
    (centred + f64::from(safe_area.offset_x) + f64::from(safe_area.padding_left)) as i32
}

/// Top edge shared by every emoji in the composition.
pub fn top_y(_video_height: u32, layout: &LayoutConfig) -> i32 {
    match layout.center_y {
        Some(center) => {
            (f64::from(center) + f64::from(layout.offset_y) - f64::from(layout.emoji_size) / 2.0)
                as i32
        }
        None => layout.top_margin + layout.offset_y,
    }
}

/// Left edge of the emoji at position `index` within its cue.
pub fn emoji_x(start_x: i32, index: usize, layout: &LayoutConfig) -> i32 {
    start_x + index as i32 * (layout.emoji_size + layout.gap)
}

/// Number of emoji visible at `now` for a cue of `total` emoji.
///
/// The first emoji shows as soon as `now` passes `start` instead of after a
/// full `typing_duration / total` step.
pub fn shown_count(total: usize, now: f64, start: f64, typing_duration: f64) -> usize {
    if now < start {
        return 0;
    }
    if typing_duration <= 0.0 {
        return total;
    }

    let progress = ((now - start) / typing_duration).clamp(0.0, 1.0);
    let typed = (progress * total as f64 + REVEAL_EPSILON).floor() as usize;
    let first = usize::from(progress > 0.0);
    total.min(typed + first)
}
