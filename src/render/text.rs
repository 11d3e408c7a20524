//! Text measurement cache and ellipsis truncation.
//!
//! Canvas text measurement dominates frame time for text-heavy grids, so
//! widths are memoized. Truncation takes a measuring closure and does not
//! depend on a backend.

use std::borrow::Cow;
use std::collections::HashMap;

pub const TEXT_MEASURE_CACHE_CAP: usize = 4096;
const ELLIPSIS: &str = "\u{2026}";

/// Text widths grouped by font.
///
/// Cell text repeats heavily from frame to frame, so when the cache fills
/// up it is simply emptied and refilled from the next frames.
#[derive(Debug, Default)]
pub struct TextMeasureCache {
    fonts: HashMap<String, HashMap<String, f64>>,
    entries: usize,
    capacity: usize,
}

impl TextMeasureCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.fonts.clear();
        self.entries = 0;
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Cached width, measuring with `measure` on a miss.
    pub fn measure(&mut self, font: &str, text: &str, measure: impl FnOnce(&str) -> f64) -> f64 {
        if let Some(width) = self.fonts.get(font).and_then(|widths| widths.get(text)) {
            return *width;
        }
        let width = measure(text);
        if self.capacity == 0 {
            return width;
        }
        if self.entries >= self.capacity {
            self.clear();
        }
        self.fonts
            .entry(font.to_string())
            .or_default()
            .insert(text.to_string(), width);
        self.entries += 1;
        width
    }
}

/// Longest prefix of `text` that fits `max_width` once an ellipsis is
/// appended. Text that already fits is returned untouched.
pub fn truncate_with<'a>(
    text: &'a str,
    max_width: f64,
    mut measure: impl FnMut(&str) -> f64,
) -> Cow<'a, str> {
    if measure(text) <= max_width {
        return Cow::Borrowed(text);
    }
    let available = max_width - measure(ELLIPSIS);
    if available <= 0.0 {
        return Cow::Borrowed(ELLIPSIS);
    }

    let chars: Vec<char> = text.chars().collect();
    let mut low = 0;
    let mut high = chars.len();
    while low < high {
        let mid = (low + high).div_ceil(2);
        let prefix: String = chars.iter().take(mid).collect();
        if measure(&prefix) <= available {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    let mut truncated: String = chars.iter().take(low).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn ten_per_char(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    #[test]
    fn widths_are_kept_per_font() {
        let mut cache = TextMeasureCache::new(8);
        assert_eq!(cache.measure("11px Arial", "hello", |_| 12.0), 12.0);
        assert_eq!(cache.measure("11px Arial", "hello", |_| 99.0), 12.0);
        assert_eq!(cache.measure("600 11px Arial", "hello", |_| 14.0), 14.0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn full_cache_starts_over() {
        let mut cache = TextMeasureCache::new(2);
        cache.measure("11px Arial", "a", ten_per_char);
        cache.measure("11px Arial", "b", ten_per_char);
        cache.measure("11px Arial", "c", ten_per_char);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.measure("11px Arial", "a", |_| 0.0), 0.0);
    }

    #[test]
    fn zero_capacity_never_stores() {
        let mut cache = TextMeasureCache::new(0);
        cache.measure("11px Arial", "a", ten_per_char);
        assert!(cache.is_empty());
    }

    #[test]
    fn measure_only_calls_through_on_miss() {
        let mut cache = TextMeasureCache::new(8);
        let mut calls = 0;
        for _ in 0..3 {
            cache.measure("13px sans", "abc", |t| {
                calls += 1;
                ten_per_char(t)
            });
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn fitting_text_is_borrowed() {
        assert!(matches!(truncate_with("abc", 30.0, ten_per_char), Cow::Borrowed("abc")));
    }

    #[test]
    fn long_text_gets_ellipsis() {
        // 55px leaves 45px after the ellipsis: four characters.
        assert_eq!(truncate_with("abcdefgh", 55.0, ten_per_char), "abcd\u{2026}");
    }

    #[test]
    fn no_room_leaves_only_ellipsis() {
        assert_eq!(truncate_with("abcdefgh", 5.0, ten_per_char), "\u{2026}");
    }
}
