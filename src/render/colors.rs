//! Color helpers for grid rendering.
//!
//! Theme colors are CSS strings and go to the canvas unchanged. Only the
//! few places that blend or pick a text color parse them.

pub type CssColor = String;

/// A parsed `#RRGGBB[AA]`, `rgb()` or `rgba()` color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub fn parse(color: &str) -> Option<Self> {
        let color = color.trim();
        if let Some(hex) = color.strip_prefix('#') {
            return Self::from_hex_digits(hex);
        }
        let (args, has_alpha) = if let Some(rest) = color.strip_prefix("rgba(") {
            (rest, true)
        } else {
            (color.strip_prefix("rgb(")?, false)
        };
        let mut parts = args.strip_suffix(')')?.split(',').map(str::trim);
        let r = parts.next()?.parse().ok()?;
        let g = parts.next()?.parse().ok()?;
        let b = parts.next()?.parse().ok()?;
        let a = if has_alpha {
            parts.next()?.parse().ok()?
        } else {
            1.0
        };
        parts.next().is_none().then_some(Self { r, g, b, a })
    }

    fn from_hex_digits(hex: &str) -> Option<Self> {
        let byte = |at: usize| u8::from_str_radix(hex.get(at..at + 2)?, 16).ok();
        let a = match hex.len() {
            6 => 1.0,
            8 => f64::from(byte(6)?) / 255.0,
            _ => return None,
        };
        Some(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a,
        })
    }

    /// Perceived brightness in 0..=1 (Rec. 601 weights).
    pub fn brightness(self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    pub fn to_css(self) -> CssColor {
        format!("rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.a)
    }
}

/// Channel values of `color`, alpha in 0..=1.
pub fn parse_color_rgba(color: &str) -> Option<(u8, u8, u8, f64)> {
    Rgba::parse(color).map(|c| (c.r, c.g, c.b, c.a))
}

/// `color` at the given opacity. Named colors are returned as is.
pub fn with_alpha(color: &str, alpha: f64) -> CssColor {
    match Rgba::parse(color) {
        Some(c) => Rgba {
            a: alpha.clamp(0.0, 1.0),
            ..c
        }
        .to_css(),
        None => color.to_string(),
    }
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: &str) -> &'static str {
    match Rgba::parse(background) {
        Some(c) if c.brightness() <= 0.5 => palette::WHITE,
        _ => palette::BLACK,
    }
}

/// Fixed colors not covered by the theme
pub mod palette {
    pub const WHITE: &str = "#FFFFFF";
    pub const BLACK: &str = "#000000";

    /// Placeholder bar for loading cells
    pub const SKELETON: &str = "#E5E7EB";

    /// Avatar fill when a user has no image
    pub const AVATAR: &str = "#9CA3AF";

    /// Checkbox outline
    pub const CHECKBOX_BORDER: &str = "#9CA3AF";

    /// Unfilled rating icon
    pub const RATING_EMPTY: &str = "#E5E7EB";

    /// Chart line when the cell gives no color
    pub const CHART_LINE: &str = "#3B82F6";

    /// Drop indicator while reordering
    pub const DROP_INDICATOR: &str = "#3B82F6";
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

    #[test]
    fn parses_hex_and_functional_forms() {
        assert_eq!(parse_color_rgba("#FF8040"), Some((255, 128, 64, 1.0)));
        assert_eq!(parse_color_rgba(" rgb(1, 2, 3) "), Some((1, 2, 3, 1.0)));
        assert_eq!(parse_color_rgba("rgba(1,2,3,0.25)"), Some((1, 2, 3, 0.25)));
        let (r, g, b, a) = parse_color_rgba("#FF000080").unwrap();
        assert_eq!((r, g, b), (255, 0, 0));
        assert!((a - 0.5).abs() < 0.01);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(parse_color_rgba("#FFF"), None);
        assert_eq!(parse_color_rgba("rgb(1, 2)"), None);
        assert_eq!(parse_color_rgba("rgb(1, 2, 3, 4)"), None);
        assert_eq!(parse_color_rgba("rgba(300, 0, 0, 1)"), None);
        assert_eq!(parse_color_rgba("blue"), None);
    }

    #[test]
    fn alpha_replaces_existing_opacity() {
        assert_eq!(with_alpha("#3B82F6", 0.1), "rgba(59, 130, 246, 0.10)");
        assert_eq!(with_alpha("rgba(59, 130, 246, 0.9)", 2.0), "rgba(59, 130, 246, 1.00)");
        assert_eq!(with_alpha("red", 0.1), "red");
    }

    #[test]
    fn text_contrasts_with_chip() {
        assert_eq!(contrast_text("#111827"), palette::WHITE);
        assert_eq!(contrast_text("#FDE68A"), palette::BLACK);
        assert_eq!(contrast_text("transparent"), palette::BLACK);
    }
}
