use std::fmt;

pub const DEFAULT_COLORS: [&str; 20] = [
    "#ef4444", "#f97316", "#f59e0b", "#eab308", "#84cc16", "#22c55e", "#14b8a6", "#06b6d4",
    "#0ea5e9", "#3b82f6", "#6366f1", "#8b5cf6", "#a855f7", "#d946ef", "#ec4899", "#f43f5e",
    "#f87171", "#10b981", "#2dd4bf", "#64748b",
];

pub const DEFAULT_ACTIVITY_COLOR: &str = "#3b82f6";
pub const WHITE: Rgb = Rgb::new(255, 255, 255);
/// Stand-in for colors that are not `#rrggbb`.
pub const FALLBACK_COLOR: Rgb = Rgb::new(0xcb, 0xd5, 0xe1);
/// Join color of tiles without an activity.
pub const NEUTRAL_JOIN_COLOR: Rgb = Rgb::new(0xe2, 0xe8, 0xf0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parses `#rrggbb` (case-insensitive). Shorthand and named colors are rejected.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |offset: usize| u8::from_str_radix(&digits[offset..offset + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn parse_or_fallback(hex: &str) -> Self {
        Rgb::parse_hex(hex).unwrap_or(FALLBACK_COLOR)
    }

    /// Linear blend, `ratio` of the way from `self` to `other`.
    pub fn mix(self, other: Rgb, ratio: f64) -> Self {
        let blend = |from: u8, to: u8| {
            let from = f64::from(from);
            (from + (f64::from(to) - from) * ratio).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
        )
    }

    pub fn lighten(self, ratio: f64) -> Self {
        self.mix(WHITE, ratio)
    }

    /// Perceived brightness, used to pick a readable label color on top of a tile.
    pub fn is_light(self) -> bool {
        let luma =
            0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b);
        luma > 150.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub fn lighten_color(hex: &str, ratio: f64) -> Rgb {
    Rgb::parse_or_fallback(hex).lighten(ratio)
}

pub fn same_color(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub fn palette_color(index: usize) -> &'static str {
    DEFAULT_COLORS[index % DEFAULT_COLORS.len()]
}
