use crate::foundation::error::{MergeError, MergeResult};

/// The shadow ladder, lightest to darkest. Pure white sits above it and pure
/// black below it.
pub const GRAY_LADDER: [u8; 6] = [0xEB, 0xDC, 0xB4, 0x78, 0x46, 0x28];

/// Straight (non-premultiplied) RGBA8 pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::opaque(0xFF, 0xFF, 0xFF);
    pub const BLACK: Self = Self::opaque(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    pub const fn gray(v: u8) -> Self {
        Self::opaque(v, v, v)
    }

    /// Read a pixel from the first four bytes of `px`.
    pub fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Color equality that ignores alpha.
    pub fn same_rgb(self, other: Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    pub fn is_white(self) -> bool {
        self.same_rgb(Self::WHITE)
    }

    /// True when R, G and B are all equal.
    pub fn is_achromatic(self) -> bool {
        self.r == self.g && self.g == self.b
    }

    /// Position of this color on [`GRAY_LADDER`], if any.
    pub fn ladder_step(self) -> Option<usize> {
        if !self.is_achromatic() {
            return None;
        }
        GRAY_LADDER.iter().position(|&v| v == self.r)
    }

    /// Mix `self` over `bottom` with weight `factor`.
    ///
    /// `factor >= 1` keeps `self` and `factor <= 0` keeps `bottom`, both
    /// untouched. In between each color channel is
    /// `top * factor + bottom * (1 - factor)` truncated, and alpha is opaque.
    pub fn blend(self, bottom: Self, factor: f32) -> Self {
        if factor >= 1.0 {
            return self;
        }
        if factor <= 0.0 {
            return bottom;
        }
        // bot + (top - bot) * f == top * f + bot * (1 - f), without drifting
        // below an equal pair through rounding.
        let mix = |top: u8, bot: u8| -> u8 {
            let (top, bot) = (f32::from(top), f32::from(bot));
            (bot + (top - bot) * factor).clamp(0.0, 255.0) as u8
        };
        Self::opaque(
            mix(self.r, bottom.r),
            mix(self.g, bottom.g),
            mix(self.b, bottom.b),
        )
    }

    /// One step down the shadow ladder.
    ///
    /// White and the first ladder step both go to the second step; the last
    /// step goes to black. Anything off the ladder (black included) falls
    /// back to black.
    pub fn darken(self) -> Self {
        if self.is_white() {
            return Self::gray(GRAY_LADDER[1]);
        }
        match self.ladder_step() {
            Some(0) => Self::gray(GRAY_LADDER[1]),
            Some(step) if step + 1 < GRAY_LADDER.len() => Self::gray(GRAY_LADDER[step + 1]),
            _ => Self::BLACK,
        }
    }

    /// Replace R, G and B with their truncated mean; alpha is kept.
    pub fn desaturate(self) -> Self {
        if self.is_achromatic() {
            return self;
        }
        let mean = (u16::from(self.r) + u16::from(self.g) + u16::from(self.b)) / 3;
        let v = mean as u8;
        Self::new(v, v, v, self.a)
    }

    /// Decode the trailing six hex digits of `input` as opaque RGB.
    ///
    /// Any prefix (`#`, `0x`, an alpha byte) is ignored.
    pub fn from_hex(input: &str) -> MergeResult<Self> {
        let trimmed = input.trim();
        let err = || MergeError::color_format("color", input);

        let chars: Vec<char> = trimmed.chars().collect();
        if chars.len() < 6 {
            return Err(err());
        }
        let tail: String = chars[chars.len() - 6..].iter().collect();
        if !tail.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&tail[i..i + 2], 16).map_err(|_| err());
        Ok(Self::opaque(byte(0)?, byte(2)?, byte(4)?))
    }

    /// `#RRGGBB`, the inverse of [`Rgba8::from_hex`] for opaque colors.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// True when `px` matches any color of `list` by RGB.
pub fn contains_rgb(list: &[Rgba8], px: Rgba8) -> bool {
    list.iter().any(|c| c.same_rgb(px))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/pixel.rs"]
mod tests;
