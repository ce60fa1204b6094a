// SPDX-License-Identifier: MIT
//
// cellterm color model — three tiers, one direction.
//
// A terminal color is one of four things: "whatever the terminal uses by
// default", an index into the 16-color ANSI set, an index into the xterm
// 256-color palette, or a 24-bit RGB triple. Every tier can be reduced to
// the one below it, never the other way:
//
//   TrueColor ──to_indexed256──▶ Indexed256 ──to_indexed16──▶ Indexed16
//
// Both reductions are deliberately cheap and deliberately lossy:
//
//   - RGB → 256 is a uniform quantization onto the 6×6×6 cube, not a nearest
//     color search. Each channel lands in bucket floor(c * 6 / 256), so the
//     hue/luminance error near a bucket boundary is unbounded.
//
//   - 256 → 16 splits the grayscale ramp into two buckets (black below 244,
//     white from 244 up) and folds the cube with `index mod 8`. It guarantees
//     a value in range; it does not minimize perceptual distance. Existing
//     output depends on this exact mapping.
//
// The terminal default color survives every conversion unchanged.

// Single-letter channel names (r, g, b) are the color-science convention.
#![allow(clippy::many_single_char_names)]

use std::fmt;

// ─── ColorMode ───────────────────────────────────────────────────────────────

/// Which tier a [`Color`] lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// Terminal default (SGR 39 / 49).
    #[default]
    Default,
    /// One of the 16 ANSI colors (index 0–15).
    Indexed16,
    /// xterm 256-color palette (index 16–255 when built via [`Color::index`]).
    Indexed256,
    /// 24-bit RGB.
    TrueColor,
}

// ─── ColorDepth ──────────────────────────────────────────────────────────────

/// The richest color tier an output terminal is assumed to understand.
///
/// The renderer passes every cell color through [`Color::downgrade`] with the
/// configured depth before encoding it. Detecting the depth is the caller's
/// business; the default is `TrueColor`, which leaves colors untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorDepth {
    /// 24-bit color, no reduction.
    #[default]
    TrueColor,
    /// Reduce RGB to the 256-color palette.
    Indexed256,
    /// Reduce everything to the 16 ANSI colors.
    Indexed16,
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal color value.
///
/// Fields are private so the tier invariants hold: an `Indexed16` color
/// always has an index below 16, and RGB channels are only meaningful for
/// `TrueColor`. Equality is structural over all fields.
///
/// # Examples
///
/// ```
/// use cellterm::color::{Color, ColorMode};
///
/// let red = Color::rgb(255, 0, 0);
/// assert_eq!(red.mode(), ColorMode::TrueColor);
///
/// // Quantized onto the cube: r=5, g=0, b=0 → 16 + 36*5 = 196.
/// assert_eq!(red.to_indexed256(), Color::index(196));
///
/// // Index 9 is a bright color, so it stays in the 16-color tier.
/// assert_eq!(Color::index(9).mode(), ColorMode::Indexed16);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    mode: ColorMode,
    r: u8,
    g: u8,
    b: u8,
    index: u8,
}

/// First index of the 24-step grayscale ramp.
const GRAY_RAMP_START: u8 = 232;

/// Ramp indices from here up reduce to white; below it, black.
const GRAY_RAMP_WHITE: u8 = 244;

/// First index of the 6×6×6 color cube.
const CUBE_START: u8 = 16;

impl Color {
    /// The terminal's default color.
    pub const DEFAULT: Self = Self {
        mode: ColorMode::Default,
        r: 0,
        g: 0,
        b: 0,
        index: 0,
    };

    pub const BLACK: Self = Self::index(0);
    pub const RED: Self = Self::index(1);
    pub const GREEN: Self = Self::index(2);
    pub const YELLOW: Self = Self::index(3);
    pub const BLUE: Self = Self::index(4);
    pub const MAGENTA: Self = Self::index(5);
    pub const CYAN: Self = Self::index(6);
    pub const WHITE: Self = Self::index(7);

    /// The eight base ANSI colors, in palette order.
    pub const NAMED: [Self; 8] = [
        Self::BLACK,
        Self::RED,
        Self::GREEN,
        Self::YELLOW,
        Self::BLUE,
        Self::MAGENTA,
        Self::CYAN,
        Self::WHITE,
    ];

    // ─── Constructors ────────────────────────────────────────────────────

    /// A 24-bit RGB color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            mode: ColorMode::TrueColor,
            r,
            g,
            b,
            index: 0,
        }
    }

    /// A palette color.
    ///
    /// The tier is chosen from the value alone: `0..16` is `Indexed16`,
    /// everything else is `Indexed256`.
    #[inline]
    #[must_use]
    pub const fn index(index: u8) -> Self {
        let mode = if index < 16 {
            ColorMode::Indexed16
        } else {
            ColorMode::Indexed256
        };
        Self {
            mode,
            r: 0,
            g: 0,
            b: 0,
            index,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// The tier this color lives in.
    #[inline]
    #[must_use]
    pub const fn mode(self) -> ColorMode {
        self.mode
    }

    /// RGB channels. Only meaningful for `TrueColor`.
    #[inline]
    #[must_use]
    pub const fn channels(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Palette index. Only meaningful for the indexed tiers.
    #[inline]
    #[must_use]
    pub const fn palette_index(self) -> u8 {
        self.index
    }

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self.mode, ColorMode::Default)
    }

    // ─── Degradation ─────────────────────────────────────────────────────

    /// Reduce to the 256-color tier.
    ///
    /// Identity for anything that isn't `TrueColor`. RGB maps onto the color
    /// cube as `16 + 36r + 6g + b` with each channel quantized to
    /// `floor(c * 6 / 256)`. The result is always in `16..=231`.
    #[must_use]
    pub const fn to_indexed256(self) -> Self {
        if !matches!(self.mode, ColorMode::TrueColor) {
            return self;
        }
        let r = quantize(self.r);
        let g = quantize(self.g);
        let b = quantize(self.b);
        Self::index(CUBE_START + 36 * r + 6 * g + b)
    }

    /// Reduce to the 16-color tier.
    ///
    /// Identity for `Indexed16` and `Default`. Grayscale ramp indices below
    /// 244 become black, the rest white. Cube indices fold with `mod 8`.
    #[must_use]
    pub const fn to_indexed16(self) -> Self {
        match self.mode {
            ColorMode::Indexed16 | ColorMode::Default => self,
            ColorMode::Indexed256 | ColorMode::TrueColor => {
                let idx = self.to_indexed256().index;
                if idx < 16 {
                    Self::index(idx)
                } else if idx >= GRAY_RAMP_START {
                    if idx < GRAY_RAMP_WHITE {
                        Self::BLACK
                    } else {
                        Self::WHITE
                    }
                } else {
                    Self::index(idx % 8)
                }
            }
        }
    }

    /// Reduce this color so a terminal of the given depth can show it.
    #[must_use]
    pub const fn downgrade(self, depth: ColorDepth) -> Self {
        match depth {
            ColorDepth::TrueColor => self,
            ColorDepth::Indexed256 => self.to_indexed256(),
            ColorDepth::Indexed16 => self.to_indexed16(),
        }
    }
}

/// Bucket a channel onto the six cube levels.
#[inline]
#[allow(clippy::cast_possible_truncation)] // (255 * 6) / 256 = 5
const fn quantize(c: u8) -> u8 {
    ((c as u16 * 6) / 256) as u8
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ColorMode::Default => write!(f, "default"),
            ColorMode::Indexed16 => write!(f, "ansi16({})", self.index),
            ColorMode::Indexed256 => write!(f, "ansi256({})", self.index),
            ColorMode::TrueColor => write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────────

pub mod palette {
    //! Reference RGB values for the xterm 256-color palette.
    //!
    //! - 0–7: standard colors (black, red, green, yellow, blue, magenta, cyan, white)
    //! - 8–15: bright variants
    //! - 16–231: 6×6×6 cube with levels 0, 95, 135, 175, 215, 255
    //! - 232–255: 24-step grayscale ramp, `8 + 10 * n`
    //!
    //! Terminals may override these; they are a display reference only and
    //! play no part in [`Color::to_indexed16`](super::Color::to_indexed16).

    use super::{Color, ColorMode};

    /// xterm defaults for the 16 ANSI colors.
    pub const ANSI16_RGB: [(u8, u8, u8); 16] = [
        (0, 0, 0),       // 0: Black
        (128, 0, 0),     // 1: Red
        (0, 128, 0),     // 2: Green
        (128, 128, 0),   // 3: Yellow
        (0, 0, 128),     // 4: Blue
        (128, 0, 128),   // 5: Magenta
        (0, 128, 128),   // 6: Cyan
        (192, 192, 192), // 7: White
        (128, 128, 128), // 8: Bright Black
        (255, 0, 0),     // 9: Bright Red
        (0, 255, 0),     // 10: Bright Green
        (255, 255, 0),   // 11: Bright Yellow
        (0, 0, 255),     // 12: Bright Blue
        (255, 0, 255),   // 13: Bright Magenta
        (0, 255, 255),   // 14: Bright Cyan
        (255, 255, 255), // 15: Bright White
    ];

    /// Reference RGB for a palette index.
    #[must_use]
    pub const fn ansi256_to_rgb(idx: u8) -> (u8, u8, u8) {
        match idx {
            0..=15 => ANSI16_RGB[idx as usize],
            16..=231 => {
                let idx = idx - 16;
                (
                    cube_level(idx / 36),
                    cube_level((idx % 36) / 6),
                    cube_level(idx % 6),
                )
            }
            232..=255 => {
                let v = 8 + 10 * (idx - 232);
                (v, v, v)
            }
        }
    }

    /// Reference RGB for any color. `None` for the terminal default.
    #[must_use]
    pub const fn approximate_rgb(color: Color) -> Option<(u8, u8, u8)> {
        match color.mode() {
            ColorMode::Default => None,
            ColorMode::TrueColor => Some(color.channels()),
            ColorMode::Indexed16 | ColorMode::Indexed256 => {
                Some(ansi256_to_rgb(color.palette_index()))
            }
        }
    }

    const fn cube_level(i: u8) -> u8 {
        if i == 0 { 0 } else { 55 + 40 * i }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
