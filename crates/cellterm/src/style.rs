// SPDX-License-Identifier: MIT
//
// Style — the nine SGR text attributes as a bitmask.
//
// The flag set is closed and small, so it lives in a `u16` rather than any
// kind of collection. Flags are independent: nothing here stops a caller from
// asking for bold and dim at once. Whether a terminal honors both is its
// problem, not the data model's.
//
// The combinators return new values (`with`, `without`, `toggled`); the
// in-place `insert`/`remove`/`toggle` that bitflags generates still work.

bitflags::bitflags! {
    /// Text attributes, one bit per SGR parameter.
    ///
    /// Bit order is emission order: the renderer writes one sequence per set
    /// flag, lowest bit first.
    ///
    /// ```
    /// use cellterm::style::Style;
    ///
    /// let s = Style::NONE.with(Style::BOLD).with(Style::UNDERLINE);
    /// assert!(s.has(Style::BOLD));
    /// assert!(!s.has(Style::ITALIC));
    /// assert_eq!(s.without(Style::BOLD), Style::UNDERLINE);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Style: u16 {
        /// SGR 1: increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2: decreased intensity.
        const DIM           = 1 << 1;
        /// SGR 3: italic.
        const ITALIC        = 1 << 2;
        /// SGR 4: underline.
        const UNDERLINE     = 1 << 3;
        /// SGR 5: slow blink.
        const SLOW_BLINK    = 1 << 4;
        /// SGR 6: rapid blink. Rarely supported.
        const RAPID_BLINK   = 1 << 5;
        /// SGR 7: swap foreground and background.
        const REVERSE       = 1 << 6;
        /// SGR 8: hidden text.
        const CONCEAL       = 1 << 7;
        /// SGR 9: crossed-out text.
        const STRIKETHROUGH = 1 << 8;
    }
}

impl Style {
    /// No attributes.
    pub const NONE: Self = Self::empty();

    /// Every flag paired with its SGR parameter, in emission order.
    pub const SGR_PARAMS: [(Self, u8); 9] = [
        (Self::BOLD, 1),
        (Self::DIM, 2),
        (Self::ITALIC, 3),
        (Self::UNDERLINE, 4),
        (Self::SLOW_BLINK, 5),
        (Self::RAPID_BLINK, 6),
        (Self::REVERSE, 7),
        (Self::CONCEAL, 8),
        (Self::STRIKETHROUGH, 9),
    ];

    /// Whether any bit of `flag` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: Self) -> bool {
        self.bits() & flag.bits() != 0
    }

    /// A copy with `flag` added.
    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        self.union(flag)
    }

    /// A copy with `flag` removed.
    #[inline]
    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        self.difference(flag)
    }

    /// A copy with `flag` flipped.
    #[inline]
    #[must_use]
    pub const fn toggled(self, flag: Self) -> Self {
        self.symmetric_difference(flag)
    }

    /// SGR parameters for the set flags, in emission order.
    pub fn sgr_params(self) -> impl Iterator<Item = u8> {
        Self::SGR_PARAMS
            .into_iter()
            .filter(move |(flag, _)| self.has(*flag))
            .map(|(_, code)| code)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
