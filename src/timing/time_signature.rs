use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time signature as written on the staff
///
/// The metronome clicks once per numerator unit, so 6/8 gives six clicks per
/// bar with the accent on the first.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    /// Number of beats per bar
    pub numerator: u8,
    /// Note value that gets one beat (4 = quarter, 8 = eighth)
    pub denominator: u8,
}

impl TimeSignature {
    /// 2/2, cut time
    pub const TWO_TWO: TimeSignature = TimeSignature::new(2, 2);
    pub const TWO_FOUR: TimeSignature = TimeSignature::new(2, 4);
    /// 3/4, waltz
    pub const THREE_FOUR: TimeSignature = TimeSignature::new(3, 4);
    /// 4/4, common time
    pub const FOUR_FOUR: TimeSignature = TimeSignature::new(4, 4);
    /// 6/8, compound duple
    pub const SIX_EIGHT: TimeSignature = TimeSignature::new(6, 8);
    /// 9/8, compound triple
    pub const NINE_EIGHT: TimeSignature = TimeSignature::new(9, 8);
    /// 12/8, compound quadruple
    pub const TWELVE_EIGHT: TimeSignature = TimeSignature::new(12, 8);

    pub const fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Clicks per bar; the first of them is accented.
    pub fn beats_per_bar(&self) -> u32 {
        self.numerator as u32
    }

    /// Compound meters group eighths in threes (6/8, 9/8, 12/8)
    pub fn is_compound(&self) -> bool {
        self.denominator == 8 && self.numerator > 3 && self.numerator % 3 == 0
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
