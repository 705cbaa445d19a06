//! Rank sets as bitmasks: bit `i` set means rank `i` is a member.

use core::fmt;

/// A set of ranks. Masks built from ranges are a single run of set bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct RankMask(u64);

impl RankMask {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, rank: u8) -> bool {
        rank < 64 && self.0 & (1 << rank) != 0
    }

    pub const fn intersects(self, other: RankMask) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn intersection(self, other: RankMask) -> RankMask {
        Self(self.0 & other.0)
    }

    pub const fn union(self, other: RankMask) -> RankMask {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: RankMask) -> RankMask {
        Self(self.0 & !other.0)
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Inclusive bounds of a contiguous mask.
    pub fn range(self) -> (u8, u8) {
        mask_to_range(self)
    }

    /// Number of ranks in a contiguous mask.
    pub fn width(self) -> u32 {
        let (lo, hi) = mask_to_range(self);
        u32::from(hi - lo) + 1
    }

    pub fn fragments(self) -> Fragments {
        fragment_mask(self)
    }
}

impl fmt::Display for RankMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        let mut first = true;
        f.write_str("{")?;
        for run in self.fragments() {
            let (lo, hi) = mask_to_range(run);
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if lo == hi {
                write!(f, "{lo}")?;
            } else {
                write!(f, "{lo}..={hi}")?;
            }
        }
        f.write_str("}")
    }
}

/// Mask holding exactly the ranks `lo..=hi`; empty when `lo > hi`.
pub fn range_to_mask(lo: u8, hi: u8) -> RankMask {
    assert!(hi < 64, "rank {hi} does not fit in a mask");
    if lo > hi {
        return RankMask::EMPTY;
    }
    let upper = if hi == 63 { u64::MAX } else { (1u64 << (hi + 1)) - 1 };
    let lower = (1u64 << lo) - 1;
    RankMask(upper & !lower)
}

/// Inverse of [`range_to_mask`] for a non-empty contiguous mask.
pub fn mask_to_range(mask: RankMask) -> (u8, u8) {
    assert!(!mask.is_empty(), "cannot decode the empty mask");
    let lo = mask.0.trailing_zeros() as u8;
    let hi = 63 - mask.0.leading_zeros() as u8;
    (lo, hi)
}

/// Splits a mask into its maximal runs of set bits, lowest run first.
pub fn fragment_mask(mask: RankMask) -> Fragments {
    Fragments { remaining: mask.0 }
}

/// Iterator returned by [`fragment_mask`].
#[derive(Debug, Clone)]
pub struct Fragments {
    remaining: u64,
}

impl Iterator for Fragments {
    type Item = RankMask;

    fn next(&mut self) -> Option<RankMask> {
        let mask = self.remaining;
        if mask == 0 {
            return None;
        }
        let low_bit = mask & mask.wrapping_neg();
        // Carrying through the lowest run clears it; the carry lands just above the run.
        let carried = mask.wrapping_add(low_bit);
        let below_carry = (carried & carried.wrapping_neg()).wrapping_sub(1);
        let run = mask & below_carry;
        self.remaining = mask & !below_carry;
        Some(RankMask(run))
    }
}
