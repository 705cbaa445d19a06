use crate::error::SolverError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// A public prediction of whether the bidder takes the trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bid {
    Zero = 0,
    One = 1,
}

impl Bid {
    pub const BOTH: [Bid; 2] = [Bid::Zero, Bid::One];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Bid::Zero),
            1 => Some(Bid::One),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn flipped(self) -> Bid {
        match self {
            Bid::Zero => Bid::One,
            Bid::One => Bid::Zero,
        }
    }

    pub const fn claims_trick(self) -> bool {
        matches!(self, Bid::One)
    }

    pub fn from_char(ch: char) -> Result<Self, SolverError> {
        match ch {
            '0' => Ok(Bid::Zero),
            '1' => Ok(Bid::One),
            other => Err(SolverError::InvalidBid(other)),
        }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Bids in turn order, starting with the leader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BidSequence {
    bids: Vec<Bid>,
}

impl BidSequence {
    pub const fn new() -> Self {
        Self { bids: Vec::new() }
    }

    pub fn with_bids(bids: Vec<Bid>) -> Self {
        Self { bids }
    }

    /// Decodes the low `len` bits of `bits`, most significant first, so that counting
    /// `0..1 << len` walks sequences in lexicographic order.
    pub fn from_bits(bits: u32, len: usize) -> Self {
        let bids = (0..len)
            .map(|idx| {
                if bits >> (len - 1 - idx) & 1 == 1 {
                    Bid::One
                } else {
                    Bid::Zero
                }
            })
            .collect();
        Self { bids }
    }

    pub fn as_slice(&self) -> &[Bid] {
        &self.bids
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    pub fn push(&mut self, bid: Bid) {
        self.bids.push(bid);
    }

    pub fn prefix(&self, len: usize) -> &[Bid] {
        &self.bids[..len]
    }

    pub fn total(&self) -> usize {
        total_bid(&self.bids)
    }

    pub fn leader(&self) -> Option<Bid> {
        self.bids.first().copied()
    }
}

/// Number of seats claiming the trick.
pub fn total_bid(bids: &[Bid]) -> usize {
    bids.iter().filter(|bid| bid.claims_trick()).count()
}

impl From<Vec<Bid>> for BidSequence {
    fn from(bids: Vec<Bid>) -> Self {
        Self::with_bids(bids)
    }
}

impl FromStr for BidSequence {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "-" {
            return Ok(Self::new());
        }
        trimmed
            .chars()
            .map(Bid::from_char)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::with_bids)
    }
}

impl TryFrom<String> for BidSequence {
    type Error = SolverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BidSequence> for String {
    fn from(sequence: BidSequence) -> Self {
        sequence.to_string()
    }
}

impl fmt::Display for BidSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bids.is_empty() {
            return f.write_str("-");
        }
        for bid in &self.bids {
            write!(f, "{bid}")?;
        }
        Ok(())
    }
}
