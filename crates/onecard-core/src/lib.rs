//! Exact equilibrium analysis of single-trick, one-card bidding.
//!
//! Every seat holds one card from a 51-card deck and bids, in turn, whether it will take
//! the only trick. [`ThresholdSolver`] derives the rank below which each bidder claims the
//! trick given the bids already made, and [`expected_scores`] weighs every legal bid
//! sequence by its exact number of card arrangements.

pub mod constraints;
pub mod counting;
pub mod error;
pub mod model;
pub mod partition;
pub mod scores;
pub mod simulate;
pub mod solver;
pub mod table;

pub use error::SolverError;
pub use model::{Bid, BidSequence, RankMask};
pub use scores::{ExpectedScore, ScoreReport, SequenceOutcome, expected_scores};
pub use simulate::{SimulationSummary, Simulator};
pub use solver::{MAX_PLAYERS, ThresholdSolver, bid_threshold};
pub use table::{ThresholdEntry, ThresholdTable};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "onecard"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
