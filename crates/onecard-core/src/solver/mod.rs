//! Equilibrium bidding thresholds.
//!
//! - `evaluate`: win/loss tallies for one bid history.
//! - `cache`: the solver object that owns memoized thresholds and evaluates prefixes
//!   shortest first.

mod cache;
mod evaluate;

pub use cache::{CacheStats, MAX_PLAYERS, ThresholdKey, ThresholdSolver, bid_threshold};
pub use evaluate::{FOLLOWER_LIMIT, LEADER_LIMIT};

pub(crate) use cache::validate_players;
