//! Off-chain replica of the MIND reward and burn-round math
//! Pure functions over decoded snapshots: no I/O, no panics, overflow is an error

pub mod error;
pub mod helpers;
pub mod leaderboard;
pub mod levels;
pub mod math;
pub mod melt;
pub mod rewards;
pub mod staking;

// Re-export commonly used types
pub use error::*;
pub use leaderboard::{Completeness, Leaderboard, Standing};
pub use melt::{ClaimPrediction, ContributionSplit, RoundPhase};
pub use rewards::AccumulatorProjection;
pub use staking::StakingProjection;
