//! MIND mirror service
//!
//! Ledger access, wallet snapshots and burn-round leaderboards on top of the
//! `mind-codec` decoders and the `mind-model` replicas.

pub mod cache;
pub mod config;
pub mod gateway;
pub mod leaderboard;
pub mod mirror;
pub mod pda;
pub mod snapshot;
