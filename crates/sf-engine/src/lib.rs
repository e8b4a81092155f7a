//! # sf-engine — slot machine gameplay for SpinForge
//!
//! Draws five weighted reels per spin, evaluates the leftmost three against
//! the paytable, and resolves the special outcomes: multiplier symbols,
//! the progressive jackpot, and the free-spin bonus round. A dice-risk
//! side game lets a winning spin be staked double-or-nothing.
//!
//! The engine owns an immutable [`sf_config::GameConfig`] snapshot and a
//! seedable RNG; balances live with the caller.

pub mod engine;
pub mod risk;
pub mod session;

pub use engine::*;
pub use risk::*;
pub use session::*;
