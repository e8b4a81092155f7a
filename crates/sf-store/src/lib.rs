//! # sf-store — persistence for SpinForge
//!
//! SQLite-backed storage for the progressive jackpot pool, user profiles,
//! play sessions and analytics history. The math core never touches this
//! crate; games and the CLI read and write through [`Store`].

pub mod store;

pub use store::*;
