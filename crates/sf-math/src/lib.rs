//! # sf-math — RTP math core for SpinForge
//!
//! Pure probability/payout calculations over a configuration snapshot:
//! symbol probabilities from weight tables, combination probabilities,
//! theoretical RTP and house edge, paytable retargeting, and variance
//! analysis for tuning.
//!
//! ## Architecture
//!
//! ```text
//! RtpEngine
//!     │
//!     ├── SymbolSet (name → weight + role)
//!     ├── PayTable (combination → payout multiple)
//!     ├── BonusSettings (free spins, bonus multiplier)
//!     └── RtpSettings (target RTP, house edge)
//!           │
//!           v
//!     probabilities / RTP / VarianceAnalysis / report
//! ```
//!
//! The engine holds no mutable state: it is constructed from an immutable
//! snapshot and recomputes on demand. Replacing the configuration means
//! constructing a new engine.

pub mod engine;
pub mod paytable;
pub mod report;
pub mod symbols;

pub use engine::*;
pub use paytable::*;
pub use symbols::*;
