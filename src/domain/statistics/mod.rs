//! Collection statistics invariants:
//!
//! 1. Statistics are ALWAYS derived, NEVER stored
//! 2. Statistics can be recalculated at any time
//! 3. Statistics NEVER alter entries

pub mod entity;
pub use entity::{
    BlendShare, CollectionStatistics, GrindSummary, OriginCount, PriceAnalysis, RoastLevelCount,
    RoasterCount,
};
