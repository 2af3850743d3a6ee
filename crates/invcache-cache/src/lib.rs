//! # InvCache Cache
//!
//! 逆矩陣快取：容器、失效判定與解析

pub mod container;
pub mod resolver;
pub mod shared;

// Re-export 主要類型
pub use container::{CachedMatrix, Replacement};
pub use resolver::{CacheOutcome, CacheStats, CacheStatsSnapshot, InverseResolver, CACHE_HIT_MESSAGE};
pub use shared::SharedCachedMatrix;
