//! # InvCache
//!
//! 逆矩陣記憶化：矩陣未變（數值相等）時重複取逆直接返回快取。
//!
//! ```
//! use invcache::{CacheOutcome, CachedMatrix, InverseResolver, Matrix};
//!
//! let mut container = CachedMatrix::new(Matrix::identity(3));
//! let resolver = InverseResolver::new();
//!
//! let (_, first) = resolver.resolve_with_outcome(&mut container).unwrap();
//! let (_, second) = resolver.resolve_with_outcome(&mut container).unwrap();
//! assert_eq!(first, CacheOutcome::Miss);
//! assert_eq!(second, CacheOutcome::Hit);
//! ```

pub use invcache_cache::{
    CacheOutcome, CacheStats, CacheStatsSnapshot, CachedMatrix, InverseResolver, Replacement,
    SharedCachedMatrix, CACHE_HIT_MESSAGE,
};
pub use invcache_calc::{GaussJordanInverter, MatrixInverter};
pub use invcache_core::{InvCacheError, InversionConfig, Matrix, Result};
pub use rust_decimal::Decimal;
