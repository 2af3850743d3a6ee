//! 逆矩陣解析：命中快取時直接返回，未命中時計算並寫回

use std::sync::atomic::{AtomicU64, Ordering};

use invcache_calc::{GaussJordanInverter, MatrixInverter};
use invcache_core::Matrix;
use serde::{Deserialize, Serialize};

use crate::CachedMatrix;

/// 命中快取時輸出的訊息
pub const CACHE_HIT_MESSAGE: &str = "Getting cached value of matrix inverse";

/// 單次解析結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheOutcome {
    /// 返回快取的逆矩陣
    Hit,
    /// 重新計算並寫入快取
    Miss,
}

/// 命中統計
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl CacheStats {
    fn record(&self, outcome: CacheOutcome) {
        match outcome {
            CacheOutcome::Hit => self.hits.fetch_add(1, Ordering::Relaxed),
            CacheOutcome::Miss => self.misses.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// 目前統計快照
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// 歸零
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
    }
}

/// 命中統計快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    /// 命中次數
    pub hits: u64,
    /// 成功計算次數
    pub misses: u64,
    /// 求逆失敗次數
    pub failures: u64,
}

impl CacheStatsSnapshot {
    /// 成功的解析次數
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// 命中率（無解析紀錄時為 0）
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.lookups();
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// 逆矩陣解析器
#[derive(Debug)]
pub struct InverseResolver<I = GaussJordanInverter> {
    /// 求逆能力
    inverter: I,

    /// 命中統計
    stats: CacheStats,
}

impl InverseResolver<GaussJordanInverter> {
    /// 使用預設 Gauss-Jordan 求逆器
    pub fn new() -> Self {
        Self::with_inverter(GaussJordanInverter::new())
    }
}

impl Default for InverseResolver<GaussJordanInverter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MatrixInverter> InverseResolver<I> {
    /// 使用指定求逆器
    pub fn with_inverter(inverter: I) -> Self {
        Self {
            inverter,
            stats: CacheStats::default(),
        }
    }

    /// 取得容器中矩陣的逆
    ///
    /// 快取存在時直接返回（並輸出命中訊息）；否則計算、寫入快取後返回。
    /// 求逆失敗時錯誤原樣返回，快取維持為空。
    pub fn resolve(&self, container: &mut CachedMatrix) -> invcache_core::Result<Matrix> {
        self.resolve_with_outcome(container)
            .map(|(inverse, _)| inverse)
    }

    /// 同 [`resolve`](Self::resolve)，並返回是否命中
    pub fn resolve_with_outcome(
        &self,
        container: &mut CachedMatrix,
    ) -> invcache_core::Result<(Matrix, CacheOutcome)> {
        if let Some(cached) = container.cached_inverse() {
            tracing::info!(container = %container.id(), "{}", CACHE_HIT_MESSAGE);
            self.stats.record(CacheOutcome::Hit);
            return Ok((cached.clone(), CacheOutcome::Hit));
        }

        let (rows, cols) = container.current().dims();
        tracing::debug!(container = %container.id(), "快取未命中，計算 {}x{} 逆矩陣", rows, cols);

        let inverse = match self.inverter.invert(container.current()) {
            Ok(inverse) => inverse,
            Err(e) => {
                tracing::warn!(container = %container.id(), "求逆失敗: {}", e);
                self.stats.record_failure();
                return Err(e);
            }
        };

        container.store_inverse(inverse.clone());
        self.stats.record(CacheOutcome::Miss);

        Ok((inverse, CacheOutcome::Miss))
    }

    /// 命中統計快照
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// 獲取求逆器引用
    pub fn inverter(&self) -> &I {
        &self.inverter
    }
}
