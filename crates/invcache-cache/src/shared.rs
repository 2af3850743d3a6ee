//! 可跨執行緒共享的矩陣容器

use std::sync::{Arc, Mutex, MutexGuard};

use invcache_calc::MatrixInverter;
use invcache_core::{InvCacheError, Matrix};
use uuid::Uuid;

use crate::{CacheOutcome, CachedMatrix, InverseResolver, Replacement};

/// 共享矩陣容器
///
/// 每個容器一把互斥鎖。解析時「讀快取、未命中則計算並寫回」整段在鎖內完成，
/// 因此併發解析同一容器只會計算一次，其餘呼叫皆為命中。
#[derive(Debug, Clone)]
pub struct SharedCachedMatrix {
    id: Uuid,
    inner: Arc<Mutex<CachedMatrix>>,
}

impl SharedCachedMatrix {
    /// 創建新的共享容器，快取為空
    pub fn new(initial: Matrix) -> Self {
        CachedMatrix::new(initial).into()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn lock(&self) -> invcache_core::Result<MutexGuard<'_, CachedMatrix>> {
        self.inner.lock().map_err(|_| InvCacheError::LockPoisoned)
    }

    /// 替換矩陣（規則同 [`CachedMatrix::replace`]）
    pub fn replace(&self, new_matrix: Matrix) -> invcache_core::Result<Replacement> {
        Ok(self.lock()?.replace(new_matrix))
    }

    /// 目前矩陣的複本
    pub fn current(&self) -> invcache_core::Result<Matrix> {
        Ok(self.lock()?.current().clone())
    }

    pub fn store_inverse(&self, inverse: Matrix) -> invcache_core::Result<()> {
        self.lock()?.store_inverse(inverse);
        Ok(())
    }

    /// 快取逆矩陣的複本
    pub fn cached_inverse(&self) -> invcache_core::Result<Option<Matrix>> {
        Ok(self.lock()?.cached_inverse().cloned())
    }

    /// 透過解析器取得逆矩陣，整段持有鎖
    pub fn resolve_with<I: MatrixInverter>(
        &self,
        resolver: &InverseResolver<I>,
    ) -> invcache_core::Result<Matrix> {
        self.resolve_with_outcome(resolver)
            .map(|(inverse, _)| inverse)
    }

    pub fn resolve_with_outcome<I: MatrixInverter>(
        &self,
        resolver: &InverseResolver<I>,
    ) -> invcache_core::Result<(Matrix, CacheOutcome)> {
        let mut guard = self.lock()?;
        resolver.resolve_with_outcome(&mut guard)
    }
}

impl From<CachedMatrix> for SharedCachedMatrix {
    fn from(container: CachedMatrix) -> Self {
        Self {
            id: container.id(),
            inner: Arc::new(Mutex::new(container)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invcache_calc::GaussJordanInverter;
    use rayon::prelude::*;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingInverter {
        calls: AtomicUsize,
        inner: GaussJordanInverter,
    }

    impl MatrixInverter for CountingInverter {
        fn invert(&self, matrix: &Matrix) -> invcache_core::Result<Matrix> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.invert(matrix)
        }
    }

    fn matrix(values: &[i64]) -> Matrix {
        Matrix::from_column_major(3, 3, values.iter().map(|&v| Decimal::from(v)).collect())
            .unwrap()
    }

    #[test]
    fn test_concurrent_resolve_computes_once() {
        let resolver = InverseResolver::with_inverter(CountingInverter::default());
        let shared = SharedCachedMatrix::new(matrix(&[1, 2, 3, 0, 1, 4, 5, 6, 0]));

        let outcomes: Vec<CacheOutcome> = (0..64)
            .into_par_iter()
            .map(|_| shared.resolve_with_outcome(&resolver).unwrap().1)
            .collect();

        let misses = outcomes.iter().filter(|o| **o == CacheOutcome::Miss).count();
        assert_eq!(misses, 1);
        assert_eq!(resolver.inverter().calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.stats().hits, 63);
    }

    #[test]
    fn test_clones_share_state() {
        let resolver = InverseResolver::new();
        let a = SharedCachedMatrix::new(matrix(&[1, 2, 3, 0, 1, 4, 5, 6, 0]));
        let b = a.clone();

        let inverse = a.resolve_with(&resolver).unwrap();

        assert_eq!(a.id(), b.id());
        assert_eq!(b.cached_inverse().unwrap(), Some(inverse));
    }

    #[test]
    fn test_replace_through_shared_handle() {
        let resolver = InverseResolver::new();
        let shared = SharedCachedMatrix::new(matrix(&[1, 2, 3, 0, 1, 4, 5, 6, 0]));
        shared.resolve_with(&resolver).unwrap();

        let same = shared.replace(matrix(&[1, 2, 3, 0, 1, 4, 5, 6, 0])).unwrap();
        assert_eq!(same, Replacement::Unchanged);
        assert!(shared.cached_inverse().unwrap().is_some());

        let changed = shared.replace(matrix(&[3, 2, 0, 0, 0, 1, 2, -2, 1])).unwrap();
        assert_eq!(changed, Replacement::Invalidated);
        assert!(shared.cached_inverse().unwrap().is_none());
        assert_eq!(shared.current().unwrap(), matrix(&[3, 2, 0, 0, 0, 1, 2, -2, 1]));
    }

    #[test]
    fn test_store_inverse_through_shared_handle() {
        let shared = SharedCachedMatrix::new(Matrix::identity(3));
        shared.store_inverse(Matrix::identity(3)).unwrap();

        assert_eq!(shared.cached_inverse().unwrap(), Some(Matrix::identity(3)));
    }

    #[test]
    fn test_poisoned_lock() {
        let shared = SharedCachedMatrix::new(Matrix::identity(2));
        let poisoner = shared.clone();

        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert_eq!(shared.current(), Err(InvCacheError::LockPoisoned));
    }
}
