//! 帶逆矩陣快取的矩陣容器

use invcache_core::Matrix;
use uuid::Uuid;

/// 替換矩陣後的快取狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// 新矩陣與原值數值相等，快取保留
    Unchanged,
    /// 新矩陣不同，若有快取則已清除
    Invalidated,
}

/// 矩陣容器
///
/// 持有目前的矩陣與（可能不存在的）逆矩陣快取。
/// 只要快取存在，它就是目前矩陣的逆：矩陣換成數值不同的值時快取即被清除，
/// 換成數值相等的另一個實例時快取保留。
#[derive(Debug, Clone)]
pub struct CachedMatrix {
    /// 容器ID（僅用於日誌追蹤）
    id: Uuid,

    /// 目前的矩陣
    value: Matrix,

    /// 上次計算的逆矩陣
    cached_inverse: Option<Matrix>,
}

impl CachedMatrix {
    /// 創建新的容器，快取為空
    pub fn new(initial: Matrix) -> Self {
        Self {
            id: Uuid::new_v4(),
            value: initial,
            cached_inverse: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 替換矩陣
    ///
    /// 新矩陣與目前值數值不相等（維度不同或任一元素不同）時清除快取，
    /// 之後無條件寫入新矩陣。
    pub fn replace(&mut self, new_matrix: Matrix) -> Replacement {
        let outcome = if self.value.value_eq(&new_matrix) {
            Replacement::Unchanged
        } else {
            if self.cached_inverse.take().is_some() {
                tracing::debug!(container = %self.id, "矩陣已變更，清除逆矩陣快取");
            }
            Replacement::Invalidated
        };

        self.value = new_matrix;
        outcome
    }

    /// 目前的矩陣
    pub fn current(&self) -> &Matrix {
        &self.value
    }

    /// 寫入逆矩陣快取（不做驗證，由呼叫方保證是目前矩陣的逆）
    pub fn store_inverse(&mut self, inverse: Matrix) {
        self.cached_inverse = Some(inverse);
    }

    /// 快取的逆矩陣
    pub fn cached_inverse(&self) -> Option<&Matrix> {
        self.cached_inverse.as_ref()
    }

    pub fn has_cached_inverse(&self) -> bool {
        self.cached_inverse.is_some()
    }

    /// 手動清除快取
    pub fn invalidate(&mut self) {
        self.cached_inverse = None;
    }

    /// 取出矩陣，丟棄快取
    pub fn into_inner(self) -> Matrix {
        self.value
    }
}
