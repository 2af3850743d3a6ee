//! # InvCache Calculation Engine
//!
//! 線性代數計算：矩陣求逆

pub mod gauss_jordan;

// Re-export 主要類型
pub use gauss_jordan::GaussJordanInverter;

use invcache_core::Matrix;

/// 矩陣求逆能力
///
/// 對非方陣、奇異或其他無法求逆的矩陣返回錯誤。
pub trait MatrixInverter: Send + Sync {
    /// 計算逆矩陣
    fn invert(&self, matrix: &Matrix) -> invcache_core::Result<Matrix>;
}

impl<T: MatrixInverter + ?Sized> MatrixInverter for Box<T> {
    fn invert(&self, matrix: &Matrix) -> invcache_core::Result<Matrix> {
        (**self).invert(matrix)
    }
}
