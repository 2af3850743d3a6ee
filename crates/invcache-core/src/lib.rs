//! # InvCache Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod matrix;

// Re-export 主要類型
pub use config::InversionConfig;
pub use matrix::Matrix;

/// 逆矩陣快取錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvCacheError {
    #[error("矩陣不是方陣: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("矩陣為奇異矩陣，無法求逆")]
    Singular,

    #[error("空矩陣無法求逆")]
    EmptyMatrix,

    #[error("數值溢位: {0}")]
    Overflow(String),

    #[error("結果超出 Decimal 可表示範圍: {0}")]
    Underflow(String),

    #[error("維度不符: {0}")]
    DimensionMismatch(String),

    #[error("第 {row} 列長度不一致：預期 {expected}，實際 {found}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("快取鎖已中毒")]
    LockPoisoned,
}

impl InvCacheError {
    /// 是否為求逆失敗
    pub fn is_inversion_error(&self) -> bool {
        matches!(
            self,
            Self::NotSquare { .. }
                | Self::Singular
                | Self::EmptyMatrix
                | Self::Overflow(_)
                | Self::Underflow(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, InvCacheError>;
