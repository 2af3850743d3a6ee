//! 矩陣模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{InvCacheError, Result};

/// 稠密矩陣（列優先儲存）
///
/// 元素使用 `Decimal`，確保像 `0.2`、`0.3` 這類十進位數值可以精確表示與比較。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    /// 列數
    rows: usize,

    /// 行數
    cols: usize,

    /// 元素：data[row * cols + col]
    data: Vec<Decimal>,
}

impl Matrix {
    /// 由列優先資料創建矩陣
    pub fn new(rows: usize, cols: usize, data: Vec<Decimal>) -> Result<Self> {
        if data.len() != element_count(rows, cols)? {
            return Err(InvCacheError::DimensionMismatch(format!(
                "資料長度 {} 與維度 {}x{} 不符",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// 由二維列資料創建矩陣
    pub fn from_rows(rows: Vec<Vec<Decimal>>) -> Result<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(row_count * col_count);

        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != col_count {
                return Err(InvCacheError::RaggedRows {
                    row: idx,
                    expected: col_count,
                    found: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self {
            rows: row_count,
            cols: col_count,
            data,
        })
    }

    /// 由行優先資料創建矩陣（逐行填入）
    ///
    /// # 範例
    /// ```
    /// # use invcache_core::Matrix;
    /// # use rust_decimal::Decimal;
    /// let data = [1, 2, 3, 4].into_iter().map(Decimal::from).collect();
    /// let m = Matrix::from_column_major(2, 2, data).unwrap();
    /// assert_eq!(m.get(0, 1), Some(Decimal::from(3)));
    /// ```
    pub fn from_column_major(rows: usize, cols: usize, data: Vec<Decimal>) -> Result<Self> {
        let count = element_count(rows, cols)?;
        if data.len() != count {
            return Err(InvCacheError::DimensionMismatch(format!(
                "資料長度 {} 與維度 {}x{} 不符",
                data.len(),
                rows,
                cols
            )));
        }

        let mut row_major = vec![Decimal::ZERO; count];
        for (idx, value) in data.into_iter().enumerate() {
            let col = idx / rows;
            let row = idx % rows;
            row_major[row * cols + col] = value;
        }

        Ok(Self {
            rows,
            cols,
            data: row_major,
        })
    }

    /// 零矩陣
    ///
    /// # Panics
    /// 元素數量超出 `usize` 時 panic；需要檢查時使用 [`Matrix::try_zeros`]。
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Decimal::ZERO; rows.saturating_mul(cols)],
        }
    }

    /// 零矩陣，元素數量溢位時返回錯誤
    pub fn try_zeros(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            rows,
            cols,
            data: vec![Decimal::ZERO; element_count(rows, cols)?],
        })
    }

    /// 單位矩陣
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = Decimal::ONE;
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 維度 (列, 行)
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// 取得元素，越界時返回 None
    pub fn get(&self, row: usize, col: usize) -> Option<Decimal> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// 取得整列
    pub fn row(&self, row: usize) -> Option<&[Decimal]> {
        if row < self.rows {
            Some(&self.data[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    /// 列優先的底層資料
    pub fn as_slice(&self) -> &[Decimal] {
        &self.data
    }

    /// 轉為二維列資料
    pub fn to_rows(&self) -> Vec<Vec<Decimal>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.data.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    /// 數值相等：先比較維度，維度相同才逐一比較元素（精確比較，無容差）
    pub fn value_eq(&self, other: &Matrix) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        self.data.iter().zip(other.data.iter()).all(|(a, b)| a == b)
    }

    /// 矩陣乘法
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(InvCacheError::DimensionMismatch(format!(
                "無法相乘: {}x{} × {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let mut result = Matrix::try_zeros(self.rows, other.cols)?;
        for i in 0..self.rows {
            for k in 0..self.cols {
                let lhs = self.data[i * self.cols + k];
                if lhs.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    let rhs = other.data[k * other.cols + j];
                    let slot = &mut result.data[i * other.cols + j];
                    *slot = lhs
                        .checked_mul(rhs)
                        .and_then(|product| slot.checked_add(product))
                        .ok_or_else(|| {
                            InvCacheError::Overflow(format!("{} + {} × {}", slot, lhs, rhs))
                        })?;
                }
            }
        }

        Ok(result)
    }

    /// 所有元素乘上同一係數
    pub fn scale_by(&self, factor: Decimal) -> Result<Matrix> {
        let data = self
            .data
            .iter()
            .map(|v| {
                v.checked_mul(factor)
                    .ok_or_else(|| InvCacheError::Overflow(format!("{} × {}", v, factor)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// 元素絕對值的最大值（空矩陣為 0）
    pub fn max_abs(&self) -> Decimal {
        self.data
            .iter()
            .map(|v| v.abs())
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// 所有元素四捨五入到指定小數位並正規化
    pub fn round_dp(&self, dp: u32) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|v| v.round_dp(dp).normalize())
                .collect(),
        }
    }
}

fn element_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or_else(|| {
        InvCacheError::DimensionMismatch(format!("維度 {}x{} 的元素數量溢位", rows, cols))
    })
}

/// 反序列化用的原始結構，經 [`Matrix::new`] 檢查長度
#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Decimal>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = InvCacheError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        Matrix::new(raw.rows, raw.cols, raw.data)
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}

impl Eq for Matrix {}
