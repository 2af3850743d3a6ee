//! Gauss-Jordan 消去法求逆

use invcache_core::{InvCacheError, InversionConfig, Matrix};
use rust_decimal::Decimal;

use crate::MatrixInverter;

/// Decimal 的最大小數位數
const MAX_SCALE: i32 = 28;

/// Gauss-Jordan 求逆器（部分主元）
///
/// 求逆前先把矩陣按最大元素的數量級縮放到 [1, 10)，
/// 奇異容差與結果位數因此都相對於矩陣本身的尺度：
/// `[[1e-21]]` 與 `[[1e21]]` 都可求逆，等比放大的奇異矩陣仍判定為奇異。
#[derive(Debug, Clone, Default)]
pub struct GaussJordanInverter {
    config: InversionConfig,
}

impl GaussJordanInverter {
    /// 創建使用預設配置的求逆器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定配置創建求逆器
    pub fn with_config(config: InversionConfig) -> invcache_core::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 獲取配置引用
    pub fn config(&self) -> &InversionConfig {
        &self.config
    }

    /// 對增廣矩陣 [A | I] 做消去，返回右半部
    fn eliminate(&self, matrix: &Matrix) -> invcache_core::Result<Vec<Vec<Decimal>>> {
        let n = matrix.rows();
        let mut lhs = matrix.to_rows();
        let mut rhs = Matrix::identity(n).to_rows();

        for col in 0..n {
            // 部分主元：選該行中絕對值最大的列
            let pivot_row = (col..n)
                .max_by_key(|&r| lhs[r][col].abs())
                .unwrap_or(col);

            let pivot = lhs[pivot_row][col];
            if pivot.abs() <= self.config.singular_tolerance {
                tracing::debug!("第 {} 行主元 {} 低於容差，判定為奇異", col, pivot);
                return Err(InvCacheError::Singular);
            }

            if pivot_row != col {
                lhs.swap(pivot_row, col);
                rhs.swap(pivot_row, col);
            }

            for j in 0..n {
                lhs[col][j] = checked_div(lhs[col][j], pivot)?;
                rhs[col][j] = checked_div(rhs[col][j], pivot)?;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }

                let factor = lhs[r][col];
                if factor.is_zero() {
                    continue;
                }

                for j in 0..n {
                    lhs[r][j] = checked_sub_mul(lhs[r][j], factor, lhs[col][j])?;
                    rhs[r][j] = checked_sub_mul(rhs[r][j], factor, rhs[col][j])?;
                }
            }
        }

        Ok(rhs)
    }
}

impl MatrixInverter for GaussJordanInverter {
    fn invert(&self, matrix: &Matrix) -> invcache_core::Result<Matrix> {
        let (rows, cols) = matrix.dims();
        if rows != cols {
            return Err(InvCacheError::NotSquare { rows, cols });
        }
        if rows == 0 {
            return Err(InvCacheError::EmptyMatrix);
        }

        let max_abs = matrix.max_abs();
        if max_abs.is_zero() {
            return Err(InvCacheError::Singular);
        }

        // A = A' · 10^e，則 A⁻¹ = A'⁻¹ · 10^-e
        let exponent = decimal_exponent(max_abs);
        tracing::debug!("開始求逆：{}x{}，數量級 10^{}", rows, cols, exponent);

        let normalized = matrix.scale_by(pow10(-exponent)?)?;
        let raw = Matrix::from_rows(self.eliminate(&normalized)?)?;
        self.check_residual(&normalized, &raw)?;

        let rounded = self.round_significant(&raw);
        rescale(&rounded, pow10(-exponent)?)
    }
}

impl GaussJordanInverter {
    /// 檢查 A'·X' 與單位矩陣的差距，攔截捨入殘差造成的假結果
    fn check_residual(&self, normalized: &Matrix, raw: &Matrix) -> invcache_core::Result<()> {
        let product = normalized.multiply(raw)?;
        let n = product.cols();

        for (idx, value) in product.as_slice().iter().enumerate() {
            let expected = if idx / n == idx % n {
                Decimal::ONE
            } else {
                Decimal::ZERO
            };
            let residual = value
                .checked_sub(expected)
                .ok_or_else(|| InvCacheError::Overflow(format!("{} - {}", value, expected)))?
                .abs();

            if residual > self.config.residual_tolerance {
                tracing::debug!("殘差 {} 超過容差，判定為奇異", residual);
                return Err(InvCacheError::Singular);
            }
        }

        Ok(())
    }

    /// 以最大元素的數量級為基準，保留 `result_digits` 位有效數字
    fn round_significant(&self, raw: &Matrix) -> Matrix {
        let max_abs = raw.max_abs();
        if max_abs.is_zero() {
            return raw.clone();
        }

        let dp = (self.config.result_digits as i32 - 1 - decimal_exponent(max_abs))
            .clamp(0, MAX_SCALE);
        raw.round_dp(dp as u32)
    }
}

/// 非零值的十進位數量級：floor(log10(|value|))
fn decimal_exponent(value: Decimal) -> i32 {
    let mut mantissa = value.mantissa().unsigned_abs();
    let mut digits = 0;
    while mantissa > 0 {
        mantissa /= 10;
        digits += 1;
    }
    digits - 1 - value.scale() as i32
}

fn pow10(exponent: i32) -> invcache_core::Result<Decimal> {
    let overflow = || InvCacheError::Overflow(format!("10^{}", exponent));
    if exponent >= 0 {
        let value = 10i128
            .checked_pow(exponent.unsigned_abs())
            .ok_or_else(overflow)?;
        Decimal::try_from_i128_with_scale(value, 0).map_err(|_| overflow())
    } else {
        Decimal::try_from_i128_with_scale(1, exponent.unsigned_abs()).map_err(|_| overflow())
    }
}

/// 還原尺度；非零元素因超出 Decimal 精度變成 0 時返回錯誤
fn rescale(rounded: &Matrix, factor: Decimal) -> invcache_core::Result<Matrix> {
    let scaled = rounded.scale_by(factor)?;

    let lost = rounded
        .as_slice()
        .iter()
        .zip(scaled.as_slice())
        .find(|(before, after)| !before.is_zero() && after.is_zero());
    if let Some((before, _)) = lost {
        return Err(InvCacheError::Underflow(format!("{} × {}", before, factor)));
    }

    Ok(scaled)
}

fn checked_div(lhs: Decimal, rhs: Decimal) -> invcache_core::Result<Decimal> {
    lhs.checked_div(rhs)
        .ok_or_else(|| InvCacheError::Overflow(format!("{} / {}", lhs, rhs)))
}

/// lhs - factor * value
fn checked_sub_mul(lhs: Decimal, factor: Decimal, value: Decimal) -> invcache_core::Result<Decimal> {
    factor
        .checked_mul(value)
        .and_then(|product| lhs.checked_sub(product))
        .ok_or_else(|| InvCacheError::Overflow(format!("{} - {} × {}", lhs, factor, value)))
}
