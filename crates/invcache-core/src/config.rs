//! 求逆配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{InvCacheError, Result};

/// Decimal 的有效位數上限
const MAX_DECIMAL_DIGITS: u32 = 28;

/// 求逆計算參數配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InversionConfig {
    /// 奇異判定容差
    ///
    /// 矩陣先按最大元素的數量級縮放到 [1, 10)，
    /// 縮放後主元絕對值不大於此值即視為奇異，因此容差相對於矩陣本身的尺度。
    pub singular_tolerance: Decimal,

    /// 殘差容差：縮放後 `A·X - I` 任一元素絕對值超過此值即視為奇異
    pub residual_tolerance: Decimal,

    /// 結果保留的有效位數（以逆矩陣最大元素的數量級為基準）
    ///
    /// 消去過程中的除法會在第 28 位有效數字截斷，
    /// 結果四捨五入到此位數後，可精確還原有限小數的逆矩陣（例如 0.2、-0.3）。
    pub result_digits: u32,
}

impl InversionConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            singular_tolerance: Decimal::new(1, 20),
            residual_tolerance: Decimal::new(1, 12),
            result_digits: 20,
        }
    }

    /// 建構器模式：設置奇異判定容差
    pub fn with_singular_tolerance(mut self, tolerance: Decimal) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置殘差容差
    pub fn with_residual_tolerance(mut self, tolerance: Decimal) -> Self {
        self.residual_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置結果有效位數
    pub fn with_result_digits(mut self, digits: u32) -> Self {
        self.result_digits = digits;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.singular_tolerance.is_sign_negative() {
            return Err(InvCacheError::InvalidConfig(format!(
                "奇異判定容差不可為負: {}",
                self.singular_tolerance
            )));
        }

        if self.residual_tolerance.is_sign_negative() {
            return Err(InvCacheError::InvalidConfig(format!(
                "殘差容差不可為負: {}",
                self.residual_tolerance
            )));
        }

        if self.result_digits == 0 || self.result_digits > MAX_DECIMAL_DIGITS {
            return Err(InvCacheError::InvalidConfig(format!(
                "結果有效位數 {} 不在 1..={} 範圍內",
                self.result_digits, MAX_DECIMAL_DIGITS
            )));
        }

        Ok(())
    }

    /// 從 JSON 載入並驗證配置（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InvCacheError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InversionConfig::default();

        assert_eq!(config.singular_tolerance, Decimal::new(1, 20));
        assert_eq!(config.residual_tolerance, Decimal::new(1, 12));
        assert_eq!(config.result_digits, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = InversionConfig::new()
            .with_singular_tolerance(Decimal::new(1, 10))
            .with_residual_tolerance(Decimal::new(1, 8))
            .with_result_digits(12);

        assert_eq!(config.singular_tolerance, Decimal::new(1, 10));
        assert_eq!(config.residual_tolerance, Decimal::new(1, 8));
        assert_eq!(config.result_digits, 12);
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let config = InversionConfig::new().with_singular_tolerance(Decimal::new(-1, 3));
        assert!(matches!(
            config.validate(),
            Err(InvCacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_residual_tolerance() {
        let config = InversionConfig::new().with_residual_tolerance(Decimal::new(-1, 12));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_digits_out_of_range() {
        assert!(InversionConfig::new().with_result_digits(29).validate().is_err());
        assert!(InversionConfig::new().with_result_digits(0).validate().is_err());
        assert!(InversionConfig::new().with_result_digits(28).validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = InversionConfig::from_json(r#"{ "result_digits": 10 }"#).unwrap();

        assert_eq!(config.result_digits, 10);
        // 缺少的欄位使用預設值
        assert_eq!(config.singular_tolerance, Decimal::new(1, 20));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(InversionConfig::from_json("not json").is_err());
        assert!(InversionConfig::from_json(r#"{ "result_digits": 40 }"#).is_err());
    }
}
