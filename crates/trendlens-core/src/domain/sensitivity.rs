//! 반전 감지 민감도 프로파일.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CoreError;

/// 반전 감지 민감도.
///
/// 민감도가 높을수록 신호가 더 쉽게 발생합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityProfile {
    Low,
    #[default]
    Medium,
    High,
}

/// 민감도별 고정 임계값.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensitivityThresholds {
    /// 과매수 RSI 기준
    pub rsi_high: Decimal,
    /// 과매도 RSI 기준
    pub rsi_low: Decimal,
    /// 꼬리 비율 계수 (낮을수록 쉽게 발생)
    pub wick_factor: Decimal,
    /// 몸통 압축 계수
    pub compression_factor: Decimal,
    /// 거래량 소진 비율
    pub volume_exhaustion_ratio: Decimal,
    /// 모멘텀 소진 기준 (%)
    pub momentum_exhaustion_pct: Decimal,
}

impl SensitivityProfile {
    /// 프로파일의 임계값 표를 반환합니다.
    pub fn thresholds(self) -> SensitivityThresholds {
        match self {
            SensitivityProfile::Low => SensitivityThresholds {
                rsi_high: dec!(75),
                rsi_low: dec!(25),
                wick_factor: dec!(1.4),
                compression_factor: dec!(0.35),
                volume_exhaustion_ratio: dec!(0.7),
                momentum_exhaustion_pct: dec!(0.5),
            },
            SensitivityProfile::Medium => SensitivityThresholds {
                rsi_high: dec!(70),
                rsi_low: dec!(30),
                wick_factor: dec!(1.0),
                compression_factor: dec!(0.55),
                volume_exhaustion_ratio: dec!(0.8),
                momentum_exhaustion_pct: dec!(1.0),
            },
            SensitivityProfile::High => SensitivityThresholds {
                rsi_high: dec!(65),
                rsi_low: dec!(35),
                wick_factor: dec!(0.65),
                compression_factor: dec!(0.75),
                volume_exhaustion_ratio: dec!(0.9),
                momentum_exhaustion_pct: dec!(1.5),
            },
        }
    }
}

impl FromStr for SensitivityProfile {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "mid" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(CoreError::Config(format!(
                "알 수 없는 민감도: {} (low, medium, high 중 하나)",
                other
            ))),
        }
    }
}

impl fmt::Display for SensitivityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityProfile::Low => write!(f, "low"),
            SensitivityProfile::Medium => write!(f, "medium"),
            SensitivityProfile::High => write!(f, "high"),
        }
    }
}
