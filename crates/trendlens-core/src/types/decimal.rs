//! 정밀한 가격 계산을 위한 Decimal 유틸리티.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Volume = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// f64로 변환합니다 (표현 불가 시 0.0).
    fn to_f64_lossy(&self) -> f64;

    /// 기준값 대비 변화율(%)을 계산합니다. 기준값이 0이면 `None`.
    fn pct_change_from(&self, base: Decimal) -> Option<Decimal>;

    /// 안전한 나눗셈. 분모가 0이면 `None`.
    fn checked_ratio(&self, denominator: Decimal) -> Option<Decimal>;
}

impl DecimalExt for Decimal {
    fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    fn pct_change_from(&self, base: Decimal) -> Option<Decimal> {
        if base.is_zero() {
            return None;
        }
        Some((*self - base) / base * Decimal::ONE_HUNDRED)
    }

    fn checked_ratio(&self, denominator: Decimal) -> Option<Decimal> {
        if denominator.is_zero() {
            return None;
        }
        self.checked_div(denominator)
    }
}

/// 값들의 산술 평균. 비어 있으면 `None`.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some(sum / Decimal::from(values.len()))
}
