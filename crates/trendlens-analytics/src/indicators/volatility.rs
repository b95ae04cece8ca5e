//! 변동성 지표 (Volatility Indicators).
//!
//! 가격 변동성을 측정하는 지표들을 제공합니다.
//! - Bollinger Bands (볼린저 밴드)
//! - ATR (Average True Range, 평균 실제 범위)

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: Decimal,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: dec!(2.0),
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드 (MA + k × σ).
    pub upper: Option<Decimal>,
    /// 중간 밴드 (이동평균).
    pub middle: Option<Decimal>,
    /// 하단 밴드 (MA - k × σ).
    pub lower: Option<Decimal>,
}

impl BollingerBandsResult {
    fn empty() -> Self {
        Self {
            upper: None,
            middle: None,
            lower: None,
        }
    }
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Clone, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 밴드 = SMA(period), 상단/하단 = 중간 ± k × 표본 표준편차(period)
    ///
    /// 표본 표준편차는 (n - 1)로 나눕니다. period = 1이면 표준편차는 0입니다.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let period_decimal = Decimal::from(period);
        let mut result = vec![BollingerBandsResult::empty(); period - 1];

        for window in prices.windows(period) {
            let sum = window
                .iter()
                .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
                .ok_or_else(|| overflow("이동평균"))?;
            let ma = sum / period_decimal;

            let std_dev = if period > 1 {
                let squares = window
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, p| {
                        let diff = p.checked_sub(ma)?;
                        acc.checked_add(diff.checked_mul(diff)?)
                    })
                    .ok_or_else(|| overflow("분산"))?;
                sqrt_decimal(squares / Decimal::from(period - 1))
            } else {
                Decimal::ZERO
            };

            let deviation = params
                .std_dev_multiplier
                .checked_mul(std_dev)
                .ok_or_else(|| overflow("밴드 폭"))?;
            let (Some(upper), Some(lower)) = (ma.checked_add(deviation), ma.checked_sub(deviation)) else {
                return Err(overflow("밴드"));
            };
            result.push(BollingerBandsResult {
                upper: Some(upper),
                middle: Some(ma),
                lower: Some(lower),
            });
        }

        Ok(result)
    }

    /// True Range 계산.
    ///
    /// TR[0] = 고가 - 저가, 이후 max(고가 - 저가, |고가 - 전일종가|, |저가 - 전일종가|)
    pub fn true_range(&self, high: &[Decimal], low: &[Decimal], close: &[Decimal]) -> Vec<Decimal> {
        let len = high.len().min(low.len()).min(close.len());

        (0..len)
            .map(|i| {
                let hl = high[i] - low[i];
                if i == 0 {
                    hl
                } else {
                    let hc = (high[i] - close[i - 1]).abs();
                    let lc = (low[i] - close[i - 1]).abs();
                    hl.max(hc).max(lc)
                }
            })
            .collect()
    }

    /// ATR (Average True Range) 계산.
    ///
    /// ATR = True Range의 단순 이동평균 (period)
    ///
    /// # 반환
    /// ATR 값들 (인덱스 period-1 이전은 None)
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let true_ranges = self.true_range(high, low, close);

        if true_ranges.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: true_ranges.len(),
            });
        }

        let period_decimal = Decimal::from(period);
        let mut result = vec![None; period - 1];
        result.extend(
            true_ranges
                .windows(period)
                .map(|w| Some(w.iter().sum::<Decimal>() / period_decimal)),
        );

        Ok(result)
    }
}

/// Decimal 제곱근 계산 (Newton-Raphson 방법).
///
/// Decimal 타입은 기본 제곱근 함수가 없으므로 직접 구현합니다.
/// f64 근사값에서 시작해 수렴할 때까지 반복합니다.
fn overflow(what: &str) -> IndicatorError {
    IndicatorError::CalculationError(format!("{} 계산 중 Decimal 범위를 초과했습니다", what))
}

pub(crate) fn sqrt_decimal(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut x = value
        .to_f64()
        .map(f64::sqrt)
        .and_then(Decimal::from_f64)
        .filter(|g| *g > Decimal::ZERO)
        .unwrap_or(value);
    let two = dec!(2);

    for _ in 0..20 {
        let next = (x + value / x) / two;
        if next == x {
            break;
        }
        x = next;
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_decimal() {
        assert_eq!(sqrt_decimal(dec!(0)), Decimal::ZERO);
        assert!((sqrt_decimal(dec!(16)) - dec!(4)).abs() < dec!(0.0000001));
        assert!((sqrt_decimal(dec!(2)) - dec!(1.41421356)).abs() < dec!(0.0000001));
        assert!((sqrt_decimal(dec!(1000000)) - dec!(1000)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_bollinger_sample_std_dev() {
        let vol = VolatilityIndicators::new();
        let prices = vec![dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];

        let bb = vol
            .bollinger_bands(
                &prices,
                BollingerBandsParams {
                    period: 8,
                    std_dev_multiplier: dec!(1),
                },
            )
            .unwrap();

        assert!(bb[6].middle.is_none());
        let last = bb[7];
        assert_eq!(last.middle, Some(dec!(5)));

        // 제곱편차 합 32, n-1 = 7 → σ = sqrt(32/7) ≈ 2.13809
        let sigma = last.upper.unwrap() - dec!(5);
        assert!((sigma - dec!(2.13809)).abs() < dec!(0.0001));
        assert_eq!(last.lower.unwrap(), dec!(5) - sigma);
    }

    #[test]
    fn test_bollinger_constant_series_collapses() {
        let vol = VolatilityIndicators::new();
        let prices = vec![dec!(100); 25];

        let bb = vol.bollinger_bands(&prices, BollingerBandsParams::default()).unwrap();
        let last = bb[24];
        assert_eq!(last.upper, Some(dec!(100)));
        assert_eq!(last.lower, Some(dec!(100)));
    }

    #[test]
    fn test_bollinger_overflow_is_calculation_error() {
        let vol = VolatilityIndicators::new();
        // 편차 1e14의 제곱(1e28)을 8번 더하면 Decimal 최대값을 넘음
        let prices: Vec<Decimal> = (0..20)
            .map(|i| if i % 2 == 0 { Decimal::from(100_000_000_000_000i64) } else { Decimal::from(300_000_000_000_000i64) })
            .collect();

        let result = vol.bollinger_bands(&prices, BollingerBandsParams::default());
        assert!(matches!(result, Err(IndicatorError::CalculationError(_))));
    }

    #[test]
    fn test_true_range_uses_previous_close() {
        let vol = VolatilityIndicators::new();
        let high = vec![dec!(10), dec!(15)];
        let low = vec![dec!(8), dec!(14)];
        let close = vec![dec!(9), dec!(14.5)];

        let tr = vol.true_range(&high, &low, &close);
        assert_eq!(tr, vec![dec!(2), dec!(6)]);
    }

    #[test]
    fn test_atr_rolling_mean() {
        let vol = VolatilityIndicators::new();
        let high = vec![dec!(10), dec!(11), dec!(12), dec!(13)];
        let low = vec![dec!(9), dec!(10), dec!(11), dec!(12)];
        let close = vec![dec!(9.5), dec!(10.5), dec!(11.5), dec!(12.5)];

        let atr = vol.atr(&high, &low, &close, AtrParams { period: 3 }).unwrap();

        // TR = [1, 1.5, 1.5, 1.5]
        assert!(atr[1].is_none());
        assert_eq!(atr[2], Some(dec!(4) / dec!(3)));
        assert_eq!(atr[3], Some(dec!(1.5)));
    }

    #[test]
    fn test_atr_insufficient_data() {
        let vol = VolatilityIndicators::new();
        let v = vec![dec!(1); 5];
        assert!(matches!(
            vol.atr(&v, &v, &v, AtrParams { period: 14 }),
            Err(IndicatorError::InsufficientData { required: 14, provided: 5 })
        ));
    }
}
