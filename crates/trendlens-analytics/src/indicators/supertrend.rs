//! SuperTrend 지표.
//!
//! SuperTrend는 ATR 기반 추세 추종 지표로, 밴드 돌파 시에만 방향이 전환됩니다.
//!
//! ## 계산 방식
//! 1. 기본 밴드 = (고가 + 저가) / 2 ± (배수 × ATR)
//! 2. 최종 상단 밴드: 전봉 종가가 전봉 최종 상단을 넘었으면 기본 상단,
//!    아니면 min(기본 상단, 전봉 최종 상단)
//! 3. 최종 하단 밴드: 대칭 (max)
//! 4. 종가 > 전봉 최종 상단 → 상승, 종가 < 전봉 최종 하단 → 하락, 그 외 유지
//!
//! ATR이 처음 정의되는 시점에서 방향은 상승, 밴드는 기본 밴드로 시작합니다.
//! 밴드는 확정된 돌파 없이는 뒤로 물러나지 않습니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendlens_core::Direction;

use super::volatility::{AtrParams, VolatilityIndicators};
use super::{IndicatorError, IndicatorResult};

/// SuperTrend 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperTrendParams {
    /// ATR 기간 (기본: 10).
    pub atr_period: usize,
    /// ATR 배수 (기본: 3.0).
    pub multiplier: Decimal,
}

impl Default for SuperTrendParams {
    fn default() -> Self {
        Self {
            atr_period: 10,
            multiplier: dec!(3.0),
        }
    }
}

/// SuperTrend 결과.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SuperTrendResult {
    /// SuperTrend 값 (상승: 최종 하단, 하락: 최종 상단).
    pub value: Option<Decimal>,
    /// 추세 방향 (ATR 정의 전은 None).
    pub direction: Option<Direction>,
    /// 최종 상단 밴드.
    pub final_upper: Option<Decimal>,
    /// 최종 하단 밴드.
    pub final_lower: Option<Decimal>,
    /// 매수 시그널 (추세 전환: 하락 -> 상승).
    pub buy_signal: bool,
    /// 매도 시그널 (추세 전환: 상승 -> 하락).
    pub sell_signal: bool,
}

/// 한 번의 계산 패스 동안 유지되는 밴드 상태.
#[derive(Debug, Clone, Copy)]
struct BandState {
    final_upper: Decimal,
    final_lower: Decimal,
    direction: Direction,
}

/// SuperTrend 계산기.
#[derive(Debug, Clone, Default)]
pub struct SuperTrendIndicator {
    volatility: VolatilityIndicators,
}

impl SuperTrendIndicator {
    /// 새로운 SuperTrend 계산기 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// SuperTrend 지표 계산.
    ///
    /// # 반환
    /// 각 시점의 SuperTrend 값과 시그널 (입력과 같은 길이)
    pub fn calculate(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: SuperTrendParams,
    ) -> IndicatorResult<Vec<SuperTrendResult>> {
        if high.len() != low.len() || high.len() != close.len() {
            return Err(IndicatorError::InvalidParameter(
                "고가, 저가, 종가 데이터의 길이가 일치하지 않습니다".to_string(),
            ));
        }

        if params.multiplier <= Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter(
                "배수는 0보다 커야 합니다".to_string(),
            ));
        }

        let atr = self.volatility.atr(
            high,
            low,
            close,
            AtrParams {
                period: params.atr_period,
            },
        )?;

        let mut result = Vec::with_capacity(high.len());
        let mut state: Option<BandState> = None;

        for i in 0..high.len() {
            let Some(atr_val) = atr[i] else {
                result.push(SuperTrendResult::default());
                continue;
            };

            let hl2 = (high[i] + low[i]) / dec!(2);
            let raw_upper = hl2 + params.multiplier * atr_val;
            let raw_lower = hl2 - params.multiplier * atr_val;

            let next = match state {
                None => BandState {
                    final_upper: raw_upper,
                    final_lower: raw_lower,
                    direction: Direction::Up,
                },
                Some(prev) => {
                    let prev_close = close[i - 1];

                    let final_upper = if prev_close > prev.final_upper {
                        raw_upper
                    } else {
                        raw_upper.min(prev.final_upper)
                    };

                    let final_lower = if prev_close < prev.final_lower {
                        raw_lower
                    } else {
                        raw_lower.max(prev.final_lower)
                    };

                    let direction = if close[i] > prev.final_upper {
                        Direction::Up
                    } else if close[i] < prev.final_lower {
                        Direction::Down
                    } else {
                        prev.direction
                    };

                    BandState {
                        final_upper,
                        final_lower,
                        direction,
                    }
                }
            };

            let flipped_from = state.map(|s| s.direction).filter(|d| *d != next.direction);

            result.push(SuperTrendResult {
                value: Some(match next.direction {
                    Direction::Up => next.final_lower,
                    Direction::Down => next.final_upper,
                }),
                direction: Some(next.direction),
                final_upper: Some(next.final_upper),
                final_lower: Some(next.final_lower),
                buy_signal: flipped_from == Some(Direction::Down),
                sell_signal: flipped_from == Some(Direction::Up),
            });

            state = Some(next);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(atr_period: usize, multiplier: Decimal) -> SuperTrendParams {
        SuperTrendParams {
            atr_period,
            multiplier,
        }
    }

    #[test]
    fn test_supertrend_band_carry_forward_and_flips() {
        let indicator = SuperTrendIndicator::new();
        let high = vec![dec!(11), dec!(11), dec!(7), dec!(7), dec!(13)];
        let low = vec![dec!(9), dec!(9), dec!(5), dec!(5), dec!(11)];
        let close = vec![dec!(10), dec!(10), dec!(6), dec!(6), dec!(12)];

        let result = indicator
            .calculate(&high, &low, &close, params(1, dec!(1)))
            .unwrap();

        // 시드: 상승, 기본 밴드
        assert_eq!(result[0].direction, Some(Direction::Up));
        assert_eq!(result[0].final_upper, Some(dec!(12)));
        assert_eq!(result[0].value, Some(dec!(8)));

        // 밴드 내 유지
        assert_eq!(result[1].direction, Some(Direction::Up));

        // 종가 6 < 전봉 최종 하단 8 → 하락 전환
        assert_eq!(result[2].direction, Some(Direction::Down));
        assert!(result[2].sell_signal);
        assert_eq!(result[2].final_upper, Some(dec!(11)));
        assert_eq!(result[2].final_lower, Some(dec!(8)));
        assert_eq!(result[2].value, Some(dec!(11)));

        // 상단 밴드는 min으로 내려오고, 하단은 전봉 종가 돌파로 리셋
        assert_eq!(result[3].direction, Some(Direction::Down));
        assert_eq!(result[3].final_upper, Some(dec!(8)));
        assert_eq!(result[3].final_lower, Some(dec!(4)));
        assert!(!result[3].buy_signal && !result[3].sell_signal);

        // 종가 12 > 전봉 최종 상단 8 → 상승 전환
        assert_eq!(result[4].direction, Some(Direction::Up));
        assert!(result[4].buy_signal);
        assert_eq!(result[4].final_lower, Some(dec!(5)));
        assert_eq!(result[4].value, Some(dec!(5)));
    }

    #[test]
    fn test_supertrend_rising_series_stays_up() {
        let indicator = SuperTrendIndicator::new();
        let close: Vec<Decimal> = (0..30).map(|i| Decimal::from(100 + i)).collect();
        let high: Vec<Decimal> = close.iter().map(|c| c + dec!(0.5)).collect();
        let low: Vec<Decimal> = close.iter().map(|c| c - dec!(0.5)).collect();

        let result = indicator
            .calculate(&high, &low, &close, SuperTrendParams::default())
            .unwrap();

        assert_eq!(result.len(), close.len());
        assert!(result[8].value.is_none());
        assert!(result[9..].iter().all(|r| r.direction == Some(Direction::Up)));
        assert!(result.iter().all(|r| !r.sell_signal));
    }

    #[test]
    fn test_final_lower_never_retreats_in_uptrend() {
        let indicator = SuperTrendIndicator::new();
        let close = vec![
            dec!(100), dec!(101), dec!(100.5), dec!(102), dec!(101), dec!(103), dec!(102.5),
            dec!(104), dec!(103), dec!(105),
        ];
        let high: Vec<Decimal> = close.iter().map(|c| c + dec!(1)).collect();
        let low: Vec<Decimal> = close.iter().map(|c| c - dec!(1)).collect();

        let result = indicator
            .calculate(&high, &low, &close, params(3, dec!(2)))
            .unwrap();

        for pair in result.windows(2) {
            if let (Some(Direction::Up), Some(Direction::Up), Some(a), Some(b)) = (
                pair[0].direction,
                pair[1].direction,
                pair[0].final_lower,
                pair[1].final_lower,
            ) {
                assert!(b >= a);
            }
        }
    }

    #[test]
    fn test_mismatched_length_error() {
        let indicator = SuperTrendIndicator::new();
        let high = vec![dec!(100.0), dec!(101.0)];
        let low = vec![dec!(99.0)];
        let close = vec![dec!(100.0), dec!(101.0)];

        let result = indicator.calculate(&high, &low, &close, SuperTrendParams::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_insufficient_data_error() {
        let indicator = SuperTrendIndicator::new();
        let v = vec![dec!(100.0); 5];

        let result = indicator.calculate(&v, &v, &v, SuperTrendParams::default());
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 10, provided: 5 })
        ));
    }

    #[test]
    fn test_invalid_multiplier_error() {
        let indicator = SuperTrendIndicator::new();
        let v = vec![dec!(100.0); 20];

        let result = indicator.calculate(&v, &v, &v, params(10, dec!(-1.0)));
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }
}
