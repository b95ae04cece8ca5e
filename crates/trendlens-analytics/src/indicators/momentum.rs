//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 모멘텀과 과매수/과매도 상태를 측정하는 지표들을 제공합니다.
//! - RSI (Relative Strength Index, Wilder 평활)
//! - Stochastic Oscillator
//! - N봉 변화율 모멘텀

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 스토캐스틱 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    /// %K 기간 (기본: 14).
    pub k_period: usize,
    /// %D 기간 (smoothing, 기본: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

/// 스토캐스틱 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticResult {
    /// %K (Fast Stochastic).
    pub k: Option<Decimal>,
    /// %D (Slow Stochastic, %K의 이동평균).
    pub d: Option<Decimal>,
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Clone, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// Wilder 평활: 첫 평균은 1..=period 구간 변화량의 단순 평균, 이후
    /// avg[t] = (avg[t-1] × (period - 1) + x[t]) / period.
    /// 평균 하락폭이 0이면 RSI = 100.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (인덱스 period 이전은 None)
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        let (gains, losses): (Vec<Decimal>, Vec<Decimal>) = prices
            .windows(2)
            .map(|w| {
                let delta = w[1] - w[0];
                if delta > Decimal::ZERO {
                    (delta, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, -delta)
                }
            })
            .unzip();

        let period_dec = Decimal::from(period);
        let prev_weight = Decimal::from(period - 1);

        let mut avg_gain: Decimal = gains[..period].iter().sum::<Decimal>() / period_dec;
        let mut avg_loss: Decimal = losses[..period].iter().sum::<Decimal>() / period_dec;

        let mut result = vec![None; period];
        result.push(Some(Self::rsi_value(avg_gain, avg_loss)));

        // gains[i]는 prices[i + 1]의 변화량
        for i in period..gains.len() {
            avg_gain = (avg_gain * prev_weight + gains[i]) / period_dec;
            avg_loss = (avg_loss * prev_weight + losses[i]) / period_dec;
            result.push(Some(Self::rsi_value(avg_gain, avg_loss)));
        }

        Ok(result)
    }

    fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
        if avg_loss.is_zero() {
            return dec!(100);
        }
        let rs = avg_gain / avg_loss;
        let rsi = dec!(100) - (dec!(100) / (Decimal::ONE + rs));
        rsi.clamp(Decimal::ZERO, dec!(100))
    }

    /// 스토캐스틱 오실레이터 계산.
    ///
    /// %K = (현재가 - 최저가) / (최고가 - 최저가) × 100
    /// %D = %K의 이동평균
    ///
    /// 범위가 0이면 %K = 50.
    pub fn stochastic(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        if params.k_period == 0 || params.d_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "%K, %D 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let len = high.len().min(low.len()).min(close.len());

        if len < params.k_period {
            return Err(IndicatorError::InsufficientData {
                required: params.k_period,
                provided: len,
            });
        }

        let mut k_values: Vec<Option<Decimal>> = Vec::with_capacity(len);

        for i in 0..len {
            if i < params.k_period - 1 {
                k_values.push(None);
                continue;
            }

            let start = i + 1 - params.k_period;
            let highest = high[start..=i].iter().max().copied().unwrap_or(Decimal::ZERO);
            let lowest = low[start..=i].iter().min().copied().unwrap_or(Decimal::ZERO);

            let range = highest - lowest;
            if range.is_zero() {
                k_values.push(Some(dec!(50))); // 범위가 0이면 중립값
            } else {
                k_values.push(Some(((close[i] - lowest) / range) * dec!(100)));
            }
        }

        let d_period_dec = Decimal::from(params.d_period);
        let first_d = params.k_period + params.d_period - 2;

        let result = (0..len)
            .map(|i| {
                let d = if i < first_d {
                    None
                } else {
                    let sum: Decimal = k_values[i + 1 - params.d_period..=i].iter().flatten().sum();
                    Some(sum / d_period_dec)
                };
                StochasticResult { k: k_values[i], d }
            })
            .collect();

        Ok(result)
    }

    /// 마지막 시점의 N봉 변화율(%)을 계산합니다.
    ///
    /// 데이터가 `lookback + 1`개보다 적으면 가능한 가장 오래된 값을 기준으로 합니다.
    /// 기준값이 0이면 `None`.
    pub fn pct_momentum(&self, prices: &[Decimal], lookback: usize) -> Option<Decimal> {
        let last = *prices.last()?;
        let base_idx = prices.len().saturating_sub(lookback + 1);
        let base = prices[base_idx];

        if base.is_zero() {
            return None;
        }
        Some((last - base) / base * dec!(100))
    }
}
