//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// 추세 지표 계산기.
#[derive(Debug, Clone, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 반환
    /// 각 시점의 SMA 값 (처음 period-1개는 None)
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
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
        let mut result = vec![None; period - 1];
        result.extend(
            prices
                .windows(period)
                .map(|w| Some(w.iter().sum::<Decimal>() / period_decimal)),
        );

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// e[0] = P[0], e[t] = α × P[t] + (1 - α) × e[t-1], α = 2 / (period + 1)
    ///
    /// 첫 값으로 시드하므로 모든 시점에 값이 있으며, period = 1이면 입력과 같습니다.
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        Ok(self.ema_values(prices, params.period)?.into_iter().map(Some).collect())
    }

    /// EMA 값을 `Option` 없이 반환합니다.
    pub(crate) fn ema_values(&self, prices: &[Decimal], period: usize) -> IndicatorResult<Vec<Decimal>> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let Some(&first) = prices.first() else {
            return Err(IndicatorError::InsufficientData {
                required: 1,
                provided: 0,
            });
        };

        let alpha = dec!(2) / Decimal::from(period + 1);
        let mut result = Vec::with_capacity(prices.len());
        let mut prev = first;
        result.push(prev);

        for price in prices.iter().skip(1) {
            prev += alpha * (*price - prev);
            result.push(prev);
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        if params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 기간({})은 장기 기간({})보다 작아야 합니다",
                params.fast_period, params.slow_period
            )));
        }

        let fast = self.ema_values(prices, params.fast_period)?;
        let slow = self.ema_values(prices, params.slow_period)?;

        let macd_line: Vec<Decimal> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = self.ema_values(&macd_line, params.signal_period)?;

        Ok(macd_line
            .iter()
            .zip(&signal_line)
            .map(|(m, s)| MacdResult {
                macd: Some(*m),
                signal: Some(*s),
                histogram: Some(m - s),
            })
            .collect())
    }
}
