//! 스마트머니 편향.
//!
//! 마지막 종가와 장기 EMA를 비교한 참고용 편향입니다. 결정 자체에는 영향을 주지 않고
//! 설명 문자열로만 덧붙여집니다.

use trendlens_core::{CandleSeries, SmartMoneyBias};

use crate::indicators::{IndicatorError, IndicatorResult, TrendIndicators};

/// 마지막 종가 > EMA(period)이면 `Bullish`, 아니면 `Bearish`.
pub fn smart_money_bias(series: &CandleSeries, ema_period: usize) -> IndicatorResult<SmartMoneyBias> {
    let closes = series.closes();
    let ema = TrendIndicators::new().ema_values(&closes, ema_period)?;

    let last_ema = ema
        .last()
        .copied()
        .ok_or_else(|| IndicatorError::CalculationError("EMA 값이 없습니다".to_string()))?;

    Ok(if series.last().close() > last_ema {
        SmartMoneyBias::Bullish
    } else {
        SmartMoneyBias::Bearish
    })
}
