//! 지표 프레임.
//!
//! 캔들 시계열과 1:1로 정렬된 지표 컬럼 묶음입니다. 매 갱신 사이클마다 전체를
//! 다시 계산하며 증분 갱신은 지원하지 않습니다.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};
use trendlens_core::{CandleSeries, Direction};

use crate::config::IndicatorSettings;
use crate::indicators::{EmaParams, IndicatorEngine, IndicatorResult};

/// 캔들 시계열과 정렬된 지표 컬럼.
///
/// 데이터가 부족한 지표는 해당 컬럼 전체가 `None`이며 `warnings`에 사유가 남습니다.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorFrame {
    /// 행 수 (캔들 수와 동일)
    pub len: usize,
    /// 기간별 EMA
    pub ema: BTreeMap<usize, Vec<Option<Decimal>>>,
    pub rsi: Vec<Option<Decimal>>,
    pub macd: Vec<Option<Decimal>>,
    pub macd_signal: Vec<Option<Decimal>>,
    pub macd_hist: Vec<Option<Decimal>>,
    pub bb_upper: Vec<Option<Decimal>>,
    pub bb_mid: Vec<Option<Decimal>>,
    pub bb_lower: Vec<Option<Decimal>>,
    pub stoch_k: Vec<Option<Decimal>>,
    pub stoch_d: Vec<Option<Decimal>>,
    pub atr: Vec<Option<Decimal>>,
    pub supertrend_value: Vec<Option<Decimal>>,
    /// 직렬화 시 +1(상승) / -1(하락)
    #[serde(serialize_with = "direction_signs")]
    pub supertrend_direction: Vec<Option<Direction>>,
    /// 계산하지 못한 컬럼에 대한 경고
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl IndicatorFrame {
    /// 캔들 시계열에서 모든 지표 컬럼을 계산합니다.
    pub fn compute(
        series: &CandleSeries,
        settings: &IndicatorSettings,
        engine: &IndicatorEngine,
    ) -> Self {
        let len = series.len();
        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();

        let mut warnings = Vec::new();

        let mut ema = BTreeMap::new();
        for &period in &settings.ema_periods {
            let column = column_or_empty(
                engine.ema(&closes, EmaParams { period }),
                len,
                &format!("EMA({})", period),
                &mut warnings,
            );
            ema.insert(period, column);
        }

        let rsi = column_or_empty(
            engine.rsi(&closes, settings.rsi),
            len,
            "RSI",
            &mut warnings,
        );

        let (macd, macd_signal, macd_hist) = match engine.macd(&closes, settings.macd) {
            Ok(rows) => (
                rows.iter().map(|r| r.macd).collect(),
                rows.iter().map(|r| r.signal).collect(),
                rows.iter().map(|r| r.histogram).collect(),
            ),
            Err(e) => {
                record_skip("MACD", &e.to_string(), &mut warnings);
                (vec![None; len], vec![None; len], vec![None; len])
            }
        };

        let (bb_upper, bb_mid, bb_lower) = match engine.bollinger_bands(&closes, settings.bollinger) {
            Ok(rows) => (
                rows.iter().map(|r| r.upper).collect(),
                rows.iter().map(|r| r.middle).collect(),
                rows.iter().map(|r| r.lower).collect(),
            ),
            Err(e) => {
                record_skip("Bollinger", &e.to_string(), &mut warnings);
                (vec![None; len], vec![None; len], vec![None; len])
            }
        };

        let (stoch_k, stoch_d) = match engine.stochastic(&highs, &lows, &closes, settings.stochastic) {
            Ok(rows) => (
                rows.iter().map(|r| r.k).collect(),
                rows.iter().map(|r| r.d).collect(),
            ),
            Err(e) => {
                record_skip("Stochastic", &e.to_string(), &mut warnings);
                (vec![None; len], vec![None; len])
            }
        };

        let atr = column_or_empty(
            engine.atr(&highs, &lows, &closes, settings.atr),
            len,
            "ATR",
            &mut warnings,
        );

        let (supertrend_value, supertrend_direction) =
            match engine.supertrend(&highs, &lows, &closes, settings.supertrend) {
                Ok(rows) => (
                    rows.iter().map(|r| r.value).collect(),
                    rows.iter().map(|r| r.direction).collect(),
                ),
                Err(e) => {
                    record_skip("SuperTrend", &e.to_string(), &mut warnings);
                    (vec![None; len], vec![None; len])
                }
            };

        debug!(rows = len, skipped = warnings.len(), "Indicator frame computed");

        Self {
            len,
            ema,
            rsi,
            macd,
            macd_signal,
            macd_hist,
            bb_upper,
            bb_mid,
            bb_lower,
            stoch_k,
            stoch_d,
            atr,
            supertrend_value,
            supertrend_direction,
            warnings,
        }
    }

    /// 특정 기간의 EMA 컬럼.
    pub fn ema(&self, period: usize) -> Option<&[Option<Decimal>]> {
        self.ema.get(&period).map(Vec::as_slice)
    }

    /// 마지막 봉의 SuperTrend 방향.
    pub fn latest_supertrend_direction(&self) -> Option<Direction> {
        self.supertrend_direction.last().copied().flatten()
    }

    /// 마지막 봉의 RSI.
    pub fn latest_rsi(&self) -> Option<Decimal> {
        self.rsi.last().copied().flatten()
    }
}

fn direction_signs<S: Serializer>(column: &[Option<Direction>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(column.iter().map(|d| d.map(Direction::as_sign)))
}

fn column_or_empty(
    result: IndicatorResult<Vec<Option<Decimal>>>,
    len: usize,
    name: &str,
    warnings: &mut Vec<String>,
) -> Vec<Option<Decimal>> {
    match result {
        Ok(column) => column,
        Err(e) => {
            record_skip(name, &e.to_string(), warnings);
            vec![None; len]
        }
    }
}

fn record_skip(name: &str, reason: &str, warnings: &mut Vec<String>) {
    warn!(indicator = name, reason, "Indicator column left empty");
    warnings.push(format!("{} 계산 생략: {}", name, reason));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use trendlens_core::Candle;

    fn series(n: usize) -> CandleSeries {
        let candles = (0..n)
            .map(|i| {
                let close = Decimal::from(100 + i as i64);
                Candle::new(
                    Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                    close - dec!(0.5),
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(1000),
                )
                .unwrap()
            })
            .collect();
        CandleSeries::new(candles).unwrap()
    }

    #[test]
    fn test_columns_aligned_with_series() {
        let frame = IndicatorFrame::compute(&series(60), &IndicatorSettings::default(), &IndicatorEngine::new());

        assert_eq!(frame.len, 60);
        for column in [
            &frame.rsi,
            &frame.macd,
            &frame.bb_upper,
            &frame.stoch_k,
            &frame.atr,
            &frame.supertrend_value,
        ] {
            assert_eq!(column.len(), 60);
        }
        assert_eq!(frame.ema(20).map(|c| c.len()), Some(60));
        assert_eq!(frame.ema(50).map(|c| c.len()), Some(60));
        assert!(frame.warnings.is_empty());
        assert_eq!(frame.latest_supertrend_direction(), Some(Direction::Up));
    }

    #[test]
    fn test_bollinger_overflow_leaves_column_empty() {
        let candles = (0..30)
            .map(|i| {
                let close = if i % 2 == 0 { Decimal::from(100_000_000_000_000i64) } else { Decimal::from(300_000_000_000_000i64) };
                Candle::new(
                    Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap(),
                    close,
                    close,
                    close,
                    close,
                    dec!(1),
                )
                .unwrap()
            })
            .collect();
        let series = CandleSeries::new(candles).unwrap();

        let frame = IndicatorFrame::compute(&series, &IndicatorSettings::default(), &IndicatorEngine::new());

        assert_eq!(frame.bb_mid, vec![None; 30]);
        assert!(frame.warnings.iter().any(|w| w.starts_with("Bollinger")));
        assert!(frame.rsi.last().copied().flatten().is_some());
    }

    #[test]
    fn test_supertrend_direction_serialized_as_sign() {
        let frame = IndicatorFrame::compute(&series(20), &IndicatorSettings::default(), &IndicatorEngine::new());

        let json = serde_json::to_value(&frame).unwrap();
        let column = json["supertrend_direction"].as_array().unwrap();

        assert_eq!(column.len(), 20);
        assert!(column[0].is_null());
        assert_eq!(column[19], 1);
    }

    #[test]
    fn test_short_series_leaves_columns_empty_with_warnings() {
        let frame = IndicatorFrame::compute(&series(5), &IndicatorSettings::default(), &IndicatorEngine::new());

        assert_eq!(frame.rsi, vec![None; 5]);
        assert_eq!(frame.bb_mid, vec![None; 5]);
        assert_eq!(frame.supertrend_direction, vec![None; 5]);
        // EMA와 MACD는 첫 값으로 시드되므로 계산됨
        assert!(frame.ema(20).unwrap().iter().all(Option::is_some));
        assert!(frame.macd.iter().all(Option::is_some));
        assert!(frame.warnings.len() >= 4);
        assert_eq!(frame.latest_rsi(), None);
    }
}
