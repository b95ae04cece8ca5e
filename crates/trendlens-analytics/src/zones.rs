//! 수요/공급 존 감지기.
//!
//! 스윙 저점/고점을 추출해 좁은 가격대(존)로 만들고, 가까운 존끼리 병합합니다.
//!
//! - 스윙 저점: 좌우 `lookback`개 봉을 포함한 구간에서 저가가 최소인 봉
//!   (동률이면 가장 왼쪽)
//! - 스윙 고점: 대칭 (최대)
//! - 수요 존: `(저가, 저가 × (1 + 폭%))`, 공급 존: `(고가 × (1 - 폭%), 고가)`
//! - 병합: 하단 기준 정렬 후, 겹치거나 간격이 직전 존 상단 대비 임계값 미만이면 병합
//!
//! 병합 결과는 서로 겹치지 않으며, 다시 병합해도 같은 결과가 나옵니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;
use trendlens_core::{Candle, CandleSeries};

use crate::config::ZoneSettings;
use crate::indicators::{IndicatorError, IndicatorResult};

/// 가격 존.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub low: Decimal,
    pub high: Decimal,
}

impl Zone {
    pub fn new(low: Decimal, high: Decimal) -> Self {
        Self { low, high }
    }
}

/// 수요/공급 존 묶음.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneSet {
    pub demand: Vec<Zone>,
    pub supply: Vec<Zone>,
}

/// 존 감지기.
#[derive(Debug, Clone, Default)]
pub struct ZoneDetector {
    settings: ZoneSettings,
}

impl ZoneDetector {
    pub fn new(settings: ZoneSettings) -> Self {
        Self { settings }
    }

    /// 스윙 판정에 필요한 최소 캔들 수.
    pub fn min_candles(&self) -> usize {
        2 * self.settings.swing_lookback + 1
    }

    /// 수요/공급 존을 감지합니다.
    pub fn detect(&self, series: &CandleSeries) -> IndicatorResult<ZoneSet> {
        let candles = series.candles();
        if candles.len() < self.min_candles() {
            return Err(IndicatorError::InsufficientData {
                required: self.min_candles(),
                provided: candles.len(),
            });
        }

        let width = self.settings.zone_width_pct / dec!(100);

        let demand: Vec<Zone> = self
            .swing_lows(candles)
            .into_iter()
            .map(|i| {
                let low = candles[i].low();
                Zone::new(low, low * (Decimal::ONE + width))
            })
            .collect();

        let supply: Vec<Zone> = self
            .swing_highs(candles)
            .into_iter()
            .map(|i| {
                let high = candles[i].high();
                Zone::new(high * (Decimal::ONE - width), high)
            })
            .collect();

        let raw_demand = demand.len();
        let raw_supply = supply.len();
        let zones = ZoneSet {
            demand: merge_zones(demand, self.settings.merge_threshold_pct),
            supply: merge_zones(supply, self.settings.merge_threshold_pct),
        };

        debug!(
            raw_demand,
            raw_supply,
            demand = zones.demand.len(),
            supply = zones.supply.len(),
            "Zones detected"
        );

        Ok(zones)
    }

    /// 스윙 저점 인덱스.
    pub fn swing_lows(&self, candles: &[Candle]) -> Vec<usize> {
        self.swing_indices(candles, |c| c.low(), |other, current| other > current, |other, current| other >= current)
    }

    /// 스윙 고점 인덱스.
    pub fn swing_highs(&self, candles: &[Candle]) -> Vec<usize> {
        self.swing_indices(candles, |c| c.high(), |other, current| other < current, |other, current| other <= current)
    }

    /// 좌측은 엄격 비교, 우측은 동률 허용 (동률이면 가장 왼쪽 봉이 스윙).
    fn swing_indices(
        &self,
        candles: &[Candle],
        price: impl Fn(&Candle) -> Decimal,
        beats_before: impl Fn(Decimal, Decimal) -> bool,
        beats_after: impl Fn(Decimal, Decimal) -> bool,
    ) -> Vec<usize> {
        let lookback = self.settings.swing_lookback;
        if candles.len() < 2 * lookback + 1 {
            return Vec::new();
        }

        (lookback..candles.len() - lookback)
            .filter(|&idx| {
                let current = price(&candles[idx]);
                (idx - lookback..idx).all(|i| beats_before(price(&candles[i]), current))
                    && (idx + 1..=idx + lookback).all(|i| beats_after(price(&candles[i]), current))
            })
            .collect()
    }
}

/// 존 목록을 병합합니다.
///
/// 하단 기준으로 정렬한 뒤, 다음 존이 직전 존과 겹치거나
/// `(다음.low - 직전.high) / 직전.high × 100 < threshold_pct`이면 하나로 합칩니다.
/// 직전 상단이 0이면 겹칠 때만 병합합니다.
pub fn merge_zones(mut zones: Vec<Zone>, threshold_pct: Decimal) -> Vec<Zone> {
    zones.sort_by(|a, b| a.low.cmp(&b.low).then(a.high.cmp(&b.high)));

    let threshold = threshold_pct / dec!(100);
    let mut merged: Vec<Zone> = Vec::with_capacity(zones.len());

    for zone in zones {
        match merged.last_mut() {
            Some(last) if should_merge(last, &zone, threshold) => {
                last.high = last.high.max(zone.high);
            }
            _ => merged.push(zone),
        }
    }

    merged
}

fn should_merge(last: &Zone, next: &Zone, threshold: Decimal) -> bool {
    if next.low <= last.high {
        return true;
    }
    if last.high.is_zero() {
        return false;
    }
    (next.low - last.high) / last.high < threshold
}
