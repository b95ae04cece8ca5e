//! 캔들 데이터 타입 및 검증된 캔들 시계열.
//!
//! - `Candle` - 불변식이 검증된 OHLCV 캔들
//! - `CandleSeries` - 타임스탬프 오름차순, 중복 제거된 캔들 시계열

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Price, Volume};

/// OHLCV 캔들.
///
/// 생성 시 `high ≥ max(open, close)`, `low ≤ min(open, close)`, 음수가 아닌 거래량을
/// 검증하며 이후에는 변경할 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candle {
    timestamp: DateTime<Utc>,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: Volume,
}

impl Candle {
    /// 새 캔들을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> CoreResult<Self> {
        if open.is_sign_negative() || low.is_sign_negative() || close.is_sign_negative() {
            return Err(CoreError::InvalidCandle(format!(
                "{}: 가격은 음수일 수 없습니다",
                timestamp
            )));
        }
        if volume.is_sign_negative() && !volume.is_zero() {
            return Err(CoreError::InvalidCandle(format!(
                "{}: 거래량은 음수일 수 없습니다 ({})",
                timestamp, volume
            )));
        }
        if high < open.max(close) {
            return Err(CoreError::InvalidCandle(format!(
                "{}: 고가 {}가 시가/종가보다 낮습니다",
                timestamp, high
            )));
        }
        if low > open.min(close) {
            return Err(CoreError::InvalidCandle(format!(
                "{}: 저가 {}가 시가/종가보다 높습니다",
                timestamp, low
            )));
        }

        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// 캔들 시작 시간.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// 시가.
    pub fn open(&self) -> Price {
        self.open
    }

    /// 고가.
    pub fn high(&self) -> Price {
        self.high
    }

    /// 저가.
    pub fn low(&self) -> Price {
        self.low
    }

    /// 종가.
    pub fn close(&self) -> Price {
        self.close
    }

    /// 거래량.
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// 캔들 몸통 크기(절대값)를 반환합니다.
    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 상단 꼬리 길이.
    pub fn upper_wick(&self) -> Decimal {
        self.high - self.open.max(self.close)
    }

    /// 하단 꼬리 길이.
    pub fn lower_wick(&self) -> Decimal {
        self.open.min(self.close) - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// 검증된 캔들 시계열.
///
/// 타임스탬프가 엄격하게 증가하며 최소 1개의 캔들을 포함합니다.
/// 같은 타임스탬프가 여러 번 들어오면 입력 순서상 마지막 캔들을 유지합니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// 캔들 목록에서 시계열을 생성합니다.
    pub fn new(mut candles: Vec<Candle>) -> CoreResult<Self> {
        if candles.is_empty() {
            return Err(CoreError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let input_len = candles.len();

        // 안정 정렬이므로 같은 타임스탬프끼리는 입력 순서가 유지됨
        candles.sort_by_key(|c| c.timestamp);

        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }

        if deduped.len() != input_len {
            tracing::debug!(
                dropped = input_len - deduped.len(),
                "Duplicate candle timestamps resolved (latest kept)"
            );
        }

        Ok(Self { candles: deduped })
    }

    /// 모든 캔들.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// 캔들 개수.
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// 생성자가 빈 시계열을 거부하므로 항상 `false`입니다.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// 마지막 캔들.
    pub fn last(&self) -> &Candle {
        // 생성 시 최소 1개 보장
        &self.candles[self.candles.len() - 1]
    }

    /// 마지막 `n`개 캔들의 구간 (부족하면 전체).
    pub fn tail(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }

    /// 고가 컬럼.
    pub fn highs(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.high).collect()
    }

    /// 저가 컬럼.
    pub fn lows(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.low).collect()
    }

    /// 종가 컬럼.
    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// 거래량 컬럼.
    pub fn volumes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// 타임스탬프 컬럼.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.candles.iter().map(|c| c.timestamp).collect()
    }
}

/// 역직렬화 시에도 불변식을 검증하기 위한 원시 표현.
#[derive(Deserialize)]
struct RawCandle {
    timestamp: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl<'de> Deserialize<'de> for Candle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawCandle::deserialize(deserializer)?;
        Candle::new(raw.timestamp, raw.open, raw.high, raw.low, raw.close, raw.volume)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn candle(secs: i64, close: Decimal) -> Candle {
        Candle::new(ts(secs), close, close + dec!(1), close - dec!(1), close, dec!(10)).unwrap()
    }

    #[test]
    fn test_candle_invariants() {
        assert!(Candle::new(ts(0), dec!(10), dec!(9), dec!(8), dec!(9.5), dec!(1)).is_err());
        assert!(Candle::new(ts(0), dec!(10), dec!(12), dec!(10.5), dec!(11), dec!(1)).is_err());
        assert!(Candle::new(ts(0), dec!(10), dec!(12), dec!(9), dec!(11), dec!(-1)).is_err());
        assert!(Candle::new(ts(0), dec!(10), dec!(12), dec!(9), dec!(11), dec!(0)).is_ok());
    }

    #[test]
    fn test_candle_wicks() {
        let c = Candle::new(ts(0), dec!(10), dec!(13), dec!(7), dec!(11), dec!(1)).unwrap();
        assert_eq!(c.body_size(), dec!(1));
        assert_eq!(c.upper_wick(), dec!(2));
        assert_eq!(c.lower_wick(), dec!(3));
        assert!(c.is_bullish());
    }

    #[test]
    fn test_series_sorts_and_keeps_latest_duplicate() {
        let series = CandleSeries::new(vec![
            candle(120, dec!(3)),
            candle(0, dec!(1)),
            candle(60, dec!(2)),
            candle(60, dec!(5)),
        ])
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![dec!(1), dec!(5), dec!(3)]);
        assert_eq!(series.last().close(), dec!(3));
    }

    #[test]
    fn test_empty_series_rejected() {
        let result = CandleSeries::new(vec![]);
        assert!(matches!(
            result,
            Err(CoreError::InsufficientData { required: 1, provided: 0 })
        ));
    }

    #[test]
    fn test_tail() {
        let series = CandleSeries::new((0..5).map(|i| candle(i * 60, dec!(10))).collect()).unwrap();
        assert_eq!(series.tail(3).len(), 3);
        assert_eq!(series.tail(10).len(), 5);
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = r#"{"timestamp":"2024-01-01T00:00:00Z","open":"10","high":"9","low":"8","close":"9","volume":"1"}"#;
        assert!(serde_json::from_str::<Candle>(bad).is_err());

        let good = r#"{"timestamp":"2024-01-01T00:00:00Z","open":"10","high":"11","low":"8","close":"9","volume":"1"}"#;
        assert!(serde_json::from_str::<Candle>(good).is_ok());
    }
}
