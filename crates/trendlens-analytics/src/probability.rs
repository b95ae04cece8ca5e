//! 반전 확률 점수기.
//!
//! 마지막 봉에 가중 점수를 매겨 0~100 범위의 반전 확률로 변환합니다.
//! 이 확률은 시그널 메모리의 반전 히스토리와 히스테리시스 알림의 입력입니다.
//!
//! | 규칙 | 조건 | 점수 |
//! |------|------|------|
//! | RSI | < 30 / > 70 | +2 / −2 |
//! | 몸통 % | > 1 / < −1 | +1 / −1 |
//! | 거래량 급증 | 거래량 / 20봉 평균 > 1.4 | 몸통 부호 ±1 |
//! | 범위 확장 | 범위 > 1.2 × 10봉 평균 범위 | 몸통 부호 ±1 |
//!
//! `probability = clamp((score + 4) × 12.5, 0, 100)`
//!
//! RSI는 같은 사이클의 [`IndicatorFrame`]에서 읽습니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;
use trendlens_core::{mean, Candle, CandleSeries, DecimalExt, ProbabilityDirection};

use crate::frame::IndicatorFrame;

/// 점수 계산에 필요한 최소 캔들 수.
pub const MIN_PROBABILITY_CANDLES: usize = 14;

const RSI_OVERSOLD: Decimal = dec!(30);
const RSI_OVERBOUGHT: Decimal = dec!(70);
const BODY_PCT_THRESHOLD: Decimal = dec!(1);
const VOLUME_LOOKBACK: usize = 20;
const VOLUME_SPIKE_RATIO: Decimal = dec!(1.4);
const RANGE_LOOKBACK: usize = 10;
const RANGE_EXPANSION_RATIO: Decimal = dec!(1.2);
const UP_CUTOFF: f64 = 58.0;
const DOWN_CUTOFF: f64 = 42.0;

/// 반전 확률 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReversalProbability {
    /// 상승 반전 확률 (0 ~ 100)
    pub probability: f64,
    /// |p - 50| / 50
    pub confidence: f64,
    pub direction: ProbabilityDirection,
    /// 원점수 (−4 ~ +5)
    pub score: i32,
    pub explanations: Vec<String>,
}

impl ReversalProbability {
    /// 중립 결과 (확률 50).
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            probability: 50.0,
            confidence: 0.0,
            direction: ProbabilityDirection::Neutral,
            score: 0,
            explanations: vec![reason.into()],
        }
    }

    fn from_score(score: i32, explanations: Vec<String>) -> Self {
        let probability = ((score as f64 + 4.0) * 12.5).clamp(0.0, 100.0);
        let direction = if probability > UP_CUTOFF {
            ProbabilityDirection::Up
        } else if probability < DOWN_CUTOFF {
            ProbabilityDirection::Down
        } else {
            ProbabilityDirection::Neutral
        };

        Self {
            probability,
            confidence: (probability - 50.0).abs() / 50.0,
            direction,
            score,
            explanations,
        }
    }
}

/// 반전 확률 점수기.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProbabilityScorer;

impl ProbabilityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 마지막 봉의 반전 확률을 계산합니다.
    ///
    /// 캔들이 14개 미만이면 알림이 발동하지 않도록 중립(50)을 반환합니다.
    /// `frame`은 같은 `series`로 계산된 지표 프레임이어야 합니다.
    pub fn score(&self, series: &CandleSeries, frame: &IndicatorFrame) -> ReversalProbability {
        if series.len() < MIN_PROBABILITY_CANDLES {
            return ReversalProbability::neutral(format!(
                "데이터 부족: 반전 확률에 {}개 캔들 필요 ({}개 제공)",
                MIN_PROBABILITY_CANDLES,
                series.len()
            ));
        }

        let last = series.last();
        let mut score = 0i32;
        let mut explanations = Vec::new();

        let rsi = match frame.latest_rsi() {
            Some(value) => value,
            None => {
                explanations.push("RSI 계산 불가, 50으로 간주".to_string());
                dec!(50)
            }
        };
        if rsi < RSI_OVERSOLD {
            score += 2;
            explanations.push(format!("RSI 과매도 ({:.2}) +2", rsi));
        } else if rsi > RSI_OVERBOUGHT {
            score -= 2;
            explanations.push(format!("RSI 과매수 ({:.2}) -2", rsi));
        } else {
            explanations.push(format!("RSI 중립 ({:.2})", rsi));
        }

        let body_pct = last.close().pct_change_from(last.open()).unwrap_or(Decimal::ZERO);
        let body_sign = if body_pct > Decimal::ZERO { 1 } else { -1 };
        if body_pct > BODY_PCT_THRESHOLD {
            score += 1;
            explanations.push(format!("강한 양봉 ({:+.2}%) +1", body_pct));
        } else if body_pct < -BODY_PCT_THRESHOLD {
            score -= 1;
            explanations.push(format!("강한 음봉 ({:+.2}%) -1", body_pct));
        } else {
            explanations.push(format!("몸통 약함 ({:+.2}%)", body_pct));
        }

        let volumes: Vec<Decimal> = series.tail(VOLUME_LOOKBACK).iter().map(Candle::volume).collect();
        match mean(&volumes).and_then(|avg| last.volume().checked_ratio(avg)) {
            Some(ratio) if ratio > VOLUME_SPIKE_RATIO => {
                score += body_sign;
                explanations.push(format!("거래량 급증 ({:.2}x) {:+}", ratio, body_sign));
            }
            Some(ratio) => explanations.push(format!("거래량 평이 ({:.2}x)", ratio)),
            None => explanations.push("평균 거래량이 0이어서 거래량 규칙 생략".to_string()),
        }

        let ranges: Vec<Decimal> = series.tail(RANGE_LOOKBACK).iter().map(Candle::range).collect();
        let avg_range = mean(&ranges).unwrap_or(Decimal::ZERO);
        if last.range() > RANGE_EXPANSION_RATIO * avg_range {
            score += body_sign;
            explanations.push(format!(
                "범위 확장 ({} > {} × {:.4}) {:+}",
                last.range(),
                RANGE_EXPANSION_RATIO,
                avg_range,
                body_sign
            ));
        } else {
            explanations.push("범위 확장 없음".to_string());
        }

        let result = ReversalProbability::from_score(score, explanations);
        debug!(
            score,
            probability = result.probability,
            direction = %result.direction,
            rsi = rsi.to_f64_lossy(),
            "Reversal probability scored"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorSettings;
    use crate::indicators::IndicatorEngine;
    use chrono::{TimeZone, Utc};

    fn score(series: &CandleSeries) -> ReversalProbability {
        let frame = IndicatorFrame::compute(series, &IndicatorSettings::default(), &IndicatorEngine::new());
        ProbabilityScorer::new().score(series, &frame)
    }

    fn at(i: usize) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap()
    }

    fn linear(count: usize, start: i64, step: i64, bullish: bool) -> CandleSeries {
        let candles = (0..count)
            .map(|i| {
                let close = Decimal::from(start + step * i as i64);
                let open = if bullish { close - dec!(0.5) } else { close + dec!(0.5) };
                let high = open.max(close) + dec!(0.25);
                let low = open.min(close) - dec!(0.25);
                Candle::new(at(i), open, high, low, close, dec!(1000)).unwrap()
            })
            .collect();
        CandleSeries::new(candles).unwrap()
    }

    #[test]
    fn test_short_series_is_neutral() {
        let result = score(&linear(13, 100, 1, true));

        assert_eq!(result.probability, 50.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.direction, ProbabilityDirection::Neutral);
        assert!(result.explanations[0].contains("데이터 부족"));
    }

    #[test]
    fn test_rising_series_overbought_down() {
        // RSI 100 → −2, 나머지 규칙 해당 없음
        let result = score(&linear(20, 100, 1, true));

        assert_eq!(result.score, -2);
        assert_eq!(result.probability, 25.0);
        assert_eq!(result.direction, ProbabilityDirection::Down);
        assert!((result.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_falling_series_oversold_up() {
        // RSI 0 → +2, 몸통 약 −0.5% 로 중립
        let result = score(&linear(20, 150, -1, false));

        assert_eq!(result.score, 2);
        assert_eq!(result.probability, 75.0);
        assert_eq!(result.direction, ProbabilityDirection::Up);
    }

    #[test]
    fn test_breakout_candle_scores_all_bullish_rules() {
        let mut candles: Vec<Candle> = (0..19)
            .map(|i| {
                let (open, close) = if i % 2 == 0 {
                    (dec!(100), dec!(101))
                } else {
                    (dec!(101), dec!(100))
                };
                Candle::new(at(i), open, dec!(101.5), dec!(99.5), close, dec!(1000)).unwrap()
            })
            .collect();
        candles.push(
            Candle::new(at(19), dec!(100), dec!(103.5), dec!(99.8), dec!(103), dec!(5000)).unwrap(),
        );
        let series = CandleSeries::new(candles).unwrap();

        let result = score(&series);

        // 몸통 +3% / 거래량 4.17x / 범위 3.7 > 1.2 × 2.17, RSI 중립
        assert_eq!(result.score, 3);
        assert_eq!(result.probability, 87.5);
        assert_eq!(result.direction, ProbabilityDirection::Up);
        assert_eq!(result.explanations.len(), 4);
    }

    #[test]
    fn test_probability_is_clamped() {
        assert_eq!(ReversalProbability::from_score(-6, vec![]).probability, 0.0);
        assert_eq!(ReversalProbability::from_score(5, vec![]).probability, 100.0);
        assert_eq!(
            ReversalProbability::from_score(0, vec![]).direction,
            ProbabilityDirection::Neutral
        );
    }

    #[test]
    fn test_missing_frame_rsi_counts_as_neutral() {
        let series = linear(20, 100, 1, true);
        let mut frame = IndicatorFrame::compute(&series, &IndicatorSettings::default(), &IndicatorEngine::new());
        frame.rsi = vec![None; series.len()];

        let result = ProbabilityScorer::new().score(&series, &frame);

        // 과매수 −2가 빠지고 RSI 50으로 처리
        assert_eq!(result.score, 0);
        assert_eq!(result.probability, 50.0);
        assert!(result.explanations[0].contains("50으로 간주"));
    }
}
