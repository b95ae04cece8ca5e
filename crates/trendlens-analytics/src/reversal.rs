//! 반전 감지기.
//!
//! 두 가지 상호 보완적인 모드로 마지막 봉의 반전 가능성을 판단합니다.
//!
//! ## 꼬리 비율 모드
//! - 상승 반전: 아래꼬리 > 몸통 × 배수 × 민감도 계수, 그리고 양봉
//! - 하락 반전: 윗꼬리 > 몸통 × 배수 × 민감도 계수, 그리고 음봉
//!
//! ## 오실레이터 소진 모드
//! 각 조건이 참이면 1점:
//! 1. RSI 과매도/과매수
//! 2. 거래량 / 최근 평균 거래량 < 소진 비율
//! 3. |몸통| < 압축 계수 × 최근 평균 |몸통|
//! 4. |5봉 모멘텀| < 모멘텀 소진 기준(%)
//!
//! 최소 충족 조건 수 이상이면 발동하며, 방향은 모멘텀 부호의 반대입니다.
//!
//! ## 우선순위
//! 꼬리 모드가 발동하면 꼬리 모드 방향을 따르되, 오실레이터 모드가 반대 방향으로
//! 발동하면 NONE. 꼬리 모드가 없으면 오실레이터 모드, 둘 다 없으면 NONE.
//!
//! RSI는 같은 사이클의 [`IndicatorFrame`]에서 읽습니다.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use trendlens_core::{mean, Candle, CandleSeries, Direction, DecimalExt, ReversalSignal, SensitivityProfile};

use crate::config::ReversalSettings;
use crate::frame::IndicatorFrame;
use crate::indicators::{IndicatorError, IndicatorResult, MomentumCalculator};

/// 점수 계산에 쓰이는 전체 조건 수 (꼬리 1 + 오실레이터 4).
const TOTAL_CONDITIONS: f64 = 5.0;

/// 반전 감지 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReversalResult {
    /// 반전 시그널
    pub signal: ReversalSignal,
    /// 충족 조건 비율 (0.0 ~ 1.0)
    pub score: f64,
    /// 충족된 조건 및 판단 근거
    pub explanations: Vec<String>,
}

impl ReversalResult {
    /// 판단을 내리지 못한 중립 결과.
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            signal: ReversalSignal::None,
            score: 0.0,
            explanations: vec![reason.into()],
        }
    }
}

/// 꼬리 비율 모드 판정.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WickOutcome {
    pub bullish: bool,
    pub bearish: bool,
}

impl WickOutcome {
    /// 한 방향만 발동했을 때의 방향.
    pub fn direction(self) -> Option<Direction> {
        match (self.bullish, self.bearish) {
            (true, false) => Some(Direction::Up),
            (false, true) => Some(Direction::Down),
            _ => None,
        }
    }

    fn fired(self) -> bool {
        self.bullish || self.bearish
    }
}

/// 오실레이터 소진 모드 판정.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorOutcome {
    /// 충족 조건 수 (0 ~ 4)
    pub confirmations: usize,
    /// 최소 충족 조건 수 이상인지
    pub fired: bool,
    /// 발동 시 방향 (판단 불가면 None)
    pub direction: Option<Direction>,
    /// 근거
    pub explanations: Vec<String>,
}

/// 반전 감지기.
#[derive(Debug, Clone, Default)]
pub struct ReversalDetector {
    settings: ReversalSettings,
    momentum: MomentumCalculator,
}

impl ReversalDetector {
    /// 설정으로 감지기를 생성합니다.
    pub fn new(settings: ReversalSettings) -> Self {
        Self {
            settings,
            momentum: MomentumCalculator::new(),
        }
    }

    /// 마지막 봉의 반전 여부를 판단합니다.
    ///
    /// `frame`은 같은 `series`로 계산된 지표 프레임이어야 합니다.
    /// 캔들 수가 설정된 윈도우보다 적으면 `InsufficientData`를 반환합니다.
    pub fn detect(
        &self,
        series: &CandleSeries,
        frame: &IndicatorFrame,
        sensitivity: SensitivityProfile,
    ) -> IndicatorResult<ReversalResult> {
        if series.len() < self.settings.window {
            return Err(IndicatorError::InsufficientData {
                required: self.settings.window,
                provided: series.len(),
            });
        }

        let last = series.last();
        let wick = self.wick_signal(last, sensitivity);
        let oscillator = self.oscillator_signal(series, frame, sensitivity);

        let mut explanations = Vec::new();
        if wick.bullish {
            explanations.push(format!(
                "긴 아래꼬리 양봉 (아래꼬리 {} > 몸통 {} × {})",
                last.lower_wick(),
                last.body_size(),
                self.wick_threshold_factor(sensitivity)
            ));
        }
        if wick.bearish {
            explanations.push(format!(
                "긴 윗꼬리 음봉 (윗꼬리 {} > 몸통 {} × {})",
                last.upper_wick(),
                last.body_size(),
                self.wick_threshold_factor(sensitivity)
            ));
        }
        explanations.extend(oscillator.explanations.iter().cloned());

        let signal = match (wick.fired(), wick.direction()) {
            (true, None) => {
                explanations.push("상승/하락 꼬리 조건이 동시에 충족되어 판단 보류".to_string());
                ReversalSignal::None
            }
            (true, Some(dir)) => match oscillator.direction {
                Some(osc_dir) if oscillator.fired && osc_dir != dir => {
                    explanations.push(format!(
                        "꼬리 모드({})와 오실레이터 모드({})가 충돌하여 판단 보류",
                        dir, osc_dir
                    ));
                    ReversalSignal::None
                }
                _ => dir.into(),
            },
            (false, _) if oscillator.fired => match oscillator.direction {
                Some(dir) => dir.into(),
                None => {
                    explanations.push("오실레이터 소진 방향을 결정할 수 없음".to_string());
                    ReversalSignal::None
                }
            },
            _ => ReversalSignal::None,
        };

        let triggered = usize::from(wick.fired()) + oscillator.confirmations;
        let score = (triggered as f64 / TOTAL_CONDITIONS).clamp(0.0, 1.0);

        debug!(
            signal = %signal,
            score,
            wick_bullish = wick.bullish,
            wick_bearish = wick.bearish,
            confirmations = oscillator.confirmations,
            "Reversal detection"
        );

        Ok(ReversalResult {
            signal,
            score,
            explanations,
        })
    }

    fn wick_threshold_factor(&self, sensitivity: SensitivityProfile) -> Decimal {
        self.settings.wick_body_multiplier * sensitivity.thresholds().wick_factor
    }

    /// 꼬리 비율 모드 판정.
    pub fn wick_signal(&self, candle: &Candle, sensitivity: SensitivityProfile) -> WickOutcome {
        let threshold = candle.body_size() * self.wick_threshold_factor(sensitivity);

        WickOutcome {
            bullish: candle.lower_wick() > threshold && candle.is_bullish(),
            bearish: candle.upper_wick() > threshold && candle.is_bearish(),
        }
    }

    /// 오실레이터 소진 모드 판정.
    pub fn oscillator_signal(
        &self,
        series: &CandleSeries,
        frame: &IndicatorFrame,
        sensitivity: SensitivityProfile,
    ) -> OscillatorOutcome {
        let th = sensitivity.thresholds();
        let lookback = self.settings.average_lookback;
        let last = series.last();
        let mut explanations = Vec::new();
        let mut confirmations = 0;

        // 1. RSI 극단
        let rsi_side = match frame.latest_rsi() {
            Some(value) if value < th.rsi_low => {
                confirmations += 1;
                explanations.push(format!("RSI 과매도 ({:.2} < {})", value, th.rsi_low));
                Some(Direction::Up)
            }
            Some(value) if value > th.rsi_high => {
                confirmations += 1;
                explanations.push(format!("RSI 과매수 ({:.2} > {})", value, th.rsi_high));
                Some(Direction::Down)
            }
            Some(_) => None,
            None => {
                explanations.push("RSI 값이 없어 RSI 조건 제외".to_string());
                None
            }
        };

        // 2. 거래량 소진
        let recent = series.tail(lookback);
        let volumes: Vec<Decimal> = recent.iter().map(Candle::volume).collect();
        let volume_ratio = match mean(&volumes).and_then(|avg| last.volume().checked_ratio(avg)) {
            Some(ratio) => ratio,
            None => {
                explanations.push("평균 거래량이 0이어서 거래량 비율을 1로 간주".to_string());
                Decimal::ONE
            }
        };
        if volume_ratio < th.volume_exhaustion_ratio {
            confirmations += 1;
            explanations.push(format!(
                "거래량 소진 (비율 {:.2} < {})",
                volume_ratio, th.volume_exhaustion_ratio
            ));
        }

        // 3. 몸통 압축
        let bodies: Vec<Decimal> = recent.iter().map(Candle::body_size).collect();
        let avg_body = mean(&bodies).unwrap_or(Decimal::ZERO);
        if last.body_size() < th.compression_factor * avg_body {
            confirmations += 1;
            explanations.push(format!(
                "몸통 압축 ({} < {} × 평균 {:.4})",
                last.body_size(),
                th.compression_factor,
                avg_body
            ));
        }

        // 4. 모멘텀 소진
        let momentum = self
            .momentum
            .pct_momentum(&series.closes(), self.settings.momentum_lookback);
        match momentum {
            Some(m) if m.abs() < th.momentum_exhaustion_pct => {
                confirmations += 1;
                explanations.push(format!(
                    "모멘텀 소진 (|{:.2}%| < {}%)",
                    m, th.momentum_exhaustion_pct
                ));
            }
            Some(_) => {}
            None => explanations.push("모멘텀 기준가가 0이어서 모멘텀 조건 제외".to_string()),
        }

        let fired = confirmations >= self.settings.min_confirmations;

        // 상승 모멘텀 소진 → 하락 반전, 하락 모멘텀 소진 → 상승 반전
        let momentum_side = momentum.and_then(|m| {
            if m > Decimal::ZERO {
                Some(Direction::Down)
            } else if m < Decimal::ZERO {
                Some(Direction::Up)
            } else {
                None
            }
        });

        let direction = match (momentum_side, rsi_side) {
            (Some(m), Some(r)) if m != r => None,
            (Some(m), _) => Some(m),
            (None, r) => r,
        };

        OscillatorOutcome {
            confirmations,
            fired,
            direction,
            explanations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndicatorSettings;
    use crate::indicators::IndicatorEngine;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn candle(i: usize, open: Decimal, high: Decimal, low: Decimal, close: Decimal, volume: Decimal) -> Candle {
        Candle::new(
            Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume,
        )
        .unwrap()
    }

    /// 횡보 구간: 종가가 100과 101을 번갈아 오가며 몸통 1, 꼬리 0.5.
    fn sideways(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let (open, close) = if i % 2 == 0 {
                    (dec!(100), dec!(101))
                } else {
                    (dec!(101), dec!(100))
                };
                candle(i, open, dec!(101.5), dec!(99.5), close, dec!(1000))
            })
            .collect()
    }

    fn detector() -> ReversalDetector {
        ReversalDetector::new(ReversalSettings::default())
    }

    fn frame(series: &CandleSeries) -> IndicatorFrame {
        IndicatorFrame::compute(series, &IndicatorSettings::default(), &IndicatorEngine::new())
    }

    #[test]
    fn test_insufficient_window() {
        let series = CandleSeries::new(sideways(10)).unwrap();
        assert!(matches!(
            detector().detect(&series, &frame(&series), SensitivityProfile::Medium),
            Err(IndicatorError::InsufficientData { required: 20, provided: 10 })
        ));
    }

    #[test]
    fn test_wick_signal_sensitivity() {
        let det = detector();
        // 몸통 1, 아래꼬리 2
        let hammer = candle(0, dec!(100), dec!(101), dec!(98), dec!(101), dec!(1));

        // Medium: 2 > 1 × 2.5 × 1.0 거짓
        assert_eq!(det.wick_signal(&hammer, SensitivityProfile::Medium).direction(), None);
        // High: 2 > 1 × 2.5 × 0.65 = 1.625 참
        assert_eq!(
            det.wick_signal(&hammer, SensitivityProfile::High).direction(),
            Some(Direction::Up)
        );
    }

    #[test]
    fn test_wick_requires_matching_candle_color() {
        let det = detector();
        // 음봉이면서 긴 아래꼬리 → 상승 반전 아님
        let bearish_hammer = candle(0, dec!(101), dec!(101), dec!(95), dec!(100), dec!(1));
        let outcome = det.wick_signal(&bearish_hammer, SensitivityProfile::High);
        assert!(!outcome.bullish);
        assert!(!outcome.bearish);
    }

    #[test]
    fn test_hammer_after_sideways_is_up() {
        let mut candles = sideways(24);
        // 몸통 0.4, 아래꼬리 2.5 → 2.5 > 0.4 × 2.5 = 1.0
        // 5봉 모멘텀 -0.1% → 오실레이터도 상승 방향으로 동의
        candles.push(candle(24, dec!(99.5), dec!(100), dec!(97), dec!(99.9), dec!(1000)));
        let series = CandleSeries::new(candles).unwrap();

        let result = detector().detect(&series, &frame(&series), SensitivityProfile::Medium).unwrap();

        assert_eq!(result.signal, ReversalSignal::Up);
        // 꼬리 + 몸통 압축 + 모멘텀 소진
        assert!((result.score - 0.6).abs() < 1e-9);
        assert!(result.explanations.iter().any(|e| e.contains("아래꼬리")));
    }

    #[test]
    fn test_shooting_star_is_down() {
        let mut candles = sideways(24);
        candles.push(candle(24, dec!(100.4), dec!(104), dec!(99.9), dec!(100), dec!(1000)));
        let series = CandleSeries::new(candles).unwrap();

        let result = detector().detect(&series, &frame(&series), SensitivityProfile::Medium).unwrap();
        assert_eq!(result.signal, ReversalSignal::Down);
    }

    #[test]
    fn test_wick_conflicting_with_oscillator_is_none() {
        // 급락 후 아래꼬리 양봉: 꼬리는 UP
        // 직전 구간을 완만한 상승으로 만들어 5봉 모멘텀이 양(+) → 오실레이터는 DOWN
        let mut candles: Vec<Candle> = (0..24)
            .map(|i| {
                let close = dec!(100) + Decimal::from(i as i64) * dec!(0.05);
                candle(i, close - dec!(0.5), close + dec!(0.1), close - dec!(0.6), close, dec!(1000))
            })
            .collect();
        // 마지막: 거래량 급감(오실레이터 조건), 몸통 0.05, 아래꼬리 긴 양봉
        let prev_close = dec!(100) + dec!(23) * dec!(0.05);
        candles.push(candle(
            24,
            prev_close,
            prev_close + dec!(0.1),
            prev_close - dec!(1),
            prev_close + dec!(0.05),
            dec!(100),
        ));
        let series = CandleSeries::new(candles).unwrap();
        let det = detector();

        let osc = det.oscillator_signal(&series, &frame(&series), SensitivityProfile::Medium);
        assert!(osc.fired);
        assert_eq!(osc.direction, Some(Direction::Down));

        let result = det.detect(&series, &frame(&series), SensitivityProfile::Medium).unwrap();
        assert_eq!(result.signal, ReversalSignal::None);
        assert!(result.explanations.iter().any(|e| e.contains("충돌")));
    }

    #[test]
    fn test_rising_series_single_condition_is_none() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let close = dec!(100) + Decimal::from(i as i64);
                candle(i, close - dec!(0.5), close + dec!(0.25), close - dec!(0.75), close, dec!(1000))
            })
            .collect();
        let series = CandleSeries::new(candles).unwrap();

        let result = detector().detect(&series, &frame(&series), SensitivityProfile::Medium).unwrap();

        // RSI 과매수 하나만 충족
        assert_eq!(result.signal, ReversalSignal::None);
        assert!((result.score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_zero_volume_falls_back_with_explanation() {
        let candles: Vec<Candle> = sideways(25)
            .into_iter()
            .map(|c| {
                Candle::new(c.timestamp(), c.open(), c.high(), c.low(), c.close(), Decimal::ZERO).unwrap()
            })
            .collect();
        let series = CandleSeries::new(candles).unwrap();

        let osc = detector()
            .oscillator_signal(&series, &frame(&series), SensitivityProfile::Medium);
        assert!(osc.explanations.iter().any(|e| e.contains("평균 거래량이 0")));
    }

    #[test]
    fn test_rsi_comes_from_frame() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let close = dec!(100) + Decimal::from(i as i64);
                candle(i, close - dec!(0.5), close + dec!(0.25), close - dec!(0.75), close, dec!(1000))
            })
            .collect();
        let series = CandleSeries::new(candles).unwrap();
        let det = detector();

        // 같은 시계열이라도 프레임의 RSI 컬럼이 비어 있으면 RSI 조건은 제외됨
        let mut without_rsi = frame(&series);
        without_rsi.rsi = vec![None; series.len()];

        let with_rsi = det.oscillator_signal(&series, &frame(&series), SensitivityProfile::Medium);
        let without = det.oscillator_signal(&series, &without_rsi, SensitivityProfile::Medium);

        assert_eq!(with_rsi.confirmations, without.confirmations + 1);
        assert!(without.explanations.iter().any(|e| e.contains("RSI 값이 없어")));
    }
}
