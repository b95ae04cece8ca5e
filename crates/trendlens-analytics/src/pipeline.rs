//! 갱신 사이클 파이프라인.
//!
//! # 동작
//! 1. 지표 프레임 계산
//! 2. 추세 분류, SuperTrend 방향, 반전 감지, 반전 확률, 존 감지
//! 3. 스마트머니 편향 후 결정 퓨전
//! 4. 시그널 메모리 기록 및 히스테리시스 알림
//!
//! 각 단계의 데이터 부족은 중립값으로 낮춰지고 경고로 남으므로
//! [`SignalPipeline::run_cycle`]은 실패하지 않습니다.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};
use trendlens_core::{cycle_span, CandleSeries, Direction, SensitivityProfile};

use crate::config::EngineConfig;
use crate::frame::IndicatorFrame;
use crate::fusion::{DecisionFusion, DecisionReport};
use crate::indicators::IndicatorEngine;
use crate::memory::{Alert, SignalMemory};
use crate::probability::{ProbabilityScorer, ReversalProbability};
use crate::reversal::{ReversalDetector, ReversalResult};
use crate::smart_money::smart_money_bias;
use crate::trend_classifier::{TrendClassifier, TrendResult};
use crate::zones::{ZoneDetector, ZoneSet};

/// 한 사이클의 전체 결과.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub frame: IndicatorFrame,
    pub trend: TrendResult,
    pub supertrend_direction: Option<Direction>,
    pub reversal: ReversalResult,
    pub probability: ReversalProbability,
    pub zones: ZoneSet,
    pub decision: DecisionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    pub warnings: Vec<String>,
}

/// 갱신 사이클 파이프라인.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    config: EngineConfig,
    engine: IndicatorEngine,
    classifier: TrendClassifier,
    reversal: ReversalDetector,
    scorer: ProbabilityScorer,
    zones: ZoneDetector,
    fusion: DecisionFusion,
}

impl Default for SignalPipeline {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SignalPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: IndicatorEngine::new(),
            classifier: TrendClassifier::new(),
            reversal: ReversalDetector::new(config.reversal.clone()),
            scorer: ProbabilityScorer::new(),
            zones: ZoneDetector::new(config.zones.clone()),
            fusion: DecisionFusion::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 설정의 기본 민감도로 사이클을 실행합니다.
    pub fn run_default(&self, series: &CandleSeries, memory: &mut SignalMemory) -> CycleReport {
        self.run_cycle(series, self.config.reversal.default_sensitivity, memory)
    }

    /// 최신 스냅샷으로 한 사이클을 실행합니다.
    pub fn run_cycle(
        &self,
        series: &CandleSeries,
        sensitivity: SensitivityProfile,
        memory: &mut SignalMemory,
    ) -> CycleReport {
        let span = cycle_span!("refresh_cycle", series.len(), sensitivity);
        let _guard = span.enter();
        let start = Instant::now();

        let frame = IndicatorFrame::compute(series, &self.config.indicators, &self.engine);
        let mut warnings = frame.warnings.clone();

        let trend = self.classifier.classify(series);
        let supertrend_direction = frame.latest_supertrend_direction();

        let reversal_outcome = self.reversal.detect(series, &frame, sensitivity);
        let reversal = match &reversal_outcome {
            Ok(result) => result.clone(),
            Err(e) => {
                warn!(error = %e, "Reversal detection skipped");
                warnings.push(format!("반전 감지 생략: {}", e));
                ReversalResult::neutral(format!("반전 감지 불가: {}", e))
            }
        };

        let probability = self.scorer.score(series, &frame);

        let zones = match self.zones.detect(series) {
            Ok(zones) => zones,
            Err(e) => {
                warn!(error = %e, "Zone detection skipped");
                warnings.push(format!("존 감지 생략: {}", e));
                ZoneSet::default()
            }
        };

        let bias = smart_money_bias(series, self.config.smart_money.ema_period);
        let decision = self.fusion.decide_degraded(
            Ok(trend.direction),
            reversal_outcome.map(|r| r.signal),
            bias,
        );

        let timestamp = series.last().timestamp();
        memory.record_trend(timestamp, &trend);
        memory.record_reversal(timestamp, probability.probability);
        let alert = memory.observe_probability(probability.probability);

        info!(
            decision = %decision.decision,
            trend = %trend.direction,
            reversal = %reversal.signal,
            probability = probability.probability,
            alert = alert.is_some(),
            warnings = warnings.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Refresh cycle completed"
        );

        CycleReport {
            frame,
            trend,
            supertrend_direction,
            reversal,
            probability,
            zones,
            decision,
            alert,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trendlens_core::{Candle, DecisionKind, ReversalSignal, TrendCall};

    fn rising(count: usize) -> CandleSeries {
        let candles = (0..count)
            .map(|i| {
                let close = dec!(100) + Decimal::from(i as i64);
                Candle::new(
                    Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                    close - dec!(0.5),
                    close + dec!(0.25),
                    close - dec!(0.75),
                    close,
                    dec!(1000),
                )
                .unwrap()
            })
            .collect();
        CandleSeries::new(candles).unwrap()
    }

    #[test]
    fn test_short_series_degrades_without_panicking() {
        let pipeline = SignalPipeline::default();
        let mut memory = SignalMemory::new();

        let report = pipeline.run_cycle(&rising(3), SensitivityProfile::Medium, &mut memory);

        assert_eq!(report.trend.direction, TrendCall::NotAvailable);
        assert_eq!(report.reversal.signal, ReversalSignal::None);
        assert_eq!(report.decision.decision, DecisionKind::Wait);
        assert_eq!(report.probability.probability, 50.0);
        assert!(report.zones.demand.is_empty());
        assert!(report.alert.is_none());
        assert!(report.warnings.iter().any(|w| w.contains("반전 감지 생략")));
        assert!(report.warnings.iter().any(|w| w.contains("존 감지 생략")));
        assert_eq!(memory.get_history().len(), 1);
    }

    #[test]
    fn test_memory_persists_across_cycles() {
        let pipeline = SignalPipeline::default();
        let mut memory = SignalMemory::new();
        let series = rising(30);

        let first = pipeline.run_default(&series, &mut memory);
        let second = pipeline.run_default(&series, &mut memory);

        // 같은 스냅샷을 두 번 처리해도 알림은 한 번만
        assert!(first.alert.is_some());
        assert!(second.alert.is_none());
        assert_eq!(memory.get_history().len(), 2);
        assert_eq!(memory.reversal_history().len(), 2);
    }
}
