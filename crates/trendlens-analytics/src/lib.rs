//! 시그널 퓨전 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 및 지표 프레임
//! - SuperTrend 추세 추적
//! - 반전 감지 (꼬리 비율 + 오실레이터 소진) 및 반전 확률
//! - 규칙 기반 추세 분류
//! - 수요/공급 존 감지
//! - 결정 퓨전 (진리표)
//! - 시그널 메모리 (링 버퍼, 히스테리시스 알림)
//! - 갱신 사이클 파이프라인
//!
//! # 사용 예시
//!
//! ```no_run
//! use trendlens_analytics::{EngineConfig, SignalMemory, SignalPipeline};
//! use trendlens_core::{ingest_csv_path, SensitivityProfile};
//!
//! let outcome = ingest_csv_path("candles.csv").unwrap();
//! let pipeline = SignalPipeline::new(EngineConfig::default());
//! let mut memory = SignalMemory::new();
//!
//! let report = pipeline.run_cycle(&outcome.series, SensitivityProfile::Medium, &mut memory);
//! println!("{}", report.decision.decision);
//! ```

pub mod config;
pub mod frame;
pub mod fusion;
pub mod indicators;
pub mod memory;
pub mod pipeline;
pub mod probability;
pub mod reversal;
pub mod smart_money;
pub mod trend_classifier;
pub mod zones;

pub use config::{
    EngineConfig, IndicatorSettings, MemorySettings, ReversalSettings, SmartMoneySettings,
    ZoneSettings,
};
pub use frame::IndicatorFrame;
pub use fusion::{DecisionFusion, DecisionReport};
pub use indicators::{IndicatorEngine, IndicatorError, IndicatorResult};
pub use memory::{Alert, AlertThresholds, ProbabilityRecord, RingBuffer, SignalMemory, TrendRecord};
pub use pipeline::{CycleReport, SignalPipeline};
pub use probability::{ProbabilityScorer, ReversalProbability};
pub use reversal::{ReversalDetector, ReversalResult};
pub use smart_money::smart_money_bias;
pub use trend_classifier::{TrendClassifier, TrendFeatures, TrendResult};
pub use zones::{merge_zones, Zone, ZoneDetector, ZoneSet};
