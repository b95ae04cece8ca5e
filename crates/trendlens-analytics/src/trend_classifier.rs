//! 규칙 기반 추세 분류기.
//!
//! 마지막 봉의 네 가지 이진 특징으로 방향을 판단합니다:
//! - 1봉 수익률
//! - 5봉 모멘텀
//! - 20봉 평균 대비 거래량 편차
//! - 캔들 몸통 부호
//!
//! `prob_up = 양수 특징 수 / 4`, `prob_up ≥ 0.5`이면 상승.
//! 캔들이 5개 미만이면 "N/A"를 반환하며 호출자는 이를 기권으로 처리해야 합니다.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use trendlens_core::{mean, CandleSeries, DecimalExt, TrendCall};

/// 분류에 필요한 최소 캔들 수.
pub const MIN_TREND_CANDLES: usize = 5;

const MOMENTUM_LOOKBACK: usize = 5;
const VOLUME_LOOKBACK: usize = 20;
const FEATURE_COUNT: f64 = 4.0;

/// 추세 분류 특징값 (모두 %).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrendFeatures {
    pub ret_1: Decimal,
    pub mom_5: Decimal,
    pub vol_mom: Decimal,
    pub body: Decimal,
}

/// 추세 분류 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub direction: TrendCall,
    /// |prob_up - prob_down| (0.0 ~ 1.0)
    pub confidence: f64,
    pub prob_up: f64,
    pub prob_down: f64,
    pub features: TrendFeatures,
    pub explanations: Vec<String>,
}

impl TrendResult {
    /// 데이터 부족 시의 기권 결과.
    pub fn not_available(reason: impl Into<String>) -> Self {
        Self {
            direction: TrendCall::NotAvailable,
            confidence: 0.0,
            prob_up: 0.0,
            prob_down: 0.0,
            features: TrendFeatures::default(),
            explanations: vec![reason.into()],
        }
    }
}

/// 추세 분류기.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendClassifier;

impl TrendClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 마지막 봉 기준으로 추세를 분류합니다.
    pub fn classify(&self, series: &CandleSeries) -> TrendResult {
        if series.len() < MIN_TREND_CANDLES {
            return TrendResult::not_available(format!(
                "데이터 부족: 추세 분류에 {}개 캔들 필요 ({}개 제공)",
                MIN_TREND_CANDLES,
                series.len()
            ));
        }

        let features = self.features(series);

        let checks = [
            ("1봉 수익률", features.ret_1),
            ("5봉 모멘텀", features.mom_5),
            ("거래량 편차", features.vol_mom),
            ("캔들 몸통", features.body),
        ];

        let positive = checks.iter().filter(|(_, v)| *v > Decimal::ZERO).count();
        let explanations = checks
            .iter()
            .map(|(name, value)| {
                let tone = if *value > Decimal::ZERO { "상승" } else { "하락/중립" };
                format!("{} {:+.2}% ({})", name, value, tone)
            })
            .collect();

        let prob_up = positive as f64 / FEATURE_COUNT;
        let prob_down = 1.0 - prob_up;
        let direction = if prob_up >= 0.5 {
            TrendCall::Up
        } else {
            TrendCall::Down
        };

        debug!(direction = %direction, prob_up, ?features, "Trend classified");

        TrendResult {
            direction,
            confidence: (prob_up - prob_down).abs(),
            prob_up,
            prob_down,
            features,
            explanations,
        }
    }

    /// 특징값을 계산합니다. 기준값이 0이면 해당 특징은 0입니다.
    pub fn features(&self, series: &CandleSeries) -> TrendFeatures {
        let candles = series.candles();
        let last_idx = candles.len() - 1;
        let last = series.last();

        let ret_1 = last_idx
            .checked_sub(1)
            .and_then(|prev| last.close().pct_change_from(candles[prev].close()))
            .unwrap_or(Decimal::ZERO);

        let mom_5 = match last_idx.checked_sub(MOMENTUM_LOOKBACK) {
            Some(base) => last
                .close()
                .pct_change_from(candles[base].close())
                .unwrap_or(Decimal::ZERO),
            None => ret_1,
        };

        let window_start = last_idx.saturating_sub(VOLUME_LOOKBACK);
        let volumes: Vec<Decimal> = candles[window_start..=last_idx]
            .iter()
            .map(|c| c.volume())
            .collect();
        let vol_mom = mean(&volumes)
            .and_then(|avg| last.volume().pct_change_from(avg))
            .unwrap_or(Decimal::ZERO);

        let body = last.close().pct_change_from(last.open()).unwrap_or(Decimal::ZERO);

        TrendFeatures {
            ret_1,
            mom_5,
            vol_mom,
            body,
        }
    }
}
