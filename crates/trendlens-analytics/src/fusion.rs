//! 결정 퓨전 엔진.
//!
//! 추세 분류 결과와 반전 시그널을 고정된 진리표로 결합합니다.
//!
//! | 추세 | 반전 | 결정 |
//! |------|------|------|
//! | UP | UP | BUY |
//! | DOWN | DOWN | SELL |
//! | DOWN | UP | REVERSAL_BUY |
//! | UP | DOWN | TAKE_PROFIT |
//! | UP/DOWN | NONE | WAIT |
//!
//! 추세가 "N/A"이거나 상위 컴포넌트가 실패하면 중립 입력으로 낮춰 WAIT를 반환합니다.
//! 스마트머니 편향은 설명 문자열로만 덧붙여지며 결정을 바꾸지 않습니다.

use serde::Serialize;
use tracing::{debug, warn};
use trendlens_core::{DecisionKind, Direction, ReversalSignal, SmartMoneyBias, TrendCall};

use crate::indicators::IndicatorResult;

/// 퓨전 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionReport {
    pub decision: DecisionKind,
    /// 사람이 읽을 수 있는 근거 (최소 1개)
    pub reasons: Vec<String>,
    pub reversal_signal: ReversalSignal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_money_bias: Option<SmartMoneyBias>,
}

/// 결정 퓨전 엔진.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecisionFusion;

impl DecisionFusion {
    pub fn new() -> Self {
        Self
    }

    /// 진리표에 따라 결정을 내립니다.
    pub fn decide(
        &self,
        trend: TrendCall,
        reversal: ReversalSignal,
        bias: Option<SmartMoneyBias>,
    ) -> DecisionReport {
        let mut reasons = Vec::new();

        let decision = match (trend.direction(), reversal) {
            (Some(Direction::Up), ReversalSignal::Up) => {
                reasons.push("상승 추세".to_string());
                reasons.push("상승 반전(해머형) 감지".to_string());
                DecisionKind::Buy
            }
            (Some(Direction::Down), ReversalSignal::Down) => {
                reasons.push("하락 추세".to_string());
                reasons.push("하락 반전(윗꼬리) 감지".to_string());
                DecisionKind::Sell
            }
            (Some(Direction::Down), ReversalSignal::Up) => {
                reasons.push("하락 추세 중 상승 반전 감지".to_string());
                reasons.push("추세 전환 가능성".to_string());
                DecisionKind::ReversalBuy
            }
            (Some(Direction::Up), ReversalSignal::Down) => {
                reasons.push("상승 추세 중 하락 반전 감지".to_string());
                reasons.push("고점 형성 가능성".to_string());
                DecisionKind::TakeProfit
            }
            (Some(_), ReversalSignal::None) => {
                reasons.push("추세와 반전 시그널이 정렬되지 않음".to_string());
                DecisionKind::Wait
            }
            (None, _) => {
                reasons.push("추세 판단 불가 (N/A), 관망".to_string());
                DecisionKind::Wait
            }
        };

        if let Some(bias) = bias {
            reasons.push(format!("스마트머니: {}", bias));
        }

        debug!(trend = %trend, reversal = %reversal, decision = %decision, "Decision fused");

        DecisionReport {
            decision,
            reasons,
            reversal_signal: reversal,
            smart_money_bias: bias,
        }
    }

    /// 상위 컴포넌트의 실패를 중립 입력으로 낮춘 뒤 결정합니다.
    ///
    /// 추세 실패는 N/A, 반전 실패는 NONE, 편향 실패는 생략으로 처리하며
    /// 각 실패는 근거 문자열에 남습니다. 이 함수는 실패하지 않습니다.
    pub fn decide_degraded(
        &self,
        trend: IndicatorResult<TrendCall>,
        reversal: IndicatorResult<ReversalSignal>,
        bias: IndicatorResult<SmartMoneyBias>,
    ) -> DecisionReport {
        let mut degraded = Vec::new();

        let trend = trend.unwrap_or_else(|e| {
            warn!(error = %e, "Trend input degraded to N/A");
            degraded.push(format!("추세 입력 실패 → N/A: {}", e));
            TrendCall::NotAvailable
        });
        let reversal = reversal.unwrap_or_else(|e| {
            warn!(error = %e, "Reversal input degraded to NONE");
            degraded.push(format!("반전 입력 실패 → NONE: {}", e));
            ReversalSignal::None
        });
        let bias = match bias {
            Ok(b) => Some(b),
            Err(e) => {
                warn!(error = %e, "Smart-money bias unavailable");
                degraded.push(format!("스마트머니 편향 계산 실패: {}", e));
                None
            }
        };

        let mut report = self.decide(trend, reversal, bias);
        report.reasons.extend(degraded);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorError;

    #[test]
    fn test_bias_never_changes_decision() {
        let fusion = DecisionFusion::new();
        for bias in [Some(SmartMoneyBias::Bullish), Some(SmartMoneyBias::Bearish), None] {
            let report = fusion.decide(TrendCall::Down, ReversalSignal::Down, bias);
            assert_eq!(report.decision, DecisionKind::Sell);
            assert_eq!(report.smart_money_bias, bias);
        }
    }

    #[test]
    fn test_bias_appended_as_reason() {
        let report = DecisionFusion::new().decide(
            TrendCall::Up,
            ReversalSignal::None,
            Some(SmartMoneyBias::Bullish),
        );
        assert_eq!(report.decision, DecisionKind::Wait);
        assert_eq!(report.reasons.last().map(String::as_str), Some("스마트머니: BULLISH"));
    }

    #[test]
    fn test_not_available_trend_waits() {
        let report = DecisionFusion::new().decide(TrendCall::NotAvailable, ReversalSignal::Up, None);
        assert_eq!(report.decision, DecisionKind::Wait);
        assert_eq!(report.reversal_signal, ReversalSignal::Up);
        assert!(!report.reasons.is_empty());
    }

    #[test]
    fn test_degraded_inputs_never_fail() {
        let report = DecisionFusion::new().decide_degraded(
            Ok(TrendCall::Up),
            Err(IndicatorError::InsufficientData {
                required: 20,
                provided: 3,
            }),
            Err(IndicatorError::CalculationError("no ema".to_string())),
        );

        assert_eq!(report.decision, DecisionKind::Wait);
        assert_eq!(report.reversal_signal, ReversalSignal::None);
        assert_eq!(report.smart_money_bias, None);
        assert!(report.reasons.iter().any(|r| r.contains("반전 입력 실패")));
        assert!(report.reasons.iter().any(|r| r.contains("스마트머니 편향 계산 실패")));
    }
}
