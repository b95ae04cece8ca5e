//! 결정 퓨전 진리표 테스트

use trendlens_analytics::{DecisionFusion, IndicatorError};
use trendlens_core::{DecisionKind, ReversalSignal, SmartMoneyBias, TrendCall};

const TABLE: [(TrendCall, ReversalSignal, DecisionKind); 6] = [
    (TrendCall::Up, ReversalSignal::Up, DecisionKind::Buy),
    (TrendCall::Down, ReversalSignal::Down, DecisionKind::Sell),
    (TrendCall::Down, ReversalSignal::Up, DecisionKind::ReversalBuy),
    (TrendCall::Up, ReversalSignal::Down, DecisionKind::TakeProfit),
    (TrendCall::Up, ReversalSignal::None, DecisionKind::Wait),
    (TrendCall::Down, ReversalSignal::None, DecisionKind::Wait),
];

#[test]
fn test_all_pairs_match_table() {
    let fusion = DecisionFusion::new();

    for (trend, reversal, expected) in TABLE {
        let report = fusion.decide(trend, reversal, None);
        assert_eq!(report.decision, expected, "trend={trend}, reversal={reversal}");
        assert_eq!(report.reversal_signal, reversal);
        assert!(!report.reasons.is_empty());
    }
}

#[test]
fn test_wait_iff_reversal_none() {
    let fusion = DecisionFusion::new();

    for trend in [TrendCall::Up, TrendCall::Down] {
        for reversal in [ReversalSignal::Up, ReversalSignal::Down, ReversalSignal::None] {
            let report = fusion.decide(trend, reversal, Some(SmartMoneyBias::Bearish));
            assert_eq!(
                report.decision == DecisionKind::Wait,
                reversal == ReversalSignal::None,
                "trend={trend}, reversal={reversal}"
            );
        }
    }
}

#[test]
fn test_not_available_trend_always_waits() {
    let fusion = DecisionFusion::new();

    for reversal in [ReversalSignal::Up, ReversalSignal::Down, ReversalSignal::None] {
        assert_eq!(
            fusion.decide(TrendCall::NotAvailable, reversal, None).decision,
            DecisionKind::Wait
        );
    }
}

#[test]
fn test_failed_trend_input_degrades_to_not_available() {
    let report = DecisionFusion::new().decide_degraded(
        Err(IndicatorError::InsufficientData {
            required: 5,
            provided: 2,
        }),
        Ok(ReversalSignal::Up),
        Ok(SmartMoneyBias::Bullish),
    );

    assert_eq!(report.decision, DecisionKind::Wait);
    assert_eq!(report.smart_money_bias, Some(SmartMoneyBias::Bullish));
    assert!(report.reasons.iter().any(|r| r.contains("추세 입력 실패")));
}
