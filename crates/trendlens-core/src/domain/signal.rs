//! 방향 및 결정 시그널 타입.
//!
//! 이 모듈은 엔진 컴포넌트가 주고받는 열거형을 정의합니다:
//! - `Direction` - 추세 방향 (상승/하락)
//! - `ReversalSignal` - 반전 감지 결과
//! - `TrendCall` - 추세 분류기 결과 ("N/A" 포함)
//! - `SmartMoneyBias` - 참고용 스마트머니 편향
//! - `DecisionKind` - 최종 결정
//! - `ProbabilityDirection` - 반전 확률 방향

use serde::{Deserialize, Serialize};
use std::fmt;

/// 추세 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// 상승
    Up,
    /// 하락
    Down,
}

impl Direction {
    /// 수치 표현 (+1 / -1).
    pub fn as_sign(self) -> i8 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// 반전 감지 결과 시그널.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReversalSignal {
    /// 상승 반전
    Up,
    /// 하락 반전
    Down,
    /// 반전 없음
    #[default]
    None,
}

impl From<Direction> for ReversalSignal {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => ReversalSignal::Up,
            Direction::Down => ReversalSignal::Down,
        }
    }
}

impl fmt::Display for ReversalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReversalSignal::Up => write!(f, "UP"),
            ReversalSignal::Down => write!(f, "DOWN"),
            ReversalSignal::None => write!(f, "NONE"),
        }
    }
}

/// 추세 분류기 결과.
///
/// `NotAvailable`은 기권이며 하락으로 해석하면 안 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendCall {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl TrendCall {
    /// 확정된 방향이 있으면 반환합니다.
    pub fn direction(self) -> Option<Direction> {
        match self {
            TrendCall::Up => Some(Direction::Up),
            TrendCall::Down => Some(Direction::Down),
            TrendCall::NotAvailable => None,
        }
    }
}

impl From<Direction> for TrendCall {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => TrendCall::Up,
            Direction::Down => TrendCall::Down,
        }
    }
}

impl fmt::Display for TrendCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendCall::Up => write!(f, "UP"),
            TrendCall::Down => write!(f, "DOWN"),
            TrendCall::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// 스마트머니 편향 (참고용, 결정에 영향 없음).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SmartMoneyBias {
    Bullish,
    Bearish,
}

impl fmt::Display for SmartMoneyBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmartMoneyBias::Bullish => write!(f, "BULLISH"),
            SmartMoneyBias::Bearish => write!(f, "BEARISH"),
        }
    }
}

/// 최종 결정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    /// 매수 (상승 추세 + 상승 반전)
    Buy,
    /// 매도 (하락 추세 + 하락 반전)
    Sell,
    /// 반전 매수 (하락 추세 + 상승 반전)
    ReversalBuy,
    /// 익절 (상승 추세 + 하락 반전)
    TakeProfit,
    /// 관망
    Wait,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionKind::Buy => write!(f, "BUY"),
            DecisionKind::Sell => write!(f, "SELL"),
            DecisionKind::ReversalBuy => write!(f, "REVERSAL_BUY"),
            DecisionKind::TakeProfit => write!(f, "TAKE_PROFIT"),
            DecisionKind::Wait => write!(f, "WAIT"),
        }
    }
}

/// 반전 확률 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbabilityDirection {
    Up,
    Down,
    #[default]
    Neutral,
}

impl fmt::Display for ProbabilityDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilityDirection::Up => write!(f, "UP"),
            ProbabilityDirection::Down => write!(f, "DOWN"),
            ProbabilityDirection::Neutral => write!(f, "NEUTRAL"),
        }
    }
}
