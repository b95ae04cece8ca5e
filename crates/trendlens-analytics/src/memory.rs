//! 시그널 메모리.
//!
//! 사이클 사이에 유지되는 유일한 상태입니다.
//! - 추세 분류 결과 히스토리 (기본 200개)
//! - 반전 확률 히스토리 (기본 120개)
//! - 히스테리시스 알림 상태 (마지막 알림 방향)
//!
//! 호스트가 단일 소유자로 들고 있다가 매 사이클 `&mut`로 넘겨줍니다.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use trendlens_core::{Direction, TrendCall};

use crate::config::MemorySettings;
use crate::trend_classifier::TrendResult;

/// 고정 용량 FIFO 버퍼. 가득 차면 가장 오래된 항목을 버립니다.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// 용량이 0이면 1로 올립니다.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// 오래된 것부터 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// 추세 히스토리 항목.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecord {
    pub timestamp: DateTime<Utc>,
    pub direction: TrendCall,
    pub confidence: f64,
    pub prob_up: f64,
    pub prob_down: f64,
}

/// 반전 확률 히스토리 항목.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityRecord {
    pub timestamp: DateTime<Utc>,
    pub probability: f64,
}

/// 알림 임계값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// 상승 알림 (확률 ≥)
    pub up: f64,
    /// 하락 알림 (확률 ≤)
    pub down: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self { up: 65.0, down: 35.0 }
    }
}

/// 발동된 알림.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub direction: Direction,
    pub probability: f64,
    pub message: String,
}

/// 시그널 메모리.
#[derive(Debug, Clone)]
pub struct SignalMemory {
    trends: RingBuffer<TrendRecord>,
    reversals: RingBuffer<ProbabilityRecord>,
    thresholds: AlertThresholds,
    last_alerted: Option<Direction>,
}

impl Default for SignalMemory {
    fn default() -> Self {
        Self::with_capacities(200, 120, AlertThresholds::default())
    }
}

impl SignalMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacities(trend_capacity: usize, reversal_capacity: usize, thresholds: AlertThresholds) -> Self {
        Self {
            trends: RingBuffer::new(trend_capacity),
            reversals: RingBuffer::new(reversal_capacity),
            thresholds,
            last_alerted: None,
        }
    }

    pub fn from_settings(settings: &MemorySettings) -> Self {
        Self::with_capacities(
            settings.trend_history,
            settings.reversal_history,
            AlertThresholds {
                up: settings.alert_up,
                down: settings.alert_down,
            },
        )
    }

    pub fn record_trend(&mut self, timestamp: DateTime<Utc>, result: &TrendResult) {
        self.trends.push(TrendRecord {
            timestamp,
            direction: result.direction,
            confidence: result.confidence,
            prob_up: result.prob_up,
            prob_down: result.prob_down,
        });
    }

    pub fn record_reversal(&mut self, timestamp: DateTime<Utc>, probability: f64) {
        self.reversals.push(ProbabilityRecord {
            timestamp,
            probability,
        });
    }

    /// 히스테리시스 알림.
    ///
    /// 확률 ≥ 상승 임계값이고 마지막 알림이 UP이 아니면 UP,
    /// 확률 ≤ 하락 임계값이고 마지막 알림이 DOWN이 아니면 DOWN 알림을 발동합니다.
    pub fn observe_probability(&mut self, probability: f64) -> Option<Alert> {
        let direction = if probability >= self.thresholds.up && self.last_alerted != Some(Direction::Up) {
            Direction::Up
        } else if probability <= self.thresholds.down && self.last_alerted != Some(Direction::Down) {
            Direction::Down
        } else {
            return None;
        };

        self.last_alerted = Some(direction);

        let message = match direction {
            Direction::Up => format!(
                "상승 반전 확률 {:.1}% (임계값 {:.1}% 이상)",
                probability, self.thresholds.up
            ),
            Direction::Down => format!(
                "하락 반전 확률 {:.1}% (임계값 {:.1}% 이하)",
                probability, self.thresholds.down
            ),
        };
        info!(direction = %direction, probability, "Reversal alert fired");

        Some(Alert {
            direction,
            probability,
            message,
        })
    }

    /// 추세 히스토리 스냅샷 (오래된 것부터).
    pub fn get_history(&self) -> Vec<TrendRecord> {
        self.trends.snapshot()
    }

    pub fn reversal_history(&self) -> Vec<ProbabilityRecord> {
        self.reversals.snapshot()
    }

    pub fn last_alerted_direction(&self) -> Option<Direction> {
        self.last_alerted
    }

    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds
    }

    pub fn reset(&mut self) {
        self.trends.clear();
        self.reversals.clear();
        self.last_alerted = None;
    }
}
