//! 기술적 지표 모듈.
//!
//! 시그널 엔진이 사용하는 순수 함수형 기술적 지표를 제공합니다.
//! 모든 지표는 입력과 같은 길이의 벡터를 반환하며, 워밍업 구간은 `None`입니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (Simple Moving Average)
//! - **EMA**: 지수 이동평균 (첫 값 시드)
//! - **MACD**: 이동평균 수렴/확산 (Moving Average Convergence Divergence)
//! - **SuperTrend**: ATR 밴드 기반 추세 추적
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Wilder 평활)
//! - **Stochastic**: 스토캐스틱 오실레이터
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드 (표본 표준편차)
//! - **ATR**: 평균 실제 범위 (True Range 단순 이동평균)
//!
//! # 데이터 부족
//!
//! 입력 길이가 첫 번째 유효값을 만드는 데 필요한 길이보다 짧으면
//! `IndicatorError::InsufficientData`를 반환합니다.
//!
//! | 지표 | 필요 길이 |
//! |------|-----------|
//! | EMA, MACD | 1 |
//! | SMA, Bollinger | period |
//! | RSI | period + 1 |
//! | Stochastic | k_period |
//! | ATR, SuperTrend | period |
//!
//! # 사용 예시
//!
//! ```
//! use rust_decimal::Decimal;
//! use trendlens_analytics::indicators::{IndicatorEngine, RsiParams, SmaParams};
//!
//! let prices: Vec<Decimal> = (0..30).map(|i| Decimal::from(100 + i)).collect();
//! let engine = IndicatorEngine::new();
//!
//! let sma = engine.sma(&prices, SmaParams { period: 20 }).unwrap();
//! let rsi = engine.rsi(&prices, RsiParams { period: 14 }).unwrap();
//! assert_eq!(sma.len(), rsi.len());
//! ```

pub mod momentum;
pub mod supertrend;
pub mod trend;
pub mod volatility;

use rust_decimal::Decimal;
use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams, StochasticParams, StochasticResult};
pub use supertrend::{SuperTrendIndicator, SuperTrendParams, SuperTrendResult};
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};
pub use volatility::{AtrParams, BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};

/// 지표 계산 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 통합 인터페이스를 제공합니다.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    supertrend: SuperTrendIndicator,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균 (EMA) 계산.
    pub fn ema(&self, prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.ema(prices, params)
    }

    /// MACD 라인, 시그널 라인, 히스토그램 계산.
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        self.trend.macd(prices, params)
    }

    /// SuperTrend 계산.
    pub fn supertrend(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: SuperTrendParams,
    ) -> IndicatorResult<Vec<SuperTrendResult>> {
        self.supertrend.calculate(high, low, close, params)
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI 계산 (0-100).
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(prices, params)
    }

    /// 스토캐스틱 오실레이터 계산.
    pub fn stochastic(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        self.momentum.stochastic(high, low, close, params)
    }

    /// 마지막 시점의 N봉 변화율(%). 기준값이 0이면 `None`.
    pub fn pct_momentum(&self, prices: &[Decimal], lookback: usize) -> Option<Decimal> {
        self.momentum.pct_momentum(prices, lookback)
    }

    // ==================== 변동성 지표 ====================

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[Decimal],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        self.volatility.bollinger_bands(prices, params)
    }

    /// ATR 계산.
    pub fn atr(
        &self,
        high: &[Decimal],
        low: &[Decimal],
        close: &[Decimal],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.volatility.atr(high, low, close, params)
    }
}
