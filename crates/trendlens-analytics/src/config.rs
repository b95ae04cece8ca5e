//! 엔진 설정.
//!
//! 지표 파라미터, 반전 감지, 존 감지, 시그널 메모리의 모든 조정값을 한 곳에 모읍니다.
//! 모든 섹션은 `#[serde(default)]`이므로 TOML 파일에는 바꾸려는 값만 적으면 됩니다.
//!
//! ```toml
//! [reversal]
//! default_sensitivity = "high"
//! wick_body_multiplier = 2.0
//!
//! [memory]
//! alert_up = 70.0
//! ```
//!
//! 환경 변수 오버라이드: `TRENDLENS__MEMORY__ALERT_UP=70`

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trendlens_core::{load_layered, parse_toml, LoggingConfig, SensitivityProfile, ENV_PREFIX};

use crate::indicators::{
    AtrParams, BollingerBandsParams, IndicatorError, IndicatorResult, MacdParams, RsiParams,
    StochasticParams, SuperTrendParams,
};

/// 엔진 전체 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 지표 파라미터
    pub indicators: IndicatorSettings,
    /// 반전 감지 설정
    pub reversal: ReversalSettings,
    /// 존 감지 설정
    pub zones: ZoneSettings,
    /// 시그널 메모리 설정
    pub memory: MemorySettings,
    /// 스마트머니 편향 설정
    pub smart_money: SmartMoneySettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 지표 프레임 파라미터.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorSettings {
    /// 계산할 EMA 기간들
    pub ema_periods: Vec<usize>,
    pub rsi: RsiParams,
    pub macd: MacdParams,
    pub bollinger: BollingerBandsParams,
    pub stochastic: StochasticParams,
    pub atr: AtrParams,
    pub supertrend: SuperTrendParams,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ema_periods: vec![20, 50],
            rsi: RsiParams::default(),
            macd: MacdParams::default(),
            bollinger: BollingerBandsParams::default(),
            stochastic: StochasticParams::default(),
            atr: AtrParams::default(),
            supertrend: SuperTrendParams::default(),
        }
    }
}

/// 반전 감지 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReversalSettings {
    /// 호출자가 지정하지 않을 때 사용할 민감도
    pub default_sensitivity: SensitivityProfile,
    /// 꼬리 비율 모드의 몸통 배수 (꼬리 > 몸통 × 배수 × 민감도 계수)
    pub wick_body_multiplier: Decimal,
    /// 오실레이터 모드가 발동하기 위한 최소 충족 조건 수
    pub min_confirmations: usize,
    /// 최소 캔들 윈도우
    pub window: usize,
    /// 거래량/몸통 평균 구간
    pub average_lookback: usize,
    /// 모멘텀 소진 구간
    pub momentum_lookback: usize,
}

impl Default for ReversalSettings {
    fn default() -> Self {
        Self {
            default_sensitivity: SensitivityProfile::Medium,
            wick_body_multiplier: dec!(2.5),
            min_confirmations: 2,
            window: 20,
            average_lookback: 10,
            momentum_lookback: 5,
        }
    }
}

/// 지지/저항 존 감지 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ZoneSettings {
    /// 스윙 판정 좌우 구간
    pub swing_lookback: usize,
    /// 존 폭 (%)
    pub zone_width_pct: Decimal,
    /// 병합 임계값 (%)
    pub merge_threshold_pct: Decimal,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            swing_lookback: 12,
            zone_width_pct: dec!(0.3),
            merge_threshold_pct: dec!(0.4),
        }
    }
}

/// 시그널 메모리 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MemorySettings {
    /// 추세 결과 히스토리 용량
    pub trend_history: usize,
    /// 반전 확률 히스토리 용량
    pub reversal_history: usize,
    /// 상승 알림 임계값 (확률 ≥)
    pub alert_up: f64,
    /// 하락 알림 임계값 (확률 ≤)
    pub alert_down: f64,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            trend_history: 200,
            reversal_history: 120,
            alert_up: 65.0,
            alert_down: 35.0,
        }
    }
}

/// 스마트머니 편향 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SmartMoneySettings {
    pub ema_period: usize,
}

impl Default for SmartMoneySettings {
    fn default() -> Self {
        Self { ema_period: 50 }
    }
}

impl EngineConfig {
    /// 파일에서 설정을 로드하고 환경 변수 오버라이드를 적용한 뒤 검증합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> IndicatorResult<Self> {
        let config: Self = load_layered(path, ENV_PREFIX)
            .map_err(|e| IndicatorError::InvalidParameter(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱하고 검증합니다.
    pub fn from_toml_str(content: &str) -> IndicatorResult<Self> {
        let config: Self =
            parse_toml(content).map_err(|e| IndicatorError::InvalidParameter(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 설정값을 검증합니다.
    pub fn validate(&self) -> IndicatorResult<()> {
        let ind = &self.indicators;

        if ind.ema_periods.iter().any(|p| *p == 0) {
            return Err(invalid("indicators.ema_periods에 0이 포함되어 있습니다"));
        }

        for (name, period) in [
            ("indicators.rsi.period", ind.rsi.period),
            ("indicators.macd.fast_period", ind.macd.fast_period),
            ("indicators.macd.slow_period", ind.macd.slow_period),
            ("indicators.macd.signal_period", ind.macd.signal_period),
            ("indicators.bollinger.period", ind.bollinger.period),
            ("indicators.stochastic.k_period", ind.stochastic.k_period),
            ("indicators.stochastic.d_period", ind.stochastic.d_period),
            ("indicators.atr.period", ind.atr.period),
            ("indicators.supertrend.atr_period", ind.supertrend.atr_period),
            ("reversal.average_lookback", self.reversal.average_lookback),
            ("reversal.momentum_lookback", self.reversal.momentum_lookback),
            ("reversal.window", self.reversal.window),
            ("zones.swing_lookback", self.zones.swing_lookback),
            ("memory.trend_history", self.memory.trend_history),
            ("memory.reversal_history", self.memory.reversal_history),
            ("smart_money.ema_period", self.smart_money.ema_period),
        ] {
            if period == 0 {
                return Err(invalid(&format!("{}는 0보다 커야 합니다", name)));
            }
        }

        if ind.macd.fast_period >= ind.macd.slow_period {
            return Err(invalid("MACD 단기 기간은 장기 기간보다 작아야 합니다"));
        }

        for (name, value) in [
            ("indicators.bollinger.std_dev_multiplier", ind.bollinger.std_dev_multiplier),
            ("indicators.supertrend.multiplier", ind.supertrend.multiplier),
            ("reversal.wick_body_multiplier", self.reversal.wick_body_multiplier),
            ("zones.zone_width_pct", self.zones.zone_width_pct),
        ] {
            if value <= Decimal::ZERO {
                return Err(invalid(&format!("{}는 양수여야 합니다", name)));
            }
        }

        if self.zones.merge_threshold_pct.is_sign_negative() {
            return Err(invalid("zones.merge_threshold_pct는 음수일 수 없습니다"));
        }

        if !(1..=4).contains(&self.reversal.min_confirmations) {
            return Err(invalid("reversal.min_confirmations는 1~4 사이여야 합니다"));
        }

        let mem = &self.memory;
        if !(0.0..=100.0).contains(&mem.alert_down)
            || !(0.0..=100.0).contains(&mem.alert_up)
            || mem.alert_down >= mem.alert_up
        {
            return Err(invalid(&format!(
                "알림 임계값이 잘못되었습니다: down {} < up {} (0~100)",
                mem.alert_down, mem.alert_up
            )));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> IndicatorError {
    IndicatorError::InvalidParameter(message.to_string())
}
