//! 로깅 초기화.
//!
//! 레벨과 형식은 엔진 설정의 `[logging]` 섹션에서 옵니다
//! (`TRENDLENS__LOGGING__LEVEL`, `TRENDLENS__LOGGING__FORMAT`으로 덮어쓰기 가능).
//! `RUST_LOG`가 있으면 레벨 필터로 우선 사용합니다.
//!
//! 로그는 stderr로 나갑니다. stdout은 분석 결과(텍스트/JSON) 전용입니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::{CoreError, CoreResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 여러 줄, 색상 포함 (터미널용)
    #[default]
    Pretty,
    /// 한 줄 JSON (watch 로그 수집용)
    Json,
    /// 한 줄 텍스트
    Compact,
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(CoreError::Config(format!(
                "알 수 없는 로그 형식: {} (pretty, json, compact)",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        };
        f.write_str(name)
    }
}

fn level_filter(config: &LoggingConfig) -> CoreResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| CoreError::Config(format!("잘못된 로그 레벨 '{}': {}", config.level, e)))
}

/// 전역 subscriber를 설치합니다. 프로세스당 한 번만 성공합니다.
pub fn init_logging(config: &LoggingConfig) -> CoreResult<()> {
    let filter = level_filter(config)?;

    let base = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|e| CoreError::Config(format!("로깅 초기화 실패: {}", e)))?;

    tracing::debug!(format = %config.format, level = %config.level, "Logging initialized");
    Ok(())
}

/// 갱신 사이클 span (캔들 수, 민감도 필드 포함).
#[macro_export]
macro_rules! cycle_span {
    ($name:expr, $candles:expr, $sensitivity:expr) => {
        tracing::info_span!($name, candles = $candles, sensitivity = %$sensitivity)
    };
}
