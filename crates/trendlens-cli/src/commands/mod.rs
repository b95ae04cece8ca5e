//! CLI 명령어 구현 모듈.

pub mod analyze;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use trendlens_analytics::{CycleReport, EngineConfig};
use trendlens_core::{ingest_csv_path, init_logging, CandleSeries, CoreError};

/// 설정 파일을 로드합니다. 경로가 없으면 기본 설정.
fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("설정 파일 로드 실패: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// 설정을 로드하고 그 `[logging]` 섹션으로 로깅을 초기화합니다.
///
/// 설정 로드 결과는 subscriber 설치 후에 기록됩니다.
pub fn bootstrap(path: Option<&Path>) -> Result<EngineConfig> {
    let config = load_engine_config(path)?;
    init_logging(&config.logging).context("로깅 초기화 실패")?;

    match path {
        Some(path) => info!(path = %path.display(), "Engine config loaded"),
        None => info!("Using default engine config"),
    }
    Ok(config)
}

/// 스냅샷 내용 문제(스키마, 캔들 불변식)인지 확인합니다. 파일 접근 실패는 포함하지 않습니다.
pub fn is_data_problem(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CoreError>()
        .is_some_and(CoreError::is_data_error)
}

/// CSV 스냅샷을 읽어 캔들 시계열로 변환합니다. 수집 경고는 로그로 남깁니다.
pub fn load_series(path: &Path) -> Result<(CandleSeries, Vec<String>)> {
    let outcome = ingest_csv_path(path)
        .with_context(|| format!("캔들 데이터 로드 실패: {}", path.display()))?;

    for warning in &outcome.warnings {
        warn!(path = %path.display(), "{}", warning);
    }

    Ok((outcome.series, outcome.warnings))
}

/// 한 줄 요약.
pub fn summary_line(report: &CycleReport) -> String {
    let supertrend = report
        .supertrend_direction
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "결정 {} | 추세 {} ({:.0}%) | SuperTrend {} | 반전 {} | 반전 확률 {:.1}% ({})",
        report.decision.decision,
        report.trend.direction,
        report.trend.prob_up * 100.0,
        supertrend,
        report.reversal.signal,
        report.probability.probability,
        report.probability.direction,
    )
}
