//! 분석 명령어.
//!
//! CSV 스냅샷으로 갱신 사이클을 한 번 실행하고 결과를 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! trendlens analyze -i data/btc_1h.csv
//! trendlens analyze -i data/btc_1h.csv -s high --format json
//! trendlens analyze -i data/spy_daily.csv -c config/engine.toml
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use tracing::debug;
use trendlens_analytics::{CycleReport, EngineConfig, SignalMemory, SignalPipeline};
use trendlens_core::SensitivityProfile;

use super::{load_series, summary_line};

/// 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// 분석 CLI 설정
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// 입력 CSV 경로
    pub input: PathBuf,
    /// 민감도 (없으면 설정 파일의 기본값)
    pub sensitivity: Option<SensitivityProfile>,
    pub format: OutputFormat,
}

/// 분석을 실행하고 결과를 stdout에 출력합니다.
pub fn run_analyze(engine_config: EngineConfig, config: &AnalyzeConfig) -> Result<()> {
    let (series, ingest_warnings) = load_series(&config.input)?;
    let sensitivity = config
        .sensitivity
        .unwrap_or(engine_config.reversal.default_sensitivity);

    let pipeline = SignalPipeline::new(engine_config);
    let mut memory = SignalMemory::from_settings(&pipeline.config().memory);

    debug!(candles = series.len(), sensitivity = %sensitivity, "Running single analysis");
    let mut report = pipeline.run_cycle(&series, sensitivity, &mut memory);

    let mut warnings = ingest_warnings;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(())
}

/// 사람이 읽을 수 있는 보고서.
pub fn render_text(report: &CycleReport) -> String {
    let mut out = String::new();
    let line = "═══════════════════════════════════════════════════════════════";

    let _ = writeln!(out, "{}", line);
    let _ = writeln!(out, "  {}", summary_line(report));
    let _ = writeln!(out, "{}", line);

    let _ = writeln!(out, "\n📌 결정: {}", report.decision.decision);
    for reason in &report.decision.reasons {
        let _ = writeln!(out, "  - {}", reason);
    }

    let _ = writeln!(
        out,
        "\n📈 추세: {} (신뢰도 {:.2}, 상승 {:.2} / 하락 {:.2})",
        report.trend.direction, report.trend.confidence, report.trend.prob_up, report.trend.prob_down
    );
    for explanation in &report.trend.explanations {
        let _ = writeln!(out, "  - {}", explanation);
    }

    let _ = writeln!(
        out,
        "\n🔄 반전: {} (점수 {:.2})",
        report.reversal.signal, report.reversal.score
    );
    for explanation in &report.reversal.explanations {
        let _ = writeln!(out, "  - {}", explanation);
    }

    let _ = writeln!(
        out,
        "\n🎯 반전 확률: {:.1}% → {} (신뢰도 {:.2})",
        report.probability.probability, report.probability.direction, report.probability.confidence
    );
    for explanation in &report.probability.explanations {
        let _ = writeln!(out, "  - {}", explanation);
    }

    let _ = writeln!(out, "\n🧱 수요 존: {}", report.zones.demand.len());
    for zone in &report.zones.demand {
        let _ = writeln!(out, "  - {} ~ {}", zone.low.round_dp(4), zone.high.round_dp(4));
    }
    let _ = writeln!(out, "🧱 공급 존: {}", report.zones.supply.len());
    for zone in &report.zones.supply {
        let _ = writeln!(out, "  - {} ~ {}", zone.low.round_dp(4), zone.high.round_dp(4));
    }

    if let Some(alert) = &report.alert {
        let _ = writeln!(out, "\n🔔 알림: {}", alert.message);
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\n⚠️  경고:");
        for warning in &report.warnings {
            let _ = writeln!(out, "  - {}", warning);
        }
    }

    out
}
