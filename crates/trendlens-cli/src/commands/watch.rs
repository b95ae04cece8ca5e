//! 감시 명령어.
//!
//! 일정 주기로 CSV 스냅샷을 다시 읽어 갱신 사이클을 실행합니다.
//! 시그널 메모리 하나를 사이클 사이에 유지하므로 히스테리시스 알림이 동작합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 60초마다 분석, Ctrl+C로 종료
//! trendlens watch -i data/btc_1h.csv --interval-secs 60
//!
//! # 5회만 실행 후 히스토리 출력
//! trendlens watch -i data/btc_1h.csv --interval-secs 10 --cycles 5
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};
use trendlens_analytics::{EngineConfig, SignalMemory, SignalPipeline};
use trendlens_core::SensitivityProfile;

use super::{is_data_problem, load_series, summary_line};

/// 감시 CLI 설정
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// 입력 CSV 경로 (매 주기 다시 읽음)
    pub input: PathBuf,
    /// 실행 주기
    pub interval: Duration,
    /// 최대 실행 횟수 (없으면 Ctrl+C까지)
    pub cycles: Option<u64>,
    pub sensitivity: Option<SensitivityProfile>,
}

/// 폴링 루프를 실행하고 종료 시점의 시그널 메모리를 반환합니다.
pub async fn run_watch(engine_config: EngineConfig, config: &WatchConfig) -> Result<SignalMemory> {
    let sensitivity = config
        .sensitivity
        .unwrap_or(engine_config.reversal.default_sensitivity);
    let pipeline = SignalPipeline::new(engine_config);
    let mut memory = SignalMemory::from_settings(&pipeline.config().memory);

    info!(
        input = %config.input.display(),
        interval_secs = config.interval.as_secs(),
        sensitivity = %sensitivity,
        "Watch loop started"
    );

    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut completed = 0u64;

    loop {
        if config.cycles.is_some_and(|max| completed >= max) {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = interval.tick() => {
                completed += 1;

                // 데이터 문제는 이번 사이클만 건너뛰고 다음 스냅샷을 기다림
                let series = match load_series(&config.input) {
                    Ok((series, _)) => series,
                    Err(e) => {
                        if is_data_problem(&e) {
                            warn!(cycle = completed, "Snapshot rejected: {:#}", e);
                        } else {
                            error!(cycle = completed, "Snapshot load failed: {:#}", e);
                        }
                        println!("[{}] ❌ 스냅샷 로드 실패: {:#}", completed, e);
                        continue;
                    }
                };

                let report = pipeline.run_cycle(&series, sensitivity, &mut memory);
                println!(
                    "[{}] {} {}",
                    completed,
                    series.last().timestamp().format("%Y-%m-%d %H:%M"),
                    summary_line(&report)
                );
                if let Some(alert) = &report.alert {
                    println!("    🔔 {}", alert.message);
                }
            }
        }
    }

    print!("{}", render_history(&memory));
    info!(cycles = completed, "Watch loop finished");

    Ok(memory)
}

/// 메모리 히스토리 표.
pub fn render_history(memory: &SignalMemory) -> String {
    let mut out = String::new();
    let history = memory.get_history();

    let _ = writeln!(out, "\n📋 추세 히스토리 ({}건)", history.len());
    let _ = writeln!(out, "  시각                 | 방향 | 신뢰도 | 상승   | 하락");
    let _ = writeln!(out, "  ─────────────────────────────────────────────────────");
    for record in &history {
        let _ = writeln!(
            out,
            "  {} | {:<4} | {:.2}   | {:.2}   | {:.2}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.direction.to_string(),
            record.confidence,
            record.prob_up,
            record.prob_down
        );
    }

    let reversals = memory.reversal_history();
    if let Some(last) = reversals.last() {
        let _ = writeln!(
            out,
            "\n🎯 반전 확률 히스토리 {}건 (최근 {:.1}%)",
            reversals.len(),
            last.probability
        );
    }

    match memory.last_alerted_direction() {
        Some(direction) => {
            let _ = writeln!(out, "🔔 마지막 알림 방향: {}", direction);
        }
        None => {
            let _ = writeln!(out, "🔔 발동된 알림 없음");
        }
    }

    out
}
