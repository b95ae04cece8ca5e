//! Trendlens CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # CSV 스냅샷 1회 분석
//! trendlens analyze -i data/btc_1h.csv
//!
//! # JSON 출력, 높은 민감도
//! trendlens analyze -i data/btc_1h.csv -s high --format json
//!
//! # 30초마다 다시 읽어 분석 (Ctrl+C로 종료)
//! trendlens watch -i data/btc_1h.csv --interval-secs 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use trendlens_core::SensitivityProfile;

use trendlens_cli::commands::analyze::{run_analyze, AnalyzeConfig, OutputFormat};
use trendlens_cli::commands::bootstrap;
use trendlens_cli::commands::watch::{run_watch, WatchConfig};

#[derive(Parser)]
#[command(name = "trendlens")]
#[command(about = "Trendlens - 추세/반전 시그널 퓨전 엔진", long_about = None)]
#[command(version)]
struct Cli {
    /// 엔진 설정 파일 (TOML, 환경 변수 TRENDLENS__* 로 덮어쓰기 가능)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// CSV 스냅샷으로 갱신 사이클 1회 실행
    Analyze {
        /// 입력 CSV 경로 (timestamp, open, high, low, close[, volume])
        #[arg(short, long)]
        input: PathBuf,

        /// 반전 감지 민감도 (low, medium, high)
        #[arg(short, long)]
        sensitivity: Option<SensitivityProfile>,

        /// 출력 형식
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// 주기적으로 스냅샷을 다시 읽어 분석
    Watch {
        /// 입력 CSV 경로 (매 주기 다시 읽음)
        #[arg(short, long)]
        input: PathBuf,

        /// 실행 주기 (초)
        #[arg(long, default_value = "60")]
        interval_secs: u64,

        /// 최대 실행 횟수 (지정하지 않으면 Ctrl+C까지)
        #[arg(long)]
        cycles: Option<u64>,

        /// 반전 감지 민감도 (low, medium, high)
        #[arg(short, long)]
        sensitivity: Option<SensitivityProfile>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let engine_config = bootstrap(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            sensitivity,
            format,
        } => {
            let config = AnalyzeConfig {
                input,
                sensitivity,
                format,
            };
            run_analyze(engine_config, &config)?;
        }

        Commands::Watch {
            input,
            interval_secs,
            cycles,
            sensitivity,
        } => {
            if interval_secs == 0 {
                return Err(anyhow!("--interval-secs는 0보다 커야 합니다"));
            }

            let config = WatchConfig {
                input,
                interval: Duration::from_secs(interval_secs),
                cycles,
                sensitivity,
            };
            run_watch(engine_config, &config).await?;
        }
    }

    Ok(())
}
