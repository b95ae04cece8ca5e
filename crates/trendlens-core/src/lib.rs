//! # Trendlens Core
//!
//! 시그널 퓨전 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 엔진 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들(OHLCV) 및 검증된 캔들 시계열
//! - 방향/결정/민감도 열거형
//! - 에러 분류 체계
//! - 설정 로딩 헬퍼
//! - 로깅 인프라
//! - CSV 수집 어댑터 (정규화된 캔들 스키마 생성)

pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use ingest::{ingest_csv_path, ingest_csv_reader, IngestOutcome, PLACEHOLDER_VOLUME};
pub use logging::*;
pub use types::*;
