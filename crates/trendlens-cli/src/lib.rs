//! Trendlens CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - CSV 스냅샷 1회 분석 (`analyze`)
//! - 폴링 루프 감시 (`watch`)

pub mod commands;

pub use commands::*;
