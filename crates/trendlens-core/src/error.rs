//! 시그널 엔진의 에러 타입.
//!
//! 이 모듈은 캔들 모델, 수집 어댑터, 설정 로딩에서 사용되는 에러 타입을 정의합니다.
//! 지표 계산 에러는 `trendlens-analytics`의 `IndicatorError`가 담당합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 캔들 불변식 위반 (고가/저가 범위, 음수 거래량 등)
    #[error("잘못된 캔들: {0}")]
    InvalidCandle(String),

    /// 스키마 에러 (필수 컬럼 누락, 파싱 불가 필드)
    #[error("스키마 에러: {0}")]
    Schema(String),

    /// 데이터 부족
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 입력 데이터 문제로 인한 에러인지 확인합니다.
    ///
    /// 호스트는 이 경우 사이클을 건너뛰고 다음 스냅샷을 기다릴 수 있습니다.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidCandle(_) | CoreError::Schema(_) | CoreError::InsufficientData { .. }
        )
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Schema(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_data_error() {
        let schema_err = CoreError::Schema("missing close".to_string());
        assert!(schema_err.is_data_error());

        let io_err = CoreError::Io("permission denied".to_string());
        assert!(!io_err.is_data_error());
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = CoreError::InsufficientData {
            required: 1,
            provided: 0,
        };
        assert!(err.to_string().contains("필요 1개"));
    }
}
