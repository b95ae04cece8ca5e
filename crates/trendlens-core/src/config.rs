//! 설정 관리.
//!
//! 로깅 설정과 TOML 파일 + 환경 변수 계층 로딩 헬퍼를 제공합니다.
//! 엔진 파라미터(`EngineConfig`)는 `trendlens-analytics`에서 이 헬퍼를 사용해 로드합니다.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::logging::LogFormat;

/// 환경 변수 오버라이드 접두사 (예: `TRENDLENS__LOGGING__LEVEL=debug`).
pub const ENV_PREFIX: &str = "TRENDLENS";

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터 (예: "info", "trendlens_analytics=debug")
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// 파일과 환경 변수에서 설정을 로드합니다.
///
/// 파일 값 위에 `{prefix}__섹션__키` 형식의 환경 변수가 덮어씌워집니다.
/// 누락된 키는 대상 타입의 `#[serde(default)]` 값을 따릅니다.
pub fn load_layered<T, P>(path: P, env_prefix: &str) -> CoreResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(CoreError::Config(format!(
            "설정 파일을 찾을 수 없습니다: {}",
            path.display()
        )));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// TOML 문자열에서 설정을 파싱합니다 (환경 변수 오버라이드 없음).
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> CoreResult<T> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}
