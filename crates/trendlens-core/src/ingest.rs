//! CSV 수집 어댑터.
//!
//! 다양한 소스(대소문자가 다른 헤더, 거래량 없는 피드, 주식/코인 피드)의 CSV를
//! 정규화된 `CandleSeries`로 한 번에 변환합니다. 엔진은 이 어댑터가 만든
//! 엄격한 스키마만 가정합니다.
//!
//! # 컬럼 별칭 (대소문자 무시)
//!
//! | 필드 | 별칭 |
//! |------|------|
//! | timestamp | timestamp, time, date, datetime, open_time |
//! | open | open, o |
//! | high | high, h |
//! | low | low, l |
//! | close | close, c, price, last (대체: adjclose, adj_close) |
//! | volume | volume, vol, qty |

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::{Candle, CandleSeries};
use crate::error::{CoreError, CoreResult};

/// 거래량 컬럼이 없을 때 사용하는 고정 거래량.
pub const PLACEHOLDER_VOLUME: Decimal = Decimal::ONE;

/// 밀리초 epoch로 간주하는 최소값 (1973년 이후의 밀리초 값).
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "time", "date", "datetime", "open_time"];
const OPEN_ALIASES: &[&str] = &["open", "o"];
const HIGH_ALIASES: &[&str] = &["high", "h"];
const LOW_ALIASES: &[&str] = &["low", "l"];
const CLOSE_ALIASES: &[&str] = &["close", "c", "price", "last"];
const CLOSE_FALLBACK_ALIASES: &[&str] = &["adjclose", "adj_close"];
const VOLUME_ALIASES: &[&str] = &["volume", "vol", "qty"];

/// 수집 결과.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// 정규화된 캔들 시계열
    pub series: CandleSeries,
    /// 대체값 사용 등 경고 메시지
    pub warnings: Vec<String>,
}

/// 헤더에서 찾은 컬럼 위치.
#[derive(Debug)]
struct ColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> CoreResult<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect();

        let find = |aliases: &[&str]| -> Option<usize> {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
        };

        let require = |field: &str, aliases: &[&str]| -> CoreResult<usize> {
            find(aliases).ok_or_else(|| {
                CoreError::Schema(format!(
                    "필수 컬럼 '{}'을(를) 찾을 수 없습니다 (사용 가능한 컬럼: {})",
                    field,
                    normalized.join(", ")
                ))
            })
        };

        let close = match find(CLOSE_ALIASES).or_else(|| find(CLOSE_FALLBACK_ALIASES)) {
            Some(idx) => idx,
            None => require("close", CLOSE_ALIASES)?,
        };

        Ok(Self {
            timestamp: require("timestamp", TIMESTAMP_ALIASES)?,
            open: require("open", OPEN_ALIASES)?,
            high: require("high", HIGH_ALIASES)?,
            low: require("low", LOW_ALIASES)?,
            close,
            volume: find(VOLUME_ALIASES),
        })
    }
}

/// 리더에서 CSV를 읽어 캔들 시계열을 생성합니다.
pub fn ingest_csv_reader<R: Read>(reader: R) -> CoreResult<IngestOutcome> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    debug!(?columns, "CSV columns resolved");

    let mut warnings = Vec::new();
    if columns.volume.is_none() {
        let message = format!(
            "거래량 컬럼이 없어 고정값 {}을(를) 사용합니다",
            PLACEHOLDER_VOLUME
        );
        warn!("{}", message);
        warnings.push(message);
    }

    let mut candles = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        // 헤더가 1번째 줄이므로 데이터 줄 번호는 idx + 2
        let line = idx + 2;
        let record = record?;

        let cell = |col: usize, field: &str| -> CoreResult<&str> {
            record.get(col).ok_or_else(|| {
                CoreError::Schema(format!("{}번째 줄: '{}' 값이 없습니다", line, field))
            })
        };

        let timestamp = parse_timestamp(cell(columns.timestamp, "timestamp")?)
            .ok_or_else(|| {
                CoreError::Schema(format!(
                    "{}번째 줄: 타임스탬프를 해석할 수 없습니다: {:?}",
                    line,
                    record.get(columns.timestamp).unwrap_or_default()
                ))
            })?;

        let open = parse_number(cell(columns.open, "open")?, "open", line)?;
        let high = parse_number(cell(columns.high, "high")?, "high", line)?;
        let low = parse_number(cell(columns.low, "low")?, "low", line)?;
        let close = parse_number(cell(columns.close, "close")?, "close", line)?;
        let volume = match columns.volume {
            Some(col) => parse_number(cell(col, "volume")?, "volume", line)?,
            None => PLACEHOLDER_VOLUME,
        };

        let candle = Candle::new(timestamp, open, high, low, close, volume).map_err(|e| match e {
            CoreError::InvalidCandle(msg) => {
                CoreError::InvalidCandle(format!("{}번째 줄: {}", line, msg))
            }
            other => other,
        })?;
        candles.push(candle);
    }

    let series = CandleSeries::new(candles)?;
    debug!(candles = series.len(), "CSV ingested");

    Ok(IngestOutcome { series, warnings })
}

/// 파일 경로에서 CSV를 읽어 캔들 시계열을 생성합니다.
pub fn ingest_csv_path(path: impl AsRef<Path>) -> CoreResult<IngestOutcome> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        CoreError::Io(format!("CSV 파일을 열 수 없습니다 ({}): {}", path.display(), e))
    })?;
    ingest_csv_reader(file)
}

fn parse_number(raw: &str, field: &str, line: usize) -> CoreResult<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| {
            CoreError::Schema(format!(
                "{}번째 줄: '{}' 값을 숫자로 해석할 수 없습니다: {:?}",
                line, field, raw
            ))
        })
}

/// 지원 형식: RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, 정수 epoch(초/밀리초).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(epoch) = raw.parse::<i64>() {
        return if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(epoch)
        } else {
            DateTime::from_timestamp(epoch, 0)
        };
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_timestamp_formats() {
        let a = parse_timestamp("2024-01-02T03:04:05Z").unwrap();
        let b = parse_timestamp("2024-01-02 03:04:05").unwrap();
        assert_eq!(a, b);

        let secs = parse_timestamp("1704164645").unwrap();
        let millis = parse_timestamp("1704164645000").unwrap();
        assert_eq!(secs, a);
        assert_eq!(millis, a);

        let day = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-01-02T00:00:00+00:00");

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1.5", "open", 2).unwrap(), dec!(1.5));
        assert_eq!(parse_number("1e2", "open", 2).unwrap(), dec!(100));
        assert!(matches!(
            parse_number("abc", "open", 7),
            Err(CoreError::Schema(msg)) if msg.contains("7번째 줄")
        ));
    }

    #[test]
    fn test_adj_close_fallback() {
        let csv = "Date,Open,High,Low,Adj_Close,Volume\n2024-01-01,10,12,9,11,100\n";
        let outcome = ingest_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(outcome.series.last().close(), dec!(11));
        assert!(outcome.warnings.is_empty());
    }
}
