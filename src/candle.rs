use crate::error::{IndicatorError, IndicatorResult, ensure_len};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// OHLCV 캔들 접근 트레이트
///
/// 모든 지표/패턴/구조 분석기는 이 트레이트에 대해 제네릭하게 동작합니다.
pub trait Candle: Clone + Debug + Display + PartialEq + Send + Sync {
    /// 캔들 시작 시각 (epoch 밀리초)
    fn timestamp(&self) -> i64;
    /// 시가
    fn open_price(&self) -> f64;
    /// 고가
    fn high_price(&self) -> f64;
    /// 저가
    fn low_price(&self) -> f64;
    /// 종가
    fn close_price(&self) -> f64;
    /// 거래량
    fn volume(&self) -> f64;

    /// 캔들 시작 시각 (UTC)
    fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp()).unwrap_or_default()
    }

    /// 양봉 여부
    fn is_bullish(&self) -> bool {
        self.close_price() > self.open_price()
    }

    /// 음봉 여부
    fn is_bearish(&self) -> bool {
        self.close_price() < self.open_price()
    }
}

/// 거래소 형식의 6필드 캔들
///
/// `[timestamp, open, high, low, close, volume]` 배열로 직렬화됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct OhlcvCandle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvCandle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        OhlcvCandle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl From<[f64; 6]> for OhlcvCandle {
    fn from(raw: [f64; 6]) -> Self {
        OhlcvCandle::new(raw[0] as i64, raw[1], raw[2], raw[3], raw[4], raw[5])
    }
}

impl From<OhlcvCandle> for [f64; 6] {
    fn from(candle: OhlcvCandle) -> Self {
        [
            candle.timestamp as f64,
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume,
        ]
    }
}

impl Display for OhlcvCandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Candle(t={}, o={}, h={}, l={}, c={}, v={})",
            self.timestamp, self.open, self.high, self.low, self.close, self.volume
        )
    }
}

impl Candle for OhlcvCandle {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
    fn open_price(&self) -> f64 {
        self.open
    }
    fn high_price(&self) -> f64 {
        self.high
    }
    fn low_price(&self) -> f64 {
        self.low
    }
    fn close_price(&self) -> f64 {
        self.close
    }
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// 거래소 캔들 간격
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleInterval {
    Minute1,
    Minute3,
    Minute5,
    Minute15,
    Minute30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl CandleInterval {
    /// 거래소 토큰 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            CandleInterval::Minute1 => "1m",
            CandleInterval::Minute3 => "3m",
            CandleInterval::Minute5 => "5m",
            CandleInterval::Minute15 => "15m",
            CandleInterval::Minute30 => "30m",
            CandleInterval::Hour1 => "1h",
            CandleInterval::Hour2 => "2h",
            CandleInterval::Hour4 => "4h",
            CandleInterval::Hour6 => "6h",
            CandleInterval::Hour8 => "8h",
            CandleInterval::Hour12 => "12h",
            CandleInterval::Day1 => "1d",
            CandleInterval::Day3 => "3d",
            CandleInterval::Week1 => "1w",
            CandleInterval::Month1 => "1M",
        }
    }

    /// 간격 길이 (밀리초, 월봉은 30일 기준)
    pub fn as_millis(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            CandleInterval::Minute1 => MINUTE,
            CandleInterval::Minute3 => 3 * MINUTE,
            CandleInterval::Minute5 => 5 * MINUTE,
            CandleInterval::Minute15 => 15 * MINUTE,
            CandleInterval::Minute30 => 30 * MINUTE,
            CandleInterval::Hour1 => 60 * MINUTE,
            CandleInterval::Hour2 => 120 * MINUTE,
            CandleInterval::Hour4 => 240 * MINUTE,
            CandleInterval::Hour6 => 360 * MINUTE,
            CandleInterval::Hour8 => 480 * MINUTE,
            CandleInterval::Hour12 => 720 * MINUTE,
            CandleInterval::Day1 => 1_440 * MINUTE,
            CandleInterval::Day3 => 3 * 1_440 * MINUTE,
            CandleInterval::Week1 => 7 * 1_440 * MINUTE,
            CandleInterval::Month1 => 30 * 1_440 * MINUTE,
        }
    }
}

impl FromStr for CandleInterval {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let interval = match s {
            "1m" => CandleInterval::Minute1,
            "3m" => CandleInterval::Minute3,
            "5m" => CandleInterval::Minute5,
            "15m" => CandleInterval::Minute15,
            "30m" => CandleInterval::Minute30,
            "1h" => CandleInterval::Hour1,
            "2h" => CandleInterval::Hour2,
            "4h" => CandleInterval::Hour4,
            "6h" => CandleInterval::Hour6,
            "8h" => CandleInterval::Hour8,
            "12h" => CandleInterval::Hour12,
            "1d" => CandleInterval::Day1,
            "3d" => CandleInterval::Day3,
            "1w" => CandleInterval::Week1,
            "1M" => CandleInterval::Month1,
            _ => {
                return Err(IndicatorError::InvalidArgument(format!(
                    "지원되지 않는 캔들 간격: {s}"
                )));
            }
        };
        Ok(interval)
    }
}

impl Display for CandleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 검증된 시간 오름차순 캔들 윈도우
///
/// 삽입 순서가 곧 시간 순서이며 중복 타임스탬프는 허용되지 않습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries<C: Candle> {
    items: Vec<C>,
}

impl<C: Candle> CandleSeries<C> {
    /// 캔들 목록을 검증하여 시리즈 생성
    ///
    /// # Returns
    /// * `IndicatorResult<CandleSeries<C>>` - 검증된 시리즈 또는 `InvalidSeries` 오류
    pub fn new(items: Vec<C>) -> IndicatorResult<Self> {
        if items.is_empty() {
            return Err(IndicatorError::InvalidSeries("캔들이 비어 있습니다".to_string()));
        }

        for (i, candle) in items.iter().enumerate() {
            let prices = [
                candle.open_price(),
                candle.high_price(),
                candle.low_price(),
                candle.close_price(),
            ];
            if prices.iter().any(|p| !p.is_finite()) || !candle.volume().is_finite() {
                return Err(IndicatorError::InvalidSeries(format!(
                    "인덱스 {i}: 유한하지 않은 값"
                )));
            }
            if candle.volume() < 0.0 {
                return Err(IndicatorError::InvalidSeries(format!(
                    "인덱스 {i}: 음수 거래량 {}",
                    candle.volume()
                )));
            }
            if candle.high_price() < candle.low_price() {
                return Err(IndicatorError::InvalidSeries(format!(
                    "인덱스 {i}: 고가가 저가보다 낮음"
                )));
            }
        }

        if let Some(i) = items
            .windows(2)
            .position(|pair| pair[1].timestamp() <= pair[0].timestamp())
        {
            return Err(IndicatorError::InvalidSeries(format!(
                "인덱스 {}: 타임스탬프가 오름차순이 아니거나 중복됨",
                i + 1
            )));
        }

        Ok(CandleSeries { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 전체 캔들 슬라이스 (시간 오름차순)
    pub fn items(&self) -> &[C] {
        &self.items
    }

    /// 가장 최근 캔들
    pub fn last(&self) -> Option<&C> {
        self.items.last()
    }

    /// 마지막 `n`개 캔들 (시리즈가 더 짧으면 전체)
    pub fn tail(&self, n: usize) -> &[C] {
        tail(&self.items, n)
    }

    /// 최소 길이 확인
    pub fn require(&self, required: usize, indicator: &'static str) -> IndicatorResult<()> {
        ensure_len(indicator, required, self.items.len())
    }
}

/// 슬라이스의 마지막 `n`개 원소
pub fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}
