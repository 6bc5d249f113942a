use crate::candle::Candle;
use crate::error::{IndicatorError, IndicatorResult, ensure_len};
use crate::indicator::TABuilder;
use crate::indicator::utils::moving_average;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// MACD 입력 가격 선택
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceMode {
    /// 종가
    #[default]
    Close,
    /// (고가 + 저가) / 2
    Hl2,
    /// (시가 + 고가 + 저가 + 종가) / 4
    Ohlc4,
}

impl PriceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceMode::Close => "close",
            PriceMode::Hl2 => "hl2",
            PriceMode::Ohlc4 => "ohlc4",
        }
    }

    /// 캔들에서 입력 가격 추출
    pub fn price<C: Candle>(&self, candle: &C) -> f64 {
        match self {
            PriceMode::Close => candle.close_price(),
            PriceMode::Hl2 => (candle.high_price() + candle.low_price()) / 2.0,
            PriceMode::Ohlc4 => {
                (candle.open_price()
                    + candle.high_price()
                    + candle.low_price()
                    + candle.close_price())
                    / 4.0
            }
        }
    }
}

impl FromStr for PriceMode {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close" => Ok(PriceMode::Close),
            "hl2" => Ok(PriceMode::Hl2),
            "ohlc4" => Ok(PriceMode::Ohlc4),
            _ => Err(IndicatorError::InvalidArgument(format!(
                "price_mode는 'close', 'hl2', 'ohlc4' 중 하나여야 합니다: {s}"
            ))),
        }
    }
}

/// MACD 매개변수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MACDParams {
    /// 빠른 EMA 기간 (일반적으로 12)
    pub fast_period: usize,
    /// 느린 EMA 기간 (일반적으로 26)
    pub slow_period: usize,
    /// 시그널 라인 기간 (일반적으로 9)
    pub signal_period: usize,
}

impl Default for MACDParams {
    fn default() -> Self {
        MACDParams {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MACDParams {
    /// 기간 유효성 검사
    pub fn validate(&self) -> IndicatorResult<()> {
        if self.fast_period == 0 || self.slow_period == 0 || self.signal_period == 0 {
            return Err(IndicatorError::InvalidArgument(
                "MACD 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(IndicatorError::InvalidArgument(
                "빠른 기간은 느린 기간보다 작아야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 계산에 필요한 최소 캔들 수
    pub fn required_len(&self) -> usize {
        self.slow_period + self.signal_period
    }
}

/// MACD(Moving Average Convergence Divergence) 기술적 지표
#[derive(Clone, Debug, PartialEq)]
pub struct MACD {
    params: MACDParams,
    /// 마지막 MACD 라인 (빠른 EMA - 느린 EMA)
    pub macd_line: f64,
    /// 마지막 시그널 라인 (MACD의 EMA)
    pub signal_line: f64,
    /// 마지막 히스토그램 (MACD - 시그널)
    pub histogram: f64,
    pub macd_series: Vec<f64>,
    pub signal_series: Vec<f64>,
    pub histogram_series: Vec<f64>,
}

impl Display for MACD {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({},{},{}: {:.2}, {:.2}, {:.2})",
            self.params.fast_period,
            self.params.slow_period,
            self.params.signal_period,
            self.macd_line,
            self.signal_line,
            self.histogram
        )
    }
}

impl MACD {
    /// MACD 라인이 시그널 라인 위에 있는지
    pub fn is_bullish_crossover(&self) -> bool {
        self.macd_line > self.signal_line
    }

    /// MACD 라인이 시그널 라인 아래에 있는지
    pub fn is_bearish_crossover(&self) -> bool {
        self.macd_line < self.signal_line
    }

    /// MACD 라인이 0선 위에 있는지
    pub fn is_above_zero(&self) -> bool {
        self.macd_line > 0.0
    }

    pub fn params(&self) -> MACDParams {
        self.params
    }
}

/// MACD 계산
///
/// EMA는 기간 평균이 아닌 첫 가격 샘플로 시드합니다.
///
/// # Arguments
/// * `data` - 캔들 슬라이스 (`slow_period + signal_period`개 이상)
/// * `params` - EMA 기간
/// * `price_mode` - 입력 가격 선택
pub fn calculate_macd<C: Candle>(
    data: &[C],
    params: MACDParams,
    price_mode: PriceMode,
) -> IndicatorResult<MACD> {
    params.validate()?;
    ensure_len("MACD", params.required_len(), data.len())?;

    let prices: Vec<f64> = data.iter().map(|c| price_mode.price(c)).collect();

    let fast = moving_average::calculate_ema_series(&prices, params.fast_period);
    let slow = moving_average::calculate_ema_series(&prices, params.slow_period);

    let macd_series: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal_series = moving_average::calculate_ema_series(&macd_series, params.signal_period);
    let histogram_series: Vec<f64> = macd_series
        .iter()
        .zip(&signal_series)
        .map(|(m, s)| m - s)
        .collect();

    Ok(MACD {
        params,
        macd_line: *macd_series.last().unwrap_or(&0.0),
        signal_line: *signal_series.last().unwrap_or(&0.0),
        histogram: *histogram_series.last().unwrap_or(&0.0),
        macd_series,
        signal_series,
        histogram_series,
    })
}

/// MACD 계산을 위한 빌더
#[derive(Debug)]
pub struct MACDBuilder<C: Candle> {
    params: MACDParams,
    price_mode: PriceMode,
    _phantom: PhantomData<C>,
}

impl<C> MACDBuilder<C>
where
    C: Candle,
{
    /// 새 MACD 빌더 생성
    ///
    /// # Returns
    /// * `IndicatorResult<MACDBuilder>` - 기간이 0이거나 fast >= slow이면 `InvalidArgument`
    pub fn new(params: MACDParams, price_mode: PriceMode) -> IndicatorResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            price_mode,
            _phantom: PhantomData,
        })
    }
}

impl<C> TABuilder<MACD, C> for MACDBuilder<C>
where
    C: Candle,
{
    fn required_len(&self) -> usize {
        self.params.required_len()
    }

    fn build(&self, data: &[C]) -> IndicatorResult<MACD> {
        calculate_macd(data, self.params, self.price_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candle::OhlcvCandle;

    #[test]
    fn test_price_mode() {
        let candle = OhlcvCandle::new(0, 1.0, 4.0, 0.0, 3.0, 1.0);
        assert_eq!(PriceMode::Close.price(&candle), 3.0);
        assert_eq!(PriceMode::Hl2.price(&candle), 2.0);
        assert_eq!(PriceMode::Ohlc4.price(&candle), 2.0);
        assert!("typical".parse::<PriceMode>().is_err());
    }

    #[test]
    fn test_macd_params_validation() {
        let params = MACDParams {
            fast_period: 26,
            slow_period: 12,
            signal_period: 9,
        };
        assert!(matches!(
            MACDBuilder::<OhlcvCandle>::new(params, PriceMode::Close),
            Err(IndicatorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_macd_flat_prices_are_zero() {
        let candles: Vec<OhlcvCandle> = (0..35)
            .map(|i| OhlcvCandle::new(i, 10.0, 11.0, 9.0, 10.0, 1.0))
            .collect();
        let macd = calculate_macd(&candles, MACDParams::default(), PriceMode::Close).unwrap();
        assert!(macd.macd_line.abs() < 1e-9);
        assert!(macd.signal_line.abs() < 1e-9);
        assert!(macd.histogram.abs() < 1e-9);
        assert_eq!(macd.macd_series.len(), 35);
    }
}
