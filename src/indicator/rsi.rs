use crate::candle::Candle;
use crate::error::{IndicatorError, IndicatorResult, ensure_len};
use crate::indicator::TABuilder;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// RSI 가격 변화량 계산 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsiMode {
    /// 이전 종가 대비 종가 변화량 (표준)
    #[default]
    CloseClose,
    /// 같은 캔들의 시가 대비 종가 변화량
    OpenClose,
}

impl RsiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsiMode::CloseClose => "close-close",
            RsiMode::OpenClose => "open-close",
        }
    }
}

impl FromStr for RsiMode {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close-close" => Ok(RsiMode::CloseClose),
            "open-close" => Ok(RsiMode::OpenClose),
            _ => Err(IndicatorError::InvalidArgument(format!(
                "RSI 모드는 'close-close' 또는 'open-close'여야 합니다: {s}"
            ))),
        }
    }
}

/// 상대강도지수(RSI) 기술적 지표
///
/// RSI는 가격 변동의 상대적 강도를 측정하여 과매수/과매도 상태를 판단
#[derive(Clone, Debug, PartialEq)]
pub struct RSI {
    /// RSI 계산 기간
    period: usize,
    /// 마지막 RSI 값 (0-100)
    pub value: f64,
    /// 윈도우 전체 RSI 평균
    pub mean: f64,
    /// 시드 값부터 마지막까지의 RSI 시리즈
    pub series: Vec<f64>,
}

impl Display for RSI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RSI({}: {:.2}, mean {:.2})",
            self.period, self.value, self.mean
        )
    }
}

impl RSI {
    /// RSI가 과매수 상태인지 확인
    ///
    /// # Arguments
    /// * `threshold` - 과매수 기준값 (기본값 70.0)
    pub fn is_overbought(&self, threshold: Option<f64>) -> bool {
        self.value > threshold.unwrap_or(70.0)
    }

    /// RSI가 과매도 상태인지 확인
    ///
    /// # Arguments
    /// * `threshold` - 과매도 기준값 (기본값 30.0)
    pub fn is_oversold(&self, threshold: Option<f64>) -> bool {
        self.value < threshold.unwrap_or(30.0)
    }

    /// 마지막 값 / 평균 비율
    ///
    /// 평균이 0이면 `None`
    pub fn gap_ratio(&self) -> Option<f64> {
        if self.mean == 0.0 {
            None
        } else {
            Some(self.value / self.mean)
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Wilder 평활 RSI 계산
///
/// 첫 `period`개 변화량의 단순 평균으로 시드한 뒤
/// `avg = (avg * (period - 1) + new) / period`로 갱신합니다.
/// 시드 평균으로 계산한 RSI가 시리즈의 첫 값입니다.
///
/// # Arguments
/// * `data` - 캔들 슬라이스 (`period + 1`개 이상)
/// * `period` - RSI 기간
/// * `mode` - 변화량 계산 방식
pub fn calculate_rsi<C: Candle>(data: &[C], period: usize, mode: RsiMode) -> IndicatorResult<RSI> {
    if period == 0 {
        return Err(IndicatorError::InvalidArgument(
            "RSI 기간은 0보다 커야 합니다".to_string(),
        ));
    }
    ensure_len("RSI", period + 1, data.len())?;

    let deltas: Vec<f64> = match mode {
        RsiMode::CloseClose => data
            .windows(2)
            .map(|pair| pair[1].close_price() - pair[0].close_price())
            .collect(),
        RsiMode::OpenClose => data
            .iter()
            .map(|c| c.close_price() - c.open_price())
            .collect(),
    };

    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let period_f = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period_f;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period_f;

    let mut series = Vec::with_capacity(gains.len() - period + 1);
    series.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period_f - 1.0) + gains[i]) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + losses[i]) / period_f;
        series.push(rsi_from_averages(avg_gain, avg_loss));
    }

    let value = *series.last().unwrap_or(&50.0);
    let mean = series.iter().sum::<f64>() / series.len() as f64;

    Ok(RSI {
        period,
        value,
        mean,
        series,
    })
}

/// 상대강도지수(RSI) 기술적 지표 빌더
#[derive(Debug)]
pub struct RSIBuilder<C: Candle> {
    /// RSI 계산 기간
    period: usize,
    /// 변화량 계산 방식
    mode: RsiMode,
    _phantom: PhantomData<C>,
}

impl<C> RSIBuilder<C>
where
    C: Candle,
{
    /// 새 RSI 빌더 생성
    ///
    /// # Arguments
    /// * `period` - RSI 계산 기간 (일반적으로 14)
    /// * `mode` - 변화량 계산 방식
    ///
    /// # Returns
    /// * `IndicatorResult<RSIBuilder>` - 기간이 0이면 `InvalidArgument`
    pub fn new(period: usize, mode: RsiMode) -> IndicatorResult<Self> {
        if period == 0 {
            return Err(IndicatorError::InvalidArgument(
                "RSI 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(Self {
            period,
            mode,
            _phantom: PhantomData,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn mode(&self) -> RsiMode {
        self.mode
    }
}

impl<C> TABuilder<RSI, C> for RSIBuilder<C>
where
    C: Candle,
{
    fn required_len(&self) -> usize {
        self.period + 1
    }

    fn build(&self, data: &[C]) -> IndicatorResult<RSI> {
        calculate_rsi(data, self.period, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candle::OhlcvCandle;

    fn candles_from_closes(closes: &[f64]) -> Vec<OhlcvCandle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| OhlcvCandle::new(i as i64, c, c + 1.0, c - 1.0, c, 100.0))
            .collect()
    }

    #[test]
    fn test_rsi_mode_parse() {
        assert_eq!("close-close".parse::<RsiMode>(), Ok(RsiMode::CloseClose));
        assert_eq!("open-close".parse::<RsiMode>(), Ok(RsiMode::OpenClose));
        assert!(matches!(
            "high-low".parse::<RsiMode>(),
            Err(IndicatorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rsi_requires_period_plus_one() {
        let candles = candles_from_closes(&[1.0; 14]);
        let result = calculate_rsi(&candles, 14, RsiMode::CloseClose);
        assert_eq!(
            result,
            Err(IndicatorError::InsufficientData {
                indicator: "RSI",
                required: 15,
                actual: 14,
            })
        );
    }

    #[test]
    fn test_rsi_open_close_mode() {
        // 매 캔들이 시가 대비 +1 → 손실 없음
        let candles: Vec<OhlcvCandle> = (0..5)
            .map(|i| OhlcvCandle::new(i, 10.0, 12.0, 9.0, 11.0, 1.0))
            .collect();
        let rsi = calculate_rsi(&candles, 3, RsiMode::OpenClose).unwrap();
        assert_eq!(rsi.series.len(), 3);
        assert_eq!(rsi.value, 100.0);
    }

    #[test]
    fn test_rsi_builder_rejects_zero_period() {
        assert!(RSIBuilder::<OhlcvCandle>::new(0, RsiMode::CloseClose).is_err());
        let builder = RSIBuilder::<OhlcvCandle>::new(2, RsiMode::CloseClose).unwrap();
        assert_eq!(builder.required_len(), 3);
        let rsi = builder.build(&candles_from_closes(&[1.0, 2.0, 3.0])).unwrap();
        assert!(rsi.is_overbought(None));
    }
}
