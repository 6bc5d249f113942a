use crate::candle::{Candle, tail};
use crate::error::{IndicatorError, IndicatorResult, ensure_len};
use crate::indicator::TABuilder;
use std::fmt::Display;
use std::marker::PhantomData;

/// ATR 단일 값
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ATR {
    /// ATR 계산 기간
    pub period: usize,
    /// ATR 값
    pub value: f64,
}

impl Display for ATR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ATR({}: {:.4})", self.period, self.value)
    }
}

/// 캔들별 True Range (두 번째 캔들부터)
///
/// True Range = max(고가-저가, |고가-이전종가|, |저가-이전종가|)
pub fn true_ranges<C: Candle>(data: &[C]) -> Vec<f64> {
    data.windows(2)
        .map(|pair| {
            let prev_close = pair[0].close_price();
            let high = pair[1].high_price();
            let low = pair[1].low_price();
            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect()
}

/// 마지막 `period`개 True Range의 단순 평균
///
/// Wilder 평활을 쓰지 않습니다.
pub fn calculate_atr<C: Candle>(data: &[C], period: usize) -> IndicatorResult<ATR> {
    if period == 0 {
        return Err(IndicatorError::InvalidArgument(
            "ATR 기간은 0보다 커야 합니다".to_string(),
        ));
    }
    ensure_len("ATR", period + 1, data.len())?;

    let trs = true_ranges(data);
    let value = tail(&trs, period).iter().sum::<f64>() / period as f64;

    Ok(ATR { period, value })
}

/// ATR 계산을 위한 빌더
#[derive(Debug)]
pub struct ATRBuilder<C: Candle> {
    /// ATR 계산 기간
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C: Candle> ATRBuilder<C> {
    /// 새 ATR 빌더 생성
    pub fn new(period: usize) -> IndicatorResult<ATRBuilder<C>> {
        if period == 0 {
            return Err(IndicatorError::InvalidArgument(
                "ATR 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(ATRBuilder {
            period,
            _phantom: PhantomData,
        })
    }
}

impl<C: Candle> TABuilder<ATR, C> for ATRBuilder<C> {
    fn required_len(&self) -> usize {
        self.period + 1
    }

    fn build(&self, data: &[C]) -> IndicatorResult<ATR> {
        calculate_atr(data, self.period)
    }
}
