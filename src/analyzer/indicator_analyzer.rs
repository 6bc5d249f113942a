use crate::analyzer::base::{ForceAnalyzer, ForceTally};
use crate::candle::Candle;
use crate::config::IndicatorConfig;
use crate::error::IndicatorResult;
use crate::indicator::TABuilder;
use crate::indicator::atr::{ATR, ATRBuilder};
use crate::indicator::ichimoku::{Ichimoku, IchimokuBuilder, IchimokuParams};
use crate::indicator::macd::{MACD, MACDBuilder, PriceMode};
use crate::indicator::rsi::{RSI, RSIBuilder, RsiMode};
use crate::model::MarketDirection;
use std::fmt::Display;

/// 지표 점수 계산 결과
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorScore {
    /// 지표 기반 상승/하락 힘 (이벤트 수는 0)
    pub tally: ForceTally,
    /// 전환선/기준선 차이와 ATR 버퍼로 판단한 실제 움직임
    pub movement: MarketDirection,
    pub rsi: RSI,
    pub ichimoku: Ichimoku,
    pub atr: ATR,
    pub macd: MACD,
}

impl Display for IndicatorScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "지표 점수[{}, 움직임: {}] {} {} {} {}",
            self.tally, self.movement, self.rsi, self.ichimoku, self.atr, self.macd
        )
    }
}

/// RSI, 전환선/기준선, ATR, MACD를 묶어 힘 합계로 바꾸는 분석기
#[derive(Debug)]
pub struct IndicatorAnalyzer<C: Candle> {
    rsi: RSIBuilder<C>,
    ichimoku: IchimokuBuilder<C>,
    atr: ATRBuilder<C>,
    macd: MACDBuilder<C>,
    /// ATR을 움직임 버퍼로 바꾸는 배수
    pub atr_multiplier: f64,
    /// 히스토그램 가중치 = min(|hist| / scale, cap)
    pub histogram_scale: f64,
    pub histogram_cap: f64,
    /// 점수 계산용 후행 윈도우
    pub window: usize,
}

impl<C: Candle> IndicatorAnalyzer<C> {
    /// 설정으로부터 분석기 생성
    ///
    /// # Returns
    /// * `IndicatorResult<IndicatorAnalyzer>` - 기간이 0이거나 모드 문자열을 알 수 없으면 `InvalidArgument`
    pub fn from_config(
        config: &IndicatorConfig,
        atr_multiplier: f64,
        window: usize,
    ) -> IndicatorResult<IndicatorAnalyzer<C>> {
        let rsi_mode = config.rsi_mode.parse::<RsiMode>()?;
        let price_mode = config.macd_price_mode.parse::<PriceMode>()?;

        Ok(IndicatorAnalyzer {
            rsi: RSIBuilder::new(config.rsi_period, rsi_mode)?,
            ichimoku: IchimokuBuilder::new(IchimokuParams {
                tenkan_period: config.conversion_period,
                kijun_period: config.base_period,
            })?,
            atr: ATRBuilder::new(config.atr_period)?,
            macd: MACDBuilder::new(config.macd_params(), price_mode)?,
            atr_multiplier,
            histogram_scale: config.histogram_scale,
            histogram_cap: config.histogram_cap,
            window,
        })
    }

    /// 모든 지표 계산에 필요한 최소 캔들 수
    pub fn required_len(&self) -> usize {
        self.rsi
            .required_len()
            .max(self.ichimoku.required_len())
            .max(self.atr.required_len())
            .max(self.macd.required_len())
    }

    /// 윈도우 전체로 지표를 계산하고 점수화
    ///
    /// 지표 하나라도 데이터가 부족하면 오류를 그대로 반환합니다.
    pub fn score(&self, data: &[C]) -> IndicatorResult<IndicatorScore> {
        let rsi = self.rsi.build(data)?;
        let ichimoku = self.ichimoku.build(data)?;
        let atr = self.atr.build(data)?;
        let macd = self.macd.build(data)?;

        let (tally, movement) = self.score_readings(&rsi, &ichimoku, &atr, &macd);
        log::debug!("지표 점수: {tally}, 움직임 {movement} ({rsi}, {ichimoku}, {atr}, {macd})");

        Ok(IndicatorScore {
            tally,
            movement,
            rsi,
            ichimoku,
            atr,
            macd,
        })
    }

    /// 계산된 지표 값들을 힘 합계와 실제 움직임으로 변환
    pub fn score_readings(
        &self,
        rsi: &RSI,
        ichimoku: &Ichimoku,
        atr: &ATR,
        macd: &MACD,
    ) -> (ForceTally, MarketDirection) {
        let mut tally = ForceTally::default();

        if rsi.is_oversold(None) {
            tally.push_bullish(2.0);
        } else if rsi.is_overbought(None) {
            tally.push_bearish(2.0);
        } else if rsi.value < 50.0 {
            tally.push_bullish(1.0);
        } else if rsi.value > 50.0 {
            tally.push_bearish(1.0);
        }

        // 평균이 0이면 갭 비율 없음
        if let Some(gap) = rsi.gap_ratio() {
            let force = (gap - 1.0).abs() * 10.0;
            if gap < 1.0 {
                tally.push_bearish(force);
            } else if gap > 1.0 {
                tally.push_bullish(force);
            }
        }

        let diff = ichimoku.diff();
        let buffer = self.atr_multiplier * atr.value;
        let movement = if diff > buffer {
            tally.push_bullish(1.0);
            MarketDirection::Bullish
        } else if diff < -buffer {
            tally.push_bearish(1.0);
            MarketDirection::Bearish
        } else {
            MarketDirection::Neutral
        };

        if macd.macd_line > macd.signal_line {
            tally.push_bullish(1.0);
        } else if macd.macd_line < macd.signal_line {
            tally.push_bearish(1.0);
        }

        if macd.is_above_zero() {
            tally.push_bullish(0.5);
        } else {
            tally.push_bearish(0.5);
        }

        let histogram_weight = (macd.histogram.abs() / self.histogram_scale).min(self.histogram_cap);
        if macd.histogram > 0.0 {
            tally.push_bullish(histogram_weight);
        } else if macd.histogram < 0.0 {
            tally.push_bearish(histogram_weight);
        }

        (tally, movement)
    }
}

impl<C: Candle> ForceAnalyzer<C> for IndicatorAnalyzer<C> {
    fn window(&self) -> usize {
        self.window
    }

    fn tally(&self, data: &[C]) -> IndicatorResult<ForceTally> {
        Ok(self.score(data)?.tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candle::OhlcvCandle;
    use crate::error::IndicatorError;
    use crate::indicator::atr::calculate_atr;
    use crate::indicator::ichimoku::calculate_tenkan_kijun;
    use crate::indicator::macd::calculate_macd;
    use crate::indicator::rsi::calculate_rsi;

    fn falling_candles(count: usize) -> Vec<OhlcvCandle> {
        (0..count)
            .map(|i| {
                let close = 200.0 - i as f64 * 2.0;
                OhlcvCandle::new(i as i64 * 60_000, close + 1.0, close + 1.5, close - 0.5, close, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_falling_series_is_bearish_with_oversold_bonus() {
        let analyzer =
            IndicatorAnalyzer::<OhlcvCandle>::from_config(&IndicatorConfig::default(), 1.0, 42)
                .unwrap();
        let data = falling_candles(42);
        let score = analyzer.score(&data).unwrap();

        // 모든 변화가 하락이라 RSI 0 → 과매도 보너스 +2 (상승 쪽)
        assert_eq!(score.rsi.value, 0.0);
        assert_eq!(score.movement, MarketDirection::Bearish);
        assert!(score.tally.bearish > 0.0);
        assert_eq!(score.tally.bullish_count, 0);
        assert_eq!(score.tally.bearish_count, 0);
    }

    #[test]
    fn test_score_readings_directly() {
        let analyzer =
            IndicatorAnalyzer::<OhlcvCandle>::from_config(&IndicatorConfig::default(), 1.0, 42)
                .unwrap();
        let data = falling_candles(42);
        let rsi = calculate_rsi(&data, 14, RsiMode::CloseClose).unwrap();
        let ichimoku = calculate_tenkan_kijun(&data, IchimokuParams::default()).unwrap();
        let atr = calculate_atr(&data, 14).unwrap();
        let macd = calculate_macd(&data, Default::default(), PriceMode::Close).unwrap();

        let (tally, movement) = analyzer.score_readings(&rsi, &ichimoku, &atr, &macd);
        assert_eq!(movement, MarketDirection::Bearish);
        // 과매도 +2 외의 상승 힘 없음
        assert_eq!(tally.bullish, 2.0);
    }

    #[test]
    fn test_short_window_propagates_error() {
        let analyzer =
            IndicatorAnalyzer::<OhlcvCandle>::from_config(&IndicatorConfig::default(), 1.0, 42)
                .unwrap();
        assert_eq!(analyzer.required_len(), 35);
        let result = analyzer.score(&falling_candles(20));
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mut config = IndicatorConfig::default();
        config.macd_price_mode = "median".to_string();
        let result = IndicatorAnalyzer::<OhlcvCandle>::from_config(&config, 1.0, 42);
        assert!(matches!(result, Err(IndicatorError::InvalidArgument(_))));
    }
}
